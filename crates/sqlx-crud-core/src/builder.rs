//! Statement builders for predicate-driven CRUD.
//!
//! Every function here is pure: text and bound values in, text and bound
//! values out. Nothing is executed, and nothing partially built ever
//! reaches a connection. Predicate maps are iterated in insertion order,
//! and the returned value lists match that order exactly — positional
//! binding depends on it.
//!
//! Identifiers (table and column names) are validated before they are
//! interpolated into statement text; values always travel as parameters.
//!
//! Empty inputs are deliberately not errors: an empty predicate map or an
//! empty `IN` collection yields `None`, which callers treat as "no
//! statement, zero rows affected". That keeps compositional call sites
//! ("delete by this possibly-empty list of ids") safe without branching.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::executor::Row;
use crate::ident::validate_identifier;

/// The maximum number of values placed in a single `IN (...)` list before
/// partitioning. 1000 stays under common driver and backend hard limits
/// (Oracle's 1000-literal `IN` restriction among them).
pub const SAFE_IN_SIZE: usize = 1000;

/// Sort direction for an ORDER BY column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   fn keyword(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }
}

/// A column in an ORDER BY clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderColumn {
   /// Column name as it appears in the statement
   pub name: String,
   /// Sort direction for this column
   pub direction: SortDirection,
}

impl OrderColumn {
   /// Create an order column with ascending sort direction.
   pub fn asc(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         direction: SortDirection::Asc,
      }
   }

   /// Create an order column with descending sort direction.
   pub fn desc(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         direction: SortDirection::Desc,
      }
   }
}

/// Case-insensitive lookup in a predicate map.
///
/// Backends differ in the casing of returned column names (Oracle
/// upper-cases unquoted identifiers), so comparisons between maps that may
/// have crossed the driver boundary ignore ASCII case.
pub(crate) fn get_ci<'a>(row: &'a Row, column: &str) -> Option<&'a JsonValue> {
   row.iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(column))
      .map(|(_, value)| value)
}

/// Build a conjunctive equality predicate from a column-value map.
///
/// Returns the clause text (without the `WHERE` keyword, empty for an
/// empty map) and the values in clause order.
pub fn where_clause(filter: &Row) -> Result<(String, Vec<JsonValue>)> {
   let mut parts = Vec::with_capacity(filter.len());
   let mut values = Vec::with_capacity(filter.len());
   for (column, value) in filter {
      validate_identifier(column)?;
      parts.push(format!("{column} = ?"));
      values.push(value.clone());
   }
   Ok((parts.join(" AND "), values))
}

/// Build an ORDER BY clause, or an empty string for no columns.
pub fn order_by_clause(order: &[OrderColumn]) -> Result<String> {
   if order.is_empty() {
      return Ok(String::new());
   }
   let mut parts = Vec::with_capacity(order.len());
   for column in order {
      validate_identifier(&column.name)?;
      parts.push(format!("{} {}", column.name, column.direction.keyword()));
   }
   Ok(format!("ORDER BY {}", parts.join(", ")))
}

/// Build a set-membership predicate for `column`, partitioning large value
/// collections so no single `IN` list exceeds [`SAFE_IN_SIZE`].
///
/// Values are de-duplicated first, preserving encounter order. The shape of
/// the clause depends on the distinct count `k`:
///
/// - `k == 0`: `None` (no statement should be issued)
/// - `k == 1`: `col = :col` — plain equality binds cheaper and plans
///   more stably than a one-element `IN`
/// - `2 ≤ k ≤ 1000`: `col IN (:col)` with one collection parameter
/// - `k > 1000`: `( col IN (:col1) OR col IN (:col2) OR ... )`, one
///   collection parameter per chunk of at most 1000 values
///
/// This is the one place the toolkit uses named parameters instead of
/// positional `?` binding, because it must bind variable-length lists; the
/// [`crate::params`] module expands them back to positional form before
/// execution.
pub fn in_clause(
   column: &str,
   values: &[JsonValue],
) -> Result<Option<(String, IndexMap<String, JsonValue>)>> {
   if values.is_empty() {
      return Ok(None);
   }
   validate_identifier(column)?;

   let mut seen = HashSet::new();
   let mut distinct = Vec::new();
   for value in values {
      if seen.insert(value.to_string()) {
         distinct.push(value.clone());
      }
   }

   let mut params = IndexMap::new();
   let clause = if distinct.len() == 1 {
      params.insert(column.to_string(), distinct[0].clone());
      format!("{column} = :{column}")
   } else if distinct.len() <= SAFE_IN_SIZE {
      params.insert(column.to_string(), JsonValue::Array(distinct));
      format!("{column} IN (:{column})")
   } else {
      let mut parts = Vec::new();
      for (index, chunk) in distinct.chunks(SAFE_IN_SIZE).enumerate() {
         let key = format!("{column}{}", index + 1);
         parts.push(format!("{column} IN (:{key})"));
         params.insert(key, JsonValue::Array(chunk.to_vec()));
      }
      format!("( {} )", parts.join(" OR "))
   };

   Ok(Some((clause, params)))
}

/// Build `SELECT * FROM table [WHERE ...] [ORDER BY ...]`.
///
/// An empty filter selects the whole table; selects are the one statement
/// kind where an unconditional predicate is legitimate.
pub fn select_sql(
   table: &str,
   filter: &Row,
   order: &[OrderColumn],
) -> Result<(String, Vec<JsonValue>)> {
   validate_identifier(table)?;
   let (clause, values) = where_clause(filter)?;
   let mut sql = format!("SELECT * FROM {table}");
   if !clause.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&clause);
   }
   let order_clause = order_by_clause(order)?;
   if !order_clause.is_empty() {
      sql.push(' ');
      sql.push_str(&order_clause);
   }
   Ok((sql, values))
}

/// Build `SELECT * FROM table WHERE <in-clause> [ORDER BY ...]`, or `None`
/// for an empty value collection.
pub fn select_in_sql(
   table: &str,
   column: &str,
   values: &[JsonValue],
   order: &[OrderColumn],
) -> Result<Option<(String, IndexMap<String, JsonValue>)>> {
   validate_identifier(table)?;
   let Some((clause, params)) = in_clause(column, values)? else {
      return Ok(None);
   };
   let mut sql = format!("SELECT * FROM {table} WHERE {clause}");
   let order_clause = order_by_clause(order)?;
   if !order_clause.is_empty() {
      sql.push(' ');
      sql.push_str(&order_clause);
   }
   Ok(Some((sql, params)))
}

/// Build `INSERT INTO table ( c1, c2, ... ) VALUES ( ?, ?, ... )`, or
/// `None` for an empty column map.
pub fn insert_sql(table: &str, row: &Row) -> Result<Option<(String, Vec<JsonValue>)>> {
   if row.is_empty() {
      return Ok(None);
   }
   validate_identifier(table)?;

   let mut columns = Vec::with_capacity(row.len());
   let mut values = Vec::with_capacity(row.len());
   for (column, value) in row {
      validate_identifier(column)?;
      columns.push(column.as_str());
      values.push(value.clone());
   }
   let placeholders = vec!["?"; columns.len()].join(", ");
   let sql = format!(
      "INSERT INTO {table} ( {} ) VALUES ( {placeholders} )",
      columns.join(", ")
   );
   Ok(Some((sql, values)))
}

/// Build the multi-row variant of [`insert_sql`]: one statement text,
/// executed once per row with that row's values.
pub fn insert_many_sql(table: &str, columns: &[&str]) -> Result<Option<String>> {
   if columns.is_empty() {
      return Ok(None);
   }
   validate_identifier(table)?;
   for column in columns {
      validate_identifier(column)?;
   }
   let placeholders = vec!["?"; columns.len()].join(", ");
   Ok(Some(format!(
      "INSERT INTO {table} ( {} ) VALUES ( {placeholders} )",
      columns.join(", ")
   )))
}

/// Build `UPDATE table SET ... WHERE ...` with SET values bound before
/// WHERE values.
///
/// A column is excluded from the SET clause when the WHERE map carries the
/// same column (ignoring ASCII case) with an identical value — a redundant
/// self-assignment that some backends reject when the column is also a key
/// predicate target. Returns `None` when the SET clause is empty after
/// exclusion, or when either input map is empty: an update is never issued
/// without a predicate.
pub fn update_sql(
   table: &str,
   set: &Row,
   filter: &Row,
) -> Result<Option<(String, Vec<JsonValue>)>> {
   if set.is_empty() || filter.is_empty() {
      return Ok(None);
   }
   validate_identifier(table)?;

   let mut set_parts = Vec::new();
   let mut values = Vec::new();
   for (column, value) in set {
      validate_identifier(column)?;
      if get_ci(filter, column) == Some(value) {
         continue;
      }
      set_parts.push(format!("{column} = ?"));
      values.push(value.clone());
   }
   if set_parts.is_empty() {
      return Ok(None);
   }

   let (clause, where_values) = where_clause(filter)?;
   values.extend(where_values);
   let sql = format!("UPDATE {table} SET {} WHERE {clause}", set_parts.join(", "));
   Ok(Some((sql, values)))
}

/// Build `DELETE FROM table WHERE ...`, or `None` for an empty predicate.
///
/// An empty predicate map is never turned into an unconditional DELETE;
/// the caller gets "no statement" instead of a truncated table.
pub fn delete_sql(table: &str, filter: &Row) -> Result<Option<(String, Vec<JsonValue>)>> {
   if filter.is_empty() {
      return Ok(None);
   }
   validate_identifier(table)?;
   let (clause, values) = where_clause(filter)?;
   Ok(Some((format!("DELETE FROM {table} WHERE {clause}"), values)))
}

/// Build `DELETE FROM table WHERE <in-clause>`, or `None` for an empty
/// value collection.
pub fn delete_in_sql(
   table: &str,
   column: &str,
   values: &[JsonValue],
) -> Result<Option<(String, IndexMap<String, JsonValue>)>> {
   validate_identifier(table)?;
   let Some((clause, params)) = in_clause(column, values)? else {
      return Ok(None);
   };
   Ok(Some((format!("DELETE FROM {table} WHERE {clause}"), params)))
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   fn row(entries: &[(&str, JsonValue)]) -> Row {
      entries
         .iter()
         .map(|(k, v)| (k.to_string(), v.clone()))
         .collect()
   }

   // ─── where_clause ───

   #[test]
   fn where_clause_preserves_insertion_order() {
      let filter = row(&[("b", json!(2)), ("a", json!(1))]);
      let (clause, values) = where_clause(&filter).unwrap();
      assert_eq!(clause, "b = ? AND a = ?");
      assert_eq!(values, vec![json!(2), json!(1)]);
   }

   #[test]
   fn where_clause_empty_map() {
      let (clause, values) = where_clause(&Row::default()).unwrap();
      assert_eq!(clause, "");
      assert!(values.is_empty());
   }

   #[test]
   fn where_clause_rejects_bad_column() {
      let filter = row(&[("id; DROP TABLE t --", json!(1))]);
      assert!(where_clause(&filter).is_err());
   }

   // ─── in_clause ───

   #[test]
   fn in_clause_empty_collection_is_noop() {
      assert!(in_clause("id", &[]).unwrap().is_none());
   }

   #[test]
   fn in_clause_single_value_uses_equality() {
      let (clause, params) = in_clause("id", &[json!(7)]).unwrap().unwrap();
      assert_eq!(clause, "id = :id");
      assert_eq!(params.len(), 1);
      assert_eq!(params["id"], json!(7));
   }

   #[test]
   fn in_clause_duplicates_collapse_to_equality() {
      let (clause, params) = in_clause("id", &[json!(7), json!(7), json!(7)])
         .unwrap()
         .unwrap();
      assert_eq!(clause, "id = :id");
      assert_eq!(params["id"], json!(7));
   }

   #[test]
   fn in_clause_small_collection_uses_single_in() {
      let values: Vec<_> = (0..1000).map(|i| json!(i)).collect();
      let (clause, params) = in_clause("id", &values).unwrap().unwrap();
      assert_eq!(clause, "id IN (:id)");
      assert_eq!(params.len(), 1);
      assert_eq!(params["id"].as_array().unwrap().len(), 1000);
   }

   #[test]
   fn in_clause_partitions_past_safe_size() {
      let values: Vec<_> = (0..1001).map(|i| json!(i)).collect();
      let (clause, params) = in_clause("id", &values).unwrap().unwrap();
      assert_eq!(clause, "( id IN (:id1) OR id IN (:id2) )");
      assert_eq!(params["id1"].as_array().unwrap().len(), 1000);
      assert_eq!(params["id2"].as_array().unwrap().len(), 1);
   }

   #[test]
   fn in_clause_partition_cardinality_is_exact() {
      // 2500 distinct values → chunks of 1000, 1000, 500; nothing dropped
      // or duplicated.
      let values: Vec<_> = (0..2500).map(|i| json!(i)).collect();
      let (clause, params) = in_clause("id", &values).unwrap().unwrap();
      assert_eq!(
         clause,
         "( id IN (:id1) OR id IN (:id2) OR id IN (:id3) )"
      );

      let mut bound = Vec::new();
      for chunk in params.values() {
         bound.extend(chunk.as_array().unwrap().iter().cloned());
      }
      let expected: Vec<_> = (0..2500).map(|i| json!(i)).collect();
      assert_eq!(bound, expected);
   }

   #[test]
   fn in_clause_dedup_preserves_encounter_order() {
      let (clause, params) = in_clause("id", &[json!(3), json!(1), json!(3), json!(2)])
         .unwrap()
         .unwrap();
      assert_eq!(clause, "id IN (:id)");
      assert_eq!(params["id"], json!([3, 1, 2]));
   }

   // ─── insert_sql ───

   #[test]
   fn insert_sql_matches_column_order() {
      let columns = row(&[("id", json!(1)), ("name", json!("a"))]);
      let (sql, values) = insert_sql("t", &columns).unwrap().unwrap();
      assert_eq!(sql, "INSERT INTO t ( id, name ) VALUES ( ?, ? )");
      assert_eq!(values, vec![json!(1), json!("a")]);
   }

   #[test]
   fn insert_sql_empty_map_is_noop() {
      assert!(insert_sql("t", &Row::default()).unwrap().is_none());
   }

   #[test]
   fn insert_many_sql_requires_columns() {
      assert!(insert_many_sql("t", &[]).unwrap().is_none());
      assert_eq!(
         insert_many_sql("t", &["a", "b"]).unwrap().unwrap(),
         "INSERT INTO t ( a, b ) VALUES ( ?, ? )"
      );
   }

   // ─── update_sql ───

   #[test]
   fn update_sql_binds_set_before_where() {
      let set = row(&[("name", json!("new")), ("age", json!(30))]);
      let filter = row(&[("id", json!(5))]);
      let (sql, values) = update_sql("t", &set, &filter).unwrap().unwrap();
      assert_eq!(sql, "UPDATE t SET name = ?, age = ? WHERE id = ?");
      assert_eq!(values, vec![json!("new"), json!(30), json!(5)]);
   }

   #[test]
   fn update_sql_excludes_identical_set_and_where_entries() {
      // id appears in both maps with an equal value → dropped from SET.
      let set = row(&[("id", json!(5)), ("name", json!("new"))]);
      let filter = row(&[("id", json!(5))]);
      let (sql, values) = update_sql("t", &set, &filter).unwrap().unwrap();
      assert_eq!(sql, "UPDATE t SET name = ? WHERE id = ?");
      assert_eq!(values, vec![json!("new"), json!(5)]);
   }

   #[test]
   fn update_sql_keeps_column_when_values_differ() {
      let set = row(&[("id", json!(6)), ("name", json!("new"))]);
      let filter = row(&[("id", json!(5))]);
      let (sql, values) = update_sql("t", &set, &filter).unwrap().unwrap();
      assert_eq!(sql, "UPDATE t SET id = ?, name = ? WHERE id = ?");
      assert_eq!(values, vec![json!(6), json!("new"), json!(5)]);
   }

   #[test]
   fn update_sql_exclusion_ignores_ascii_case() {
      let set = row(&[("ID", json!(5)), ("name", json!("new"))]);
      let filter = row(&[("id", json!(5))]);
      let (sql, _) = update_sql("t", &set, &filter).unwrap().unwrap();
      assert_eq!(sql, "UPDATE t SET name = ? WHERE id = ?");
   }

   #[test]
   fn update_sql_empty_set_after_exclusion_is_noop() {
      let set = row(&[("id", json!(5))]);
      let filter = row(&[("id", json!(5))]);
      assert!(update_sql("t", &set, &filter).unwrap().is_none());
   }

   #[test]
   fn update_sql_requires_predicate() {
      let set = row(&[("name", json!("new"))]);
      assert!(update_sql("t", &set, &Row::default()).unwrap().is_none());
   }

   // ─── delete_sql ───

   #[test]
   fn delete_sql_builds_conjunction() {
      let filter = row(&[("a", json!(1)), ("b", json!(2))]);
      let (sql, values) = delete_sql("t", &filter).unwrap().unwrap();
      assert_eq!(sql, "DELETE FROM t WHERE a = ? AND b = ?");
      assert_eq!(values, vec![json!(1), json!(2)]);
   }

   #[test]
   fn delete_sql_never_deletes_unconditionally() {
      assert!(delete_sql("t", &Row::default()).unwrap().is_none());
   }

   #[test]
   fn delete_in_sql_empty_collection_is_noop() {
      assert!(delete_in_sql("t", "id", &[]).unwrap().is_none());
   }

   #[test]
   fn delete_in_sql_wraps_in_clause() {
      let (sql, params) = delete_in_sql("t", "id", &[json!(1), json!(2)])
         .unwrap()
         .unwrap();
      assert_eq!(sql, "DELETE FROM t WHERE id IN (:id)");
      assert_eq!(params["id"], json!([1, 2]));
   }

   // ─── select_sql ───

   #[test]
   fn select_sql_empty_filter_selects_all() {
      let (sql, values) = select_sql("t", &Row::default(), &[]).unwrap();
      assert_eq!(sql, "SELECT * FROM t");
      assert!(values.is_empty());
   }

   #[test]
   fn select_sql_with_filter_and_order() {
      let filter = row(&[("category", json!("tech"))]);
      let order = vec![OrderColumn::desc("score"), OrderColumn::asc("id")];
      let (sql, values) = select_sql("t", &filter, &order).unwrap();
      assert_eq!(
         sql,
         "SELECT * FROM t WHERE category = ? ORDER BY score DESC, id ASC"
      );
      assert_eq!(values, vec![json!("tech")]);
   }

   #[test]
   fn select_in_sql_with_order() {
      let (sql, params) = select_in_sql("t", "id", &[json!(1), json!(2)], &[OrderColumn::asc("id")])
         .unwrap()
         .unwrap();
      assert_eq!(sql, "SELECT * FROM t WHERE id IN (:id) ORDER BY id ASC");
      assert_eq!(params["id"], json!([1, 2]));
   }

   #[test]
   fn order_by_rejects_invalid_column() {
      let order = vec![OrderColumn::asc("id; DROP TABLE t --")];
      assert!(order_by_clause(&order).is_err());
   }
}
