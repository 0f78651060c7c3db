//! Oracle grammar: ROWNUM windowing, USER_TAB_COLUMNS introspection, and
//! CONNECT BY traversals.

/// Wrap `sql` in the pre-12c ROWNUM windowing idiom.
///
/// The inner query numbers rows up to `offset + limit`; the outer query
/// discards the first `offset`. `tmp.*` preserves the original column list.
pub(crate) fn page_sql(sql: &str, offset: u64, limit: u64) -> String {
   format!(
      "SELECT * FROM ( SELECT tmp.*, ROWNUM ROW_ID FROM ( {sql} ) tmp \
       WHERE ROWNUM <= {} ) WHERE ROW_ID > {offset}",
      offset + limit
   )
}

/// Oracle stores unquoted identifiers upper-case, so the table name is
/// upper-cased before matching against USER_TAB_COLUMNS.
pub(crate) fn column_sql(table: &str) -> String {
   format!(
      "SELECT COLUMN_NAME FROM USER_TAB_COLUMNS \
       WHERE TABLE_NAME = '{}' ORDER BY COLUMN_ID",
      table.to_uppercase()
   )
}

pub(crate) fn down_recursive_sql(table: &str, start_column: &str, join_column: &str) -> String {
   format!(
      "SELECT * FROM {table} START WITH {start_column} = ? \
       CONNECT BY PRIOR {start_column} = {join_column}"
   )
}

pub(crate) fn up_recursive_sql(table: &str, start_column: &str, join_column: &str) -> String {
   format!(
      "SELECT * FROM {table} START WITH {start_column} = ? \
       CONNECT BY PRIOR {join_column} = {start_column}"
   )
}

#[cfg(test)]
mod tests {
   use super::*;

   // ─── page_sql ───

   #[test]
   fn window_bounds_come_from_offset_and_limit() {
      assert_eq!(
         page_sql("SELECT * FROM t", 40, 20),
         "SELECT * FROM ( SELECT tmp.*, ROWNUM ROW_ID FROM ( SELECT * FROM t ) tmp \
          WHERE ROWNUM <= 60 ) WHERE ROW_ID > 40"
      );
   }

   #[test]
   fn first_page_keeps_lower_bound_at_zero() {
      assert_eq!(
         page_sql("SELECT * FROM t", 0, 20),
         "SELECT * FROM ( SELECT tmp.*, ROWNUM ROW_ID FROM ( SELECT * FROM t ) tmp \
          WHERE ROWNUM <= 20 ) WHERE ROW_ID > 0"
      );
   }

   #[test]
   fn zero_limit_makes_bounds_collapse() {
      // ROWNUM <= offset with ROW_ID > offset can match nothing.
      assert_eq!(
         page_sql("SELECT * FROM t", 40, 0),
         "SELECT * FROM ( SELECT tmp.*, ROWNUM ROW_ID FROM ( SELECT * FROM t ) tmp \
          WHERE ROWNUM <= 40 ) WHERE ROW_ID > 40"
      );
   }

   // ─── column_sql ───

   #[test]
   fn column_sql_uppercases_the_table_name() {
      assert_eq!(
         column_sql("sys_user"),
         "SELECT COLUMN_NAME FROM USER_TAB_COLUMNS \
          WHERE TABLE_NAME = 'SYS_USER' ORDER BY COLUMN_ID"
      );
   }

   // ─── recursive traversals ───

   #[test]
   fn down_recursive_uses_connect_by_prior() {
      assert_eq!(
         down_recursive_sql("dept", "id", "parent_id"),
         "SELECT * FROM dept START WITH id = ? CONNECT BY PRIOR id = parent_id"
      );
   }

   #[test]
   fn up_recursive_swaps_the_prior_column() {
      assert_eq!(
         up_recursive_sql("dept", "id", "parent_id"),
         "SELECT * FROM dept START WITH id = ? CONNECT BY PRIOR parent_id = id"
      );
   }
}
