//! SQL dialect strategies for the sqlx-crud toolkit.
//!
//! Each supported database family diverges from the others in three places:
//! how a `SELECT` is rewritten into a bounded row window, how the metadata
//! catalog is queried for a table's columns, and how hierarchical
//! (parent/child) traversals are expressed. This crate captures those
//! differences behind a single closed [`Dialect`] enum so the rest of the
//! toolkit can stay syntax-agnostic.
//!
//! All functions here are pure string assembly — nothing in this crate
//! touches a connection. Statements are built from already-validated
//! identifiers and executed elsewhere with positional parameters.
//!
//! # Example
//!
//! ```
//! use sqlx_crud_dialect::Dialect;
//!
//! let dialect = Dialect::resolve("PostgreSQL").unwrap();
//! let sql = dialect.page_sql("SELECT * FROM posts", 40, 20);
//! assert_eq!(sql, "SELECT * FROM posts LIMIT 20 OFFSET 40");
//! ```

mod error;
mod mysql;
mod oracle;
mod postgres;

pub use error::{Error, Result};

/// A database family with its own SQL grammar for pagination, column
/// introspection, and recursive queries.
///
/// The set is closed: adding a backend means adding a variant here and a
/// module beside the existing ones. Dispatch is a `match` on the tag, so the
/// compiler flags every site that needs to learn about a new variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
   MySql,
   PostgreSql,
   Oracle,
}

/// Every supported dialect, in resolution order.
const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::PostgreSql, Dialect::Oracle];

impl Dialect {
   /// Resolve a database product name (as reported by the driver) to its
   /// dialect.
   ///
   /// Matching is case-insensitive but exact — `"mysql"` resolves,
   /// `"MySQL Community Server"` does not. Returns `None` for unrecognized
   /// products; callers must treat that as a fatal configuration error
   /// rather than fall back to a default grammar.
   pub fn resolve(product_name: &str) -> Option<Dialect> {
      ALL.into_iter()
         .find(|d| d.product_name().eq_ignore_ascii_case(product_name))
   }

   /// The canonical product name this dialect matches against.
   pub fn product_name(&self) -> &'static str {
      match self {
         Dialect::MySql => "MySQL",
         Dialect::PostgreSql => "PostgreSQL",
         Dialect::Oracle => "Oracle",
      }
   }

   /// Rewrite `sql` so that executing it yields exactly the rows at
   /// positions `[offset, offset + limit)` of the original result set, in
   /// the original order.
   ///
   /// `sql` must be a plain `SELECT` — no trailing semicolon and no
   /// pagination of its own. That precondition is the caller's
   /// responsibility and is not enforced here.
   pub fn page_sql(&self, sql: &str, offset: u64, limit: u64) -> String {
      match self {
         Dialect::MySql => mysql::page_sql(sql, offset, limit),
         Dialect::PostgreSql => postgres::page_sql(sql, offset, limit),
         Dialect::Oracle => oracle::page_sql(sql, offset, limit),
      }
   }

   /// A statement against the metadata catalog returning one `COLUMN_NAME`
   /// row per physical column of `table`, in declaration order.
   ///
   /// The table name is interpolated into the statement text, so it must be
   /// validated as an identifier before it gets here.
   pub fn column_sql(&self, table: &str) -> String {
      match self {
         Dialect::MySql => mysql::column_sql(table),
         Dialect::PostgreSql => postgres::column_sql(table),
         Dialect::Oracle => oracle::column_sql(table),
      }
   }

   /// A parameterized traversal from a node to its descendants: the single
   /// `?` placeholder is bound to the start value of `start_column`, and
   /// `join_column` is the column referencing the parent row.
   pub fn down_recursive_sql(
      &self,
      table: &str,
      start_column: &str,
      join_column: &str,
   ) -> Result<String> {
      match self {
         Dialect::MySql => Err(Error::RecursiveUnsupported(self.product_name())),
         Dialect::PostgreSql => Ok(postgres::down_recursive_sql(table, start_column, join_column)),
         Dialect::Oracle => Ok(oracle::down_recursive_sql(table, start_column, join_column)),
      }
   }

   /// A parameterized traversal from a node to its ancestors — the same
   /// contract as [`Dialect::down_recursive_sql`] with the join direction
   /// swapped.
   pub fn up_recursive_sql(
      &self,
      table: &str,
      start_column: &str,
      join_column: &str,
   ) -> Result<String> {
      match self {
         Dialect::MySql => Err(Error::RecursiveUnsupported(self.product_name())),
         Dialect::PostgreSql => Ok(postgres::up_recursive_sql(table, start_column, join_column)),
         Dialect::Oracle => Ok(oracle::up_recursive_sql(table, start_column, join_column)),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   // ─── resolve ───

   #[test]
   fn resolve_is_case_insensitive() {
      assert_eq!(Dialect::resolve("MySQL"), Some(Dialect::MySql));
      assert_eq!(Dialect::resolve("mysql"), Some(Dialect::MySql));
      assert_eq!(Dialect::resolve("POSTGRESQL"), Some(Dialect::PostgreSql));
      assert_eq!(Dialect::resolve("oracle"), Some(Dialect::Oracle));
   }

   #[test]
   fn resolve_requires_exact_match() {
      assert_eq!(Dialect::resolve("MySQL Community Server"), None);
      assert_eq!(Dialect::resolve("Postgres"), None);
      assert_eq!(Dialect::resolve(""), None);
   }

   #[test]
   fn every_dialect_resolves_its_own_product_name() {
      for dialect in [Dialect::MySql, Dialect::PostgreSql, Dialect::Oracle] {
         assert_eq!(Dialect::resolve(dialect.product_name()), Some(dialect));
      }
   }

   // ─── recursive support ───

   #[test]
   fn mysql_rejects_recursive_queries() {
      let err = Dialect::MySql
         .down_recursive_sql("node", "id", "parent_id")
         .unwrap_err();
      assert!(matches!(err, Error::RecursiveUnsupported("MySQL")));

      let err = Dialect::MySql
         .up_recursive_sql("node", "id", "parent_id")
         .unwrap_err();
      assert!(matches!(err, Error::RecursiveUnsupported("MySQL")));
   }
}
