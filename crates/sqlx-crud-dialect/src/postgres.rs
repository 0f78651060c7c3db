//! PostgreSQL grammar: LIMIT/OFFSET paging and WITH RECURSIVE traversals.

pub(crate) fn page_sql(sql: &str, offset: u64, limit: u64) -> String {
   if offset == 0 {
      format!("{sql} LIMIT {limit}")
   } else {
      format!("{sql} LIMIT {limit} OFFSET {offset}")
   }
}

pub(crate) fn column_sql(table: &str) -> String {
   format!(
      "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS \
       WHERE TABLE_NAME = '{table}' ORDER BY ORDINAL_POSITION"
   )
}

/// Descendant traversal: seed on `start_column = ?`, then repeatedly join
/// children whose `join_column` references the parent's `start_column`.
pub(crate) fn down_recursive_sql(table: &str, start_column: &str, join_column: &str) -> String {
   format!(
      "WITH RECURSIVE tmp AS ( \
       SELECT * FROM {table} WHERE {start_column} = ? \
       UNION ALL \
       SELECT a.* FROM {table} a JOIN tmp b ON a.{join_column} = b.{start_column} \
       ) SELECT * FROM tmp"
   )
}

/// Ancestor traversal: the join direction of [`down_recursive_sql`] swapped.
pub(crate) fn up_recursive_sql(table: &str, start_column: &str, join_column: &str) -> String {
   format!(
      "WITH RECURSIVE tmp AS ( \
       SELECT * FROM {table} WHERE {start_column} = ? \
       UNION ALL \
       SELECT a.* FROM {table} a JOIN tmp b ON a.{start_column} = b.{join_column} \
       ) SELECT * FROM tmp"
   )
}
