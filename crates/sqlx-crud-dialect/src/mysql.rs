//! MySQL grammar: comma-form LIMIT and INFORMATION_SCHEMA introspection.

/// Append MySQL's `LIMIT` clause.
///
/// The comma grammar (`LIMIT offset, limit`) is used when an offset is
/// present; a bare `LIMIT limit` otherwise. Both are equivalent to the
/// `LIMIT n OFFSET m` form — one grammar is chosen and emitted consistently.
pub(crate) fn page_sql(sql: &str, offset: u64, limit: u64) -> String {
   if offset == 0 {
      format!("{sql} LIMIT {limit}")
   } else {
      format!("{sql} LIMIT {offset}, {limit}")
   }
}

pub(crate) fn column_sql(table: &str) -> String {
   format!(
      "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS \
       WHERE TABLE_NAME = '{table}' ORDER BY ORDINAL_POSITION"
   )
}
