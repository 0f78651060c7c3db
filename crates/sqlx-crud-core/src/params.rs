//! Parameter-placeholder rewriting.
//!
//! Two textual transforms live here, both driven by the same quote- and
//! comment-aware scan so placeholders inside string literals, quoted
//! identifiers, or comments are left untouched:
//!
//! - [`expand_named`] rewrites `:name` placeholders to positional `?`
//!   markers, flattening collection values into `?, ?, ...` lists. The
//!   `IN`-clause builder is the only producer of named placeholders; every
//!   executor consumes positional ones.
//! - [`number_placeholders`] rewrites positional `?` markers to `$1`,
//!   `$2`, … for backends (PostgreSQL) that only accept numbered
//!   parameters.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Advance the scanner index past a quoted literal or identifier.
///
/// `quote` is the opening quote character (`'` or `"`). The scanner handles
/// SQL-standard doubled-quote escaping (`''` or `""`). Returns the index of
/// the closing quote, or `len` when unterminated.
fn skip_quoted(bytes: &[u8], len: usize, i: usize, quote: u8) -> usize {
   let mut j = i + 1;
   while j < len {
      if bytes[j] == quote {
         if j + 1 < len && bytes[j + 1] == quote {
            j += 2;
            continue;
         }
         return j;
      }
      j += 1;
   }
   j
}

/// Advance the scanner index past a `--` line comment (until newline or end).
fn skip_line_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2;
   while j < len && bytes[j] != b'\n' {
      j += 1;
   }
   j
}

/// Advance the scanner index past a `/* … */` block comment. Returns the
/// index of the closing `/`, or `len` when unterminated.
fn skip_block_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2;
   while j + 1 < len {
      if bytes[j] == b'*' && bytes[j + 1] == b'/' {
         return j + 1;
      }
      j += 1;
   }
   len
}

/// Rewrite a statement, visiting every position outside quotes and
/// comments. `on_byte` receives the byte position and returns how many
/// input bytes it consumed (0 to let the scanner copy the byte through).
fn rewrite(sql: &str, mut on_byte: impl FnMut(usize, &mut String) -> Result<usize>) -> Result<String> {
   let bytes = sql.as_bytes();
   let len = bytes.len();
   let mut out = String::with_capacity(len);
   let mut i = 0;

   while i < len {
      match bytes[i] {
         quote @ (b'\'' | b'"') => {
            let end = skip_quoted(bytes, len, i, quote).min(len - 1);
            out.push_str(&sql[i..=end]);
            i = end + 1;
         }
         b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
            let end = skip_line_comment(bytes, len, i).min(len - 1);
            out.push_str(&sql[i..=end]);
            i = end + 1;
         }
         b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
            let end = skip_block_comment(bytes, len, i).min(len - 1);
            out.push_str(&sql[i..=end]);
            i = end + 1;
         }
         _ => {
            let consumed = on_byte(i, &mut out)?;
            if consumed == 0 {
               // Copy a single byte through. Multi-byte UTF-8 sequences
               // never match the scanner's ASCII triggers, so slicing on
               // the next ASCII boundary is safe.
               let start = i;
               i += 1;
               while i < len && !bytes[i].is_ascii() {
                  i += 1;
               }
               out.push_str(&sql[start..i]);
            } else {
               i += consumed;
            }
         }
      }
   }

   Ok(out)
}

/// Expand `:name` placeholders into positional `?` markers.
///
/// Scalar values expand to a single `?`; array values expand to a
/// comma-separated list, one marker per element. The returned value list
/// is ordered to match the rewritten markers exactly. A placeholder with
/// no bound value is an error, as is one bound to an empty collection —
/// `IN ()` is not valid SQL on any supported backend. A `::` sequence is
/// left alone (PostgreSQL cast syntax), as is a bare `:` with no
/// identifier after it.
pub fn expand_named(
   sql: &str,
   params: &IndexMap<String, JsonValue>,
) -> Result<(String, Vec<JsonValue>)> {
   let bytes = sql.as_bytes();
   let len = bytes.len();
   let mut values = Vec::new();

   let rewritten = rewrite(sql, |i, out| {
      if bytes[i] != b':' {
         return Ok(0);
      }
      if i + 1 < len && bytes[i + 1] == b':' {
         out.push_str("::");
         return Ok(2);
      }
      let start = i + 1;
      let mut j = start;
      while j < len && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
         j += 1;
      }
      if j == start {
         return Ok(0);
      }
      let name = &sql[start..j];
      let Some(value) = params.get(name) else {
         return Err(Error::MissingNamedParameter {
            name: name.to_string(),
         });
      };
      match value {
         JsonValue::Array(items) => {
            if items.is_empty() {
               return Err(Error::EmptyNamedParameter {
                  name: name.to_string(),
               });
            }
            out.push_str(&vec!["?"; items.len()].join(", "));
            values.extend(items.iter().cloned());
         }
         scalar => {
            out.push('?');
            values.push(scalar.clone());
         }
      }
      Ok(j - i)
   })?;

   Ok((rewritten, values))
}

/// Rewrite positional `?` markers to `$1`, `$2`, … in order of appearance.
pub fn number_placeholders(sql: &str) -> String {
   let bytes = sql.as_bytes();
   let mut next = 1u32;

   // The closure is infallible; the scanner's Result plumbing collapses.
   let rewritten = rewrite(sql, |i, out| {
      if bytes[i] != b'?' {
         return Ok(0);
      }
      out.push('$');
      out.push_str(&next.to_string());
      next += 1;
      Ok(1)
   });

   match rewritten {
      Ok(sql) => sql,
      Err(_) => unreachable!("placeholder numbering never fails"),
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   fn params(entries: &[(&str, JsonValue)]) -> IndexMap<String, JsonValue> {
      entries
         .iter()
         .map(|(k, v)| (k.to_string(), v.clone()))
         .collect()
   }

   // ─── expand_named ───

   #[test]
   fn expands_scalar_parameter() {
      let (sql, values) =
         expand_named("SELECT * FROM t WHERE id = :id", &params(&[("id", json!(7))])).unwrap();
      assert_eq!(sql, "SELECT * FROM t WHERE id = ?");
      assert_eq!(values, vec![json!(7)]);
   }

   #[test]
   fn expands_collection_parameter() {
      let (sql, values) = expand_named(
         "SELECT * FROM t WHERE id IN (:id)",
         &params(&[("id", json!([1, 2, 3]))]),
      )
      .unwrap();
      assert_eq!(sql, "SELECT * FROM t WHERE id IN (?, ?, ?)");
      assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
   }

   #[test]
   fn expands_chunked_in_clauses_in_order() {
      let (sql, values) = expand_named(
         "DELETE FROM t WHERE ( id IN (:id1) OR id IN (:id2) )",
         &params(&[("id1", json!([1, 2])), ("id2", json!([3]))]),
      )
      .unwrap();
      assert_eq!(sql, "DELETE FROM t WHERE ( id IN (?, ?) OR id IN (?) )");
      assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
   }

   #[test]
   fn missing_parameter_is_an_error() {
      let err = expand_named("SELECT * FROM t WHERE id = :id", &params(&[])).unwrap_err();
      assert!(matches!(err, Error::MissingNamedParameter { name } if name == "id"));
   }

   #[test]
   fn empty_collection_is_an_error() {
      let err = expand_named(
         "SELECT * FROM t WHERE id IN (:id)",
         &params(&[("id", json!([]))]),
      )
      .unwrap_err();
      assert!(matches!(err, Error::EmptyNamedParameter { name } if name == "id"));
   }

   #[test]
   fn cast_syntax_is_untouched() {
      let (sql, values) = expand_named(
         "SELECT created_at::date FROM t WHERE id = :id",
         &params(&[("id", json!(1))]),
      )
      .unwrap();
      assert_eq!(sql, "SELECT created_at::date FROM t WHERE id = ?");
      assert_eq!(values, vec![json!(1)]);
   }

   #[test]
   fn placeholder_in_string_literal_is_untouched() {
      let (sql, values) = expand_named(
         "SELECT * FROM t WHERE name = ':id' AND id = :id",
         &params(&[("id", json!(1))]),
      )
      .unwrap();
      assert_eq!(sql, "SELECT * FROM t WHERE name = ':id' AND id = ?");
      assert_eq!(values, vec![json!(1)]);
   }

   #[test]
   fn placeholder_in_comment_is_untouched() {
      let (sql, _) = expand_named(
         "SELECT * FROM t -- :id\nWHERE id = :id",
         &params(&[("id", json!(1))]),
      )
      .unwrap();
      assert_eq!(sql, "SELECT * FROM t -- :id\nWHERE id = ?");
   }

   #[test]
   fn repeated_parameter_binds_each_occurrence() {
      let (sql, values) = expand_named(
         "SELECT * FROM t WHERE a = :v OR b = :v",
         &params(&[("v", json!(9))]),
      )
      .unwrap();
      assert_eq!(sql, "SELECT * FROM t WHERE a = ? OR b = ?");
      assert_eq!(values, vec![json!(9), json!(9)]);
   }

   // ─── number_placeholders ───

   #[test]
   fn numbers_markers_in_order() {
      assert_eq!(
         number_placeholders("SELECT * FROM t WHERE a = ? AND b = ?"),
         "SELECT * FROM t WHERE a = $1 AND b = $2"
      );
   }

   #[test]
   fn markers_inside_quotes_are_skipped() {
      assert_eq!(
         number_placeholders("SELECT * FROM t WHERE name = 'what?' AND id = ?"),
         "SELECT * FROM t WHERE name = 'what?' AND id = $1"
      );
   }

   #[test]
   fn markers_inside_comments_are_skipped() {
      assert_eq!(
         number_placeholders("SELECT * FROM t /* ? */ WHERE id = ?"),
         "SELECT * FROM t /* ? */ WHERE id = $1"
      );
   }

   #[test]
   fn no_markers_is_identity() {
      assert_eq!(number_placeholders("SELECT 1"), "SELECT 1");
   }
}
