//! Identifier validation for SQL interpolation.

use crate::error::{Error, Result};

/// Validate that a table or column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain
/// names, qualified names (e.g., `schema.table`), and underscored
/// identifiers. Everything the builders interpolate into statement text
/// passes through here first; bound values never do — they always travel
/// as parameters.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
   let mut chars = name.chars();
   let Some(first) = chars.next() else {
      return Err(Error::InvalidIdentifier {
         name: name.to_string(),
      });
   };
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(Error::InvalidIdentifier {
         name: name.to_string(),
      });
   }

   for ch in chars {
      if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.' {
         return Err(Error::InvalidIdentifier {
            name: name.to_string(),
         });
      }
   }

   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn valid_simple_names() {
      assert!(validate_identifier("id").is_ok());
      assert!(validate_identifier("user_name").is_ok());
      assert!(validate_identifier("_private").is_ok());
      assert!(validate_identifier("col_123").is_ok());
   }

   #[test]
   fn valid_qualified_names() {
      assert!(validate_identifier("posts.id").is_ok());
      assert!(validate_identifier("schema.table.column").is_ok());
   }

   #[test]
   fn rejects_empty() {
      assert!(validate_identifier("").is_err());
   }

   #[test]
   fn rejects_injection_shapes() {
      assert!(validate_identifier("id; DROP TABLE posts --").is_err());
      assert!(validate_identifier("id)--").is_err());
      assert!(validate_identifier("1bad").is_err());
      assert!(validate_identifier("col name").is_err());
      assert!(validate_identifier("name'").is_err());
   }
}
