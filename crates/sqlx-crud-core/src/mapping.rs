//! Declared table mappings and the per-type mapping cache.
//!
//! A record type declares its own mapping — table name, key field, and the
//! field→column correspondence in column-declaration order. Nothing here
//! inspects a type's shape at runtime; the declaration is explicit and the
//! cache only memoizes its validation.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ident::validate_identifier;

/// A record type that maps to a table.
///
/// # Example
///
/// ```
/// use sqlx_crud_core::{Record, TableMapping};
///
/// struct User {
///    id: Option<String>,
///    user_name: String,
/// }
///
/// impl Record for User {
///    fn table_mapping() -> TableMapping {
///       TableMapping::new("sys_user", "id")
///          .column("id", "id")
///          .column("user_name", "user_name")
///          .generated_key()
///    }
/// }
/// ```
pub trait Record: 'static {
   /// Declare the mapping for this type. Called at most once per process;
   /// the result is validated and cached.
   fn table_mapping() -> TableMapping;
}

/// The resolved table name, key column, and field→column correspondence
/// for a record type.
///
/// Column order in generated statements follows the declaration order of
/// [`TableMapping::column`] calls.
#[derive(Debug, Clone)]
pub struct TableMapping {
   table: String,
   key_field: String,
   columns: IndexMap<String, String>,
   generated_key: bool,
}

impl TableMapping {
   /// Start a mapping for `table` whose key is the logical field
   /// `key_field`. The key field still needs its own
   /// [`column`](TableMapping::column) declaration.
   pub fn new(table: impl Into<String>, key_field: impl Into<String>) -> Self {
      Self {
         table: table.into(),
         key_field: key_field.into(),
         columns: IndexMap::new(),
         generated_key: false,
      }
   }

   /// Declare a logical field and the physical column it maps to.
   pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
      self.columns.insert(field.into(), column.into());
      self
   }

   /// Generate a UUID string for the key on insert when the record carries
   /// none. Off by default so backends with auto-increment keys keep
   /// assigning their own.
   pub fn generated_key(mut self) -> Self {
      self.generated_key = true;
      self
   }

   /// The physical table name.
   pub fn table(&self) -> &str {
      &self.table
   }

   /// The logical key field name.
   pub fn key_field(&self) -> &str {
      &self.key_field
   }

   /// The physical key column. Falls back to the field name itself for a
   /// mapping that never declared its key column (validation rejects such
   /// mappings before they reach the cache).
   pub fn key_column(&self) -> &str {
      self
         .columns
         .get(&self.key_field)
         .map(String::as_str)
         .unwrap_or(&self.key_field)
   }

   /// The field→column correspondence, in declaration order.
   pub fn columns(&self) -> &IndexMap<String, String> {
      &self.columns
   }

   /// Whether inserts generate a UUID string key for key-less records.
   pub fn has_generated_key(&self) -> bool {
      self.generated_key
   }

   fn validate(&self, type_name: &'static str) -> Result<()> {
      let mapping_error = |reason: String| Error::Mapping { type_name, reason };

      validate_identifier(&self.table)
         .map_err(|_| mapping_error(format!("invalid table name '{}'", self.table)))?;
      if self.columns.is_empty() {
         return Err(mapping_error("no columns declared".to_string()));
      }
      for (field, column) in &self.columns {
         validate_identifier(column).map_err(|_| {
            mapping_error(format!("field '{field}' maps to invalid column '{column}'"))
         })?;
      }
      if !self.columns.contains_key(&self.key_field) {
         return Err(mapping_error(format!(
            "key field '{}' has no column declaration",
            self.key_field
         )));
      }
      Ok(())
   }
}

/// Per-type mapping cache shared by all callers of one context.
///
/// Reads after the first resolution are a single read-lock acquisition; a
/// miss takes the write lock, re-checks, and computes at most once per
/// type — concurrent first access never duplicates the computation, and a
/// mapping that fails validation is never published.
#[derive(Debug, Default)]
pub struct MappingCache {
   inner: RwLock<HashMap<TypeId, Arc<TableMapping>>>,
}

impl MappingCache {
   /// Resolve (and on first use validate) the mapping for `T`.
   pub fn get<T: Record>(&self) -> Result<Arc<TableMapping>> {
      let id = TypeId::of::<T>();
      if let Some(found) = self.inner.read().get(&id) {
         return Ok(found.clone());
      }

      let mut cache = self.inner.write();
      if let Some(found) = cache.get(&id) {
         return Ok(found.clone());
      }

      let mapping = T::table_mapping();
      mapping.validate(type_name::<T>())?;
      debug!(
         record = type_name::<T>(),
         table = mapping.table(),
         key = mapping.key_column(),
         "resolved table mapping"
      );
      for (field, column) in mapping.columns() {
         debug!(field = %field, column = %column, "mapped");
      }

      let mapping = Arc::new(mapping);
      cache.insert(id, mapping.clone());
      Ok(mapping)
   }
}
