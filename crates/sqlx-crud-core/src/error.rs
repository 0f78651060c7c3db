/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CRUD toolkit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error surfaced by the underlying execution primitive. Never caught,
   /// classified, or retried here — the toolkit has no basis for telling
   /// transient backend failures from permanent ones.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Error from dialect SQL generation.
   #[error(transparent)]
   Dialect(#[from] sqlx_crud_dialect::Error),

   /// The backing database reported a product name no dialect matches.
   ///
   /// Fatal: every operation depends on the dialect, and no default is
   /// assumed for an unrecognized backend.
   #[error("unknown database product '{name}': no dialect registered for it")]
   UnknownDatabaseProduct { name: String },

   /// A table or column name contains characters that are unsafe to
   /// interpolate into statement text.
   ///
   /// Names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `schema.table`).
   #[error("invalid identifier '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidIdentifier { name: String },

   /// A record type's declared table mapping is unusable.
   #[error("table mapping for {type_name}: {reason}")]
   Mapping {
      type_name: &'static str,
      reason: String,
   },

   /// A `:name` placeholder has no bound value.
   #[error("named parameter ':{name}' has no bound value")]
   MissingNamedParameter { name: String },

   /// A `:name` placeholder is bound to an empty collection, which cannot
   /// be expanded into a placeholder list.
   #[error("named parameter ':{name}' is bound to an empty collection")]
   EmptyNamedParameter { name: String },

   /// Multiple rows returned from a fetch_one query.
   #[error("fetch_one() query returned {0} rows, expected 0 or 1")]
   MultipleRowsReturned(usize),

   /// Database type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// A row could not be converted to or from a typed record.
   #[error("record conversion failed: {0}")]
   RecordConversion(#[from] serde_json::Error),
}
