use thiserror::Error;

/// Errors produced while generating dialect-specific SQL.
#[derive(Error, Debug)]
pub enum Error {
   /// The dialect has no hierarchical-query grammar.
   #[error("recursive queries are not supported by the {0} dialect")]
   RecursiveUnsupported(&'static str),
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
