pub mod documents;
pub mod routes;

pub use documents::{source_from_settings, DocumentError, DocumentSource};
