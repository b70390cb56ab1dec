pub mod document_parser;
pub mod document_serializer;
pub mod header;
pub mod key;
pub mod metadata;

pub use document_parser::parse_document;
pub use document_serializer::serialize_document;
pub use header::{format_header, parse_header};
pub use key::{extract_key, is_ticket_key, remove_key};
