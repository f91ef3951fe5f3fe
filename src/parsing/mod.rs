pub mod response_parser;

// Re-export the entry points the gateway uses
pub use response_parser::{decode_analysis, strip_code_fence, validate_analysis, ShapeError};
