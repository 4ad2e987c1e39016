//! Entity extraction.
//!
//! Every extractor satisfies one contract: given a filename and its
//! content, produce an ordered list of `EntityRecord`s, always including
//! the file-level record when the file is readable. The registry routes
//! by file extension; higher declared priority wins ties. Per-language
//! parsing is surface-level: regexes locate signature openings, manual
//! scanning (brace matching, indentation tracking) finds block extents.

pub mod css;
pub mod fallback;
pub mod javascript;
pub mod markdown;
pub mod php;
pub mod python;
pub mod registry;
pub mod script;
pub mod text;
pub mod types;

pub use registry::{Extractor, ExtractorRegistry};
pub use types::{EntityRecord, EntityType};
