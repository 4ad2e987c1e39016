//! The entity record contract.

use serde::{Deserialize, Serialize};

/// What kind of source construct a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    File,
    Namespace,
    Module,
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    Method,
    ArrowFunction,
    Script,
    CssRule,
    CssMediaQuery,
    CssKeyframes,
    CssAtRule,
    MdHeading1,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::File => "file",
            EntityType::Namespace => "namespace",
            EntityType::Module => "module",
            EntityType::Class => "class",
            EntityType::Interface => "interface",
            EntityType::Trait => "trait",
            EntityType::Enum => "enum",
            EntityType::Function => "function",
            EntityType::Method => "method",
            EntityType::ArrowFunction => "arrow-function",
            EntityType::Script => "script",
            EntityType::CssRule => "css-rule",
            EntityType::CssMediaQuery => "css-media-query",
            EntityType::CssKeyframes => "css-keyframes",
            EntityType::CssAtRule => "css-at-rule",
            EntityType::MdHeading1 => "md-heading-1",
        }
    }

    pub fn from_str(s: &str) -> Option<EntityType> {
        match s {
            "file" => Some(EntityType::File),
            "namespace" => Some(EntityType::Namespace),
            "module" => Some(EntityType::Module),
            "class" => Some(EntityType::Class),
            "interface" => Some(EntityType::Interface),
            "trait" => Some(EntityType::Trait),
            "enum" => Some(EntityType::Enum),
            "function" => Some(EntityType::Function),
            "method" => Some(EntityType::Method),
            "arrow-function" => Some(EntityType::ArrowFunction),
            "script" => Some(EntityType::Script),
            "css-rule" => Some(EntityType::CssRule),
            "css-media-query" => Some(EntityType::CssMediaQuery),
            "css-keyframes" => Some(EntityType::CssKeyframes),
            "css-at-rule" => Some(EntityType::CssAtRule),
            "md-heading-1" => Some(EntityType::MdHeading1),
            _ => None,
        }
    }
}

/// One extracted entity. Line numbers are 1-indexed and inclusive;
/// child records nest strictly inside their parent's range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_type: EntityType,
    /// Identifier as written in source.
    pub name: String,
    /// Dotted or slashed enclosing namespace, possibly empty.
    pub namespace: String,
    /// Enclosing type name; set only for methods.
    pub enclosing: String,
    /// Declaration text, whitespace-collapsed.
    pub signature_raw: String,
    /// Leading comments, docstrings, decorators, attributes.
    pub preamble_raw: String,
    /// Implementation text.
    pub body_raw: String,
    pub line_start: u32,
    pub line_end: u32,
    pub language: String,
    /// Free-form visibility tag, possibly empty.
    pub visibility: String,
}

impl EntityRecord {
    /// A bare record with the invariant fields set and the rest empty.
    pub fn new(entity_type: EntityType, name: impl Into<String>, language: impl Into<String>) -> Self {
        EntityRecord {
            entity_type,
            name: name.into(),
            namespace: String::new(),
            enclosing: String::new(),
            signature_raw: String::new(),
            preamble_raw: String::new(),
            body_raw: String::new(),
            line_start: 1,
            line_end: 1,
            language: language.into(),
            visibility: String::new(),
        }
    }
}
