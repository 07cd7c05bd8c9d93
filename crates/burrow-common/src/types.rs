//! Attribute type tags for indexed relation attributes.

use serde::{Deserialize, Serialize};

/// Type tag describing the indexed attribute of a relation.
///
/// The tag is persisted in the index header page and validated when an
/// existing index is reopened. Only `Integer` is implemented by the index
/// core; the remaining variants are recognized but rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum AttrType {
    /// Four-byte signed integer.
    Integer = 0,
    /// Eight-byte IEEE 754 double. Not implemented.
    Double = 1,
    /// Fixed-width character string. Not implemented.
    Varchar = 2,
}

impl AttrType {
    /// Returns the fixed byte size of an attribute of this type, if known.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            AttrType::Integer => Some(4),
            AttrType::Double => Some(8),
            AttrType::Varchar => None,
        }
    }

    /// Returns true if the index core implements keys of this type.
    pub fn is_supported(&self) -> bool {
        matches!(self, AttrType::Integer)
    }

    /// Decodes a tag from its persisted u32 form.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(AttrType::Integer),
            1 => Some(AttrType::Double),
            2 => Some(AttrType::Varchar),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttrType::Integer => "INTEGER",
            AttrType::Double => "DOUBLE",
            AttrType::Varchar => "VARCHAR",
        };
        write!(f, "{}", name)
    }
}
