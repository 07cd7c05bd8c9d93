//! Index header page contents.

use crate::btree::constants::RELATION_NAME_LEN;
use burrow_common::types::AttrType;
use burrow_common::{BurrowError, Result};

/// Metadata stored on the index header page.
///
/// Written at creation and validated whenever an existing index file is
/// reopened; the root page number is rewritten on root growth.
///
/// Layout (44 bytes):
/// - relation_name: 32 bytes (NUL padded)
/// - attr_byte_offset: 4 bytes
/// - attr_type: 4 bytes
/// - root_page_no: 4 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMetadata {
    /// Name of the indexed relation.
    pub relation_name: String,
    /// Byte offset of the indexed attribute within a tuple.
    pub attr_byte_offset: u32,
    /// Type tag of the indexed attribute.
    pub attr_type: AttrType,
    /// Current root page number.
    pub root_page_no: u32,
}

impl IndexMetadata {
    /// Serialized size in bytes.
    pub const SIZE: usize = RELATION_NAME_LEN + 4 + 4 + 4;

    /// Creates header metadata, validating the relation name length.
    pub fn new(
        relation_name: &str,
        attr_byte_offset: u32,
        attr_type: AttrType,
        root_page_no: u32,
    ) -> Result<Self> {
        if relation_name.len() > RELATION_NAME_LEN {
            return Err(BurrowError::Internal(format!(
                "relation name longer than {} bytes: {}",
                RELATION_NAME_LEN, relation_name
            )));
        }
        Ok(Self {
            relation_name: relation_name.to_string(),
            attr_byte_offset,
            attr_type,
            root_page_no,
        })
    }

    /// Returns true if the stored metadata agrees with the caller's
    /// parameters.
    pub fn matches(&self, relation_name: &str, attr_byte_offset: u32, attr_type: AttrType) -> bool {
        self.relation_name == relation_name
            && self.attr_byte_offset == attr_byte_offset
            && self.attr_type == attr_type
    }

    /// Serializes the metadata to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let name = self.relation_name.as_bytes();
        buf[..name.len()].copy_from_slice(name);
        buf[RELATION_NAME_LEN..RELATION_NAME_LEN + 4]
            .copy_from_slice(&self.attr_byte_offset.to_le_bytes());
        buf[RELATION_NAME_LEN + 4..RELATION_NAME_LEN + 8]
            .copy_from_slice(&(self.attr_type as u32).to_le_bytes());
        buf[RELATION_NAME_LEN + 8..RELATION_NAME_LEN + 12]
            .copy_from_slice(&self.root_page_no.to_le_bytes());
        buf
    }

    /// Deserializes metadata from the start of a header page.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let name_bytes = &buf[..RELATION_NAME_LEN];
        let name_len = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(RELATION_NAME_LEN);
        let relation_name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

        let attr_byte_offset = u32::from_le_bytes([
            buf[RELATION_NAME_LEN],
            buf[RELATION_NAME_LEN + 1],
            buf[RELATION_NAME_LEN + 2],
            buf[RELATION_NAME_LEN + 3],
        ]);
        let type_tag = u32::from_le_bytes([
            buf[RELATION_NAME_LEN + 4],
            buf[RELATION_NAME_LEN + 5],
            buf[RELATION_NAME_LEN + 6],
            buf[RELATION_NAME_LEN + 7],
        ]);
        let attr_type = AttrType::from_u32(type_tag).ok_or_else(|| {
            BurrowError::BadIndexInfo(format!("unknown attribute type tag {}", type_tag))
        })?;
        let root_page_no = u32::from_le_bytes([
            buf[RELATION_NAME_LEN + 8],
            buf[RELATION_NAME_LEN + 9],
            buf[RELATION_NAME_LEN + 10],
            buf[RELATION_NAME_LEN + 11],
        ]);

        Ok(Self {
            relation_name,
            attr_byte_offset,
            attr_type,
            root_page_no,
        })
    }
}
