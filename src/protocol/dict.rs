// Serialized dict_t decoder
//
// Wire layout:
//   total_size                  (u32, 0 means empty and nothing follows)
//   item_count                  (u32)
//   item_count x {
//       key_len                 (u32, early revisions only)
//       value_len               (u32)
//       key                     (NUL-terminated)
//       value                   (value_len bytes)
//   }
//   round_up(total_size) - total_size bytes of padding

use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};

use super::cursor::{ByteCursor, round_up};
use super::error::{DecodeError, DecodeResult, Reason};

/// Item layout inside a serialized dictionary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DictLayout {
    /// value length only, key found by its terminator
    #[default]
    Implicit,
    /// key length then value length; the key length is not trusted
    KeyLength,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub key: String,
    pub value: Bytes,
}

/// Decoded dictionary, entries kept in wire order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<DictEntry>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.entries.push(DictEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DictEntry> {
        self.entries.iter()
    }
}

// smallest possible item: value length and an empty key
const MIN_ITEM_LEN: usize = 4 + 1;

/// Decode one dictionary at the cursor
pub fn decode_dict(
    cur: &mut ByteCursor,
    field: &'static str,
    layout: DictLayout,
) -> DecodeResult<Dictionary> {
    let total_size = cur.read_u32(field)? as usize;
    if total_size == 0 {
        return Ok(Dictionary::new());
    }

    let body_start = cur.offset();
    let count = cur.read_u32(field)?;
    let min_item = match layout {
        DictLayout::Implicit => MIN_ITEM_LEN,
        DictLayout::KeyLength => MIN_ITEM_LEN + 4,
    };
    if (count as usize).saturating_mul(min_item) > cur.remaining() {
        return Err(DecodeError::malformed(
            cur.offset(),
            field,
            Reason::Count {
                count,
                remaining: cur.remaining(),
            },
        ));
    }

    let mut dict = Dictionary::new();
    for _ in 0..count {
        let declared_key_len = match layout {
            DictLayout::Implicit => None,
            DictLayout::KeyLength => Some(cur.read_u32(field)? as usize),
        };
        let value_len = cur.read_u32(field)? as usize;
        let key_offset = cur.offset();
        let key = cur.read_cstr(field)?;
        if let Some(declared) = declared_key_len {
            if declared != key.len() {
                warn!(
                    "dict key at offset {} declares length {} but terminates after {}",
                    key_offset,
                    declared,
                    key.len()
                );
            }
        }
        let value = cur.read_bytes(value_len, field)?;
        dict.insert(key, value);
    }

    let used = cur.offset() - body_start;
    if used > total_size {
        return Err(DecodeError::malformed(
            body_start,
            field,
            Reason::DictOverrun {
                declared: total_size,
                used,
            },
        ));
    }
    if used < total_size {
        debug!("dict declares {} bytes, items used {}", total_size, used);
    }

    cur.skip(round_up(total_size) - total_size, field)?;
    Ok(dict)
}
