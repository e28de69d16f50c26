// Decoded field tree

use super::dict::Dictionary;
use super::fields::HeaderField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U32(u32),
    I32(i32),
    U64(u64),
    Gfid([u8; 16]),
    Uuid([u32; 16]),
    Str(String),
    Dict(Dictionary),
    /// Children of a composite structure or list
    Node(Vec<Field>),
}

/// One decoded item with its position in the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub info: &'static HeaderField,
    pub offset: usize,
    pub len: usize,
    pub value: Value,
    /// Extra text shown after the value
    pub note: Option<String>,
}

impl Field {
    pub fn abbrev(&self) -> &'static str {
        self.info.abbrev
    }

    pub fn children(&self) -> &[Field] {
        match &self.value {
            Value::Node(children) => children,
            _ => &[],
        }
    }

    /// Integer value widened to i64, for fields of any integer kind
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            Value::U32(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match &self.value {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

/// Depth-first search by abbreviation
pub fn find<'a>(fields: &'a [Field], abbrev: &str) -> Option<&'a Field> {
    for field in fields {
        if field.abbrev() == abbrev {
            return Some(field);
        }
        if let Some(found) = find(field.children(), abbrev) {
            return Some(found);
        }
    }
    None
}

/// Every match by abbreviation, in wire order
pub fn find_all<'a>(fields: &'a [Field], abbrev: &str) -> Vec<&'a Field> {
    let mut out = Vec::new();
    collect(fields, abbrev, &mut out);
    out
}

fn collect<'a>(fields: &'a [Field], abbrev: &str, out: &mut Vec<&'a Field>) {
    for field in fields {
        if field.abbrev() == abbrev {
            out.push(field);
        }
        collect(field.children(), abbrev, out);
    }
}
