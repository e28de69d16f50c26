// Field tree builder
//
// Procedure decoders drive a `Dissector`: each call reads one item at the
// cursor and appends a `Field` to the current level. `subtree` and `list`
// open nested levels.

use serde::Deserialize;

use crate::protocol::cursor::ByteCursor;
use crate::protocol::dict::{DictLayout, decode_dict};
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::HeaderField;
use crate::protocol::value::{Field, Value};

/// Knobs that change how ambiguous wire data is read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub dict_layout: DictLayout,
}

pub struct Dissector<'a> {
    cur: ByteCursor,
    options: &'a DecodeOptions,
    fields: Vec<Field>,
}

impl<'a> Dissector<'a> {
    pub fn new(cur: ByteCursor, options: &'a DecodeOptions) -> Self {
        Self {
            cur,
            options,
            fields: Vec::new(),
        }
    }

    pub fn offset(&self) -> usize {
        self.cur.offset()
    }

    pub fn remaining(&self) -> usize {
        self.cur.remaining()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    fn push(&mut self, info: &'static HeaderField, start: usize, value: Value) {
        self.fields.push(Field {
            info,
            offset: start,
            len: self.cur.offset() - start,
            value,
            note: None,
        });
    }

    /// Append text to the most recent field at this level
    pub fn note(&mut self, text: impl Into<String>) {
        if let Some(last) = self.fields.last_mut() {
            last.note = Some(text.into());
        }
    }

    pub fn uint32(&mut self, hf: &'static HeaderField) -> DecodeResult<u32> {
        let start = self.offset();
        let v = self.cur.read_u32(hf.abbrev)?;
        self.push(hf, start, Value::U32(v));
        Ok(v)
    }

    pub fn int32(&mut self, hf: &'static HeaderField) -> DecodeResult<i32> {
        let start = self.offset();
        let v = self.cur.read_i32(hf.abbrev)?;
        self.push(hf, start, Value::I32(v));
        Ok(v)
    }

    pub fn uint64(&mut self, hf: &'static HeaderField) -> DecodeResult<u64> {
        let start = self.offset();
        let v = self.cur.read_u64(hf.abbrev)?;
        self.push(hf, start, Value::U64(v));
        Ok(v)
    }

    /// 16-byte file identifier
    pub fn gfid(&mut self, hf: &'static HeaderField) -> DecodeResult<()> {
        let start = self.offset();
        let v = self.cur.read_fixed::<16>(hf.abbrev)?;
        self.push(hf, start, Value::Gfid(v));
        Ok(())
    }

    /// 64-byte peer UUID, one hex digit pair per word
    pub fn uuid(&mut self, hf: &'static HeaderField) -> DecodeResult<()> {
        let start = self.offset();
        let raw = self.cur.read_fixed::<64>(hf.abbrev)?;
        let mut words = [0u32; 16];
        for (word, chunk) in words.iter_mut().zip(raw.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        self.push(hf, start, Value::Uuid(words));
        Ok(())
    }

    pub fn string(&mut self, hf: &'static HeaderField) -> DecodeResult<String> {
        let start = self.offset();
        let v = self.cur.read_string(hf.abbrev)?;
        self.push(hf, start, Value::Str(v.clone()));
        Ok(v)
    }

    pub fn dict(&mut self, hf: &'static HeaderField) -> DecodeResult<()> {
        let start = self.offset();
        let v = decode_dict(&mut self.cur, hf.abbrev, self.options.dict_layout)?;
        self.push(hf, start, Value::Dict(v));
        Ok(())
    }

    /// Decode a nested structure under `hf`
    pub fn subtree<F>(&mut self, hf: &'static HeaderField, f: F) -> DecodeResult<()>
    where
        F: FnOnce(&mut Self) -> DecodeResult<()>,
    {
        let start = self.offset();
        let outer = std::mem::take(&mut self.fields);
        let res = f(self);
        let inner = std::mem::replace(&mut self.fields, outer);
        res?;
        self.push(hf, start, Value::Node(inner));
        Ok(())
    }

    /// XDR optional-data list: a non-zero word precedes every item and a
    /// zero word ends the list. A list that runs into the end of the
    /// message is also complete. Returns the number of items.
    pub fn list<F>(
        &mut self,
        hf: &'static HeaderField,
        item: &'static HeaderField,
        mut f: F,
    ) -> DecodeResult<usize>
    where
        F: FnMut(&mut Self) -> DecodeResult<()>,
    {
        let mut count = 0;
        self.subtree(hf, |d| {
            while !d.cur.is_empty() {
                if d.cur.read_u32(hf.abbrev)? == 0 {
                    break;
                }
                d.subtree(item, &mut f)?;
                count += 1;
            }
            Ok(())
        })?;
        Ok(count)
    }
}
