// Wire encoder for synthesising messages
//
// Builds payloads with the same XDR primitives the peers use, so decoders
// can be checked against byte-exact input.

use anyhow::{Result, anyhow};
use bytes::Bytes;
use xdr_codec::Pack;

#[derive(Debug, Default)]
pub struct WireWriter {
    out: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.out)
    }

    pub fn u32(&mut self, v: u32) -> Result<&mut Self> {
        v.pack(&mut self.out).map_err(|e| anyhow!("pack u32: {e}"))?;
        Ok(self)
    }

    pub fn i32(&mut self, v: i32) -> Result<&mut Self> {
        v.pack(&mut self.out).map_err(|e| anyhow!("pack i32: {e}"))?;
        Ok(self)
    }

    pub fn u64(&mut self, v: u64) -> Result<&mut Self> {
        v.pack(&mut self.out).map_err(|e| anyhow!("pack u64: {e}"))?;
        Ok(self)
    }

    pub fn gfid(&mut self, gfid: &[u8; 16]) -> Result<&mut Self> {
        xdr_codec::pack_opaque_array(gfid, 16, &mut self.out)
            .map_err(|e| anyhow!("pack gfid: {e}"))?;
        Ok(self)
    }

    pub fn uuid(&mut self, words: &[u32; 16]) -> Result<&mut Self> {
        for w in words {
            self.u32(*w)?;
        }
        Ok(self)
    }

    /// Length-prefixed string without a terminator
    pub fn string(&mut self, s: &str) -> Result<&mut Self> {
        xdr_codec::pack_string(s, None, &mut self.out).map_err(|e| anyhow!("pack string: {e}"))?;
        Ok(self)
    }

    /// Length-prefixed opaque, padded
    pub fn opaque(&mut self, data: &[u8]) -> Result<&mut Self> {
        xdr_codec::pack_opaque_flex(data, None, &mut self.out)
            .map_err(|e| anyhow!("pack opaque: {e}"))?;
        Ok(self)
    }

    /// Unframed bytes
    pub fn raw(&mut self, data: &[u8]) -> Result<&mut Self> {
        self.out.extend_from_slice(data);
        Ok(self)
    }

    /// `op_ret`, `op_errno`
    pub fn common(&mut self, op_ret: i32, op_errno: i32) -> Result<&mut Self> {
        self.i32(op_ret)?.i32(op_errno)
    }

    /// Serialized dictionary with implicit key lengths
    pub fn dict(&mut self, items: &[(&str, &[u8])]) -> Result<&mut Self> {
        if items.is_empty() {
            return self.u32(0);
        }
        let mut body = Vec::new();
        (items.len() as u32)
            .pack(&mut body)
            .map_err(|e| anyhow!("pack dict count: {e}"))?;
        for (key, value) in items {
            (value.len() as u32)
                .pack(&mut body)
                .map_err(|e| anyhow!("pack dict value length: {e}"))?;
            body.extend_from_slice(key.as_bytes());
            body.push(0);
            body.extend_from_slice(value);
        }
        self.opaque(&body)
    }

    /// Optional-data marker in front of each list item
    pub fn follows(&mut self, more: bool) -> Result<&mut Self> {
        self.u32(more as u32)
    }
}
