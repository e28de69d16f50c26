// Byte cursor over one RPC message body
//
// All integers are big-endian. Variable-length items are padded to the
// next 4-byte boundary ("RPC round-up").

use bytes::Bytes;

use super::error::{DecodeError, DecodeResult, Reason};

/// Round a length up to the next multiple of four
pub const fn round_up(len: usize) -> usize {
    len.div_ceil(4) * 4
}

/// Immutable buffer plus read offset
///
/// The offset never passes the end of the buffer: every read checks the
/// remaining length first and fails with `DecodeError::Malformed`.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buf: Bytes,
    pos: usize,
}

impl ByteCursor {
    pub fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `offset`
    pub fn at(buf: Bytes, offset: usize) -> DecodeResult<Self> {
        if offset > buf.len() {
            return Err(DecodeError::malformed(
                offset,
                "message",
                Reason::OffsetOutOfRange { len: buf.len() },
            ));
        }
        Ok(Self { buf, pos: offset })
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize, field: &'static str) -> DecodeResult<()> {
        if needed > self.remaining() {
            return Err(DecodeError::malformed(
                self.pos,
                field,
                Reason::Truncated {
                    needed,
                    remaining: self.remaining(),
                },
            ));
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> DecodeResult<[u8; N]> {
        self.ensure(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    pub fn read_u32(&mut self, field: &'static str) -> DecodeResult<u32> {
        self.take::<4>(field).map(u32::from_be_bytes)
    }

    pub fn read_i32(&mut self, field: &'static str) -> DecodeResult<i32> {
        self.take::<4>(field).map(i32::from_be_bytes)
    }

    pub fn read_u64(&mut self, field: &'static str) -> DecodeResult<u64> {
        self.take::<8>(field).map(u64::from_be_bytes)
    }

    /// Fixed-length opaque, no padding
    pub fn read_fixed<const N: usize>(&mut self, field: &'static str) -> DecodeResult<[u8; N]> {
        self.take::<N>(field)
    }

    /// Zero-copy slice of `len` bytes, no padding
    pub fn read_bytes(&mut self, len: usize, field: &'static str) -> DecodeResult<Bytes> {
        self.ensure(len, field)?;
        let out = self.buf.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(out)
    }

    pub fn skip(&mut self, len: usize, field: &'static str) -> DecodeResult<()> {
        self.ensure(len, field)?;
        self.pos += len;
        Ok(())
    }

    /// `len` bytes followed by round-up padding
    pub fn read_padded(&mut self, len: usize, field: &'static str) -> DecodeResult<Bytes> {
        self.ensure(round_up(len), field)?;
        let out = self.read_bytes(len, field)?;
        self.pos += round_up(len) - len;
        Ok(out)
    }

    /// Length-prefixed opaque
    pub fn read_opaque(&mut self, field: &'static str) -> DecodeResult<Bytes> {
        let start = self.pos;
        let len = self.read_u32(field)? as usize;
        self.read_padded(len, field).inspect_err(|_| self.pos = start)
    }

    /// Length-prefixed string; a NUL inside the declared length ends it
    pub fn read_string(&mut self, field: &'static str) -> DecodeResult<String> {
        let raw = self.read_opaque(field)?;
        let text = match raw.iter().position(|&b| b == 0) {
            Some(nul) => &raw[..nul],
            None => &raw[..],
        };
        Ok(String::from_utf8_lossy(text).into_owned())
    }

    /// NUL-terminated string; the terminator is consumed, no padding
    pub fn read_cstr(&mut self, field: &'static str) -> DecodeResult<String> {
        let rest = &self.buf[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| DecodeError::malformed(self.pos, field, Reason::Unterminated))?;
        let text = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(bytes: &[u8]) -> ByteCursor {
        ByteCursor::new(Bytes::copy_from_slice(bytes))
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0), 0);
        assert_eq!(round_up(1), 4);
        assert_eq!(round_up(4), 4);
        assert_eq!(round_up(9), 12);
        assert_eq!(round_up(13), 16);
    }

    #[test]
    fn test_integers_are_big_endian() {
        let mut cur = cursor(&[
            0x00, 0x00, 0x5d, 0xb7, // 24007
            0xff, 0xff, 0xff, 0xfe, // -2
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
        ]);
        assert_eq!(cur.read_u32("port").unwrap(), 24007);
        assert_eq!(cur.read_i32("ret").unwrap(), -2);
        assert_eq!(cur.read_u64("ino").unwrap(), 0x0102030405060708);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_string_padding_and_terminator() {
        // length 9, "hostname1" is the whole payload
        let mut bytes = vec![0, 0, 0, 9];
        bytes.extend_from_slice(b"hostname1\0\0\0");
        bytes.extend_from_slice(&[0, 0, 0, 1]);
        let mut cur = cursor(&bytes);
        assert_eq!(cur.read_string("hostname").unwrap(), "hostname1");
        assert_eq!(cur.offset(), 16);
        assert_eq!(cur.read_u32("next").unwrap(), 1);

        // NUL inside the declared length ends the string early
        let mut cur = cursor(&[0, 0, 0, 6, b'a', b'b', 0, b'z', b'z', b'z', 0, 0]);
        assert_eq!(cur.read_string("name").unwrap(), "ab");
        assert_eq!(cur.offset(), 12);
    }

    #[test]
    fn test_truncated_string_does_not_move() {
        let mut cur = cursor(&[0, 0, 0, 20, b'a', b'b']);
        let err = cur.read_string("path").unwrap_err();
        assert_eq!(err.field(), "path");
        assert_eq!(err.offset(), 4);
        assert_eq!(cur.offset(), 0);
    }

    #[test]
    fn test_missing_padding_is_malformed() {
        // 3 bytes declared, 3 present, but the round-up byte is missing
        let mut cur = cursor(&[0, 0, 0, 3, b'a', b'b', b'c']);
        assert!(cur.read_string("bname").is_err());
    }

    #[test]
    fn test_cstr() {
        let mut cur = cursor(b"key\0value");
        assert_eq!(cur.read_cstr("key").unwrap(), "key");
        assert_eq!(cur.offset(), 4);
        let err = cur.read_cstr("key").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Malformed {
                reason: Reason::Unterminated,
                ..
            }
        ));
    }

    #[test]
    fn test_start_offset_past_end() {
        let buf = Bytes::from_static(&[0, 0, 0, 0]);
        assert!(ByteCursor::at(buf.clone(), 4).is_ok());
        assert!(ByteCursor::at(buf, 5).is_err());
    }
}
