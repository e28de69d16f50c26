// RPC record marking (RFC 5531 section 11)
//
// Each fragment starts with a 4-byte header: bit 31 marks the last
// fragment of a record, bits 0-30 carry the fragment length. Fragments
// are concatenated until the last one arrives.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

const LAST_FRAGMENT: u32 = 0x8000_0000;
const LENGTH_MASK: u32 = 0x7FFF_FFFF;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("stream ended inside a record ({have} bytes buffered)")]
    Truncated { have: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reassembles record-marked messages from a byte stream
pub struct RecordReader<R> {
    inner: R,
    max_record_size: usize,
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    pub fn new(inner: R, max_record_size: usize) -> Self {
        Self {
            inner,
            max_record_size,
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Next complete record, `None` on a clean end of stream
    pub async fn next_record(&mut self) -> Result<Option<Bytes>, RecordError> {
        loop {
            // Read record marking fragment header (4 bytes)
            let mut header = [0u8; 4];
            match self.inner.read_exact(&mut header).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    if self.buffer.is_empty() {
                        debug!("End of stream");
                        return Ok(None);
                    }
                    return Err(RecordError::Truncated {
                        have: self.buffer.len(),
                    });
                }
                Err(e) => return Err(e.into()),
            }

            let header_u32 = u32::from_be_bytes(header);
            let is_last = (header_u32 & LAST_FRAGMENT) != 0;
            let fragment_len = (header_u32 & LENGTH_MASK) as usize;

            debug!("Record marking: last={}, length={}", is_last, fragment_len);

            if self.buffer.len() + fragment_len > self.max_record_size {
                return Err(RecordError::TooLarge {
                    limit: self.max_record_size,
                });
            }

            // Read fragment data
            let mut fragment = vec![0u8; fragment_len];
            if let Err(e) = self.inner.read_exact(&mut fragment).await {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    return Err(RecordError::Truncated {
                        have: self.buffer.len(),
                    });
                }
                return Err(e.into());
            }
            self.buffer.put_slice(&fragment);

            if is_last {
                debug!("Complete RPC message received ({} bytes)", self.buffer.len());
                return Ok(Some(self.buffer.split().freeze()));
            }
        }
    }
}

/// Wrap `record` in a single last fragment
pub fn frame(record: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(record.len() + 4);
    out.put_u32(record.len() as u32 | LAST_FRAGMENT);
    out.put_slice(record);
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_and_multi_fragment_records() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&frame(b"first"));
        // second record split into two fragments
        stream.extend_from_slice(&3u32.to_be_bytes());
        stream.extend_from_slice(b"sec");
        stream.extend_from_slice(&(3u32 | LAST_FRAGMENT).to_be_bytes());
        stream.extend_from_slice(b"ond");

        let mut reader = RecordReader::new(stream.as_slice(), 1024);
        assert_eq!(reader.next_record().await.unwrap().unwrap().as_ref(), b"first");
        assert_eq!(reader.next_record().await.unwrap().unwrap().as_ref(), b"second");
        assert!(reader.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_last_fragment() {
        let stream = frame(b"");
        let mut reader = RecordReader::new(&stream[..], 16);
        assert!(reader.next_record().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_size_limit() {
        let stream = frame(&[0u8; 64]);
        let mut reader = RecordReader::new(&stream[..], 32);
        assert!(matches!(
            reader.next_record().await,
            Err(RecordError::TooLarge { limit: 32 })
        ));
    }

    #[tokio::test]
    async fn test_truncated_stream() {
        let mut stream = frame(b"abcdefgh").to_vec();
        stream.truncate(8);
        let mut reader = RecordReader::new(stream.as_slice(), 1024);
        assert!(matches!(
            reader.next_record().await,
            Err(RecordError::Truncated { .. })
        ));

        // a non-last fragment followed by nothing
        let mut stream = 2u32.to_be_bytes().to_vec();
        stream.extend_from_slice(b"ab");
        let mut reader = RecordReader::new(stream.as_slice(), 1024);
        assert!(matches!(
            reader.next_record().await,
            Err(RecordError::Truncated { have: 2 })
        ));
    }
}
