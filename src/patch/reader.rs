// Forward-only byte source over an in-memory patch.

use super::error::PatchError;
use super::varint;

/// Cursor over a contiguous patch buffer.
///
/// Every read either consumes exactly what it returns or fails without
/// moving the cursor.
#[derive(Debug, Clone)]
pub struct PatchReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PatchReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread tail, as a contiguous view.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, PatchError> {
        let byte = *self.remaining().first().ok_or(PatchError::Truncated {
            offset: self.pos,
            context,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, PatchError> {
        let (val, len) = varint::read_u64(self.remaining())
            .map_err(|e| PatchError::from_varint(e, self.pos, context))?;
        self.pos += len;
        Ok(val)
    }

    /// Borrow the next `len` raw bytes.
    pub fn read_bytes(&mut self, len: u64, context: &'static str) -> Result<&'a [u8], PatchError> {
        let rest = self.remaining();
        let len = usize::try_from(len)
            .ok()
            .filter(|&n| n <= rest.len())
            .ok_or(PatchError::Truncated {
                offset: self.pos,
                context,
            })?;
        self.pos += len;
        Ok(&rest[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_cursor() {
        let data = [0xAC, 0x02, b'x', b'y', 0x07];
        let mut r = PatchReader::new(&data);
        assert_eq!(r.read_varint("n").unwrap(), 300);
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_bytes(2, "lit").unwrap(), b"xy");
        assert_eq!(r.read_byte("b").unwrap(), 0x07);
        assert!(r.is_empty());
    }

    #[test]
    fn failed_reads_do_not_move() {
        let data = [0x80, b'a'];
        let mut r = PatchReader::new(&data);
        let err = r.read_bytes(3, "literal bytes").unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(r.position(), 0);

        r.read_byte("b").unwrap();
        r.read_byte("b").unwrap();
        let err = r.read_byte("b").unwrap_err();
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn huge_length_is_truncation() {
        let mut r = PatchReader::new(b"abc");
        assert!(r.read_bytes(u64::MAX, "literal bytes").unwrap_err().is_truncated());
    }
}
