// Patch encoder: serializes an edit script into the patch wire format.
//
//   patch := count:varint item*
//   item  := start_a:varint start_b:varint deleted_a:varint inserted_b:varint
//            inserted_bytes[inserted_b]
//
// The edit script is trusted: the encoder does not check that replaying it
// against A yields B. It only refuses literal ranges that fall outside B,
// before anything is written.

use std::io::Write;

use log::{debug, trace};

use super::error::EncodeError;
use super::item::EditItem;
use super::varint;

// ---------------------------------------------------------------------------
// PatchEncoder
// ---------------------------------------------------------------------------

/// Writes patches to any `Write` sink and keeps running totals.
///
/// # Example
/// ```
/// use bytepatch::patch::{EditItem, PatchEncoder};
/// let mut enc = PatchEncoder::new(Vec::new());
/// enc.encode(b"abc", b"xyz", &[EditItem::new(0, 0, 3, 3)]).unwrap();
/// assert_eq!(enc.finish(), [1, 0, 0, 3, 3, b'x', b'y', b'z']);
/// ```
pub struct PatchEncoder<W: Write> {
    writer: W,
    patches_written: u64,
    items_written: u64,
    bytes_written: u64,
}

impl<W: Write> PatchEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            patches_written: 0,
            items_written: 0,
            bytes_written: 0,
        }
    }

    /// Encode one complete patch turning `source` into `target`.
    ///
    /// Returns the number of bytes written for this patch.
    pub fn encode(
        &mut self,
        source: &[u8],
        target: &[u8],
        items: &[EditItem],
    ) -> Result<u64, EncodeError> {
        check_literal_ranges(target, items)?;

        let mut written = 0u64;
        written += self.put_varint(items.len() as u64)?;

        for item in items {
            trace!("encode item {item}");
            written += self.put_varint(item.start_a)?;
            written += self.put_varint(item.start_b)?;
            written += self.put_varint(item.deleted_a)?;
            written += self.put_varint(item.inserted_b)?;

            // Literal payload: raw octets, never varint-coded.
            let literal = literal_range(item, target.len()).unwrap_or(0..0);
            self.writer.write_all(&target[literal])?;
            written += item.inserted_b;
        }

        debug!(
            "encoded patch: source {} bytes, target {} bytes, {} items, {} patch bytes",
            source.len(),
            target.len(),
            items.len(),
            written
        );

        self.patches_written += 1;
        self.items_written += items.len() as u64;
        self.bytes_written += written;
        Ok(written)
    }

    fn put_varint(&mut self, num: u64) -> Result<u64, EncodeError> {
        varint::write_u64(&mut self.writer, num)?;
        Ok(varint::sizeof_u64(num) as u64)
    }

    /// Number of patches written so far.
    pub fn patches_written(&self) -> u64 {
        self.patches_written
    }

    /// Number of edit items written across all patches.
    pub fn items_written(&self) -> u64 {
        self.items_written
    }

    /// Total patch bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consume the encoder and return the sink.
    pub fn finish(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Encode `items` as a patch into `writer`.
pub fn encode_patch<W: Write>(
    source: &[u8],
    target: &[u8],
    items: &[EditItem],
    writer: &mut W,
) -> Result<u64, EncodeError> {
    PatchEncoder::new(writer).encode(source, target, items)
}

/// Encode `items` into a freshly allocated, exactly sized buffer.
pub fn encode_to_vec(
    source: &[u8],
    target: &[u8],
    items: &[EditItem],
) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(encoded_len(items));
    encode_patch(source, target, items, &mut out)?;
    Ok(out)
}

/// Exact size in bytes of the patch encoding `items`.
pub fn encoded_len(items: &[EditItem]) -> usize {
    items.iter().fold(
        varint::sizeof_u64(items.len() as u64),
        |acc, item| {
            acc.saturating_add(varint::sizeof_u64(item.start_a))
                .saturating_add(varint::sizeof_u64(item.start_b))
                .saturating_add(varint::sizeof_u64(item.deleted_a))
                .saturating_add(varint::sizeof_u64(item.inserted_b))
                .saturating_add(usize::try_from(item.inserted_b).unwrap_or(usize::MAX))
        },
    )
}

// ---------------------------------------------------------------------------
// Literal range checks
// ---------------------------------------------------------------------------

fn literal_range(item: &EditItem, target_len: usize) -> Option<std::ops::Range<usize>> {
    let start = usize::try_from(item.start_b).ok()?;
    let len = usize::try_from(item.inserted_b).ok()?;
    let end = start.checked_add(len)?;
    (end <= target_len).then_some(start..end)
}

fn check_literal_ranges(target: &[u8], items: &[EditItem]) -> Result<(), EncodeError> {
    for (index, item) in items.iter().enumerate() {
        if item.inserted_b > 0 && literal_range(item, target.len()).is_none() {
            return Err(EncodeError::InsertOutOfRange {
                index,
                start_b: item.start_b,
                inserted_b: item.inserted_b,
                target_len: target.len(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_is_a_single_zero() {
        let patch = encode_to_vec(b"same", b"same", &[]).unwrap();
        assert_eq!(patch, [0]);
    }

    #[test]
    fn wire_layout_matches_item_shape() {
        let items = [EditItem::new(1, 1, 0, 1), EditItem::new(2, 3, 1, 0)];
        let patch = encode_to_vec(b"abc", b"aab", &items).unwrap();
        assert_eq!(patch, [2, 1, 1, 0, 1, b'a', 2, 3, 1, 0]);
        assert_eq!(patch.len(), encoded_len(&items));
    }

    #[test]
    fn literal_bytes_bypass_varint() {
        let target = [0x00, 0x80, 0xFF];
        let items = [EditItem::insert(0, 0, 3)];
        let patch = encode_to_vec(b"", &target, &items).unwrap();
        assert_eq!(patch, [1, 0, 0, 0, 3, 0x00, 0x80, 0xFF]);
    }

    #[test]
    fn large_offsets_use_multibyte_varints() {
        let target = vec![7u8; 400];
        let items = [EditItem::new(300, 300, 0, 100)];
        let patch = encode_to_vec(&target[..300], &target, &items).unwrap();
        assert_eq!(&patch[..7], &[1, 0xAC, 0x02, 0xAC, 0x02, 0x00, 0x64]);
        assert_eq!(patch.len(), 7 + 100);
        assert_eq!(patch.len(), encoded_len(&items));
    }

    #[test]
    fn out_of_range_literal_rejected_before_writing() {
        let mut out = Vec::new();
        let items = [EditItem::insert(0, 0, 1), EditItem::insert(0, 2, 5)];
        let err = encode_patch(b"", b"abc", &items, &mut out).unwrap_err();
        match err {
            EncodeError::InsertOutOfRange {
                index, target_len, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(target_len, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn deletion_only_items_ignore_start_b_range() {
        // start_b past the end is fine when nothing is inserted.
        let patch = encode_to_vec(b"abc", b"", &[EditItem::delete(0, 0, 3)]).unwrap();
        assert_eq!(patch, [1, 0, 0, 3, 0]);
    }

    #[test]
    fn encoder_tracks_totals() {
        let mut enc = PatchEncoder::new(Vec::new());
        let n1 = enc.encode(b"abc", b"xyz", &[EditItem::new(0, 0, 3, 3)]).unwrap();
        let n2 = enc.encode(b"abc", b"abc", &[]).unwrap();
        assert_eq!(enc.patches_written(), 2);
        assert_eq!(enc.items_written(), 1);
        assert_eq!(enc.bytes_written(), n1 + n2);
        assert_eq!(enc.finish().len() as u64, n1 + n2);
    }
}
