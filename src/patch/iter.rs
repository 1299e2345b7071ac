// Item-by-item decoding of a patch stream.
//
// The applier replays items straight from this iterator, and the CLI uses
// it to print a patch without the source buffer.

use super::error::PatchError;
use super::item::{EditItem, PatchItem};
use super::reader::PatchReader;

/// Smallest possible encoded item: four one-byte varints, no literals.
pub const MIN_ITEM_LEN: usize = 4;

/// Iterates over the items of a patch, borrowing literal bytes from it.
///
/// Stops after the declared number of items or at the first error.
pub struct ItemIterator<'a> {
    reader: PatchReader<'a>,
    count: u64,
    index: u64,
    failed: bool,
}

impl<'a> ItemIterator<'a> {
    /// Read the item count and prepare to decode items.
    ///
    /// A count that cannot fit in the rest of the stream is reported as
    /// truncation up front.
    pub fn new(patch: &'a [u8]) -> Result<Self, PatchError> {
        let mut reader = PatchReader::new(patch);
        let count = reader.read_varint("item count")?;
        let room = (reader.remaining().len() / MIN_ITEM_LEN) as u64;
        if count > room {
            return Err(PatchError::Truncated {
                offset: patch.len(),
                context: "items announced by the item count",
            });
        }
        Ok(Self {
            reader,
            count,
            index: 0,
            failed: false,
        })
    }

    /// Declared number of items.
    pub fn item_count(&self) -> u64 {
        self.count
    }

    /// Items decoded so far.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Current offset in the patch.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Check that every item was consumed and nothing follows the last one.
    pub fn finish(self) -> Result<(), PatchError> {
        if self.index < self.count {
            return Err(PatchError::malformed(
                self.reader.position(),
                format!("{} of {} items left unread", self.count - self.index, self.count),
            ));
        }
        if !self.reader.is_empty() {
            return Err(PatchError::malformed(
                self.reader.position(),
                format!(
                    "{} trailing bytes after last item",
                    self.reader.remaining().len()
                ),
            ));
        }
        Ok(())
    }

    fn decode_item(&mut self) -> Result<PatchItem<'a>, PatchError> {
        let start_a = self.reader.read_varint("start_a")?;
        let start_b = self.reader.read_varint("start_b")?;
        let deleted_a = self.reader.read_varint("deleted_a")?;
        let inserted_b = self.reader.read_varint("inserted_b")?;
        let inserted = self.reader.read_bytes(inserted_b, "inserted bytes")?;
        Ok(PatchItem {
            edit: EditItem {
                start_a,
                start_b,
                deleted_a,
                inserted_b,
            },
            inserted,
        })
    }
}

impl<'a> Iterator for ItemIterator<'a> {
    type Item = Result<PatchItem<'a>, PatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.count {
            return None;
        }
        match self.decode_item() {
            Ok(item) => {
                self.index += 1;
                Some(Ok(item))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = usize::try_from(self.count - self.index).unwrap_or(usize::MAX);
        (0, Some(left))
    }
}
