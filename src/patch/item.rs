// Edit items: the unit of an edit script and of a patch stream.

use std::fmt;

/// One step of an edit script.
///
/// Relative to the previous item, the bytes of A between the two edits are
/// unchanged and copied forward; then `deleted_a` bytes of A are skipped and
/// `inserted_b` new bytes (taken from B at `start_b`) are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EditItem {
    /// Offset into A where this change begins.
    pub start_a: u64,
    /// Offset into B where this change begins.
    pub start_b: u64,
    /// Bytes of A that do not appear in B.
    pub deleted_a: u64,
    /// Bytes of B that do not appear in A.
    pub inserted_b: u64,
}

impl EditItem {
    pub const fn new(start_a: u64, start_b: u64, deleted_a: u64, inserted_b: u64) -> Self {
        Self {
            start_a,
            start_b,
            deleted_a,
            inserted_b,
        }
    }

    /// Pure deletion of `len` bytes of A.
    pub const fn delete(start_a: u64, start_b: u64, len: u64) -> Self {
        Self::new(start_a, start_b, len, 0)
    }

    /// Pure insertion of `len` bytes of B.
    pub const fn insert(start_a: u64, start_b: u64, len: u64) -> Self {
        Self::new(start_a, start_b, 0, len)
    }

    /// Source offset just past the deleted span.
    #[inline]
    pub fn end_a(&self) -> u64 {
        self.start_a.saturating_add(self.deleted_a)
    }

    /// Target offset just past the inserted span.
    #[inline]
    pub fn end_b(&self) -> u64 {
        self.start_b.saturating_add(self.inserted_b)
    }
}

impl fmt::Display for EditItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A@{} B@{} -{} +{}",
            self.start_a, self.start_b, self.deleted_a, self.inserted_b
        )
    }
}

/// An item decoded from a patch stream, borrowing its literal bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchItem<'a> {
    pub edit: EditItem,
    /// The `inserted_b` literal bytes, exactly as carried in the patch.
    pub inserted: &'a [u8],
}

impl PatchItem<'_> {
    #[inline]
    pub fn start_a(&self) -> u64 {
        self.edit.start_a
    }

    #[inline]
    pub fn start_b(&self) -> u64 {
        self.edit.start_b
    }

    #[inline]
    pub fn deleted_a(&self) -> u64 {
        self.edit.deleted_a
    }

    #[inline]
    pub fn inserted_b(&self) -> u64 {
        self.edit.inserted_b
    }

    #[inline]
    pub fn end_a(&self) -> u64 {
        self.edit.end_a()
    }

    #[inline]
    pub fn end_b(&self) -> u64 {
        self.edit.end_b()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_ends() {
        let item = EditItem::new(4, 6, 3, 2);
        assert_eq!(item.end_a(), 7);
        assert_eq!(item.end_b(), 8);
        assert_eq!(EditItem::delete(1, 1, 5), EditItem::new(1, 1, 5, 0));
        assert_eq!(EditItem::insert(1, 1, 5), EditItem::new(1, 1, 0, 5));
    }

    #[test]
    fn patch_item_spans_follow_edit() {
        let item = PatchItem {
            edit: EditItem::new(2, 3, 4, 2),
            inserted: b"xy",
        };
        assert_eq!(item.end_a(), 6);
        assert_eq!(item.end_b(), 5);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(EditItem::new(1, 2, 3, 4).to_string(), "A@1 B@2 -3 +4");
    }
}
