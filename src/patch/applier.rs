// Patch applier: reconstructs the target from the source and a patch.
//
// The target is replayed from scratch into the output sink in a single
// forward pass. Two cursors drive it:
//
//   source cursor  bytes of A already copied or skipped
//   target cursor  bytes of B already written
//
// For each item the unchanged run is `start_b - target cursor` bytes long.
// Those bytes are copied from A at the source cursor (which must then sit at
// `start_a`), `deleted_a` bytes of A are skipped, and the literal bytes from
// the patch are written. Whatever is left of A after the last item is copied
// verbatim. Neither cursor ever moves backward and no byte of A is read twice.

use std::io::Write;

use log::{debug, trace};

use super::error::PatchError;
use super::item::PatchItem;
use super::iter::ItemIterator;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Byte accounting for one successful application.
///
/// `copied + skipped` always equals the source length: the source is
/// consumed exactly once, front to back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Edit items replayed.
    pub items: u64,
    /// Source bytes copied unchanged (including the trailing run).
    pub copied: u64,
    /// Source bytes skipped as deleted.
    pub skipped: u64,
    /// Literal bytes taken from the patch.
    pub inserted: u64,
    /// Total bytes written to the output.
    pub output_len: u64,
}

// ---------------------------------------------------------------------------
// PatchApplier
// ---------------------------------------------------------------------------

/// Replays patches against a fixed source buffer.
///
/// Holds no mutable state, so one applier can serve any number of patches,
/// from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct PatchApplier<'s> {
    source: &'s [u8],
}

impl<'s> PatchApplier<'s> {
    pub fn new(source: &'s [u8]) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'s [u8] {
        self.source
    }

    /// Apply `patch`, writing the reconstructed target to `output`.
    ///
    /// On error, whatever was already written stays in `output`.
    pub fn apply_to<W: Write>(
        &self,
        patch: &[u8],
        output: &mut W,
    ) -> Result<ApplyStats, PatchError> {
        let mut items = ItemIterator::new(patch)?;
        let mut stats = ApplyStats::default();

        if items.item_count() == 0 {
            items.finish()?;
            output.write_all(self.source)?;
            stats.copied = self.source.len() as u64;
            stats.output_len = stats.copied;
            debug!("applied empty patch: {} bytes copied", stats.copied);
            return Ok(stats);
        }

        let mut cursor = Cursor::default();
        while let Some(item) = items.next() {
            let item = item?;
            let offset = items.position();
            trace!("apply item {} at patch offset {offset}", item.edit);
            self.replay(&item, &mut cursor, &mut stats, offset, output)?;
            stats.items += 1;
        }
        items.finish()?;

        // Unchanged tail of the source.
        let tail = &self.source[cursor.a..];
        output.write_all(tail)?;
        stats.copied += tail.len() as u64;
        stats.output_len = cursor.b + tail.len() as u64;

        debug!(
            "applied patch: {} items, {} copied, {} skipped, {} inserted, {} bytes out",
            stats.items, stats.copied, stats.skipped, stats.inserted, stats.output_len
        );
        Ok(stats)
    }

    /// Apply `patch` into a new buffer.
    pub fn apply_to_vec(&self, patch: &[u8]) -> Result<Vec<u8>, PatchError> {
        let mut out = Vec::with_capacity(self.source.len());
        self.apply_to(patch, &mut out)?;
        Ok(out)
    }

    fn replay<W: Write>(
        &self,
        item: &PatchItem<'_>,
        cursor: &mut Cursor,
        stats: &mut ApplyStats,
        offset: usize,
        output: &mut W,
    ) -> Result<(), PatchError> {
        let unchanged = item.start_b().checked_sub(cursor.b).ok_or_else(|| {
            PatchError::malformed(
                offset,
                format!(
                    "start_b {} is behind the {} bytes already written",
                    item.start_b(),
                    cursor.b
                ),
            )
        })?;

        let copy_end = self.advance(cursor.a, unchanged).ok_or_else(|| {
            PatchError::malformed(
                offset,
                format!(
                    "unchanged run of {unchanged} bytes at source offset {} passes end of source ({} bytes)",
                    cursor.a,
                    self.source.len()
                ),
            )
        })?;
        if item.start_a() != copy_end as u64 {
            return Err(PatchError::malformed(
                offset,
                format!(
                    "start_a {} does not match source cursor {copy_end}",
                    item.start_a()
                ),
            ));
        }

        let skip_end = self.advance(copy_end, item.deleted_a()).ok_or_else(|| {
            PatchError::malformed(
                offset,
                format!(
                    "deletion of {} bytes at source offset {copy_end} passes end of source ({} bytes)",
                    item.deleted_a(),
                    self.source.len()
                ),
            )
        })?;

        output.write_all(&self.source[cursor.a..copy_end])?;
        output.write_all(item.inserted)?;

        stats.copied += unchanged;
        stats.skipped += item.deleted_a();
        stats.inserted += item.inserted_b();

        cursor.a = skip_end;
        cursor.b = item.end_b();
        Ok(())
    }

    /// Source offset `len` bytes past `from`, if still inside the source.
    fn advance(&self, from: usize, len: u64) -> Option<usize> {
        usize::try_from(len)
            .ok()
            .and_then(|len| from.checked_add(len))
            .filter(|&end| end <= self.source.len())
    }
}

/// Replay position: source bytes consumed, target bytes produced.
#[derive(Debug, Default)]
struct Cursor {
    a: usize,
    b: u64,
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Reconstruct the target from `source` and `patch` into `output`.
pub fn apply_patch<W: Write>(
    source: &[u8],
    patch: &[u8],
    output: &mut W,
) -> Result<ApplyStats, PatchError> {
    PatchApplier::new(source).apply_to(patch, output)
}

/// Reconstruct the target from `source` and `patch` into a new buffer.
pub fn apply_to_vec(source: &[u8], patch: &[u8]) -> Result<Vec<u8>, PatchError> {
    PatchApplier::new(source).apply_to_vec(patch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
