// Edit scripts: the encoder's input.
//
// Scripts come from the `similar` crate's Myers implementation (feature
// `myers`); this module only reshapes its ops into `EditItem`s. `validate`
// replays a script's cursors without touching any bytes, for callers that
// want to check a script from elsewhere before encoding it.

use crate::patch::EditItem;

// ---------------------------------------------------------------------------
// Script construction
// ---------------------------------------------------------------------------

/// Compute an edit script turning `source` into `target`.
#[cfg(feature = "myers")]
pub fn edit_script(source: &[u8], target: &[u8]) -> Vec<EditItem> {
    edit_script_with_deadline(source, target, None)
}

/// Like [`edit_script`], but lets the diff give up refining after
/// `deadline`. The result is still a valid script, just possibly larger.
#[cfg(feature = "myers")]
pub fn edit_script_with_deadline(
    source: &[u8],
    target: &[u8],
    deadline: Option<std::time::Instant>,
) -> Vec<EditItem> {
    use similar::{Algorithm, DiffOp};

    let ops = similar::capture_diff_slices_deadline(Algorithm::Myers, source, target, deadline);
    let mut items: Vec<EditItem> = Vec::new();

    // Positions come from running cursors over op lengths. The indices on
    // an op are not reliable for the side it does not touch: an `Insert`
    // may carry an `old_index` behind bytes already consumed.
    let mut old_pos: u64 = 0;
    let mut new_pos: u64 = 0;

    for op in ops {
        let (deleted, inserted) = match op {
            DiffOp::Equal { len, .. } => {
                old_pos += len as u64;
                new_pos += len as u64;
                continue;
            }
            DiffOp::Delete { old_len, .. } => (old_len as u64, 0),
            DiffOp::Insert { new_len, .. } => (0, new_len as u64),
            DiffOp::Replace {
                old_len, new_len, ..
            } => (old_len as u64, new_len as u64),
        };
        push_merged(&mut items, EditItem::new(old_pos, new_pos, deleted, inserted));
        old_pos += deleted;
        new_pos += inserted;
    }

    debug_assert_eq!(old_pos, source.len() as u64);
    debug_assert_eq!(new_pos, target.len() as u64);

    log::debug!(
        "edit script: {} items for {} -> {} bytes",
        items.len(),
        source.len(),
        target.len()
    );
    items
}

/// Append `item`, folding it into the previous item when no unchanged run
/// separates them.
pub fn push_merged(items: &mut Vec<EditItem>, item: EditItem) {
    if let Some(last) = items.last_mut()
        && last.end_a() == item.start_a
        && last.end_b() == item.start_b
    {
        last.deleted_a += item.deleted_a;
        last.inserted_b += item.inserted_b;
        return;
    }
    items.push(item);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("item {index}: start_b {start_b} is behind target cursor {cursor}")]
    Backward {
        index: usize,
        start_b: u64,
        cursor: u64,
    },

    #[error("item {index}: start_a {found} does not match source cursor {expected}")]
    SourceMismatch {
        index: usize,
        expected: u64,
        found: u64,
    },

    #[error("item {index}: span ends at {end}, past source length {source_len}")]
    SourceOverrun {
        index: usize,
        end: u64,
        source_len: u64,
    },

    #[error("item {index}: literal span ends at {end}, past target length {target_len}")]
    TargetOverrun {
        index: usize,
        end: u64,
        target_len: u64,
    },

    #[error("script produces {produced} bytes, target has {target_len}")]
    LengthMismatch { produced: u64, target_len: u64 },
}

/// Check that `items` replays against a source of `source_len` bytes into
/// exactly `target_len` bytes.
///
/// Only cursor arithmetic is checked; byte content is not compared.
pub fn validate(source_len: u64, target_len: u64, items: &[EditItem]) -> Result<(), ScriptError> {
    let mut a: u64 = 0;
    let mut b: u64 = 0;

    for (index, item) in items.iter().enumerate() {
        let unchanged = item
            .start_b
            .checked_sub(b)
            .ok_or(ScriptError::Backward {
                index,
                start_b: item.start_b,
                cursor: b,
            })?;
        let expected = a.saturating_add(unchanged);
        if item.start_a != expected {
            return Err(ScriptError::SourceMismatch {
                index,
                expected,
                found: item.start_a,
            });
        }
        let end_a = item.start_a.checked_add(item.deleted_a).unwrap_or(u64::MAX);
        if end_a > source_len {
            return Err(ScriptError::SourceOverrun {
                index,
                end: end_a,
                source_len,
            });
        }
        let end_b = item.start_b.checked_add(item.inserted_b).unwrap_or(u64::MAX);
        if end_b > target_len {
            return Err(ScriptError::TargetOverrun {
                index,
                end: end_b,
                target_len,
            });
        }
        a = end_a;
        b = end_b;
    }

    let produced = b + (source_len - a);
    if produced != target_len {
        return Err(ScriptError::LengthMismatch {
            produced,
            target_len,
        });
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
    fn merges_adjacent_items() {
        let mut items = Vec::new();
        push_merged(&mut items, EditItem::delete(2, 2, 3));
        push_merged(&mut items, EditItem::insert(5, 2, 4));
        push_merged(&mut items, EditItem::insert(9, 8, 1));
        assert_eq!(items, [EditItem::new(2, 2, 3, 4), EditItem::insert(9, 8, 1)]);
    }

    #[test]
    fn validate_accepts_worked_example() {
        let items = [EditItem::new(1, 1, 0, 1), EditItem::new(2, 3, 1, 0)];
        validate(3, 3, &items).unwrap();
        validate(3, 3, &[]).unwrap();
    }

    #[test]
    fn validate_rejects_bad_scripts() {
        assert!(matches!(
            validate(3, 3, &[EditItem::new(2, 1, 0, 0)]),
            Err(ScriptError::SourceMismatch { .. })
        ));
        assert!(matches!(
            validate(3, 0, &[EditItem::delete(0, 0, 4)]),
            Err(ScriptError::SourceOverrun { .. })
        ));
        assert!(matches!(
            validate(0, 1, &[EditItem::insert(0, 0, 2)]),
            Err(ScriptError::TargetOverrun { .. })
        ));
        assert!(matches!(
            validate(3, 4, &[EditItem::insert(0, 0, 2), EditItem::insert(0, 1, 1)]),
            Err(ScriptError::Backward { .. })
        ));
        assert_eq!(
            validate(3, 5, &[]),
            Err(ScriptError::LengthMismatch {
                produced: 3,
                target_len: 5
            })
        );
    }

    #[cfg(feature = "myers")]
    #[test]
    fn insert_after_equal_uses_consumed_source_position() {
        // Myers reports an insert here whose own old index trails the source
        // bytes already consumed by the preceding ops.
        let a = b"The quick brown fox jumps over the lazy dog. 1234567890";
        let b = b"The quick brown cat sits on the lazy mat. 1234567890!!!";
        let items = edit_script(a, b);
        assert!(items.iter().any(|i| i.deleted_a == 0 && i.start_b == 21));
        validate(a.len() as u64, b.len() as u64, &items).unwrap();

        let mut a_pos = 0u64;
        let mut b_pos = 0u64;
        for item in &items {
            assert!(item.start_a >= a_pos && item.start_b >= b_pos, "{item}");
            assert_eq!(item.start_a - a_pos, item.start_b - b_pos, "{item}");
            a_pos = item.end_a();
            b_pos = item.end_b();
        }
    }

    #[cfg(feature = "myers")]
    #[test]
    fn identical_inputs_give_empty_script() {
        assert!(edit_script(b"same bytes", b"same bytes").is_empty());
        assert!(edit_script(b"", b"").is_empty());
    }

    #[cfg(feature = "myers")]
    #[test]
    fn scripts_are_valid() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"abc", b"aab"),
            (b"abc", b"xyz"),
            (b"", b"new"),
            (b"old", b""),
            (b"The quick brown fox", b"The quick red fox jumps"),
            (
                b"The quick brown fox jumps over the lazy dog. 1234567890",
                b"The quick brown cat sits on the lazy mat. 1234567890!!!",
            ),
        ];
        for (a, b) in cases {
            let items = edit_script(a, b);
            validate(a.len() as u64, b.len() as u64, &items)
                .unwrap_or_else(|e| panic!("{a:?} -> {b:?}: {e}"));
        }
    }
}
