#![no_main]
use libfuzzer_sys::fuzz_target;
use bytepatch::patch::{ItemIterator, apply_to_vec};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a patch: errors are fine, panics are not.
    let _ = apply_to_vec(&[], data);

    if data.len() >= 2 {
        let split = data.len() / 2;
        let (source, patch) = data.split_at(split);
        if apply_to_vec(source, patch).is_ok() {
            // A patch that applies must also decode cleanly on its own.
            let mut items = ItemIterator::new(patch).unwrap();
            for item in items.by_ref() {
                item.unwrap();
            }
            items.finish().unwrap();
        }
    }
});
