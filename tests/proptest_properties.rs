use bytepatch::patch::{self, EditItem};
use bytepatch::script;
use proptest::prelude::*;

fn encode(source: &[u8], target: &[u8]) -> (Vec<EditItem>, Vec<u8>) {
    let items = script::edit_script(source, target);
    let delta = patch::encode_to_vec(source, target, &items).unwrap();
    (items, delta)
}

/// Target derived from `source` by a few splices, so scripts have structure.
fn mutated() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (
        proptest::collection::vec(any::<u8>(), 0..2048),
        proptest::collection::vec(
            (
                any::<prop::sample::Index>(),
                0usize..16,
                proptest::collection::vec(any::<u8>(), 0..16),
            ),
            0..8,
        ),
    )
        .prop_map(|(source, edits)| {
            let mut target = source.clone();
            for (at, remove, insert) in edits {
                let start = if target.is_empty() { 0 } else { at.index(target.len()) };
                let end = (start + remove).min(target.len());
                target.splice(start..end, insert);
            }
            (source, target)
        })
}

proptest! {
    #[test]
    fn prop_encode_apply_roundtrip(
        source in proptest::collection::vec(any::<u8>(), 0..512),
        target in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let (_, delta) = encode(&source, &target);
        let decoded = patch::apply_to_vec(&source, &delta).unwrap();
        prop_assert_eq!(decoded, target);
    }

    #[test]
    fn prop_mutations_roundtrip_in_one_pass((source, target) in mutated()) {
        let (items, delta) = encode(&source, &target);
        prop_assert_eq!(delta.len(), patch::encoded_len(&items));
        script::validate(source.len() as u64, target.len() as u64, &items).unwrap();

        let mut out = Vec::new();
        let stats = patch::apply_patch(&source, &delta, &mut out).unwrap();
        prop_assert_eq!(&out, &target);
        prop_assert_eq!(stats.copied + stats.skipped, source.len() as u64);
        prop_assert_eq!(stats.items, items.len() as u64);
    }

    #[test]
    fn prop_identical_data_is_one_byte(
        source in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let (items, delta) = encode(&source, &source);
        prop_assert!(items.is_empty());
        prop_assert_eq!(delta, vec![0u8]);
    }

    #[test]
    fn prop_truncation_never_succeeds(
        (source, target) in mutated(),
        cut in any::<prop::sample::Index>(),
    ) {
        let (_, delta) = encode(&source, &target);
        let cut = cut.index(delta.len());
        let err = patch::apply_to_vec(&source, &delta[..cut]).unwrap_err();
        prop_assert!(err.is_truncated(), "cut {} of {}: {}", cut, delta.len(), err);
    }

    #[test]
    fn prop_arbitrary_patch_never_panics(
        source in proptest::collection::vec(any::<u8>(), 0..256),
        delta in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut out = Vec::new();
        if let Ok(stats) = patch::apply_patch(&source, &delta, &mut out) {
            prop_assert_eq!(stats.output_len, out.len() as u64);
            prop_assert_eq!(stats.copied + stats.skipped, source.len() as u64);
        }
    }
}

#[test]
#[ignore = "performance properties are workload and machine dependent"]
fn perf_property_apply_is_linear() {
    use std::time::Instant;
    let make = |n: usize| -> Vec<u8> { (0..n).map(|i| (i % 251) as u8).collect() };
    let source = make(4 * 1024 * 1024);
    let mut target = source.clone();
    for i in (0..target.len()).step_by(4096) {
        target[i] = target[i].wrapping_add(3);
    }

    let items: Vec<EditItem> = (0..target.len() as u64)
        .step_by(4096)
        .map(|i| EditItem::new(i, i, 1, 1))
        .collect();
    let delta = patch::encode_to_vec(&source, &target, &items).unwrap();
    let t0 = Instant::now();
    let decoded = patch::apply_to_vec(&source, &delta).unwrap();
    let dt = t0.elapsed();
    assert_eq!(decoded, target);
    assert!(dt.as_secs_f64() < 5.0, "apply took {:?}", dt);
}
