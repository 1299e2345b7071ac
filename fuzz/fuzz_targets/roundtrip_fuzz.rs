#![no_main]
use libfuzzer_sys::fuzz_target;
use bytepatch::patch::{apply_to_vec, encode_to_vec};
use bytepatch::script;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let split = 1 + data[0] as usize % data.len();
    let source = &data[1..split];
    let target = &data[split..];

    let items = script::edit_script(source, target);
    let patch = encode_to_vec(source, target, &items).unwrap();
    let out = apply_to_vec(source, &patch).unwrap();
    assert_eq!(out, target);
});
