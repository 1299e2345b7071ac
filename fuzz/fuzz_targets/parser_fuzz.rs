#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whitespace-separated tokens become argv after the program name.
    let args: Vec<String> = String::from_utf8_lossy(data)
        .split_whitespace()
        .take(32)
        .map(str::to_owned)
        .collect();
    bytepatch::cli::fuzz_try_parse_args(&args);
});
