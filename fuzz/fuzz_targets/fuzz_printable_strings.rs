#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the printable-strings extractor on raw bytes.
fuzz_target!(|data: &[u8]| {
    let extractor = binsniff::extract::PrintableStringsExtractor::default();
    for s in extractor.strings_from_bytes(data) {
        assert!(s.len() >= 4);
    }
});
