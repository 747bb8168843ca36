#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz signature document parsing.
///
/// Both document shapes are tried, and every entry of a parsed document is
/// decoded the way the stores do.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = binsniff::corpus::parse_document(s) {
            for entry in doc.decode_entries() {
                let _ = entry;
            }
        }
    }
});
