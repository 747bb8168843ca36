#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the genericity classifier on arbitrary patterns.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let filter = binsniff::GenericityFilter::new();
        let verdict = filter.classify(s);
        assert_eq!(verdict.is_generic(), filter.is_generic(s));
    }
});
