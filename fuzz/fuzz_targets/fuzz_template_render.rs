#![no_main]

use iam_errors::template;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Nothing supplied: either renders or names what is missing.
    let empty: &[(&str, &str)] = &[];
    if let Err(missing) = template::render(raw, empty) {
        assert!(!missing.is_empty());
    }

    // Everything supplied: always renders.
    let names = template::placeholders(raw);
    let pairs: Vec<(&str, &str)> = names.iter().map(|name| (*name, "{x}")).collect();
    let rendered = template::render(raw, pairs.as_slice());
    assert!(rendered.is_ok());
});
