#![no_main]

use iam_errors::message::{self, Disclosure};
use iam_errors::{ErrorKind, ExplicitMessage, Params};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let kind = ErrorKind::ALL[selector as usize % ErrorKind::COUNT];
    let revealed = selector & 0x80 != 0;
    let text = String::from_utf8_lossy(rest).into_owned();

    let mut params = Params::new();
    params.insert("user_id", text.clone());
    params.insert("detail", text.clone());

    let explicit = ExplicitMessage::from(text);
    let out = message::build(kind, Some(&explicit), &params, Disclosure::from_override(revealed));
    assert!(!out.is_empty());

    let again = message::build(kind, Some(&explicit), &params, Disclosure::from_override(revealed));
    assert_eq!(out, again);
});
