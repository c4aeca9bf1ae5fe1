#![no_main]
use libfuzzer_sys::fuzz_target;
use tasklane_stream::{ChatStreamDecoder, DecoderConfig};

fuzz_target!(|data: &[u8]| {
    // First byte picks the chunk size, the rest is the body.
    let Some((&size, body)) = data.split_first() else {
        return;
    };
    let size = usize::from(size).max(1);

    let mut decoder = ChatStreamDecoder::new(DecoderConfig::default().max_line_retries(2));
    let mut previous = String::new();
    for chunk in body.chunks(size) {
        for update in decoder.feed(chunk) {
            assert!(update.starts_with(&previous));
            previous = update;
        }
    }
    let finish = decoder.finish();
    for update in finish.updates {
        assert!(update.starts_with(&previous));
        previous = update;
    }
    assert_eq!(finish.message, previous);
});
