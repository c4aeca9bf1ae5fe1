//! Chunk-boundary behaviour of the decoder, driven end to end.

use bytes::Bytes;
use futures::{StreamExt, stream};
use proptest::prelude::*;
use tasklane_stream::{ChatStreamDecoder, DecodeEvent, DecoderConfig, StreamOutcome, decode_stream};

fn delta_record(text: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"choices":[{"index":0,"delta":{"content":text},"finish_reason":null}]})
    )
}

/// Build a body from fragments, with comments and blank lines between records.
fn build_body(fragments: &[String], terminate: bool) -> String {
    let mut body = String::from(": connected\n\n");
    for (i, fragment) in fragments.iter().enumerate() {
        body.push_str(&delta_record(fragment));
        if i % 2 == 0 {
            body.push('\n');
        } else {
            body.push_str(": ping\r\n");
        }
    }
    if terminate {
        body.push_str("data: [DONE]\n");
    }
    body
}

/// Split `bytes` at the given (unsorted, possibly repeated) offsets.
fn split_at_points(bytes: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = points.iter().map(|p| p % (bytes.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(bytes[start..cut].to_vec());
        start = cut;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

fn run_sync(chunks: &[Vec<u8>]) -> (Vec<String>, String, bool) {
    run_with(DecoderConfig::default(), chunks)
}

fn run_with(config: DecoderConfig, chunks: &[Vec<u8>]) -> (Vec<String>, String, bool) {
    let mut decoder = ChatStreamDecoder::new(config);
    let mut updates: Vec<String> = chunks.iter().flat_map(|c| decoder.feed(c)).collect();
    let finish = decoder.finish();
    updates.extend(finish.updates);
    let completed = matches!(finish.outcome, StreamOutcome::Completed);
    (updates, finish.message, completed)
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 .,!?]{1,12}",
        "[éüñ€中文🦀\n\"\\\\]{1,6}",
    ]
}

/// A fragment record, or `None` for a data line that never parses.
fn record() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => fragment().prop_map(Some),
        1 => Just(None),
    ]
}

fn retry_cap() -> impl Strategy<Value = DecoderConfig> {
    prop_oneof![
        Just(DecoderConfig::default()),
        (0u32..4).prop_map(|n| DecoderConfig::default().max_line_retries(n)),
    ]
}

fn build_body_with_malformed(records: &[Option<String>], terminate: bool) -> String {
    let mut body = String::new();
    for record in records {
        match record {
            Some(fragment) => body.push_str(&delta_record(fragment)),
            None => body.push_str("data: {broken\n"),
        }
    }
    if terminate {
        body.push_str("data: [DONE]\n");
    }
    body
}

proptest! {
    #[test]
    fn malformed_records_do_not_make_the_result_depend_on_chunking(
        records in prop::collection::vec(record(), 0..12),
        points in prop::collection::vec(any::<usize>(), 0..24),
        terminate in any::<bool>(),
        config in retry_cap(),
    ) {
        let body = build_body_with_malformed(&records, terminate);
        let expected: String = records.iter().flatten().map(String::as_str).collect();

        let (whole_updates, whole, whole_completed) =
            run_with(config.clone(), &[body.as_bytes().to_vec()]);
        let (split_updates, split, split_completed) =
            run_with(config, &split_at_points(body.as_bytes(), &points));

        prop_assert_eq!(&whole, &expected);
        prop_assert_eq!(&split, &expected);
        prop_assert_eq!(whole_completed, terminate);
        prop_assert_eq!(split_completed, terminate);
        prop_assert_eq!(whole_updates, split_updates);
    }

    #[test]
    fn chunking_does_not_change_the_result(
        fragments in prop::collection::vec(fragment(), 0..12),
        points in prop::collection::vec(any::<usize>(), 0..24),
        terminate in any::<bool>(),
    ) {
        let body = build_body(&fragments, terminate);
        let expected: String = fragments.concat();

        let (_, whole, whole_completed) = run_sync(&[body.as_bytes().to_vec()]);
        let (_, split, split_completed) = run_sync(&split_at_points(body.as_bytes(), &points));

        prop_assert_eq!(&whole, &expected);
        prop_assert_eq!(&split, &expected);
        prop_assert_eq!(whole_completed, terminate);
        prop_assert_eq!(split_completed, terminate);
    }

    #[test]
    fn updates_only_grow_by_append(
        fragments in prop::collection::vec(fragment(), 1..12),
        points in prop::collection::vec(any::<usize>(), 0..24),
    ) {
        let body = build_body(&fragments, true);
        let (updates, message, _) = run_sync(&split_at_points(body.as_bytes(), &points));

        prop_assert_eq!(updates.len(), fragments.len());
        let mut previous: &str = "";
        for update in &updates {
            prop_assert!(update.starts_with(previous));
            prop_assert!(update.chars().count() > previous.chars().count());
            previous = update.as_str();
        }
        prop_assert_eq!(previous, message.as_str());
    }

    #[test]
    fn no_replacement_characters_from_split_multibyte(
        points in prop::collection::vec(any::<usize>(), 1..16),
    ) {
        let fragments = vec!["naïve ".to_string(), "中文 ".to_string(), "🦀🦀".to_string()];
        let body = build_body(&fragments, true);
        let (_, message, _) = run_sync(&split_at_points(body.as_bytes(), &points));
        prop_assert!(!message.contains(char::REPLACEMENT_CHARACTER));
        prop_assert_eq!(message, "naïve 中文 🦀🦀");
    }
}

#[test]
fn terminator_ends_processing_regardless_of_trailing_bytes() {
    let body = format!(
        "{}data: [DONE]\n{}data: {{half",
        delta_record("kept"),
        delta_record("ignored")
    );
    let (updates, message, completed) = run_sync(&[body.into_bytes()]);
    assert_eq!(updates, vec!["kept"]);
    assert_eq!(message, "kept");
    assert!(completed);
}

#[test]
fn payload_split_inside_json_contributes_once_complete() {
    let chunks = vec![
        b"data: {\"choices\":".to_vec(),
        b"[{\"delta\":{\"content\":\"hi\"}}]}\n".to_vec(),
    ];
    let (updates, message, _) = run_sync(&chunks);
    assert_eq!(updates, vec!["hi"]);
    assert_eq!(message, "hi");
}

async fn collect(chunks: Vec<Result<Bytes, std::io::Error>>) -> Vec<DecodeEvent> {
    decode_stream(stream::iter(chunks), DecoderConfig::default())
        .collect()
        .await
}

fn updates_of(events: &[DecodeEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DecodeEvent::Update(t) => Some(t.clone()),
            DecodeEvent::Finished { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn scenario_completed() {
    let events = collect(vec![
        Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
        )),
        Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n",
        )),
        Ok(Bytes::from_static(b"data: [DONE]\n")),
    ])
    .await;

    assert_eq!(updates_of(&events), vec!["Hel", "Hello"]);
    assert!(matches!(
        events.last(),
        Some(DecodeEvent::Finished { outcome: StreamOutcome::Completed, message }) if message == "Hello"
    ));
}

#[tokio::test]
async fn scenario_exhausted() {
    let events = collect(vec![Ok(Bytes::from_static(
        b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n",
    ))])
    .await;

    assert_eq!(updates_of(&events), vec!["Hi"]);
    assert!(matches!(
        events.last(),
        Some(DecodeEvent::Finished { outcome: StreamOutcome::Exhausted, message }) if message == "Hi"
    ));
}

#[tokio::test]
async fn scenario_failed_before_any_chunk() {
    let events = collect(vec![Err(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ))])
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        DecodeEvent::Finished { outcome: StreamOutcome::Failed(_), message } if message.is_empty()
    ));
}

#[tokio::test]
async fn exactly_one_finished_event() {
    let events = collect(vec![
        Ok(Bytes::from(delta_record("a"))),
        Ok(Bytes::from_static(b"data: [DONE]\n")),
        Ok(Bytes::from_static(b"data: [DONE]\n")),
    ])
    .await;
    let finished = events
        .iter()
        .filter(|e| matches!(e, DecodeEvent::Finished { .. }))
        .count();
    assert_eq!(finished, 1);
    assert!(matches!(events.last(), Some(DecodeEvent::Finished { .. })));
}
