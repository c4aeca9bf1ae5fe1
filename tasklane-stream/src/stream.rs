//! Async driver: turn a chunked byte stream into [`DecodeEvent`]s.

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::decoder::{ChatStreamDecoder, DecoderConfig, Finish, StreamOutcome};
use crate::error::TransportError;

/// An event produced while decoding one streaming response.
#[derive(Debug)]
pub enum DecodeEvent {
    /// The full assembled message after a new fragment was appended.
    Update(String),
    /// The session ended. Always the last event, emitted exactly once
    /// (unless the session was abandoned through cancellation).
    Finished {
        /// How the session ended.
        outcome: StreamOutcome,
        /// The final assembled message, including on failure.
        message: String,
    },
}

/// Decode a chunked byte stream into cumulative message updates.
///
/// The only await point is the next chunk; everything inside a chunk is
/// processed synchronously. The stream stops reading as soon as the
/// terminator is observed or a read fails.
pub fn decode_stream<S, B, E>(
    source: S,
    config: DecoderConfig,
) -> impl Stream<Item = DecodeEvent> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    decode_stream_with_cancel(source, config, CancellationToken::new())
}

/// Like [`decode_stream`], but abandoned as soon as `cancel` fires.
///
/// On cancellation the byte source is dropped immediately, which releases the
/// underlying read handle. No further updates are emitted and no
/// [`DecodeEvent::Finished`] is produced.
pub fn decode_stream_with_cancel<S, B, E>(
    source: S,
    config: DecoderConfig,
    cancel: CancellationToken,
) -> impl Stream<Item = DecodeEvent> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut decoder = ChatStreamDecoder::new(config);
        let mut source = Box::pin(source);

        let finish = loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(
                        assembled_len = decoder.assembled().len(),
                        "chat stream abandoned"
                    );
                    return;
                }
                next = source.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for update in decoder.feed(chunk.as_ref()) {
                        yield DecodeEvent::Update(update);
                    }
                    if decoder.is_completed() {
                        break decoder.finish();
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "chat stream read failed");
                    break decoder.fail(TransportError::new(e));
                }
                None => break decoder.finish(),
            }
        };
        drop(source);

        let Finish { updates, outcome, message } = finish;
        for update in updates {
            yield DecodeEvent::Update(update);
        }
        tracing::debug!(
            outcome = outcome.label(),
            message_len = message.len(),
            "chat stream finished"
        );
        yield DecodeEvent::Finished { outcome, message };
    }
}
