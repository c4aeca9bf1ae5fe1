#![deny(missing_docs)]
//! Incremental decoder for Server-Sent-Events chat completion streams.
//!
//! A streaming chat reply arrives as an HTTP body split at arbitrary byte
//! boundaries. [`ChatStreamDecoder`] reassembles it into lines, picks out the
//! `data: ` records, pulls `choices[0].delta.content` out of each JSON payload,
//! and keeps a running transcript of the assistant's reply:
//!
//! ```
//! use tasklane_stream::{ChatStreamDecoder, StreamOutcome};
//!
//! let mut decoder = ChatStreamDecoder::default();
//! let mut updates = decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n");
//! updates.extend(decoder.feed(b"data: {\"choices\":[{\"delta\":{\"con"));
//! updates.extend(decoder.feed(b"tent\":\"lo\"}}]}\ndata: [DONE]\n"));
//! assert_eq!(updates, ["Hel", "Hello"]);
//!
//! let finish = decoder.finish();
//! assert!(matches!(finish.outcome, StreamOutcome::Completed));
//! ```
//!
//! [`decode_stream`] drives a decoder from any chunked byte stream (such as
//! `reqwest::Response::bytes_stream`) and yields [`DecodeEvent`]s.

pub mod decoder;
pub mod error;
pub mod line;
pub mod record;
pub mod stream;
pub mod utf8;

pub use decoder::{ChatStreamDecoder, DecoderConfig, DecoderState, Finish, StreamOutcome};
pub use error::TransportError;
pub use line::LineBuffer;
pub use record::{Record, extract_fragment};
pub use stream::{DecodeEvent, decode_stream, decode_stream_with_cancel};
pub use utf8::Utf8Decoder;
