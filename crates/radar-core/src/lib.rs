//! Core types and the streaming analysis protocol for invest-radar
//!
//! This crate defines the payloads shared between the server and its clients:
//!
//! - [`AnalysisEvent`] and [`SourceRef`], the units of a streamed analysis
//! - [`Stock`], [`PriceDataPoint`] and [`StockSnapshot`], the quote lookup payload
//! - Frame encoding ([`encode_frame`]) using the [`FRAME_DELIMITER`] token
//! - An incremental [`FrameDecoder`] that tolerates arbitrary read boundaries
//! - [`decode_stream`], adapting a byte stream into an event stream
//! - [`AnalysisTranscript`], the accumulated state of one analysis turn

pub mod decoder;
pub mod error;
pub mod event;
pub mod frame;
pub mod quote;
pub mod stream;
pub mod transcript;

pub use decoder::{FrameDecoder, Utf8Decoder};
pub use error::{ProtocolError, Result};
pub use event::{AnalysisEvent, SourceRef, dedupe_sources};
pub use frame::{FRAME_DELIMITER, encode_frame, encode_payload};
pub use quote::{PriceDataPoint, Stock, StockSnapshot};
pub use stream::{TRANSPORT_ERROR_MESSAGE, decode_stream};
pub use transcript::AnalysisTranscript;
