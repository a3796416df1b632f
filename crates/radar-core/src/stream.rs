//! Adapting a byte stream into a stream of analysis events

use crate::decoder::FrameDecoder;
use crate::event::AnalysisEvent;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use tracing::warn;

/// Event yielded when the transport fails mid-stream
pub const TRANSPORT_ERROR_MESSAGE: &str = "An error occurred while streaming the analysis.";

struct DecodeState<S> {
    source: Option<Pin<Box<S>>>,
    decoder: FrameDecoder,
    ready: VecDeque<AnalysisEvent>,
}

/// Decode a framed byte stream into events, in arrival order
///
/// The result is single-pass. A read error ends the stream after one error
/// event carrying [`TRANSPORT_ERROR_MESSAGE`]; end of input flushes any
/// undelimited final frame. Dropping the returned stream drops `bytes`, which
/// releases the underlying connection.
pub fn decode_stream<S, B, E>(bytes: S) -> impl Stream<Item = AnalysisEvent>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = DecodeState {
        source: Some(Box::pin(bytes)),
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((event, state));
            }

            let source = state.source.as_mut()?;
            let next = source.next().await;

            match next {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(chunk.as_ref());
                    state.ready.extend(events);
                }
                Some(Err(err)) => {
                    warn!(error = %err, "Analysis stream read failed");
                    state.source = None;
                    state.ready.push_back(AnalysisEvent::error(TRANSPORT_ERROR_MESSAGE));
                }
                None => {
                    state.source = None;
                    let last = state.decoder.finish();
                    state.ready.extend(last);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SourceRef;
    use futures::channel::mpsc;

    fn ok_chunks(chunks: &[&str]) -> Vec<Result<Vec<u8>, String>> {
        chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect()
    }

    #[tokio::test]
    async fn test_decode_stream_across_chunks() {
        let chunks = ok_chunks(&[
            r#"{"text":"Hel"#,
            r#"lo "}__END_OF_"#,
            r#"OBJECT__{"text":"world"}__END_OF_OBJECT__{"sources":[{"uri":"x","#,
            r#""title":"X"}]}"#,
        ]);

        let events: Vec<AnalysisEvent> = decode_stream(stream::iter(chunks)).collect().await;

        assert_eq!(
            events,
            vec![
                AnalysisEvent::text("Hello "),
                AnalysisEvent::text("world"),
                AnalysisEvent::sources(vec![SourceRef::new("x", "X")]),
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_error_yields_one_error_then_ends() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![
            Ok(br#"{"text":"partial"}__END_OF_OBJECT__{"text":"lost"#.to_vec()),
            Err("connection reset".to_string()),
            Ok(br#"{"text":"never"}__END_OF_OBJECT__"#.to_vec()),
        ];

        let events: Vec<AnalysisEvent> = decode_stream(stream::iter(chunks)).collect().await;

        assert_eq!(
            events,
            vec![
                AnalysisEvent::text("partial"),
                AnalysisEvent::error(TRANSPORT_ERROR_MESSAGE),
            ]
        );
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        let chunks: Vec<Result<Vec<u8>, String>> = Vec::new();
        let events: Vec<AnalysisEvent> =
            tokio_test::block_on(decode_stream(stream::iter(chunks)).collect());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_dropping_consumer_releases_source() {
        let (tx, rx) = mpsc::unbounded::<Vec<u8>>();
        let events = decode_stream(rx.map(Ok::<_, String>));
        let mut events = Box::pin(events);

        tx.unbounded_send(br#"{"text":"first"}__END_OF_OBJECT__"#.to_vec())
            .unwrap();
        assert_eq!(events.next().await, Some(AnalysisEvent::text("first")));
        assert!(!tx.is_closed());

        drop(events);
        assert!(tx.is_closed());
    }
}
