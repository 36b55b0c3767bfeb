//! Stream adapter: turns one upstream exchange into a sequence of text fragments

use crate::session::SessionHandle;
use async_stream::stream;
use futures::StreamExt;
use lyra_ai::{Error, StreamEvent};
use std::pin::Pin;
use tokio_stream::Stream;

/// Non-empty reply fragments, or a single error that ends the exchange
pub type FragmentStream = Pin<Box<dyn Stream<Item = lyra_ai::Result<String>> + Send>>;

/// Open an exchange on `session` carrying `payload`.
///
/// Nothing is sent until the stream is first polled. Empty deltas are
/// skipped. The stream ends after `Done`, after the upstream ends, or right
/// after yielding its only `Err`.
pub fn open_exchange(session: SessionHandle, payload: String) -> FragmentStream {
    Box::pin(stream! {
        tracing::debug!(len = payload.len(), "opening exchange");

        let mut events = match session.send_message_stream(&payload).await {
            Ok(events) => events,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut fragments = 0usize;
        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Start { .. } => {}
                StreamEvent::TextDelta { delta } => {
                    if delta.is_empty() {
                        continue;
                    }
                    fragments += 1;
                    yield Ok(delta);
                }
                StreamEvent::Done { stop_reason, usage, .. } => {
                    tracing::debug!(
                        fragments,
                        ?stop_reason,
                        input_tokens = usage.input,
                        output_tokens = usage.output,
                        "exchange finished"
                    );
                    return;
                }
                StreamEvent::Error { message } => {
                    yield Err(Error::Sse(message));
                    return;
                }
            }
        }

        tracing::debug!(fragments, "upstream ended without a done event");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lyra_ai::{ChatSession, StreamEventStream, Usage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Replays a fixed list of events
    struct ScriptedSession {
        events: Vec<StreamEvent>,
        fail_setup: bool,
        sent: AtomicBool,
    }

    impl ScriptedSession {
        fn new(events: Vec<StreamEvent>) -> Arc<Self> {
            Arc::new(Self {
                events,
                fail_setup: false,
                sent: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl ChatSession for ScriptedSession {
        async fn send_message_stream(&self, _message: &str) -> lyra_ai::Result<StreamEventStream> {
            self.sent.store(true, Ordering::SeqCst);
            if self.fail_setup {
                return Err(Error::Sse("service unavailable".into()));
            }
            let events = self.events.clone();
            Ok(Box::pin(stream! {
                for event in events {
                    yield event;
                }
            }))
        }
    }

    fn delta(text: &str) -> StreamEvent {
        StreamEvent::TextDelta {
            delta: text.to_string(),
        }
    }

    fn done(text: &str) -> StreamEvent {
        StreamEvent::Done {
            text: text.to_string(),
            stop_reason: None,
            usage: Usage::default(),
        }
    }

    async fn collect(stream: FragmentStream) -> Vec<lyra_ai::Result<String>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_yields_non_empty_fragments_in_order() {
        let session = ScriptedSession::new(vec![
            StreamEvent::Start {
                model: "test".into(),
            },
            delta("Hi"),
            delta(""),
            delta(" there"),
            done("Hi there"),
        ]);

        let items = collect(open_exchange(session, "hello".into())).await;
        let texts: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["Hi".to_string(), " there".to_string()]);
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let session = ScriptedSession::new(vec![delta("a"), done("a"), delta("b")]);
        let items = collect(open_exchange(session, "x".into())).await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_end_without_done_is_clean() {
        let session = ScriptedSession::new(vec![delta("a")]);
        let items = collect(open_exchange(session, "x".into())).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
    }

    #[tokio::test]
    async fn test_mid_stream_error_is_single_and_final() {
        let session = ScriptedSession::new(vec![
            delta("partial"),
            StreamEvent::Error {
                message: "boom".into(),
            },
            delta("never"),
        ]);

        let items = collect(open_exchange(session, "x".into())).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "partial");
        assert!(matches!(&items[1], Err(Error::Sse(m)) if m == "boom"));
    }

    #[tokio::test]
    async fn test_setup_error_is_single_item() {
        let session = Arc::new(ScriptedSession {
            events: vec![delta("never")],
            fail_setup: true,
            sent: AtomicBool::new(false),
        });

        let items = collect(open_exchange(session, "x".into())).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(Error::Sse(m)) if m == "service unavailable"));
    }

    #[tokio::test]
    async fn test_lazy_until_polled() {
        let session = ScriptedSession::new(vec![delta("a")]);
        let mut stream = open_exchange(session.clone(), "x".into());
        assert!(!session.sent.load(Ordering::SeqCst));

        stream.next().await;
        assert!(session.sent.load(Ordering::SeqCst));
    }
}
