//! Feed WebSocket Client
//!
//! Holds exactly one connection to the quote stream and reports what the
//! transport does as [`TransportEvent`]s. It never reconnects on its own:
//! the session decides when a new connection is wanted.
//!
//! # Protocol
//!
//! Each text frame carries one complete XML document. Binary frames are
//! ignored; pings are answered.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur in the feed client.
#[derive(Debug, thiserror::Error)]
pub enum FeedClientError {
    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The event receiver is gone.
    #[error("channel send error")]
    ChannelSend,
}

// =============================================================================
// Transport Events
// =============================================================================

/// What the transport did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open.
    Opened,
    /// A text message arrived.
    Message(String),
    /// The peer closed the connection or the stream ended.
    Closed,
    /// Connecting or reading failed.
    Failed(String),
}

impl TransportEvent {
    /// Event name for logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Message(_) => "message",
            Self::Closed => "closed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Whether this client can reach `url` at all (a `ws` or `wss` URL).
#[must_use]
pub fn transport_supported(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "ws" | "wss"))
}

// =============================================================================
// Feed Client
// =============================================================================

/// One connection to the feed endpoint.
pub struct FeedClient {
    url: String,
    event_tx: mpsc::Sender<TransportEvent>,
    cancel: CancellationToken,
}

impl FeedClient {
    /// Create a client for one connection.
    #[must_use]
    pub const fn new(
        url: String,
        event_tx: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            url,
            event_tx,
            cancel,
        }
    }

    /// Connect and forward events until the connection ends.
    ///
    /// Emits `Opened` once connected and exactly one `Closed` or `Failed`
    /// when it ends. Cancellation ends silently.
    ///
    /// # Errors
    ///
    /// Returns [`FeedClientError::ChannelSend`] when the receiver is gone.
    pub async fn run(self) -> Result<(), FeedClientError> {
        let terminal = match self.connect_and_run().await {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::info!("Feed client cancelled");
                return Ok(());
            }
            Err(FeedClientError::ChannelSend) => return Err(FeedClientError::ChannelSend),
            Err(e) => {
                tracing::warn!(error = %e, "Feed connection error");
                TransportEvent::Failed(e.to_string())
            }
        };

        self.send(terminal).await
    }

    /// Returns the terminal event, or `None` when cancelled.
    async fn connect_and_run(&self) -> Result<Option<TransportEvent>, FeedClientError> {
        tracing::info!(url = %self.url, "Connecting to quote feed");

        let connect = tokio_tungstenite::connect_async(self.url.as_str());
        let (ws_stream, _response) = tokio::select! {
            () = self.cancel.cancelled() => return Ok(None),
            result = connect => result?,
        };

        self.send(TransportEvent::Opened).await?;
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(None);
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.send(TransportEvent::Message(text.as_str().to_owned())).await?;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(frame = ?frame, "Server sent close frame");
                            return Ok(Some(TransportEvent::Closed));
                        }
                        Some(Ok(_)) => {
                            // Binary and pong frames carry nothing for the board
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            tracing::info!("WebSocket stream ended");
                            return Ok(Some(TransportEvent::Closed));
                        }
                    }
                }
            }
        }
    }

    async fn send(&self, event: TransportEvent) -> Result<(), FeedClientError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| FeedClientError::ChannelSend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("ws://localhost:9001/feed", true ; "plain websocket")]
    #[test_case("wss://feed.example.com/quotes", true ; "tls websocket")]
    #[test_case("http://localhost:9001", false ; "http scheme")]
    #[test_case("not a url", false ; "garbage")]
    #[test_case("", false ; "empty")]
    fn transport_support(url: &str, expected: bool) {
        assert_eq!(transport_supported(url), expected);
    }

    #[test]
    fn event_names() {
        assert_eq!(TransportEvent::Opened.as_str(), "opened");
        assert_eq!(TransportEvent::Message(String::new()).as_str(), "message");
        assert_eq!(TransportEvent::Closed.as_str(), "closed");
        assert_eq!(TransportEvent::Failed(String::new()).as_str(), "failed");
    }
}
