// WebSocket transport to the draft room.
//
// One connection per session. The socket is split into a reader task that
// forwards text frames as `TransportEvent`s and a writer task that encodes
// `ClientMessage`s; the session talks to both through mpsc channels.

use std::fmt::Display;

use async_trait::async_trait;
use futures_util::stream::Stream;
use futures_util::{Sink, SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

use crate::draft::model::{LeagueId, ManagerId};
use crate::protocol::ClientMessage;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },
}

/// Events from the reader half of a connection.
#[derive(Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame (raw JSON).
    Message(String),
    /// The socket closed or failed. No more events follow.
    Closed,
}

/// URL of a league's draft room for one user.
pub fn draft_url(ws_base: &str, league: LeagueId, user: ManagerId) -> String {
    format!(
        "{}/ws/draft/{league}?userID={user}",
        ws_base.trim_end_matches('/')
    )
}

/// An open draft-room connection.
///
/// Dropping it stops the reader and writer tasks.
pub struct Connection {
    pub events: mpsc::Receiver<TransportEvent>,
    pub outbound: mpsc::Sender<ClientMessage>,
    tasks: Vec<JoinHandle<()>>,
}

impl Connection {
    /// Wrap already-wired channels, e.g. an in-memory connection in tests.
    pub fn new(
        events: mpsc::Receiver<TransportEvent>,
        outbound: mpsc::Sender<ClientMessage>,
    ) -> Self {
        Connection {
            events,
            outbound,
            tasks: Vec::new(),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Opens draft-room connections. The session holds this as a trait object
/// so tests can substitute an in-memory room.
#[async_trait]
pub trait DraftConnector: Send + Sync {
    async fn connect(&self, league: LeagueId, user: ManagerId) -> Result<Connection, TransportError>;
}

/// Connector for a real server via `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    ws_base: String,
}

impl WsConnector {
    /// `ws_base` is the scheme and host, e.g. `ws://localhost:8080`.
    pub fn new(ws_base: impl Into<String>) -> Self {
        WsConnector {
            ws_base: ws_base.into(),
        }
    }
}

#[async_trait]
impl DraftConnector for WsConnector {
    async fn connect(&self, league: LeagueId, user: ManagerId) -> Result<Connection, TransportError> {
        let url = draft_url(&self.ws_base, league, user);
        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connect {
                url: url.clone(),
                source: Box::new(e),
            })?;
        info!("Connected to draft room at {url}");

        let (write, read) = socket.split();
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (out_tx, out_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let reader = tokio::spawn(async move {
            if process_message_stream(read, &event_tx).await.is_ok() {
                let _ = event_tx.send(TransportEvent::Closed).await;
            }
        });
        let writer = tokio::spawn(forward_outbound(out_rx, write));

        Ok(Connection {
            events: event_rx,
            outbound: out_tx,
            tasks: vec![reader, writer],
        })
    }
}

/// Forward text frames from `stream` through `tx` until the socket closes
/// or errors. Returns `Err(())` if the receiver is gone.
pub async fn process_message_stream<St>(
    mut stream: St,
    tx: &mpsc::Sender<TransportEvent>,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if tx.send(TransportEvent::Message(text.to_string())).await.is_err() {
                    return Err(());
                }
            }
            Ok(Message::Close(frame)) => {
                info!("Server closed the draft room: {frame:?}");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
            Ok(_) => {
                // Binary, ping, pong and raw frames carry nothing for us.
            }
        }
    }
    Ok(())
}

/// Encode and send outbound messages until the channel closes or the sink
/// fails, then close the sink.
pub async fn forward_outbound<Si>(mut rx: mpsc::Receiver<ClientMessage>, mut sink: Si)
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    while let Some(msg) = rx.recv().await {
        let text = match msg.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode outbound message: {e}");
                continue;
            }
        };
        debug!("Sending {text}");
        if let Err(e) = sink.send(Message::Text(text.into())).await {
            warn!("WebSocket send failed: {e}");
            return;
        }
    }
    let _ = sink.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tungstenite::Error as WsError;

    fn mock_stream(
        frames: Vec<Result<Message, WsError>>,
    ) -> impl Stream<Item = Result<Message, WsError>> + Unpin {
        stream::iter(frames)
    }

    #[test]
    fn builds_draft_room_url() {
        assert_eq!(
            draft_url("ws://localhost:8080", LeagueId(4), ManagerId(9)),
            "ws://localhost:8080/ws/draft/4?userID=9"
        );
        assert_eq!(
            draft_url("wss://draft.example.com/", LeagueId(1), ManagerId(2)),
            "wss://draft.example.com/ws/draft/1?userID=2"
        );
    }

    #[tokio::test]
    async fn text_frames_forwarded_in_order() {
        let (tx, mut rx) = mpsc::channel(16);
        let frames = vec![
            Ok(Message::Text("first".into())),
            Ok(Message::Text("second".into())),
        ];
        process_message_stream(mock_stream(frames), &tx).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), TransportEvent::Message("first".into()));
        assert_eq!(rx.recv().await.unwrap(), TransportEvent::Message("second".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn close_frame_stops_reading() {
        let (tx, mut rx) = mpsc::channel(16);
        let frames = vec![
            Ok(Message::Text("before".into())),
            Ok(Message::Close(None)),
            Ok(Message::Text("after".into())),
        ];
        process_message_stream(mock_stream(frames), &tx).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), TransportEvent::Message("before".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn error_stops_reading() {
        let (tx, mut rx) = mpsc::channel(16);
        let frames = vec![
            Err(WsError::ConnectionClosed),
            Ok(Message::Text("after".into())),
        ];
        process_message_stream(mock_stream(frames), &tx).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn non_text_frames_are_ignored() {
        let (tx, mut rx) = mpsc::channel(16);
        let frames = vec![
            Ok(Message::Binary(vec![1, 2].into())),
            Ok(Message::Ping(vec![].into())),
            Ok(Message::Text("kept".into())),
        ];
        process_message_stream(mock_stream(frames), &tx).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), TransportEvent::Message("kept".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receiver_is_reported() {
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        let frames = vec![Ok(Message::Text("orphan".into()))];
        assert!(process_message_stream(mock_stream(frames), &tx).await.is_err());
    }

    #[tokio::test]
    async fn outbound_messages_are_encoded() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(ClientMessage::Message("gg".into())).await.unwrap();
        drop(tx);

        let mut sent: Vec<Message> = Vec::new();
        forward_outbound(rx, &mut sent).await;

        assert_eq!(
            sent,
            vec![Message::Text(r#"{"Kind":"message","Payload":"gg"}"#.into())]
        );
    }
}
