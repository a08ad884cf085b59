//! WebSocket connection and I/O task.
//!
//! # I/O Task
//!
//! Each connection spawns a tokio task that handles:
//!
//! - Incoming text frames, forwarded as [`TransportEvent::Message`]
//! - Outgoing frames queued through [`Transport::send`]
//! - Close requests from the owner
//!
//! The task reports [`TransportEvent::Open`] when it starts and
//! [`TransportEvent::Close`] as its last notification, after releasing its
//! command channel so that [`Transport::is_tracked`] already reads `false`.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;

use super::notification::{Notification, NotificationSender, TransportEvent};
use super::{Connector, Transport};

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the I/O task.
enum ConnectionCommand {
    /// Send a text frame.
    Send(String),
    /// Close the connection.
    Close,
}

// ============================================================================
// WsConnection
// ============================================================================

/// Socket Mode WebSocket connection.
///
/// Dropping the handle closes the connection.
pub struct WsConnection {
    /// Connection identifier.
    id: ConnectionId,
    /// Channel for sending commands to the I/O task.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl WsConnection {
    /// Connects to `url` and spawns the I/O task.
    ///
    /// # Errors
    ///
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(
        id: ConnectionId,
        url: &Url,
        notifications: NotificationSender,
    ) -> Result<Self> {
        debug!(connection = %id, host = url.host_str(), "Connecting");
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        Ok(Self::from_stream(id, ws_stream, notifications))
    }

    /// Wraps an established WebSocket stream.
    pub fn from_stream<S>(
        id: ConnectionId,
        ws_stream: WebSocketStream<S>,
        notifications: NotificationSender,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::run_io_loop(id, ws_stream, command_rx, notifications));

        Self { id, command_tx }
    }

    /// I/O task for one connection.
    async fn run_io_loop<S>(
        id: ConnectionId,
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        notifications: NotificationSender,
    ) where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let notify = |event| notifications.send(Notification::new(id, event)).is_ok();

        if notify(TransportEvent::Open) {
            loop {
                tokio::select! {
                    message = ws_read.next() => {
                        match message {
                            Some(Ok(Message::Text(text))) => {
                                trace!(connection = %id, len = text.len(), "Frame received");
                                if !notify(TransportEvent::Message(text.as_str().to_owned())) {
                                    break;
                                }
                            }

                            Some(Ok(Message::Close(frame))) => {
                                debug!(connection = %id, ?frame, "WebSocket closed by remote");
                                // Flushes the close reply queued by the protocol layer.
                                let _ = ws_write.close().await;
                                break;
                            }

                            Some(Err(e)) => {
                                warn!(connection = %id, error = %e, "WebSocket error");
                                break;
                            }

                            None => {
                                debug!(connection = %id, "WebSocket stream ended");
                                break;
                            }

                            // Ignore Binary, Ping, Pong
                            _ => {}
                        }
                    }

                    command = command_rx.recv() => {
                        match command {
                            Some(ConnectionCommand::Send(text)) => {
                                if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                    warn!(connection = %id, error = %e, "Failed to send frame");
                                    break;
                                }
                            }

                            Some(ConnectionCommand::Close) | None => {
                                debug!(connection = %id, "Closing WebSocket");
                                let _ = ws_write.close().await;
                                break;
                            }
                        }
                    }
                }
            }
        }

        drop(command_rx);
        notify(TransportEvent::Close);

        debug!(connection = %id, "I/O task terminated");
    }
}

impl Transport for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, text: String) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Send(text))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Close);
    }

    fn is_tracked(&self) -> bool {
        !self.command_tx.is_closed()
    }
}

// ============================================================================
// WsConnector
// ============================================================================

/// Opens [`WsConnection`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        id: ConnectionId,
        url: Url,
        notifications: NotificationSender,
    ) -> Result<Box<dyn Transport>> {
        let connection = WsConnection::connect(id, &url, notifications).await?;
        Ok(Box::new(connection))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;

    /// Accepts one WebSocket on an ephemeral port and returns both ends.
    async fn socket_pair() -> (WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>, WebSocketStream<TcpStream>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            tokio_tungstenite::accept_async(stream).await.expect("upgrade")
        });

        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("connect");
        (client, server.await.expect("server task"))
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Notification>) -> TransportEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("notification in time")
            .expect("channel open")
            .event
    }

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (client, mut server) = socket_pair().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = ConnectionId::next();
        let connection = WsConnection::from_stream(id, client, tx);

        assert_eq!(next(&mut rx).await, TransportEvent::Open);
        assert!(connection.is_tracked());

        server
            .send(Message::Text(r#"{"type":"hello"}"#.into()))
            .await
            .expect("server send");
        assert_eq!(
            next(&mut rx).await,
            TransportEvent::Message(r#"{"type":"hello"}"#.to_owned())
        );

        connection.send("ack".to_owned()).expect("queue frame");
        let received = timeout(Duration::from_secs(5), server.next())
            .await
            .expect("frame in time")
            .expect("stream open")
            .expect("frame");
        assert_eq!(received, Message::Text("ack".into()));
    }

    #[tokio::test]
    async fn test_remote_close_untracks_before_notifying() {
        let (client, mut server) = socket_pair().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = WsConnection::from_stream(ConnectionId::next(), client, tx);

        assert_eq!(next(&mut rx).await, TransportEvent::Open);
        server.close(None).await.expect("server close");

        assert_eq!(next(&mut rx).await, TransportEvent::Close);
        assert!(!connection.is_tracked());
        assert!(matches!(
            connection.send("late".to_owned()),
            Err(Error::ConnectionClosed)
        ));

        let reply = timeout(Duration::from_secs(5), server.next())
            .await
            .expect("close reply in time");
        assert!(matches!(reply, Some(Ok(Message::Close(_)))));
    }

    #[tokio::test]
    async fn test_local_close_reports_close() {
        let (client, _server) = socket_pair().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = WsConnection::from_stream(ConnectionId::next(), client, tx);

        assert_eq!(next(&mut rx).await, TransportEvent::Open);
        connection.close();

        assert_eq!(next(&mut rx).await, TransportEvent::Close);
        assert!(!connection.is_tracked());
    }
}
