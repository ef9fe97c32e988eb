//! Live channel to the chat backend.
//!
//! Owns one WebSocket connection: dispatches inbound frames to registered
//! observers, accepts outbound text, and re-opens the channel with a
//! bounded linear retry policy when it drops. Retries stop after
//! `ReconnectConfig::max_attempts` consecutive failures or as soon as the
//! stored identity is cleared by `disconnect`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use protocol::{ChatMessage, FrameCodec, OutboundFrame};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::auth::Identity;
use crate::config::{EndpointConfig, ReconnectConfig};
use crate::error::Result;

/// Handle returned by observer registration; pass to `off_*` to stop
/// delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type MessageHandler = Arc<dyn Fn(&ChatMessage) + Send + Sync>;
type ConnectionHandler = Arc<dyn Fn(bool) + Send + Sync>;

struct ConnectionInner {
    endpoint: EndpointConfig,
    reconnect: ReconnectConfig,
    codec: FrameCodec,
    current_user: Mutex<Option<Identity>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    connected: AtomicBool,
    reconnect_attempts: AtomicU32,
    reconnect_task: Mutex<Option<JoinHandle<()>>>,
    next_subscription: AtomicU64,
    message_handlers: Mutex<Vec<(SubscriptionId, MessageHandler)>>,
    connection_handlers: Mutex<Vec<(SubscriptionId, ConnectionHandler)>>,
}

/// Client side of the chat channel. Construct once and share by
/// reference; `disconnect` tears the channel down.
pub struct ChatConnection {
    inner: Arc<ConnectionInner>,
}

impl ChatConnection {
    pub fn new(endpoint: EndpointConfig, reconnect: ReconnectConfig) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                endpoint,
                reconnect,
                codec: FrameCodec::default(),
                current_user: Mutex::new(None),
                outbound: Mutex::new(None),
                connected: AtomicBool::new(false),
                reconnect_attempts: AtomicU32::new(0),
                reconnect_task: Mutex::new(None),
                next_subscription: AtomicU64::new(1),
                message_handlers: Mutex::new(Vec::new()),
                connection_handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Opens the channel for the given identity.
    ///
    /// Resolves once the channel reports open. An open failure is returned
    /// to the caller and also counts against the automatic retry policy.
    pub async fn connect(&self, user: Identity) -> Result<()> {
        *self.inner.current_user.lock() = Some(user);

        match self.inner.clone().open_channel().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.inner.schedule_reconnect();
                Err(err)
            }
        }
    }

    /// Closes the channel and forgets the stored identity.
    ///
    /// Any pending reconnect is aborted outright; the cleared identity
    /// also defuses a reconnect that already started running. The retry
    /// counter is left as-is.
    pub fn disconnect(&self) {
        if let Some(task) = self.inner.reconnect_task.lock().take() {
            task.abort();
        }
        *self.inner.current_user.lock() = None;

        if let Some(tx) = self.inner.outbound.lock().take() {
            let _ = tx.send(Message::Close(None));
        }
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    /// Sends a text frame, optionally addressed to a single peer.
    ///
    /// Logged and dropped when the channel is not open; nothing is queued.
    pub fn send_message(&self, content: &str, target_ip: Option<&str>) {
        if !self.inner.connected.load(Ordering::SeqCst) {
            log::error!("Cannot send message: channel is not open");
            return;
        }

        let frame = OutboundFrame::text(content, target_ip.map(str::to_string));
        let raw = match self.inner.codec.encode_outbound(&frame) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("Failed to encode outbound frame: {}", err);
                return;
            }
        };

        let guard = self.inner.outbound.lock();
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(Message::Text(raw)).is_err() {
                    log::warn!("Outbound queue closed while sending");
                }
            }
            None => log::error!("Cannot send message: channel is not open"),
        }
    }

    /// Registers a chat-message observer; observers fire in registration
    /// order.
    pub fn on_message<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        let id = self.inner.next_id();
        self.inner
            .message_handlers
            .lock()
            .push((id, Arc::new(handler)));
        id
    }

    /// Stops delivery to a previously registered message observer.
    pub fn off_message(&self, id: SubscriptionId) {
        self.inner
            .message_handlers
            .lock()
            .retain(|(entry, _)| *entry != id);
    }

    /// Registers a connectivity observer fired with `true` on open and
    /// `false` on close.
    pub fn on_connection<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.inner.next_id();
        self.inner
            .connection_handlers
            .lock()
            .push((id, Arc::new(handler)));
        id
    }

    /// Stops delivery to a previously registered connectivity observer.
    pub fn off_connection(&self, id: SubscriptionId) {
        self.inner
            .connection_handlers
            .lock()
            .retain(|(entry, _)| *entry != id);
    }

    /// True while the channel is open.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Identity the channel was opened with, if any.
    pub fn current_user(&self) -> Option<Identity> {
        self.inner.current_user.lock().clone()
    }

    /// Retry attempts consumed since the last successful open. Diagnostic.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.reconnect_attempts.load(Ordering::SeqCst)
    }
}

impl ConnectionInner {
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    async fn open_channel(self: Arc<Self>) -> Result<()> {
        let url = self.endpoint.ws_url();
        log::info!("Opening channel to {}", url);

        let (stream, _response) = connect_async(url.as_str()).await?;

        self.reconnect_attempts.store(0, Ordering::SeqCst);
        let (mut sink, mut read) = stream.split();

        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        *self.outbound.lock() = Some(tx);
        self.connected.store(true, Ordering::SeqCst);
        log::info!("Channel open");
        self.notify_connection(true);

        // Writer half: forwards queued frames until the channel drops.
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                let closing = matches!(frame, Message::Close(_));
                if sink.send(frame).await.is_err() {
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Reader half: dispatches frames, then drives the retry policy.
        let inner = Arc::clone(&self);
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(raw)) => match inner.codec.decode_incoming(&raw) {
                        Ok(message) => inner.notify_message(&message),
                        Err(err) => log::error!("Dropping undecodable frame: {}", err),
                    },
                    Ok(Message::Close(_)) => break,
                    // Binary frames are not part of the chat contract;
                    // ping/pong is handled by the transport.
                    Ok(_) => {}
                    Err(err) => {
                        log::warn!("Channel error: {}", err);
                        break;
                    }
                }
            }

            log::info!("Channel closed");
            inner.connected.store(false, Ordering::SeqCst);
            *inner.outbound.lock() = None;
            inner.notify_connection(false);
            inner.schedule_reconnect();
        });

        Ok(())
    }

    fn schedule_reconnect(self: &Arc<Self>) {
        if self.current_user.lock().is_none() {
            return;
        }

        let attempts = self.reconnect_attempts.load(Ordering::SeqCst);
        if attempts >= self.reconnect.max_attempts {
            log::warn!("Giving up on reconnection after {} attempts", attempts);
            return;
        }
        self.reconnect_attempts.store(attempts + 1, Ordering::SeqCst);
        log::info!(
            "Scheduling reconnect attempt {}/{}",
            attempts + 1,
            self.reconnect.max_attempts
        );

        let inner = Arc::clone(self);
        let delay = Duration::from_millis(self.reconnect.delay_ms);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // A disconnect in the meantime cleared the identity; stand down.
            if inner.current_user.lock().is_none() {
                return;
            }

            if let Err(err) = inner.clone().open_channel().await {
                log::warn!("Reconnect attempt failed: {}", err);
                inner.schedule_reconnect();
            }
        });
        *self.reconnect_task.lock() = Some(task);
    }

    fn notify_message(&self, message: &ChatMessage) {
        let handlers: Vec<MessageHandler> = self
            .message_handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(message))).is_err() {
                log::error!("Message observer panicked; continuing with the rest");
            }
        }
    }

    fn notify_connection(&self, connected: bool) {
        let handlers: Vec<ConnectionHandler> = self
            .connection_handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(connected))).is_err() {
                log::error!("Connectivity observer panicked; continuing with the rest");
            }
        }
    }
}
