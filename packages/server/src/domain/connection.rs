//! One live socket session: presence state plus its Outbound Pipeline.
//!
//! The pipeline is a bounded queue drained by a single delivery loop, which
//! is the only writer of the socket. Producers never block: when the queue is
//! full the consumer is treated as unresponsive and the connection is closed.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::body::Bytes;
use tokio::sync::{mpsc, watch};

use super::{ConnectionId, EnqueueError, RoomId, ServerEvent, Username};

/// Outbound queue capacity per connection
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// A message waiting in the Outbound Pipeline
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Serialized to a text frame by the delivery loop
    Event(Arc<ServerEvent>),
    /// Written as a binary frame, byte-for-byte
    Binary(Bytes),
}

/// Receiving half of the Outbound Pipeline, owned by the delivery loop
pub type OutboundQueue = mpsc::Receiver<Outbound>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Accepting messages
    Open,
    /// Close requested; the delivery loop is winding down
    Closing,
    /// Delivery loop finished, socket released
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed the socket or the read stream ended
    PeerClosed,
    ReadError,
    WriteError,
    QueueOverflow,
    Shutdown,
}

struct PipelineState {
    liveness: Liveness,
    sender: Option<mpsc::Sender<Outbound>>,
    close_reason: Option<CloseReason>,
}

#[derive(Default)]
struct Presence {
    room: Option<RoomId>,
    username: Username,
}

pub struct Connection {
    id: ConnectionId,
    pipeline: Mutex<PipelineState>,
    presence: Mutex<Presence>,
    shutdown: watch::Sender<bool>,
}

impl Connection {
    /// Create a connection with the default queue capacity.
    pub fn open() -> (Arc<Self>, OutboundQueue) {
        Self::with_capacity(OUTBOUND_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Arc<Self>, OutboundQueue) {
        let (sender, queue) = mpsc::channel(capacity);
        let (shutdown, _) = watch::channel(false);
        let connection = Arc::new(Self {
            id: ConnectionId::generate(),
            pipeline: Mutex::new(PipelineState {
                liveness: Liveness::Open,
                sender: Some(sender),
                close_reason: None,
            }),
            presence: Mutex::new(Presence::default()),
            shutdown,
        });
        (connection, queue)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Append `message` to the queue without waiting.
    ///
    /// A full queue drops the message and closes the connection.
    pub fn enqueue(&self, message: Outbound) -> Result<(), EnqueueError> {
        let mut pipeline = self.lock_pipeline();
        let Some(sender) = pipeline.sender.as_ref() else {
            return Err(EnqueueError::Closed);
        };

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    "Outbound queue full for connection {}, closing connection",
                    self.id
                );
                Self::begin_close(&mut pipeline, &self.shutdown, CloseReason::QueueOverflow);
                Err(EnqueueError::Overflow)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // Delivery loop is gone
                Self::begin_close(&mut pipeline, &self.shutdown, CloseReason::WriteError);
                Err(EnqueueError::Closed)
            }
        }
    }

    /// Request closure. Returns `true` only for the call that performed it.
    pub fn close(&self, reason: CloseReason) -> bool {
        let mut pipeline = self.lock_pipeline();
        Self::begin_close(&mut pipeline, &self.shutdown, reason)
    }

    fn begin_close(
        pipeline: &mut PipelineState,
        shutdown: &watch::Sender<bool>,
        reason: CloseReason,
    ) -> bool {
        if pipeline.liveness != Liveness::Open {
            return false;
        }
        pipeline.liveness = Liveness::Closing;
        pipeline.close_reason = Some(reason);
        pipeline.sender = None;
        shutdown.send_replace(true);
        true
    }

    /// Record that the delivery loop has finished and the socket is released.
    pub fn mark_closed(&self) {
        let mut pipeline = self.lock_pipeline();
        if pipeline.liveness == Liveness::Open {
            Self::begin_close(&mut pipeline, &self.shutdown, CloseReason::Shutdown);
        }
        pipeline.liveness = Liveness::Closed;
    }

    pub fn liveness(&self) -> Liveness {
        self.lock_pipeline().liveness
    }

    pub fn is_open(&self) -> bool {
        self.liveness() == Liveness::Open
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.lock_pipeline().close_reason
    }

    /// Resolves once closure has been requested.
    pub async fn closed(&self) {
        let mut shutdown = self.shutdown.subscribe();
        // The sender lives in `self`, so this only returns once the flag is set.
        let _ = shutdown.wait_for(|closed| *closed).await;
    }

    pub fn room(&self) -> Option<RoomId> {
        self.lock_presence().room.clone()
    }

    pub fn username(&self) -> Username {
        self.lock_presence().username.clone()
    }

    /// Record room membership. Only the room registry calls this, under its lock.
    pub(crate) fn assign(&self, room: RoomId, username: Username) {
        let mut presence = self.lock_presence();
        presence.room = Some(room);
        presence.username = username;
    }

    pub(crate) fn clear_room(&self) -> Option<RoomId> {
        self.lock_presence().room.take()
    }

    fn lock_pipeline(&self) -> MutexGuard<'_, PipelineState> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_presence(&self) -> MutexGuard<'_, Presence> {
        self.presence.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("liveness", &self.liveness())
            .field("room", &self.room())
            .finish()
    }
}
