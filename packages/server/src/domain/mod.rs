//! Domain layer: relay rules independent of transport and storage.

pub mod chunk_frame;
pub mod connection;
pub mod error;
pub mod event;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod room;
pub mod value_object;

pub use chunk_frame::{CHUNK_HEADER_LEN, ChunkFrame, ChunkHeader, MAX_FRAME_LEN, check_frame_len};
pub use connection::{
    CloseReason, Connection, Liveness, OUTBOUND_QUEUE_CAPACITY, Outbound, OutboundQueue,
};
pub use error::{EnqueueError, FrameError, ValueObjectError};
pub use event::ServerEvent;
pub use presence::{Admission, Departure, JoinOutcome, LeaveOutcome};
pub use pusher::MessagePusher;
pub use repository::RoomRepository;
pub use room::{ROOM_CAPACITY, Room};
pub use value_object::{ConnectionId, RoomId, Username};

#[cfg(test)]
pub use pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::MockRoomRepository;
