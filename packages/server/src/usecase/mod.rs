//! UseCase layer: the relay operations driven by inbound events.

mod error;
mod join_room;
mod leave_room;
mod presence;
mod relay_file;
mod test_connection;

pub use error::{JoinRoomError, RelayError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use relay_file::RelayFileUseCase;
pub use test_connection::TestConnectionUseCase;
