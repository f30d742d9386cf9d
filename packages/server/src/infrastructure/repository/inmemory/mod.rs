//! インメモリ実装（プロセス内のみ、永続化しない）

pub mod room;

pub use room::InMemoryRoomRepository;
