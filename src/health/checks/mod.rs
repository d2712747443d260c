//! Built-in checks

pub mod build_info;
pub mod json;
pub mod network;
pub mod storage;

pub use build_info::BuildInfoCheck;
pub use json::{JsonCodec, JsonRoundTripCheck, SerdeJsonCodec};
pub use network::{HttpTransport, NetworkCheck, Transport, TransportResponse};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageCheck};
