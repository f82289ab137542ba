//! TubePilot gateway: typed request/response boundary to the remote service,
//! plus the local key-value storage it reads credentials from.
mod client;
mod error;
mod gateway;
mod persist;
mod session;
mod settings;
mod storage;
mod upload;
pub mod wire;

pub use client::ReqwestGateway;
pub use error::{FailureKind, GatewayError};
pub use gateway::{ProgressSink, RemoteGateway};
pub use persist::{ensure_storage_dir, AtomicFileWriter, StoreError};
pub use session::SessionObserver;
pub use settings::{parse_base_url, GatewaySettings, API_URL_ENV, DEFAULT_API_URL, TIMEOUT_ENV};
pub use storage::{
    CredentialStore, FileStore, KeyValueStore, MemoryStore, AUTH_TOKEN_KEY, SETTINGS_KEY,
};
