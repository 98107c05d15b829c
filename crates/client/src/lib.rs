//! `shopdesk-client`
//!
//! **Responsibility:** the dashboard's session core.
//!
//! This crate provides:
//! - The credential transport to the remote auth API
//! - The tab-scoped session store
//! - Silent token renewal
//! - The session state machine that guards and UI controls query
//!
//! Authorization decisions themselves live in `shopdesk-auth`.

pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;
pub mod timer;
pub mod transport;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use error::SessionError;
pub use session::{RenewalOutcome, SessionCore, SessionInfo};
pub use storage::{MemoryStorage, SessionStorage, StorageError};
pub use store::SessionStore;
pub use timer::RenewalTimer;
pub use transport::{CredentialTransport, HttpTransport, TransportError};
