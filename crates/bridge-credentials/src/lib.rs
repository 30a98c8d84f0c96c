//! JWT credential-refresh scheduling and per-device connection state
//! tracking, shared by every per-cloud processor that needs session-scoped
//! credentials (Google's per-device JWT, in particular).

pub mod error;
pub mod scheduler;
pub mod state;

pub use error::{CredentialError, CredentialResult};
pub use scheduler::{JwtRefreshScheduler, RefreshHandle};
pub use state::{ConnectionState, ConnectionStateTracker};
