//! Client core for the Paydeck dashboard: the outbound request pipeline and
//! a typed façade over the backend REST API.
//!
//! Every call funnels through one pipeline combining bearer-token
//! attachment, response caching, in-flight deduplication, bounded retry and
//! response normalization, with a guarded session-termination side effect on
//! authentication failure.
//!
//! ```ignore
//! let config = ClientConfig::new("https://api.paydeck.dev/api/v1");
//! let credentials = Arc::new(CredentialStore::in_memory());
//! let client = PaydeckClient::new(&config, credentials, Arc::new(go_to_login))?;
//!
//! client.login("dev@paydeck.dev", "secret").await?;
//! let agents = client.list_agents().await?;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod session;

pub use api::PaydeckClient;
pub use config::{ClientConfig, ConfigError};
pub use credentials::{CredentialStorage, CredentialStore, FileStorage, MemoryStorage};
pub use error::{ApiError, ErrorDetail};
pub use http::{HttpClient, Method, RequestDescriptor};
pub use session::{SessionGuard, SessionSink};
