//! Embeddable capture agent.
//!
//! Captures page views, custom events, and identity changes from a host
//! application and dispatches them to the ingestion endpoint. Failures on
//! this path never interrupt the host: bad input is logged and dropped,
//! network errors are logged and dropped, and identity-storage failures
//! degrade to an in-memory visitor id.

pub mod agent;
pub mod clicks;
pub mod config;
pub mod context;
pub mod identity;
pub mod transport;

pub use agent::{default_agent, CaptureAgent};
pub use clicks::ElementNode;
pub use config::AgentConfig;
pub use context::{ContextSource, HostContextSource, PageState};
pub use identity::{FileIdentityStore, IdentityStore, MemoryIdentityStore};
pub use transport::{HttpTransport, Transport};
