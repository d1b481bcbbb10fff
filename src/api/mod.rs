pub mod classify;
pub mod client;
pub mod credentials;
pub mod resources;

pub use classify::classify;
pub use client::{ApiClient, AuthSignal, ClientSettings, DEFAULT_BASE_URL, LOGIN_PATH};
pub use credentials::{CredentialMode, ServiceAccount};
pub use resources::ResourceClient;
