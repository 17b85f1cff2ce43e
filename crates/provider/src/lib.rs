#![forbid(unsafe_code)]

pub mod provider;
pub mod remote;
pub mod synthetic;

pub use provider::{DEFAULT_PAGE_SIZE, ProgressProvider, ProviderError};
pub use remote::{RemoteProvider, RemoteProviderConfig};
pub use synthetic::SyntheticProvider;
