// Adapters layer: concrete implementations for external systems (relay http client, local storage).

pub mod http;
pub mod storage;

pub use http::RelayClient;
pub use storage::LocalStorage;
