// Adapters layer: concrete implementations for external systems (http service, local storage).

pub mod http;
pub mod storage;
