// Adapters layer: concrete implementations of the domain ports (http, settings, notifications).

pub mod http;
pub mod notify;
pub mod settings;
