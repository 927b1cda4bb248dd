pub mod builtin_providers;
pub mod chat_stream;
pub mod config;
pub mod constants;
pub mod message;
pub mod project_context;
pub mod session;
pub mod wire;
