pub mod data;
pub mod io;
pub mod printing;
pub mod store;

pub use data::{path_display, Config, HISTORY_LIMIT};
pub use io::ConfigError;
pub use store::ConfigStore;
