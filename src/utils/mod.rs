pub mod campsync_toml;
pub mod config;
pub mod logger;
pub mod tempfiles;

pub use campsync_toml::{apply_file_to_opts, load_campsync_toml};
pub use config::*;
pub use logger::{Colors, setup_logging};
pub use tempfiles::write_atomic;
