//! Engine module: hashing, folder identity, the entry store and reconciliation

pub mod arg_parser;
pub mod cli;
pub mod folders;
pub mod hashing;
pub mod naming;
pub mod reconcile;
pub mod store;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use folders::{FolderResolver, find_folder, index_folders, read_marker};
pub use hashing::{find_by_hash, hash_equals, hash_file};
pub use naming::{conflict_free_name, local_copy_name};
pub use reconcile::{Outcome, Reconciler, check_identity, decide};
pub use store::{EntryStore, StoredRow, parse_state};
pub use tools::{
    folder_name, is_hidden_name, path_from_store_string, path_relative_to, path_to_store_string,
    sanitize_file_name,
};
