mod fs_file_store;
pub use fs_file_store::*;
