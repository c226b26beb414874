//! File storage primitives.

mod atomic_toml;
mod record_dir;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use record_dir::RecordDir;
pub(crate) use record_dir::run_blocking;
