//! Profile persistence adapters

mod filesystem;

pub use filesystem::FsProfileStore;
