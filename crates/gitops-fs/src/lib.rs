//! Filesystem abstraction for the GitOps manifest compiler
//!
//! The compiler never touches `std::fs` directly. Everything it reads or
//! writes goes through the [`Filesystem`] trait, keyed by [`NormalizedPath`]:
//!
//! - [`OsFilesystem`] writes atomically to disk with advisory locking
//! - [`MemoryFilesystem`] keeps everything in memory (tests)
//! - [`OverlayFilesystem`] reads through to another filesystem but captures
//!   writes in memory (dry runs)
//!
//! [`ConfigStore`] layers format-agnostic (de)serialization on top.

pub mod checksum;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use filesystem::{Filesystem, MemoryFilesystem, OsFilesystem, OverlayFilesystem};
pub use path::NormalizedPath;
