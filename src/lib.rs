//! Async filesystem helpers over `tokio::fs`.
//!
//! ```no_run
//! use fshelpers::FileSystem;
//!
//! # async fn demo() -> fshelpers::Result<()> {
//! let fs = FileSystem::new();
//! fs.write_content_to_file("out/notes/today.txt", "hello").await?;
//! assert_eq!(fs.read_file_content("out/notes/today.txt").await?, "hello");
//! fs.delete_directory("out").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod fs;
pub mod logger;

pub use config::{CrossDevicePolicy, FsConfig, SymlinkPolicy};
pub use encoding::{Content, Encoding};
pub use error::{EncodingError, FsError, NotFoundExt, Result};
pub use fs::{Entry, EntryKind, FileSystem};
