//! Result persistence.

mod json_archive;

pub use json_archive::{ARCHIVE_VERSION, ArchiveError, JsonArchive};
