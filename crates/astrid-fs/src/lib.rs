//! Atomic filesystem helpers and directory watching for the file-backed IPC
//! fabric: write-temp-then-rename primitives with monotonically ordered
//! filenames, plus a watcher combining native events with a coarse poll.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)]

mod atomic;
mod error;
mod watch;

pub use atomic::{
    append_ordered_json, atomic_write, atomic_write_json, is_tmp_path, list_ordered,
    ordered_filename, TMP_SUFFIX,
};
pub use error::{FsError, FsResult};
pub use watch::{DirWatcher, FileAppeared, DEFAULT_POLL_INTERVAL};
