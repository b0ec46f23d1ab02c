//! Write-temp-then-rename JSON files with monotonic filename ordering (§4.A).

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::Serialize;

use crate::error::{FsError, FsResult};

/// Suffix used for the temp file in the write-then-rename dance. Watchers
/// must ignore files with this suffix.
pub const TMP_SUFFIX: &str = ".tmp";

/// Build a monotonically-ordered filename: `"<ms-epoch>-<6-hex>"`.
///
/// Lexicographic sort equals creation order across processes; the hex
/// suffix breaks ties between files created within the same millisecond.
#[must_use]
pub fn ordered_filename() -> String {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
    format!("{ms:013}-{suffix:06x}")
}

/// `true` if `path` is a temp file a watcher must ignore.
#[must_use]
pub fn is_tmp_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "tmp")
        || path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TMP_SUFFIX))
}

/// Atomically write `bytes` to `final_path`: write to `<final>.tmp`, then
/// rename. A reader observing `final_path` never sees a partial payload,
/// even under a crash between the write and the rename — the `.tmp` file
/// is simply left behind and ignored on the next sweep.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or the rename fails.
pub async fn atomic_write(final_path: &Path, bytes: &[u8]) -> FsResult<()> {
    let tmp_path = tmp_path_for(final_path);
    if let Some(parent) = final_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|source| FsError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, final_path)
        .await
        .map_err(|source| FsError::Io {
            path: final_path.to_path_buf(),
            source,
        })?;
    Ok(())
}

/// Serialize `value` as JSON and [`atomic_write`] it to `final_path`.
///
/// # Errors
///
/// Returns an error if serialization fails or the underlying write does.
pub async fn atomic_write_json<T: Serialize>(final_path: &Path, value: &T) -> FsResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(FsError::Serialize)?;
    atomic_write(final_path, &bytes).await
}

/// Write `value` under `dir` using an [`ordered_filename`], returning the
/// final path.
///
/// # Errors
///
/// Returns an error if serialization or the underlying write fails.
pub async fn append_ordered_json<T: Serialize>(dir: &Path, value: &T) -> FsResult<PathBuf> {
    let path = dir.join(format!("{}.json", ordered_filename()));
    atomic_write_json(&path, value).await?;
    Ok(path)
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(TMP_SUFFIX);
    final_path.with_file_name(name)
}

/// List JSON entries in `dir` in filename order, skipping temp files and any
/// name that doesn't parse as UTF-8. Missing directories yield an empty list.
///
/// # Errors
///
/// Returns an error if `dir` exists but cannot be read.
pub async fn list_ordered(dir: &Path) -> FsResult<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(FsError::Io {
                path: dir.to_path_buf(),
                source,
            });
        },
    };

    let mut paths = Vec::new();
    loop {
        let next = entries.next_entry().await.map_err(|source| FsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let Some(entry) = next else { break };
        let path = entry.path();
        if is_tmp_path(&path) {
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn atomic_write_never_leaves_a_dangling_tmp_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        atomic_write(&path, b"{}").await.unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn list_ordered_skips_tmp_files_and_sorts_by_name() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("002-aaaaaa.json"), b"{}")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("001-aaaaaa.json"), b"{}")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("000-bbbbbb.json.tmp"), b"{}")
            .await
            .unwrap();

        let listed = list_ordered(dir.path()).await.unwrap();
        let names: Vec<_> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["001-aaaaaa.json", "002-aaaaaa.json"]);
    }

    #[tokio::test]
    async fn list_ordered_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let listed = list_ordered(&missing).await.unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn ordered_filenames_sort_by_creation_order() {
        let a = ordered_filename();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = ordered_filename();
        assert!(a < b);
    }
}
