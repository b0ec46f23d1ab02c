//! Folder-slug derivation and path-escape checks (§3: `Workspace.folder`).
//!
//! A workspace's folder is used as a single path component under the data
//! root (`ipc/<folder>/`, audit logs, etc). It may be chosen by an admin
//! command or derived from a channel-group's display name — either way it
//! must never be allowed to escape that single component.

use astrid_core::WorkspaceFolder;

use crate::error::{WorkspaceError, WorkspaceResult};

/// Derive a filesystem-safe slug from a display name: lowercase, spaces to
/// `-`, anything outside `[a-z0-9-_]` dropped.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() { "workspace".to_string() } else { trimmed.to_string() }
}

/// Validate that `folder` is safe to use as a single path component: no
/// separators, no `.`/`..`, not empty.
///
/// # Errors
///
/// Returns [`WorkspaceError::EmptyFolder`] or [`WorkspaceError::UnsafeFolder`].
pub fn validate_folder(folder: &WorkspaceFolder) -> WorkspaceResult<()> {
    let raw = folder.0.as_str();
    if raw.is_empty() {
        return Err(WorkspaceError::EmptyFolder);
    }
    if raw == "." || raw == ".." || raw.contains('/') || raw.contains('\\') || raw.contains('\0') {
        return Err(WorkspaceError::UnsafeFolder(raw.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normalizes_display_names() {
        assert_eq!(slugify("Team Standup!"), "team-standup");
        assert_eq!(slugify("  leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("已經"), "workspace");
    }

    #[test]
    fn validate_folder_rejects_traversal() {
        assert!(validate_folder(&WorkspaceFolder("..".to_string())).is_err());
        assert!(validate_folder(&WorkspaceFolder("a/../b".to_string())).is_err());
        assert!(validate_folder(&WorkspaceFolder("a/b".to_string())).is_err());
        assert!(validate_folder(&WorkspaceFolder(String::new())).is_err());
    }

    #[test]
    fn validate_folder_accepts_plain_slugs() {
        assert!(validate_folder(&WorkspaceFolder("team-standup".to_string())).is_ok());
    }
}
