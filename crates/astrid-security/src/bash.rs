//! Bash gating sub-protocol (§4.D): a cheap local classification that lets
//! most shell commands skip IPC entirely, plus the taint-aware escalation
//! table for the ones that don't.

use astrid_core::Taints;

use crate::cop::{Cop, CopVerdict};

/// Result of classifying one shell command locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BashClass {
    /// Every pipeline segment resolves to a provably-local utility.
    Safe,
    /// At least one segment resolves to a network-capable tool.
    Network,
    /// A segment doesn't match either list — treated like `Network` for
    /// escalation purposes, but reported distinctly for audit.
    Unknown,
}

/// Leading tokens known to never touch the network.
const LOCAL_UTILITIES: &[&str] = &[
    "ls", "cd", "pwd", "cat", "echo", "grep", "sed", "awk", "cut", "sort", "uniq", "head", "tail", "wc", "mkdir",
    "rmdir", "rm", "cp", "mv", "touch", "chmod", "chown", "find", "xargs", "tr", "basename", "dirname", "date",
    "sleep", "true", "false", "test", "export", "unset", "source", "alias", "printf", "diff", "patch", "tar",
    "gzip", "gunzip", "zip", "unzip", "jq", "env",
];

/// Leading tokens, or multi-token patterns, that are network-capable.
const NETWORK_UTILITIES: &[&str] = &[
    "curl", "wget", "ssh", "scp", "rsync", "ftp", "sftp", "telnet", "nc", "netcat", "ping", "dig", "nslookup",
    "git", "pip", "pip3", "npm", "npx", "yarn", "pnpm", "cargo", "go", "docker", "kubectl", "aws", "gcloud", "az",
];

/// Multi-token patterns (leading-token matching alone would miss these —
/// e.g. `bash -c "curl ..."` has a local-looking leading token).
const NETWORK_PHRASES: &[&str] = &["bash -c", "sh -c", "pip install", "python -m pip", "eval "];

/// Classify `command` by splitting on pipeline separators and inspecting
/// each segment's leading token.
#[must_use]
pub fn classify(command: &str) -> BashClass {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return BashClass::Safe;
    }

    if NETWORK_PHRASES.iter().any(|phrase| trimmed.contains(phrase)) {
        return BashClass::Network;
    }

    let mut saw_unknown = false;
    for segment in split_pipeline(trimmed) {
        let Some(leading) = segment.split_whitespace().next() else {
            continue;
        };
        if NETWORK_UTILITIES.contains(&leading) {
            return BashClass::Network;
        }
        if !LOCAL_UTILITIES.contains(&leading) {
            saw_unknown = true;
        }
    }

    if saw_unknown { BashClass::Unknown } else { BashClass::Safe }
}

fn split_pipeline(command: &str) -> impl Iterator<Item = &str> {
    command.split(['|', ';', '&']).map(str::trim).filter(|s| !s.is_empty())
}

/// Apply the bash-specific escalation table to a command already classified
/// as [`BashClass::Network`] or [`BashClass::Unknown`], given the current
/// taint state. Returns `true` if the Cop should be consulted.
#[must_use]
pub fn needs_cop_review(class: BashClass, taints: Taints) -> bool {
    match class {
        BashClass::Safe => false,
        BashClass::Network => taints.corruption && !taints.secret,
        BashClass::Unknown => !taints.is_clean(),
    }
}

/// `true` if the taint state alone forces `needs_human` without consulting
/// the Cop (both taints set, command is network-capable).
#[must_use]
pub fn forces_needs_human(class: BashClass, taints: Taints) -> bool {
    matches!(class, BashClass::Network) && taints.corruption && taints.secret
}

/// Evaluate the full bash escalation path for a command already classified
/// as [`BashClass::Network`] or [`BashClass::Unknown`].
pub async fn evaluate_escalation<C: Cop>(class: BashClass, taints: Taints, cop: &C, summary: &str) -> BashVerdict {
    if taints.is_clean() {
        return BashVerdict::Allow;
    }
    if forces_needs_human(class, taints) {
        return BashVerdict::NeedsHuman;
    }
    if needs_cop_review(class, taints) {
        let verdict = match cop.classify(summary).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "cop backend failed during bash escalation, failing open");
                CopVerdict::clear()
            },
        };
        return if verdict.suspicious { BashVerdict::NeedsHuman } else { BashVerdict::Allow };
    }
    BashVerdict::Allow
}

/// Outcome of the bash escalation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BashVerdict {
    /// Execute the command.
    Allow,
    /// Create a `PendingApproval` and wait for the user.
    NeedsHuman,
}

#[cfg(test)]
mod tests {
    use crate::cop::NullCop;

    use super::*;

    #[test]
    fn ls_pipeline_is_safe() {
        assert_eq!(classify("ls -la | grep foo"), BashClass::Safe);
    }

    #[test]
    fn curl_is_network() {
        assert_eq!(classify("curl https://example.com"), BashClass::Network);
    }

    #[test]
    fn bash_dash_c_is_network_even_with_local_leading_token() {
        assert_eq!(classify(r#"bash -c "curl example.com""#), BashClass::Network);
    }

    #[test]
    fn unrecognized_leading_token_is_unknown() {
        assert_eq!(classify("frobnicate --loud"), BashClass::Unknown);
    }

    #[test]
    fn clean_gate_allows_network_commands() {
        assert!(!needs_cop_review(BashClass::Network, Taints::clean()));
    }

    #[test]
    fn corruption_only_plus_network_needs_cop() {
        let taints = Taints {
            corruption: true,
            secret: false,
        };
        assert!(needs_cop_review(BashClass::Network, taints));
        assert!(!forces_needs_human(BashClass::Network, taints));
    }

    #[test]
    fn both_taints_plus_network_forces_needs_human_without_cop() {
        let taints = Taints {
            corruption: true,
            secret: true,
        };
        assert!(forces_needs_human(BashClass::Network, taints));
    }

    #[test]
    fn unknown_under_any_taint_needs_cop() {
        let taints = Taints {
            corruption: false,
            secret: true,
        };
        assert!(needs_cop_review(BashClass::Unknown, taints));
    }

    #[tokio::test]
    async fn evaluate_escalation_clean_gate_allows() {
        let verdict = evaluate_escalation(BashClass::Network, Taints::clean(), &NullCop, "curl example.com").await;
        assert_eq!(verdict, BashVerdict::Allow);
    }

    #[tokio::test]
    async fn evaluate_escalation_both_taints_needs_human() {
        let taints = Taints {
            corruption: true,
            secret: true,
        };
        let verdict = evaluate_escalation(BashClass::Network, taints, &NullCop, "curl example.com").await;
        assert_eq!(verdict, BashVerdict::NeedsHuman);
    }
}
