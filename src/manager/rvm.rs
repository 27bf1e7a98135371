//! RVM installation probing.
//!
//! An RVM root is accepted only if it carries the `bin/rvm-shell` wrapper;
//! installed interpreters live under `<root>/rubies/`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::env::EnvSnapshot;

use super::{home_dir, list_interpreter_dirs, Installation, ManagerKind};

/// Environment variable RVM itself exports with its install root.
pub const RVM_PATH_VAR: &str = "rvm_path";

/// System-wide install location used by RVM's multi-user setup.
const SYSTEM_ROOT: &str = "/usr/local/rvm";

const RUBIES_DIR: &str = "rubies";
const ALIAS_FILE: &str = "config/alias";

/// Detect an RVM installation from the environment hint or well-known roots.
pub fn detect(env: &EnvSnapshot) -> Option<Installation> {
    detect_from_hint(env).or_else(|| probe(env))
}

/// Detection via the `rvm_path` environment variable.
///
/// A hint that does not validate (no `bin/rvm-shell` under it) is dropped
/// with a warning so probing can still run; it never yields a broken
/// installation.
pub(crate) fn detect_from_hint(env: &EnvSnapshot) -> Option<Installation> {
    let hint = env.get(RVM_PATH_VAR)?;
    let root = PathBuf::from(hint);
    match Installation::discover(ManagerKind::Rvm, root, env) {
        Some(installation) => {
            tracing::debug!(
                "RVM found via {} at {}",
                RVM_PATH_VAR,
                installation.root().display()
            );
            Some(installation)
        }
        None => {
            tracing::warn!(
                "{} points at '{}' but bin/rvm-shell is missing there; ignoring the hint",
                RVM_PATH_VAR,
                hint
            );
            None
        }
    }
}

/// Filesystem probing of the fixed candidate roots.
pub(crate) fn probe(env: &EnvSnapshot) -> Option<Installation> {
    let installation = candidate_roots(env)
        .into_iter()
        .find_map(|root| Installation::discover(ManagerKind::Rvm, root, env))?;
    tracing::debug!("RVM found by probing at {}", installation.root().display());
    Some(installation)
}

fn candidate_roots(env: &EnvSnapshot) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = home_dir(env) {
        roots.push(home.join(".rvm"));
    }
    roots.push(PathBuf::from(SYSTEM_ROOT));
    roots
}

pub(crate) fn installed_interpreters(root: &Path) -> std::collections::BTreeSet<String> {
    list_interpreter_dirs(&root.join(RUBIES_DIR))
}

/// The `default` alias from `<root>/config/alias`, when present.
pub(crate) fn default_interpreter(root: &Path) -> Option<String> {
    let contents = fs::read_to_string(root.join(ALIAS_FILE)).ok()?;
    contents
        .lines()
        .find_map(|line| line.trim().strip_prefix("default="))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
}
