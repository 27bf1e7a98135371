//! rbenv installation probing.
//!
//! An rbenv root is accepted only if it carries the `bin/rbenv` executable;
//! installed interpreters live under `<root>/versions/`. Unlike RVM there is
//! no shell wrapper: selection happens through `RBENV_VERSION` and the shims
//! directory on `PATH`.

use std::path::{Path, PathBuf};

use crate::env::EnvSnapshot;

use super::{home_dir, list_interpreter_dirs, Installation, ManagerKind};

/// Environment variable naming the rbenv install root.
pub const RBENV_ROOT_VAR: &str = "RBENV_ROOT";

/// Environment variable naming the interpreter rbenv should resolve to.
pub const RBENV_VERSION_VAR: &str = "RBENV_VERSION";

const VERSIONS_DIR: &str = "versions";
const VERSION_FILE: &str = "version";

/// Detect an rbenv installation from the environment hint, the home
/// directory, or the `rbenv` executable on the snapshot's `PATH`.
pub fn detect(env: &EnvSnapshot) -> Option<Installation> {
    detect_from_hint(env).or_else(|| probe(env))
}

/// Detection via the `RBENV_ROOT` environment variable.
///
/// Same policy as the RVM hint: an invalid hint is logged and dropped, and
/// probing still gets its chance.
pub(crate) fn detect_from_hint(env: &EnvSnapshot) -> Option<Installation> {
    let hint = env.get(RBENV_ROOT_VAR)?;
    let root = PathBuf::from(hint);
    match Installation::discover(ManagerKind::Rbenv, root, env) {
        Some(installation) => {
            tracing::debug!(
                "rbenv found via {} at {}",
                RBENV_ROOT_VAR,
                installation.root().display()
            );
            Some(installation)
        }
        None => {
            tracing::warn!(
                "{} points at '{}' but bin/rbenv is missing there; ignoring the hint",
                RBENV_ROOT_VAR,
                hint
            );
            None
        }
    }
}

/// Filesystem probing: `$HOME/.rbenv` first, then the root derived from a
/// PATH-resolved `rbenv` executable.
pub(crate) fn probe(env: &EnvSnapshot) -> Option<Installation> {
    let installation = candidate_roots(env)
        .into_iter()
        .find_map(|root| Installation::discover(ManagerKind::Rbenv, root, env))?;
    tracing::debug!(
        "rbenv found by probing at {}",
        installation.root().display()
    );
    Some(installation)
}

fn candidate_roots(env: &EnvSnapshot) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = home_dir(env) {
        roots.push(home.join(".rbenv"));
    }
    if let Some(root) = path_resolved_root(env) {
        roots.push(root);
    }
    roots
}

/// Root of the installation owning the `rbenv` executable on the
/// snapshot's `PATH`: the executable sits at `<root>/bin/rbenv`.
fn path_resolved_root(env: &EnvSnapshot) -> Option<PathBuf> {
    let path_var = env.get("PATH")?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let executable = which::which_in("rbenv", Some(path_var), cwd).ok()?;
    let executable = executable.canonicalize().unwrap_or(executable);
    let bin_dir = executable.parent()?;
    bin_dir.parent().map(Path::to_path_buf)
}

pub(crate) fn installed_interpreters(root: &Path) -> std::collections::BTreeSet<String> {
    list_interpreter_dirs(&root.join(VERSIONS_DIR))
}

/// The interpreter rbenv would currently resolve to: `RBENV_VERSION` from
/// the snapshot wins, then the global `<root>/version` file.
pub(crate) fn default_interpreter(root: &Path, env: &EnvSnapshot) -> Option<String> {
    if let Some(version) = env.get(RBENV_VERSION_VAR).filter(|v| !v.is_empty()) {
        return Some(version.to_string());
    }
    let contents = std::fs::read_to_string(root.join(VERSION_FILE)).ok()?;
    let version = contents.lines().next()?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_interpreter_prefers_env_over_version_file() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join(VERSION_FILE), "3.1.2\n").unwrap();

        let env: EnvSnapshot = [(RBENV_VERSION_VAR.to_string(), "2.7.6".to_string())]
            .into_iter()
            .collect();
        assert_eq!(
            default_interpreter(root.path(), &env).as_deref(),
            Some("2.7.6")
        );

        assert_eq!(
            default_interpreter(root.path(), &EnvSnapshot::empty()).as_deref(),
            Some("3.1.2")
        );
    }

    #[test]
    fn default_interpreter_absent_without_either_source() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(default_interpreter(root.path(), &EnvSnapshot::empty()), None);
    }
}
