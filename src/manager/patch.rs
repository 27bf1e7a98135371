//! Environment deltas that reproduce a version-manager shell.
//!
//! Given an installation and an interpreter selection, computes the new
//! snapshot a child process needs so that gems and binaries resolve the way
//! the manager would resolve them. Pure: the base snapshot is untouched and
//! the same inputs always produce the same output.

use std::path::{Path, PathBuf};

use crate::env::EnvSnapshot;

use super::{rbenv, rvm, Installation, InterpreterSelection, ManagerKind};

/// RVM honors per-project `.rvmrc` files without prompting when this is set.
const RVM_TRUST_RVMRCS_VAR: &str = "rvm_trust_rvmrcs_flag";

const PATH_VAR: &str = "PATH";

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("interpreter '{interpreter}' is not installed in the {kind} installation at {root}")]
    InvalidSelection {
        interpreter: String,
        kind: ManagerKind,
        root: PathBuf,
    },
}

/// Compute the environment a child process needs to behave as if launched
/// inside `installation`'s shell with `selection` active.
///
/// A selected interpreter must be a member of the installation's set; the
/// patcher never substitutes a different one. A gemset selected under rbenv
/// (which has no gemset concept) is ignored with a warning.
pub fn patch(
    base: &EnvSnapshot,
    installation: &Installation,
    selection: &InterpreterSelection,
) -> Result<EnvSnapshot, PatchError> {
    if let Some(interpreter) = selection.interpreter_id() {
        if !installation.has_interpreter(interpreter) {
            return Err(PatchError::InvalidSelection {
                interpreter: interpreter.to_string(),
                kind: installation.kind(),
                root: installation.root().to_path_buf(),
            });
        }
    }

    Ok(match installation.kind() {
        ManagerKind::Rvm => patch_rvm(base, installation),
        ManagerKind::Rbenv => patch_rbenv(base, installation, selection),
    })
}

/// RVM deltas: advertise the root and trust project `.rvmrc` files.
///
/// `PATH` is deliberately left alone; the `rvm-shell` wrapper invoked at
/// spawn time performs its own PATH resolution, and interpreter/gemset
/// choice travels as a `rvm-shell` argument rather than a variable.
fn patch_rvm(base: &EnvSnapshot, installation: &Installation) -> EnvSnapshot {
    base.merged([
        (
            rvm::RVM_PATH_VAR.to_string(),
            installation.root().display().to_string(),
        ),
        (RVM_TRUST_RVMRCS_VAR.to_string(), "1".to_string()),
    ])
}

/// rbenv deltas: root, selected version, and the shims directory at the
/// front of `PATH` so shim executables win over system ones.
fn patch_rbenv(
    base: &EnvSnapshot,
    installation: &Installation,
    selection: &InterpreterSelection,
) -> EnvSnapshot {
    if let Some(gemset) = selection.gemset_name() {
        tracing::warn!(
            "rbenv has no gemset support; ignoring requested gemset '{}'",
            gemset
        );
    }

    let mut overrides = vec![(
        rbenv::RBENV_ROOT_VAR.to_string(),
        installation.root().display().to_string(),
    )];
    if let Some(interpreter) = selection.interpreter_id() {
        overrides.push((rbenv::RBENV_VERSION_VAR.to_string(), interpreter.to_string()));
    }
    overrides.push((
        PATH_VAR.to_string(),
        prepend_path(&installation.root().join("shims"), base.get(PATH_VAR)),
    ));

    base.merged(overrides)
}

fn prepend_path(dir: &Path, existing: Option<&str>) -> String {
    match existing.filter(|path| !path.is_empty()) {
        Some(existing) => {
            let entries =
                std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(existing));
            match std::env::join_paths(entries) {
                Ok(joined) => joined.to_string_lossy().into_owned(),
                Err(_) => format!("{}:{}", dir.display(), existing),
            }
        }
        None => dir.display().to_string(),
    }
}
