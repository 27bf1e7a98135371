//! Ruby version-manager detection.
//!
//! Locates an installed version manager (RVM or rbenv) from an environment
//! snapshot plus read-only filesystem probes, and enumerates its installed
//! interpreters. Detection has no side effects: the same snapshot and
//! filesystem state always produce the same [`Installation`]. A host with
//! no manager installed yields `None`, never an error.

pub mod cache;
pub mod patch;
pub mod rbenv;
pub mod rvm;

pub use cache::InstallationCache;
pub use patch::{patch, PatchError};

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::env::EnvSnapshot;

/// Directory names that count as installed interpreters.
///
/// Covers engine-prefixed names (`ruby-1.9.2-p290`, `jruby-1.6.4`, plain
/// `jruby`) as RVM lays them out under `rubies/`, and bare version numbers
/// (`3.1.2`) as rbenv lays them out under `versions/`. Anything else in
/// those directories (alias symlinks, cache dirs) is not an interpreter.
static INTERPRETER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:ruby|jruby|truffleruby|mruby|macruby|maglev|rbx|ree|ironruby)(?:-[\w.+]+)?|\d+(?:\.\d+){0,3}(?:-\w+)?)$",
    )
    .expect("interpreter name pattern is valid")
});

/// Which version manager an [`Installation`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerKind {
    Rvm,
    Rbenv,
}

impl ManagerKind {
    /// Name of the manager executable under `<root>/bin/`.
    pub fn executable_name(&self) -> &'static str {
        match self {
            ManagerKind::Rvm => "rvm-shell",
            ManagerKind::Rbenv => "rbenv",
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerKind::Rvm => write!(f, "RVM"),
            ManagerKind::Rbenv => write!(f, "rbenv"),
        }
    }
}

/// A detected, validated version-manager instance on the host.
///
/// Constructed only through detection, which guarantees the root exists and
/// contains the manager executable at detection time. Equality is by kind,
/// root and enumerated contents, so a cached instance can be compared
/// against a fresh detection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    kind: ManagerKind,
    root: PathBuf,
    interpreters: BTreeSet<String>,
    default_interpreter: Option<String>,
}

impl Installation {
    /// Validate `root` as a manager installation and enumerate it.
    ///
    /// Returns `None` unless `<root>/bin/<manager executable>` exists, so a
    /// stale environment hint can never surface as a broken installation.
    pub(crate) fn discover(kind: ManagerKind, root: PathBuf, env: &EnvSnapshot) -> Option<Self> {
        if !root.join("bin").join(kind.executable_name()).is_file() {
            return None;
        }
        let (interpreters, default_interpreter) = match kind {
            ManagerKind::Rvm => (
                rvm::installed_interpreters(&root),
                rvm::default_interpreter(&root),
            ),
            ManagerKind::Rbenv => (
                rbenv::installed_interpreters(&root),
                rbenv::default_interpreter(&root, env),
            ),
        };
        Some(Self {
            kind,
            root,
            interpreters,
            default_interpreter,
        })
    }

    pub fn kind(&self) -> ManagerKind {
        self.kind
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifiers of the installed interpreters, e.g. `ruby-1.9.2-p290`.
    pub fn interpreters(&self) -> &BTreeSet<String> {
        &self.interpreters
    }

    /// The manager's configured default interpreter, when one is set.
    pub fn default_interpreter(&self) -> Option<&str> {
        self.default_interpreter.as_deref()
    }

    pub fn has_interpreter(&self, name: &str) -> bool {
        self.interpreters.contains(name)
    }

    /// Absolute path of the manager executable (`bin/rvm-shell` or `bin/rbenv`).
    pub fn manager_executable(&self) -> PathBuf {
        self.root.join("bin").join(self.kind.executable_name())
    }
}

/// A chosen interpreter identifier plus an optional gemset name.
///
/// An empty selection defers the choice to the manager (per-project
/// `.rvmrc`/`.ruby-version` files, or the manager's global default). The
/// gemset is free-form; the version manager validates it at spawn time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpreterSelection {
    pub interpreter: Option<String>,
    pub gemset: Option<String>,
}

impl InterpreterSelection {
    pub fn interpreter(name: impl Into<String>) -> Self {
        Self {
            interpreter: Some(name.into()),
            gemset: None,
        }
    }

    pub fn with_gemset(mut self, gemset: impl Into<String>) -> Self {
        self.gemset = Some(gemset.into());
        self
    }

    /// The selected interpreter identifier, treating empty as unset.
    pub(crate) fn interpreter_id(&self) -> Option<&str> {
        self.interpreter.as_deref().filter(|id| !id.is_empty())
    }

    pub(crate) fn gemset_name(&self) -> Option<&str> {
        self.gemset.as_deref().filter(|g| !g.is_empty())
    }

    /// The `interpreter[@gemset]` string RVM's tooling understands.
    pub fn rvm_ruby_string(&self) -> Option<String> {
        let interpreter = self.interpreter_id()?;
        Some(match self.gemset_name() {
            Some(gemset) => format!("{interpreter}@{gemset}"),
            None => interpreter.to_string(),
        })
    }
}

/// Detect an installed version manager.
///
/// Explicit environment hints (`rvm_path`, then `RBENV_ROOT`) always win
/// over filesystem probing; among probes RVM is tried before rbenv.
pub fn detect(env: &EnvSnapshot) -> Option<Installation> {
    rvm::detect_from_hint(env)
        .or_else(|| rbenv::detect_from_hint(env))
        .or_else(|| rvm::probe(env))
        .or_else(|| rbenv::probe(env))
}

/// Home directory for candidate-root probing.
///
/// Prefers the snapshot's own `HOME` so detection stays deterministic under
/// test; falls back to the OS account database.
pub(crate) fn home_dir(env: &EnvSnapshot) -> Option<PathBuf> {
    env.get("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// Subdirectory names of `dir` that look like installed interpreters.
pub(crate) fn list_interpreter_dirs(dir: &Path) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return BTreeSet::new();
    };
    entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| INTERPRETER_NAME.is_match(name))
        .collect()
}
