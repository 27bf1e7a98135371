//! # rubyrun
//!
//! Detects installed Ruby version managers (RVM, rbenv) on a build host,
//! resolves which interpreter and gemset a build should use, constructs a
//! patched process environment, and executes Ruby scripts or shell commands
//! under that environment while capturing their output.
//!
//! The crate is a library only: build-server lifecycle dispatch, parameter
//! persistence and CLI wiring belong to the caller.
//!
//! ## Modules
//!
//! - `env` - Immutable snapshots of a process environment
//! - `manager` - RVM/rbenv detection, installation cache, environment patching
//! - `script` - Scoped temporary script files with guaranteed cleanup
//! - `subprocess` - Unified subprocess abstraction layer for testing
//!
//! ## Typical flow
//!
//! ```no_run
//! use rubyrun::env::EnvSnapshot;
//! use rubyrun::manager::{self, InterpreterSelection};
//! use rubyrun::subprocess::{RvmShellRunner, SubprocessManager};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn demo() -> rubyrun::Result<()> {
//! let base = EnvSnapshot::current();
//! let installation = manager::detect(&base).expect("no Ruby version manager installed");
//! let subprocess = SubprocessManager::production();
//! let shell = RvmShellRunner::new(Arc::new(installation), subprocess.runner());
//! let output = shell
//!     .run_script(
//!         "gem list",
//!         Path::new("/home/builder/project"),
//!         &InterpreterSelection::default(),
//!         &base,
//!     )
//!     .await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod error;
pub mod manager;
pub mod script;
pub mod subprocess;

pub use env::EnvSnapshot;
pub use error::{Error, Result};
pub use manager::{
    detect, patch, Installation, InstallationCache, InterpreterSelection, ManagerKind, PatchError,
};
pub use script::{materialize, ScriptError, ScriptFile};
pub use subprocess::{
    ProcessCommand, ProcessCommandBuilder, ProcessError, ProcessOutput, ProcessRunner,
    SubprocessManager,
};
