//! Shell-script execution under RVM's `rvm-shell` wrapper.
//!
//! Produces a `.sh` script file and runs it. The script is materialized
//! inside the working directory because RVM resolves `.rvmrc` relative to
//! it. RVM required; Unix/Linux only.

use std::path::Path;
use std::sync::Arc;

use crate::env::EnvSnapshot;
use crate::error::Error;
use crate::manager::{patch, Installation, InterpreterSelection, ManagerKind};
use crate::script::materialize;
use crate::subprocess::builder::ProcessCommandBuilder;
use crate::subprocess::runner::{ProcessOutput, ProcessRunner};

pub struct RvmShellRunner {
    installation: Arc<Installation>,
    runner: Arc<dyn ProcessRunner>,
}

impl RvmShellRunner {
    /// Panics if handed a non-RVM installation; that is a caller bug, not a
    /// runtime condition.
    pub fn new(installation: Arc<Installation>, runner: Arc<dyn ProcessRunner>) -> Self {
        assert_eq!(
            installation.kind(),
            ManagerKind::Rvm,
            "RvmShellRunner requires an RVM installation"
        );
        Self {
            installation,
            runner,
        }
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    /// Run a shell script under `rvm-shell`.
    ///
    /// The script body is written to a temporary file in `working_directory`
    /// with a `#!<root>/bin/rvm-shell` shebang and executed there under the
    /// RVM-patched environment. With an explicit interpreter selection the
    /// script is passed to `rvm-shell <interpreter[@gemset]>` instead of
    /// relying on `.rvmrc` resolution. The script file is removed on every
    /// exit path.
    pub async fn run_script(
        &self,
        script: &str,
        working_directory: &Path,
        selection: &InterpreterSelection,
        base: &EnvSnapshot,
    ) -> Result<ProcessOutput, Error> {
        let env = patch(base, &self.installation, selection)?;
        let shell = self.installation.manager_executable();
        let mut script_file = materialize(working_directory, script, Some(&shell))?;

        let script_path = script_file.path().display().to_string();
        let builder = match selection.rvm_ruby_string() {
            Some(ruby_string) => ProcessCommandBuilder::new(&shell.display().to_string())
                .arg(&ruby_string)
                .arg(&script_path),
            None => ProcessCommandBuilder::new(&script_path),
        };
        let command = builder
            .current_dir(working_directory)
            .envs_from(&env)
            .build();

        let result = self.runner.run(command).await;
        if let Err(err) = script_file.release() {
            tracing::warn!("failed to remove rvm-shell script: {err}");
        }
        Ok(result?)
    }

    /// Run a command line through `rvm-shell` without a script file:
    /// `<root>/bin/rvm-shell [<interpreter[@gemset]>] -- <args...>`.
    pub async fn run_command(
        &self,
        working_directory: Option<&Path>,
        selection: &InterpreterSelection,
        base: &EnvSnapshot,
        args: &[String],
    ) -> Result<ProcessOutput, Error> {
        let env = patch(base, &self.installation, selection)?;
        let shell = self.installation.manager_executable();

        let mut builder = ProcessCommandBuilder::new(&shell.display().to_string());
        if let Some(ruby_string) = selection.rvm_ruby_string() {
            builder = builder.arg(&ruby_string);
        }
        builder = builder.arg("--").args(args.iter().map(String::as_str));
        if let Some(dir) = working_directory {
            builder = builder.current_dir(dir);
        }

        Ok(self.runner.run(builder.envs_from(&env).build()).await?)
    }
}
