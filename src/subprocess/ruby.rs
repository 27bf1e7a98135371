//! Ruby script execution from in-memory source.
//!
//! Writes the source to a temporary `.rb` file and invokes the interpreter
//! on it. The caller supplies the already-patched environment, so the same
//! entry point serves bare interpreters, rbenv shims and RVM wrappers.

use std::path::Path;
use std::sync::Arc;

use crate::env::EnvSnapshot;
use crate::error::Error;
use crate::script::materialize;
use crate::subprocess::builder::ProcessCommandBuilder;
use crate::subprocess::runner::{ProcessOutput, ProcessRunner};

pub struct RubyScriptRunner {
    runner: Arc<dyn ProcessRunner>,
}

impl RubyScriptRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Run `source` under `interpreter`.
    ///
    /// The argv is `<interpreter> <interpreter_args...> <script> <script_args...>`,
    /// matching how a user would invoke `ruby -w script.rb arg`. The
    /// temporary script file is removed on every exit path.
    pub async fn run_script_source(
        &self,
        interpreter: &Path,
        interpreter_args: &[String],
        source: &str,
        script_args: &[String],
        env: &EnvSnapshot,
        working_directory: Option<&Path>,
    ) -> Result<ProcessOutput, Error> {
        let mut script_file = materialize(&std::env::temp_dir(), source, None)?;

        let mut builder = ProcessCommandBuilder::new(&interpreter.display().to_string())
            .args(interpreter_args.iter().map(String::as_str))
            .arg(&script_file.path().display().to_string())
            .args(script_args.iter().map(String::as_str));
        if let Some(dir) = working_directory {
            builder = builder.current_dir(dir);
        }

        let result = self.runner.run(builder.envs_from(env).build()).await;
        if let Err(err) = script_file.release() {
            tracing::warn!("failed to remove ruby script: {err}");
        }
        Ok(result?)
    }
}
