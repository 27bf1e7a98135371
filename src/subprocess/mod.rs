//! Unified subprocess abstraction layer.
//!
//! A [`ProcessRunner`] trait object sits between domain runners and the
//! operating system so tests can substitute [`MockProcessRunner`] without
//! touching production call sites.

pub mod builder;
pub mod error;
pub mod mock;
pub mod ruby;
pub mod runner;
pub mod rvm_shell;

pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use ruby::RubyScriptRunner;
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use rvm_shell::RvmShellRunner;

use std::sync::Arc;

use crate::manager::Installation;

#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(TokioProcessRunner))
    }

    #[cfg(test)]
    pub fn mock() -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        let runner = Arc::new(mock.clone()) as Arc<dyn ProcessRunner>;
        (Self::new(runner), mock)
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    pub fn ruby(&self) -> RubyScriptRunner {
        RubyScriptRunner::new(Arc::clone(&self.runner))
    }

    pub fn rvm_shell(&self, installation: Arc<Installation>) -> RvmShellRunner {
        RvmShellRunner::new(installation, Arc::clone(&self.runner))
    }
}
