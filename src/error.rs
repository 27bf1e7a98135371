//! Crate-level error type.
//!
//! Each stage of the pipeline (patching, script materialization, process
//! execution) carries its own error enum; this aggregate wraps them so a
//! caller always learns which stage failed and why. Absence of a version
//! manager is not an error and is reported as `None` from detection.

use crate::manager::PatchError;
use crate::script::ScriptError;
use crate::subprocess::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment patching failed: {0}")]
    Patch(#[from] PatchError),

    #[error("script materialization failed: {0}")]
    Script(#[from] ScriptError),

    #[error("process execution failed: {0}")]
    Process(#[from] ProcessError),
}

pub type Result<T> = std::result::Result<T, Error>;
