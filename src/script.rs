//! Scoped temporary script files.
//!
//! Script-based invocation writes the script body to a uniquely named file
//! inside a caller-chosen directory. The directory matters: RVM resolves
//! `.rvmrc` relative to where the script lives, so an `rvm-shell` script
//! must be materialized inside the build's working directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to materialize script file in {dir}: {source}")]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A temporary script file that is deleted when released or dropped.
///
/// Owned by the invocation that created it; the file disappears on every
/// exit path of that invocation, whether through [`ScriptFile::release`] or
/// through `Drop` during unwinding.
#[derive(Debug)]
pub struct ScriptFile {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl ScriptFile {
    /// Absolute path of the materialized script.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now instead of waiting for `Drop`.
    ///
    /// Idempotent: releasing an already-released handle is a no-op.
    pub fn release(&mut self) -> Result<(), ScriptError> {
        if let Some(temp) = self.temp.take() {
            let dir = self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            temp.close()
                .map_err(|source| ScriptError::Io { dir, source })?;
        }
        Ok(())
    }
}

/// Write `body` to a uniquely named file inside `dir`.
///
/// When `shebang` names an interpreter, the file starts with `#!<path>` and
/// is made executable for owner, group and other, since it will be invoked
/// directly. Without a shebang the body is written verbatim and the file
/// stays non-executable (it will be passed as an interpreter argument).
///
/// On any creation or write failure the partially written file is removed
/// before the error is returned.
pub fn materialize(
    dir: &Path,
    body: &str,
    shebang: Option<&Path>,
) -> Result<ScriptFile, ScriptError> {
    let build = || -> std::io::Result<NamedTempFile> {
        let mut temp = tempfile::Builder::new()
            .prefix("rubyrun")
            .suffix(if shebang.is_some() { ".sh" } else { ".rb" })
            .tempfile_in(dir)?;

        let file = temp.as_file_mut();
        if let Some(interpreter) = shebang {
            writeln!(file, "#!{}", interpreter.display())?;
        }
        file.write_all(body.as_bytes())?;
        file.flush()?;

        #[cfg(unix)]
        if shebang.is_some() {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = file.metadata()?.permissions();
            permissions.set_mode(0o755);
            file.set_permissions(permissions)?;
        }

        Ok(temp)
    };

    // A NamedTempFile dropped on the error path deletes itself, so no
    // partial file survives a failed write.
    let temp = build().map_err(|source| ScriptError::Io {
        dir: dir.to_path_buf(),
        source,
    })?;
    let path = temp
        .path()
        .canonicalize()
        .unwrap_or_else(|_| temp.path().to_path_buf());

    tracing::trace!("materialized script at {}", path.display());
    Ok(ScriptFile {
        path,
        temp: Some(temp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode()
    }

    #[test]
    fn body_is_written_verbatim_without_shebang() {
        let dir = tempfile::tempdir().unwrap();
        let script = materialize(dir.path(), "puts 'hello'\n", None).unwrap();

        let contents = fs::read_to_string(script.path()).unwrap();
        assert_eq!(contents, "puts 'hello'\n");
        #[cfg(unix)]
        assert_eq!(mode_of(script.path()) & 0o111, 0);
    }

    #[test]
    fn shebang_prefixes_body_and_sets_execute_bits() {
        let dir = tempfile::tempdir().unwrap();
        let script = materialize(
            dir.path(),
            "echo hello\n",
            Some(Path::new("/opt/rvm/bin/rvm-shell")),
        )
        .unwrap();

        let contents = fs::read_to_string(script.path()).unwrap();
        assert_eq!(contents, "#!/opt/rvm/bin/rvm-shell\necho hello\n");
        #[cfg(unix)]
        assert_eq!(mode_of(script.path()) & 0o111, 0o111);
    }

    #[test]
    fn file_lives_inside_the_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let script = materialize(dir.path(), "echo hi\n", None).unwrap();
        assert_eq!(
            script.path().parent().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn release_deletes_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut script = materialize(dir.path(), "echo hi\n", None).unwrap();
        let path = script.path().to_path_buf();
        assert!(path.exists());

        script.release().unwrap();
        assert!(!path.exists());
        script.release().unwrap();
    }

    #[test]
    fn drop_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let script = materialize(dir.path(), "echo hi\n", None).unwrap();
            script.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn missing_directory_surfaces_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = materialize(&missing, "echo hi\n", None).unwrap_err();
        let ScriptError::Io { dir: failed_dir, .. } = err;
        assert_eq!(failed_dir, missing);
    }
}
