#![allow(dead_code)]

//! Shared fixtures: fake version-manager roots on a real filesystem.

use rubyrun::env::EnvSnapshot;
use std::fs;
use std::path::Path;

/// Route crate logs into the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn snapshot(pairs: &[(&str, &str)]) -> EnvSnapshot {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Write `contents` to `path` and mark it executable for all.
pub fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Lay out an RVM installation: `bin/rvm-shell` plus `rubies/<name>` dirs.
///
/// The stub shell prints the `rvm_path` it received and then hands the
/// script over to `/bin/sh`, which is enough to observe both the patched
/// environment and the script body's own output.
pub fn fake_rvm_root(root: &Path, interpreters: &[&str]) {
    fake_rvm_root_with_shell(
        root,
        interpreters,
        "#!/bin/sh\necho \"rvm_path=$rvm_path\"\nexec /bin/sh \"$@\"\n",
    );
}

pub fn fake_rvm_root_with_shell(root: &Path, interpreters: &[&str], shell_script: &str) {
    fs::create_dir_all(root.join("bin")).unwrap();
    write_executable(&root.join("bin/rvm-shell"), shell_script);
    for interpreter in interpreters {
        fs::create_dir_all(root.join("rubies").join(interpreter)).unwrap();
    }
}

/// Lay out an rbenv installation: `bin/rbenv` plus `versions/<name>` dirs.
pub fn fake_rbenv_root(root: &Path, versions: &[&str]) {
    fs::create_dir_all(root.join("bin")).unwrap();
    write_executable(&root.join("bin/rbenv"), "#!/bin/sh\nexit 0\n");
    for version in versions {
        fs::create_dir_all(root.join("versions").join(version)).unwrap();
    }
}
