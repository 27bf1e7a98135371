//! End-to-end flows: detect, patch, materialize and run against fake
//! installations whose manager executables are observable stubs.

mod common;

use common::{fake_rbenv_root, fake_rvm_root, fake_rvm_root_with_shell, snapshot};
use rubyrun::env::EnvSnapshot;
use rubyrun::manager::{detect, patch, InterpreterSelection};
use rubyrun::subprocess::{ProcessCommandBuilder, SubprocessManager};
use rubyrun::Error;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn base_env(home: &TempDir) -> EnvSnapshot {
    snapshot(&[
        ("HOME", &home.path().display().to_string()),
        ("PATH", "/usr/bin:/bin"),
    ])
}

#[tokio::test]
async fn rvm_script_run_sees_patched_env_and_script_output() {
    common::init_tracing();
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    fake_rvm_root(root.path(), &["ruby-3.1.2"]);

    let base = base_env(&home).with_var("rvm_path", root.path().display().to_string());
    let installation = detect(&base).expect("fake RVM should be detected");

    let subprocess = SubprocessManager::production();
    let shell = subprocess.rvm_shell(Arc::new(installation));
    let output = shell
        .run_script(
            "echo hello",
            workdir.path(),
            &InterpreterSelection::default(),
            &base,
        )
        .await
        .unwrap();

    assert!(output.status.success(), "stderr: {}", output.stderr);
    let expected_rvm_path = format!("rvm_path={}", root.path().display());
    assert!(
        output.stdout.contains(&expected_rvm_path),
        "stdout should carry the injected rvm_path, got: {}",
        output.stdout
    );
    assert!(output.stdout.contains("hello"));

    // The materialized script is gone once the call returns.
    let leftovers: Vec<_> = std::fs::read_dir(workdir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "script file leaked: {leftovers:?}");
}

#[tokio::test]
async fn rvm_command_run_passes_selection_to_the_shell() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fake_rvm_root_with_shell(
        root.path(),
        &["ruby-3.1.2"],
        "#!/bin/sh\necho \"rvm_path=$rvm_path\"\necho \"argv:$*\"\n",
    );

    let base = base_env(&home).with_var("rvm_path", root.path().display().to_string());
    let installation = detect(&base).unwrap();

    let shell = SubprocessManager::production().rvm_shell(Arc::new(installation));
    let selection = InterpreterSelection::interpreter("ruby-3.1.2").with_gemset("dev");
    let output = shell
        .run_command(
            None,
            &selection,
            &base,
            &["echo".to_string(), "hi".to_string()],
        )
        .await
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.contains("argv:ruby-3.1.2@dev -- echo hi"));
}

#[tokio::test]
async fn rbenv_round_trip_exposes_selected_version_to_the_child() {
    common::init_tracing();
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fake_rbenv_root(root.path(), &["3.1.2"]);

    let base = base_env(&home).with_var("RBENV_ROOT", root.path().display().to_string());
    let installation = detect(&base).unwrap();

    let patched = patch(&base, &installation, &InterpreterSelection::interpreter("3.1.2")).unwrap();

    // The child observes exactly what the patcher computed.
    let command = ProcessCommandBuilder::new("/bin/sh")
        .arg("-c")
        .arg("printf '%s' \"$RBENV_VERSION\"; printf ':%s' \"$PATH\"")
        .envs_from(&patched)
        .build();
    let output = SubprocessManager::production()
        .runner()
        .run(command)
        .await
        .unwrap();

    let shims = root.path().join("shims").display().to_string();
    assert!(output.stdout.starts_with("3.1.2:"));
    assert!(
        output.stdout.contains(&shims),
        "PATH should lead with the shims dir, got: {}",
        output.stdout
    );
}

#[tokio::test]
async fn ruby_script_runner_executes_materialized_source() {
    let home = TempDir::new().unwrap();
    let base = base_env(&home);

    // /bin/sh stands in for a Ruby interpreter: the runner's contract is
    // interpreter-agnostic argv assembly, not Ruby syntax.
    let output = SubprocessManager::production()
        .ruby()
        .run_script_source(
            Path::new("/bin/sh"),
            &[],
            "echo from-script \"$1\"",
            &["arg-one".to_string()],
            &base,
            None,
        )
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, "from-script arg-one\n");
}

#[tokio::test]
async fn unknown_interpreter_selection_surfaces_invalid_selection() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    fake_rvm_root(root.path(), &["ruby-3.1.2"]);

    let base = base_env(&home).with_var("rvm_path", root.path().display().to_string());
    let installation = detect(&base).unwrap();

    let shell = SubprocessManager::production().rvm_shell(Arc::new(installation));
    let err = shell
        .run_script(
            "echo never-runs",
            workdir.path(),
            &InterpreterSelection::interpreter("ruby-0.0.0"),
            &base,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Patch(_)));
    let message = err.to_string();
    assert!(message.contains("ruby-0.0.0"));
    assert!(message.contains("not installed"));
}
