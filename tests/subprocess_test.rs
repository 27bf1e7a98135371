//! Output-capture fidelity of the production process runner.

use rubyrun::subprocess::{ProcessCommandBuilder, ProcessError, SubprocessManager};

fn sh(script: &str) -> rubyrun::subprocess::ProcessCommand {
    ProcessCommandBuilder::new("/bin/sh")
        .arg("-c")
        .arg(script)
        .env("PATH", "/usr/bin:/bin")
        .build()
}

#[tokio::test]
async fn megabytes_on_both_streams_are_captured_without_truncation() {
    // 30 rounds of interleaved chunk writes: 3,000,000 bytes of 'x' on
    // stdout and 2,100,000 bytes of 'y' on stderr. Backpressure on either
    // pipe must never stall the drain of the other.
    let script = r#"
i=0
while [ $i -lt 30 ]; do
  head -c 100000 /dev/zero | tr '\0' x
  head -c 70000 /dev/zero | tr '\0' y 1>&2
  i=$((i+1))
done
"#;

    let output = SubprocessManager::production()
        .runner()
        .run(sh(script))
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout.len(), 3_000_000);
    assert_eq!(output.stderr.len(), 2_100_000);
    assert!(output.stdout.bytes().all(|b| b == b'x'));
    assert!(output.stderr.bytes().all(|b| b == b'y'));
}

#[tokio::test]
async fn per_stream_byte_order_is_preserved() {
    let output = SubprocessManager::production()
        .runner()
        .run(sh("printf 'first\\nsecond\\nthird\\n'; printf 'e1\\ne2\\n' 1>&2"))
        .await
        .unwrap();

    assert_eq!(output.stdout, "first\nsecond\nthird\n");
    assert_eq!(output.stderr, "e1\ne2\n");
}

#[tokio::test]
async fn spawning_a_nonexistent_executable_fails_fast_with_a_cause() {
    let command = ProcessCommandBuilder::new("/definitely/not/a/real/binary").build();

    let err = SubprocessManager::production()
        .runner()
        .run(command)
        .await
        .unwrap_err();

    match err {
        ProcessError::Spawn { command, source } => {
            assert!(command.contains("/definitely/not/a/real/binary"));
            assert!(!source.to_string().is_empty());
        }
        other => panic!("expected a spawn failure, got {other:?}"),
    }
}

#[tokio::test]
async fn exit_codes_round_trip_as_ordinary_data() {
    let runner = SubprocessManager::production();
    for code in [0, 1, 42] {
        let output = runner
            .runner()
            .run(sh(&format!("exit {code}")))
            .await
            .unwrap();
        assert_eq!(output.status.code(), Some(code));
    }
}
