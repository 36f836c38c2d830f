use std::process::Command;



fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tokio_fanout"));
    cmd.env("RUST_LOG", "info");
    cmd
}


#[test]
fn failure_is_reported_once_with_nonzero_status() {
    let output = binary().args(["--workers", "0"]).output().unwrap();

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("pipeline must at-least have 1 worker").count(), 1, "{stderr}");
}

#[test]
fn untruncated_run_prints_report_and_succeeds() {
    let output = binary()
        .args(["--len", "10", "--workers", "3", "--deadline-us", "60000000"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("count: input 10 output 10"), "{stdout}");
    assert!(stdout.contains("sum: input 45 output 45"), "{stdout}");
    assert!(stdout.contains("per-worker counts: ["), "{stdout}");
}
