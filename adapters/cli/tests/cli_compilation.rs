use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "spawn-balance"])
        .status()
        .expect("failed to invoke cargo check for spawn-balance CLI binary");

    assert!(status.success(), "cargo check --bin spawn-balance should succeed");
}

#[test]
fn cli_prints_json_report() {
    let output = Command::new(env!("CARGO_BIN_EXE_spawn-balance"))
        .args(["--spawns", "30", "--seed", "7", "--json", "--log-level", "off"])
        .output()
        .expect("failed to run spawn-balance");

    assert!(
        output.status.success(),
        "spawn-balance exited with {:?}",
        output.status
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds a JSON report");
    assert_eq!(report["stats"]["total_spawns"], 20);

    let spawned = &report["spawned"];
    let total = spawned["energy"].as_u64().expect("energy count")
        + spawned["combat"].as_u64().expect("combat count");
    assert_eq!(total, 30);
}
