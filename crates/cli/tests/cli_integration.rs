// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn write_temp_file(prefix: &str, contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push("wirebench-tests");
    let _ = std::fs::create_dir_all(&dir);

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = dir.join(format!("{}-{}.yaml", prefix, nonce));
    std::fs::write(&path, contents).expect("Failed to write temp file");
    path
}

fn wirebench() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wirebench"))
}

#[test]
fn test_default_scenario_passes() {
    let output = wirebench().output().expect("Failed to execute wirebench");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Errors : 0"),
        "Report line not found. Stdout: {}",
        stdout
    );
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_scenario_file_is_honored() {
    let scenario = write_temp_file(
        "short",
        "payload_len: 32\nslot_pairs:\n  - source: \"0x000\"\n    dest: \"0x400\"\ntick_budget: 1000\nsettle_ticks: 5\n",
    );
    let output = wirebench()
        .args(["--scenario", scenario.to_str().unwrap()])
        .output()
        .expect("Failed to execute wirebench");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Errors : 0"), "Stdout: {}", stdout);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_bad_scenario_address_is_config_error() {
    let scenario = write_temp_file(
        "bad-addr",
        "slot_pairs:\n  - source: \"0xzz\"\n    dest: \"0x400\"\n",
    );
    let output = wirebench()
        .args(["--scenario", scenario.to_str().unwrap()])
        .output()
        .expect("Failed to execute wirebench");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_exhausted_tick_budget_is_runtime_error() {
    let output = wirebench()
        .args(["--tick-budget", "10"])
        .output()
        .expect("Failed to execute wirebench");
    assert_eq!(output.status.code(), Some(3));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("bus acknowledge"),
        "Timeout should name the suspension point. Stdout: {}",
        stdout
    );
}

#[test]
fn test_vcd_dump_is_written() {
    let mut vcd_path = std::env::temp_dir();
    vcd_path.push("wirebench-tests");
    let _ = std::fs::create_dir_all(&vcd_path);
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    vcd_path.push(format!("trace-{}.vcd", nonce));

    let output = wirebench()
        .args(["--vcd", vcd_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute wirebench");
    assert_eq!(output.status.code(), Some(0));

    let vcd = std::fs::read_to_string(&vcd_path).expect("VCD file missing");
    assert!(vcd.contains("$timescale"));
    assert!(vcd.contains("cyc"));
    assert!(vcd.contains("done_pending"));
    std::fs::remove_file(&vcd_path).ok();
}
