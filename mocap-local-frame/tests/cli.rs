use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

const MARKERS: usize = 29;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn indices() -> NamedTempFile {
    config_file("[Indexies]\nLeftAsis=0\nRightAsis=1\nVSacral=2\n")
}

fn world_row(offset: f64) -> String {
    let mut values = Vec::with_capacity(MARKERS * 3);
    values.extend([1.0 + offset, 0.0, 1.0]);
    values.extend([-1.0 + offset, 0.0, 1.0]);
    values.extend([offset, -1.0, 1.1]);
    for i in 3..MARKERS {
        let i = i as f64;
        values.extend([0.1 * i + offset, -0.05 * i, 0.02 * i]);
    }
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn run(args: &[&str], stdin: String) -> std::process::Output {
    Command::cargo_bin("mocap-local-frame")
        .unwrap()
        .args(args)
        .write_stdin(stdin)
        .output()
        .unwrap()
}

#[test]
fn forward_and_inverse_runs_round_trip() {
    let config = indices();
    let config_path = config.path().to_str().unwrap();
    let input = format!("header\n{}\n{}\n", world_row(0.0), world_row(0.5));

    let forward = run(&["--config", config_path], input.clone());
    assert!(forward.status.success());
    let local = String::from_utf8(forward.stdout).unwrap();
    assert_eq!(local.lines().count(), 2);

    let inverse = run(
        &["--config", config_path, "--inverse", "--header", "false"],
        local,
    );
    assert!(inverse.status.success());
    let world = String::from_utf8(inverse.stdout).unwrap();

    for (restored, original) in world.lines().zip(input.lines().skip(1)) {
        for (a, b) in restored.split(',').zip(original.split(',')) {
            let (a, b): (f64, f64) = (a.parse().unwrap(), b.parse().unwrap());
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    let config = indices();
    let config_path = config.path().to_str().unwrap();
    let input = format!("header\n{}\n", world_row(0.25));

    let first = run(&["--config", config_path], input.clone());
    let second = run(&["--config", config_path, "--batch-size", "8"], input);

    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn missing_key_is_a_configuration_error() {
    let config = config_file("[Indexies]\nLeftAsis=0\nRightAsis=1\n");
    let output = run(&["--config", config.path().to_str().unwrap()], String::new());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid marker index format"), "{stderr}");
    assert!(stderr.contains("VSacral"), "{stderr}");
}

#[test]
fn malformed_file_is_a_distinct_configuration_error() {
    let config = config_file("[Indexies\nLeftAsis=0\n");
    let output = run(&["--config", config.path().to_str().unwrap()], String::new());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid marker index file"), "{stderr}");
}

#[test]
fn short_record_fails_the_run_when_asked() {
    let config = indices();
    let output = run(
        &[
            "--config",
            config.path().to_str().unwrap(),
            "--header",
            "false",
            "--short-records",
            "fail",
        ],
        "1,2,3\n".to_string(),
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("line 1"), "{stderr}");
}

#[test]
fn missing_markers_still_exit_zero() {
    let config = indices();
    let row = world_row(0.0);
    let mut fields: Vec<&str> = row.split(',').collect();
    fields[9] = "";
    let row = fields.join(",");
    let output = run(
        &["--config", config.path().to_str().unwrap(), "--header", "false"],
        format!("{row}\n"),
    );

    assert!(output.status.success());
    let local = String::from_utf8(output.stdout).unwrap();
    let fields: Vec<&str> = local.trim_end().split(',').collect();
    assert_eq!(fields.len(), 94);
    assert!(fields[9..12].iter().all(|f| f.is_empty()));
}

#[test]
fn oversized_batch_size_streams_like_batch_one() {
    let config = indices();
    let config_path = config.path().to_str().unwrap();
    let input = format!("header\n{}\n{}\n", world_row(0.0), world_row(0.3));

    let sequential = run(&["--config", config_path], input.clone());
    let oversized = run(
        &["--config", config_path, "--batch-size", &u64::MAX.to_string()],
        input,
    );

    assert!(oversized.status.success());
    assert_eq!(oversized.stdout, sequential.stdout);

    let zero = run(&["--config", config_path, "--batch-size", "0"], String::new());
    assert!(!zero.status.success());
}

#[test]
fn file_io_writes_blank_rows_and_a_summary() {
    let config = indices();
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("world.csv");
    let output_path = dir.path().join("local.csv");
    let summary_path = dir.path().join("summary.json");
    std::fs::write(
        &input_path,
        format!("header\n{}\n1,2,3\n{}\n", world_row(0.0), world_row(0.2)),
    )
    .unwrap();

    let output = run(
        &[
            "--config",
            config.path().to_str().unwrap(),
            "--input",
            input_path.to_str().unwrap(),
            "--output",
            output_path.to_str().unwrap(),
            "--summary",
            summary_path.to_str().unwrap(),
            "--short-records",
            "blank",
        ],
        String::new(),
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let local = std::fs::read_to_string(&output_path).unwrap();
    let rows: Vec<&str> = local.lines().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], ",".repeat(93));
    assert_eq!(rows[0].split(',').count(), 94);
    assert!(!rows[2].starts_with(','));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["rows_read"], 3);
    assert_eq!(summary["rows_written"], 3);
    assert_eq!(summary["rows_blanked"], 1);
    assert_eq!(summary["direction"], "world-to-local");
}
