//! End-to-end rotation runs driven from TOML configuration
//!
//! Each test writes a configuration into a temporary directory, builds the
//! jobs through the public API and runs them the way the binary does.

use flate2::read::MultiGzDecoder;
use newsyslog::config::{Config, ConfigError};
use newsyslog::rotate::{JobError, RotationStatus};
use newsyslog::runner::{JobRunner, RunMode};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Write `body` as the root configuration inside `dir`.
fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("newsyslog.toml");
    fs::write(&path, body).unwrap();
    path
}

fn rotated_copies(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut copies: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    copies.sort();
    copies
}

async fn run_once(config_path: &Path, mode: RunMode) -> newsyslog::runner::RunReport {
    let config = Config::load_with_includes(config_path).unwrap();
    JobRunner::from_config(&config).unwrap().run(mode).await
}

#[tokio::test]
async fn test_size_rule_keeps_retention_count() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let log = dir.join("app.log");
    let config_path = write_config(
        dir,
        &format!(
            r#"
[[project]]
name = "app"
from = "{log}"
to = "{dir}/app.log.%Y%m%d%H%M%S%f"

[project.rotate]
size = "1B"
count = 2

[project.compress]
type = "none"
"#,
            log = log.display(),
            dir = dir.display(),
        ),
    );

    for round in 0..3 {
        fs::write(&log, format!("round {round}\n")).unwrap();
        let report = run_once(&config_path, RunMode::Execute).await;
        assert_eq!(report.get("app").unwrap().status(), RotationStatus::Success);
        assert_eq!(fs::metadata(&log).unwrap().len(), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let copies = rotated_copies(dir, "app.log.");
    assert_eq!(copies.len(), 2);
    // The oldest round was evicted.
    let kept: Vec<String> = copies
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    assert_eq!(kept, vec!["round 1\n", "round 2\n"]);
}

#[tokio::test]
async fn test_empty_rule_always_rotates() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let log = dir.join("always.log");
    fs::write(&log, b"").unwrap();
    let config_path = write_config(
        dir,
        &format!(
            r#"
[[project]]
name = "always"
from = "{log}"
to = "{dir}/always.log.%Y%m%d%H%M%S%f"
"#,
            log = log.display(),
            dir = dir.display(),
        ),
    );

    let report = run_once(&config_path, RunMode::Execute).await;

    assert_eq!(report.succeeded, 1);
    assert!(!report.has_failures());
    assert!(log.exists());
    assert_eq!(fs::metadata(&log).unwrap().len(), 0);
    assert_eq!(rotated_copies(dir, "always.log.").len(), 1);
}

#[tokio::test]
async fn test_invalid_size_builds_no_jobs() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let config_path = write_config(
        dir,
        r#"
[[project]]
name = "ok"
from = "/var/log/ok.log"
to = "/var/log/ok.log.%Y%m%d"

[[project]]
name = "broken"
from = "/var/log/broken.log"
to = "/var/log/broken.log.%Y%m%d"

[project.rotate]
size = "10XB"
"#,
    );

    let config = Config::load_with_includes(&config_path).unwrap();
    let err = JobRunner::from_config(&config).err().unwrap();
    assert!(matches!(err, JobError::InvalidSize { ref job, .. } if job == "broken"));
}

#[tokio::test]
async fn test_test_mode_reports_without_rotating() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let big = dir.join("big.log");
    let small = dir.join("small.log");
    fs::write(&big, vec![b'x'; 4096]).unwrap();
    fs::write(&small, b"x").unwrap();
    let config_path = write_config(
        dir,
        &format!(
            r#"
[[project]]
name = "big"
from = "{big}"
to = "{dir}/big.log.%Y%m%d%H%M%S%f"
rotate = {{ size = "1KB", count = 1 }}

[[project]]
name = "small"
from = "{small}"
to = "{dir}/small.log.%Y%m%d%H%M%S%f"
rotate = {{ size = "1KB", count = 1 }}
"#,
            big = big.display(),
            small = small.display(),
            dir = dir.display(),
        ),
    );

    let report = run_once(&config_path, RunMode::DryRun).await;

    assert!(report.dry_run);
    assert_eq!(report.get("big").unwrap().status(), RotationStatus::Success);
    assert_eq!(report.get("small").unwrap().status(), RotationStatus::Skip);
    assert_eq!(fs::metadata(&big).unwrap().len(), 4096);
    assert!(rotated_copies(dir, "big.log.").is_empty());
}

#[tokio::test]
async fn test_included_gzip_project_and_success_command() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let log = dir.join("web.log");
    let marker = dir.join("rotated.marker");
    fs::write(&log, b"GET / 200\n").unwrap();
    fs::create_dir(dir.join("conf.d")).unwrap();
    fs::write(
        dir.join("conf.d/web.toml"),
        format!(
            r#"
[[project]]
name = "web"
from = "{log}"
to = "{dir}/web.log.%Y%m%d%H%M%S%f"
successCommand = "touch {marker}"

[project.rotate]
count = 3

[project.compress]
type = "gzip"
"#,
            log = log.display(),
            dir = dir.display(),
            marker = marker.display(),
        ),
    )
    .unwrap();
    let config_path = write_config(
        dir,
        r#"
[common]
include = "conf.d/*.toml"
"#,
    );

    let report = run_once(&config_path, RunMode::Execute).await;
    assert_eq!(report.get("web").unwrap().status(), RotationStatus::Success);

    let copies = rotated_copies(dir, "web.log.");
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].extension().and_then(|e| e.to_str()), Some("gz"));

    let mut decoded = String::new();
    MultiGzDecoder::new(fs::File::open(&copies[0]).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "GET / 200\n");

    // The command runs detached; give it a moment.
    for _ in 0..100 {
        if marker.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(marker.exists());
}

#[tokio::test]
async fn test_conflicting_include_does_not_stop_root_jobs() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let log = dir.join("app.log");
    fs::write(&log, b"line\n").unwrap();
    fs::create_dir(dir.join("conf.d")).unwrap();
    fs::write(
        dir.join("conf.d/dup.toml"),
        format!(
            r#"
[[project]]
name = "dup"
from = "{log}"
to = "{dir}/dup.log.%Y%m%d%H%M%S%f"
"#,
            log = log.display(),
            dir = dir.display(),
        ),
    )
    .unwrap();
    let config_path = write_config(
        dir,
        &format!(
            r#"
[common]
include = "conf.d/*.toml"

[[project]]
name = "app"
from = "{log}"
to = "{dir}/app.log.%Y%m%d%H%M%S%f"
"#,
            log = log.display(),
            dir = dir.display(),
        ),
    );

    let report = run_once(&config_path, RunMode::Execute).await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.get("app").unwrap().status(), RotationStatus::Success);
    assert!(report.get("dup").is_none());
    assert!(rotated_copies(dir, "dup.log.").is_empty());
}

#[tokio::test]
async fn test_missing_pid_file_fails_only_that_job() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let good = dir.join("good.log");
    let bad = dir.join("bad.log");
    fs::write(&good, b"good\n").unwrap();
    fs::write(&bad, b"bad\n").unwrap();
    let config_path = write_config(
        dir,
        &format!(
            r#"
[[project]]
name = "good"
from = "{good}"
to = "{dir}/good.log.%Y%m%d%H%M%S%f"

[[project]]
name = "bad"
from = "{bad}"
to = "{dir}/bad.log.%Y%m%d%H%M%S%f"
pid = "{dir}/missing.pid"
"#,
            good = good.display(),
            bad = bad.display(),
            dir = dir.display(),
        ),
    );

    let report = run_once(&config_path, RunMode::Execute).await;

    assert!(report.has_failures());
    assert_eq!(report.get("good").unwrap().status(), RotationStatus::Success);
    let failed = report.get("bad").unwrap();
    assert_eq!(failed.status(), RotationStatus::Fail);
    assert!(failed.error().unwrap().contains("missing.pid"));
}

#[test]
fn test_missing_root_config_is_a_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::load_with_includes(temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}
