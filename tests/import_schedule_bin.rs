use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use roster_terminal::db::Database;
use roster_terminal::schedule::count_games;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn run_import(workdir: &Path, file: &Path, db: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_import_schedule"))
        .current_dir(workdir)
        .env_remove("ROSTER_SEASON")
        .env("ROSTER_LOG", "warn")
        .arg(file)
        .arg("--db")
        .arg(db)
        .output()
        .expect("run import_schedule")
}

#[test]
fn headless_import_reports_summary_and_row_count() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("roster.sqlite");
    let schedule = fixture_path("schedule_sample.txt");

    let first = run_import(dir.path(), &schedule, &db_path);
    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("New games added: 4"));
    assert!(stdout.contains("Duplicate games skipped: 0"));
    assert!(stdout.contains("Games stored: 4"));

    let second = run_import(dir.path(), &schedule, &db_path);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("New games added: 0"));
    assert!(stdout.contains("Duplicate games skipped: 4"));
}

#[test]
fn headless_import_exits_non_zero_on_malformed_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("roster.sqlite");
    let file = dir.path().join("broken.txt");
    fs::write(&file, "2024-10-23, Cavaliers, Home, 7:30 PM\n2024-10-25, 76ers\n")
        .expect("write schedule");

    let out = run_import(dir.path(), &file, &db_path);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 2"));

    let db = Database::open(&db_path).expect("open db");
    assert_eq!(count_games(&db).expect("count"), 0);
}
