use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

struct Env {
    _cfg: TempDir,
    backups: TempDir,
    saves: TempDir,
}

fn setup() -> Env {
    Env {
        _cfg: tempdir().unwrap(),
        backups: tempdir().unwrap(),
        saves: tempdir().unwrap(),
    }
}

fn savekeep(env: &Env) -> Command {
    let mut cmd = Command::cargo_bin("savekeep").unwrap();
    cmd.env("SAVEKEEP_CONFIG_DIR", env._cfg.path())
        .env("SAVEKEEP_BACKUP_DIR", env.backups.path())
        .env("SAVEKEEP_SAVE_DIR", env.saves.path())
        .env("SAVEKEEP_LOG", "warn");
    cmd
}

fn write_save(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn created_id(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    text.split("Backup created: ")
        .nth(1)
        .expect("create output names the id")
        .trim()
        .to_string()
}

#[test]
fn create_then_list_shows_the_backup() {
    let env = setup();
    let source = write_save(env.saves.path(), "save1.eu4", b"campaign");

    let output = savekeep(&env)
        .arg("create")
        .arg(&source)
        .arg("--description")
        .arg("first")
        .arg("--tags")
        .arg("a,b")
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = created_id(&output.stdout);

    savekeep(&env)
        .args(["list", "--save", "save1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id).and(predicate::str::contains("first")));

    savekeep(&env)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("save1"));
}

#[test]
fn create_accepts_bare_names_from_the_save_directory() {
    let env = setup();
    write_save(env.saves.path(), "save1.eu4", b"campaign");

    savekeep(&env)
        .args(["create", "save1.eu4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created: save1_"));
}

#[test]
fn restore_cycle_round_trips_content() {
    let env = setup();
    let source = write_save(env.saves.path(), "save1.eu4", b"good state");

    let output = savekeep(&env).arg("create").arg(&source).output().unwrap();
    assert!(output.status.success());
    let id = created_id(&output.stdout);

    fs::write(&source, b"bad state").unwrap();

    savekeep(&env)
        .args(["restore", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));

    assert_eq!(fs::read(&source).unwrap(), b"good state");
    let baks: Vec<_> = fs::read_dir(env.saves.path())
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".bak"))
        .collect();
    assert_eq!(baks.len(), 1, "safety copy next to the live file");
}

#[test]
fn rm_twice_reports_not_found() {
    let env = setup();
    let source = write_save(env.saves.path(), "save1.eu4", b"content");

    let output = savekeep(&env).arg("create").arg(&source).output().unwrap();
    let id = created_id(&output.stdout);

    savekeep(&env)
        .args(["rm", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    savekeep(&env)
        .args(["rm", &id, "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no backup"));
}

#[test]
fn saves_lists_only_matching_extensions() {
    let env = setup();
    write_save(env.saves.path(), "alpha.eu4", b"a");
    write_save(env.saves.path(), "beta.eu4", b"b");
    write_save(env.saves.path(), "readme.txt", b"x");

    savekeep(&env)
        .arg("saves")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("alpha.eu4")
                .and(predicate::str::contains("beta.eu4"))
                .and(predicate::str::contains("readme.txt").not()),
        );
}

#[test]
fn edit_updates_description_via_cli() {
    let env = setup();
    let source = write_save(env.saves.path(), "save1.eu4", b"content");

    let output = savekeep(&env).arg("create").arg(&source).output().unwrap();
    let id = created_id(&output.stdout);

    savekeep(&env)
        .args(["edit", &id, "--description", "v2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    savekeep(&env)
        .args(["list", "--save", "save1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"v2\""));
}

#[test]
fn list_json_is_machine_readable() {
    let env = setup();
    let source = write_save(env.saves.path(), "save1.eu4", b"content");
    savekeep(&env).arg("create").arg(&source).assert().success();

    let output = savekeep(&env).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0].get("save_name").and_then(|v| v.as_str()), Some("save1"));
}

#[test]
fn config_prints_effective_settings() {
    let env = setup();
    savekeep(&env)
        .arg("config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("max_backups: 10")
                .and(predicate::str::contains("save_ext:"))
                .and(predicate::str::contains(
                    env.backups.path().to_string_lossy().to_string(),
                )),
        );
}
