use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("contas_cli").unwrap();
    cmd.env("CONTAS_CORE_HOME", home.path())
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn first_start_lists_seed_bills() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("First start"))
        .stdout(contains("INTERNET R$ 89.90"));

    cli(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Bills: 3"))
        .stdout(contains("Loaded from: Primary"));
    home.child("store").assert(predicates::path::is_dir());
}

#[test]
fn add_and_list_with_filters() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["add", "TELEFONE", "59,90", "20/01/2031", "Pago"])
        .assert()
        .success()
        .stdout(contains("Bill #4 added."));

    cli(&home)
        .args(["list", "--month", "2031-01"])
        .assert()
        .success()
        .stdout(contains("TELEFONE R$ 59.90 20/01/2031 (Pago)"))
        .stdout(contains("Paid: R$ 59.90"));
}

#[test]
fn reserved_category_name_is_rejected() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["create", "internet"])
        .assert()
        .failure()
        .stderr(contains("already a built-in category"));
}

fn home_with_pets_bill() -> TempDir {
    let home = TempDir::new().unwrap();
    cli(&home).args(["create", "Pets"]).assert().success();
    cli(&home)
        .args(["add", "Pets", "80,00", "10/02/2031"])
        .assert()
        .success();
    home
}

#[test]
fn delete_in_use_category_requires_confirmation() {
    let home = home_with_pets_bill();
    cli(&home)
        .args(["delete", "4"])
        .assert()
        .failure()
        .stderr(contains("used by 1 bill(s)"))
        .stderr(contains("--yes"));

    cli(&home)
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("Pets"));
    cli(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Bills: 4"));
}

#[test]
fn delete_with_yes_cascades_to_bills() {
    let home = home_with_pets_bill();
    cli(&home)
        .args(["delete", "4", "--yes"])
        .assert()
        .success()
        .stdout(contains("Category \"Pets\" deleted with 1 bill(s)."));

    cli(&home)
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("Pets").not());
    cli(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Bills: 3"));
}

#[test]
fn delete_unused_category_needs_no_confirmation() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(contains("deleted with 0 bill(s)"));
}

#[test]
fn backup_moves_between_homes() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let file = source.child("backup.json");

    cli(&source)
        .args(["create", "Pets", "animais"])
        .assert()
        .success();
    cli(&source)
        .args(["export-backup", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("exported"));
    file.assert(contains("\"aviso\""));

    cli(&target)
        .args(["import-backup", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("4 categories"));
    cli(&target)
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("Pets"));
}

#[test]
fn version_reports_build_info() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(contains("contas_cli 0.1.0"));
}
