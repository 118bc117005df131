#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli(ledger: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("blocop-cli").unwrap();
    cmd.arg("--ledger").arg(ledger);
    cmd
}

#[test]
fn book_and_cancel_through_the_cli() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");

    for physiologist in ["anna", "bruno"] {
        cli(&ledger)
            .args([
                "add-shift",
                "--hospital",
                "H",
                "--physiologist",
                physiologist,
                "--date",
                "2026-03-10",
                "--period",
                "morning",
            ])
            .assert()
            .success();
    }

    cli(&ledger)
        .args(["availability", "--hospital", "H", "--date", "2026-03-10", "--time", "09:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anna").and(predicate::str::contains("bruno")));

    let booked = cli(&ledger)
        .args([
            "book",
            "--hospital",
            "H",
            "--surgeon",
            "X",
            "--physiologists",
            "anna",
            "--surgery-type",
            "craniotomy",
            "--date",
            "2026-03-10",
            "--time",
            "09:00",
            "--duration",
            "120",
        ])
        .assert()
        .success();
    let surgery_id = String::from_utf8(booked.get_output().stdout.clone())
        .unwrap()
        .trim()
        .to_string();
    assert!(!surgery_id.is_empty());

    // anna est consommée, bruno reste disponible
    cli(&ledger)
        .args(["availability", "--hospital", "H", "--date", "2026-03-10", "--time", "09:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anna").not().and(predicate::str::contains("bruno")));

    // conflit chirurgien sur fenêtre chevauchante → code 2
    cli(&ledger)
        .args([
            "check",
            "--surgeon",
            "X",
            "--hospital",
            "H",
            "--date",
            "2026-03-10",
            "--time",
            "10:00",
            "--duration",
            "120",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CONFLICT"));

    cli(&ledger)
        .args(["cancel", "--surgery-id", &surgery_id])
        .assert()
        .success();

    cli(&ledger)
        .args(["availability", "--hospital", "H", "--date", "2026-03-10", "--time", "09:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anna"));
}

#[test]
fn booking_twice_reports_the_lost_shift() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");

    cli(&ledger)
        .args([
            "add-shift",
            "--hospital",
            "H",
            "--physiologist",
            "anna",
            "--date",
            "2026-03-10",
            "--period",
            "afternoon",
        ])
        .assert()
        .success();

    cli(&ledger)
        .args([
            "book",
            "--hospital",
            "H",
            "--surgeon",
            "X",
            "--physiologists",
            "anna",
            "--surgery-type",
            "craniotomy",
            "--date",
            "2026-03-10",
            "--time",
            "15:00",
            "--duration",
            "60",
        ])
        .assert()
        .success();

    cli(&ledger)
        .args([
            "book",
            "--hospital",
            "H",
            "--surgeon",
            "Y",
            "--physiologists",
            "anna",
            "--surgery-type",
            "craniotomy",
            "--date",
            "2026-03-10",
            "--time",
            "16:00",
            "--duration",
            "60",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no open shift for: anna"));
}
