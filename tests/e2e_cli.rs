use assert_cmd::{cargo, prelude::*};
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn setup_temp_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("data.db");
    (dir, path)
}

fn cli(db: &PathBuf) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("rendimento"));
    cmd.arg("--no-color").arg("--db").arg(db);
    cmd
}

#[test]
fn simulate_prints_deterministic_statement() {
    let (_dir, db) = setup_temp_db();

    // 10,000 in a CDB at 110% of CDI over 30 days: IOF already zero,
    // IR at 22.5%, gross yield 130.51.
    cli(&db)
        .args([
            "simulate",
            "10000",
            "CDB",
            "2025-01-01",
            "--cdi",
            "110",
            "--at",
            "2025-01-31",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Elapsed days:     30"))
        .stdout(predicate::str::contains("R$ 10.130,51"))
        .stdout(predicate::str::contains("R$ 10.101,14"))
        .stdout(predicate::str::contains("IOF withheld:     R$ 0,00"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn simulate_json_reports_elapsed_days() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args([
            "--json",
            "simulate",
            "10000",
            "CDB",
            "2025-01-01",
            "--cdi",
            "110",
            "--at",
            "2025-01-31",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"elapsed_days\": 30"));
}

#[test]
fn fresh_store_lists_seeded_example_position() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args(["positions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Empresa Exemplo"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn add_then_list_shows_the_new_position() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args([
            "positions",
            "add",
            "Acme",
            "Itaú",
            "777",
            "CDB",
            "5000",
            "2025-01-01",
            "--cdi",
            "110",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("registered"));

    cli(&db)
        .args(["positions", "list", "--at", "2025-01-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme"))
        .stdout(predicate::str::contains("Empresa Exemplo"));

    // The company filter narrows the list down.
    cli(&db)
        .args(["positions", "list", "--company", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme"))
        .stdout(predicate::str::contains("Empresa Exemplo").not());
}

#[test]
fn add_cdb_without_cdi_percentage_fails() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args([
            "positions",
            "add",
            "Acme",
            "Itaú",
            "777",
            "CDB",
            "5000",
            "2025-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CDI percentage"));
}

#[test]
fn withdrawal_over_net_balance_is_rejected() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args([
            "positions",
            "add",
            "Acme",
            "Itaú",
            "777",
            "CDB",
            "1000",
            "2025-01-01",
            "--cdi",
            "110",
        ])
        .assert()
        .success();

    // Position 1 is the seeded example, ours is 2. On the deposit date
    // the balance is exactly the principal.
    cli(&db)
        .args([
            "withdrawals",
            "add",
            "2",
            "2000",
            "--date",
            "2025-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the available net balance"));
}

#[test]
fn withdrawal_before_deposit_date_is_rejected() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args([
            "positions",
            "add",
            "Acme",
            "Itaú",
            "777",
            "CDB",
            "1000",
            "2025-06-01",
            "--cdi",
            "110",
        ])
        .assert()
        .success();

    cli(&db)
        .args([
            "withdrawals",
            "add",
            "2",
            "1",
            "--date",
            "2025-05-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("precedes the deposit date"));
}

#[test]
fn remove_cascades_to_withdrawals() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args([
            "positions",
            "add",
            "Acme",
            "Itaú",
            "777",
            "CDB",
            "1000",
            "2025-01-01",
            "--cdi",
            "110",
        ])
        .assert()
        .success();

    cli(&db)
        .args(["withdrawals", "add", "2", "100", "--date", "2025-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Withdrawal #1"));

    cli(&db)
        .args(["positions", "remove", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    cli(&db)
        .args(["withdrawals", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No withdrawals found"));
}

#[test]
fn summary_json_exposes_totals() {
    let (_dir, db) = setup_temp_db();

    cli(&db)
        .args(["--json", "summary", "--at", "2025-06-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_invested\""))
        .stdout(predicate::str::contains("\"position_count\": 1"));
}
