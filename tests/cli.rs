use std::fs;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::TestWorkspace;

const SAMPLE_CSV: &str = "\
numero_releve,observateurs,date_min,altitude_min,lb_nom,strate_vegetation,indice_abondance_dominance,type_releve
20240618CB01,Martin,2024-06-18,450,Fagus sylvatica,Strate arborée,3,Relevé phytosociologique
20240618CB01,Martin,2024-06-18,450,Rubus sp.,Strate arbustive,i : Individu unique,Relevé phytosociologique
T6-C5/1,Dubois,2024-07-02,620,Carex sp.,Strate herbacée,2,Relevé phytocénotique
";

fn cargo_bin() -> Command {
    Command::cargo_bin("releve-export").expect("binary exists")
}

#[test]
fn export_writes_workbook_from_csv_dump() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("releves.csv", SAMPLE_CSV);
    let output = workspace.path().join("phyto.xlsx");

    cargo_bin()
        .args([
            "export",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let metadata = fs::metadata(&output).expect("workbook written");
    assert!(metadata.len() > 0);
}

#[test]
fn preview_renders_sorted_taxon_rows() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("releves.csv", SAMPLE_CSV);

    cargo_bin()
        .args(["preview", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("numero_releve"))
        .stdout(contains("Fagus sylvatica"))
        .stdout(contains("Carex sp."));
}

#[test]
fn releve_filter_restricts_surveys() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("releves.csv", SAMPLE_CSV);

    cargo_bin()
        .args([
            "preview",
            "-i",
            input.to_str().unwrap(),
            "--releves",
            "cb01",
        ])
        .assert()
        .success()
        .stdout(contains("Fagus sylvatica"))
        .stdout(contains("Carex sp.").not());
}

#[test]
fn missing_identifier_column_is_fatal() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "no_id.csv",
        "lb_nom,indice_abondance_dominance\nFagus sylvatica,3\n",
    );
    let output = workspace.path().join("phyto.xlsx");

    cargo_bin()
        .args([
            "export",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("numero_releve"));

    assert!(!output.exists(), "no partial workbook on fatal error");
}

#[test]
fn invalid_date_filter_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("releves.csv", SAMPLE_CSV);

    cargo_bin()
        .args([
            "preview",
            "-i",
            input.to_str().unwrap(),
            "--dates",
            "18/06/2024",
        ])
        .assert()
        .failure()
        .stderr(contains("YYYY-MM-DD"));
}
