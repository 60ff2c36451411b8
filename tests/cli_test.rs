use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn round_trip_test(qd_text: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let qd_path = temp_dir.path().join("board.qd");
    let wb_path = temp_dir.path().join("board.wb");
    let out_path = temp_dir.path().join("board_out.qd");
    std::fs::write(&qd_path,qd_text)?;
    let mut cmd = Command::cargo_bin("quadpress")?;
    cmd.arg("compress")
        .arg("-i").arg(&qd_path)
        .arg("-o").arg(&wb_path)
        .assert()
        .success();
    // the symbol table lands beside the container by default
    assert!(temp_dir.path().join("board.sym").is_file());
    let mut cmd = Command::cargo_bin("quadpress")?;
    cmd.arg("expand")
        .arg("-i").arg(&wb_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    match (std::fs::read(&qd_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with original")
    }
    Ok(())
}

#[test]
fn quadtree_round_trip() -> STDRESULT {
    round_trip_test("8 6|w|kbgrwk")
}

#[test]
fn single_leaf_round_trip() -> STDRESULT {
    round_trip_test("4 4w")
}

#[test]
fn missing_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("quadpress")?;
    cmd.arg("compress")
        .arg("-i").arg(temp_dir.path().join("absent.qd"))
        .arg("-o").arg(temp_dir.path().join("absent.wb"))
        .assert()
        .failure()
        .stderr(predicate::str::is_empty().not());
    Ok(())
}
