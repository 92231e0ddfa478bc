use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::{PathBuf,Path};
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

// Make a copy in temporary directory with LF newlines.
// This insulates us against newline substitutions inserted by git or other layers.
fn copy_and_fix_newlines(in_file: PathBuf,temp_dir: &tempfile::TempDir) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let txt = std::fs::read(in_file)?;
    let new_txt: Vec<u8> = txt.into_iter().filter(|c| *c!=13).collect();
    let new_txt_path = temp_dir.path().join("converted.txt");
    std::fs::write(&new_txt_path,new_txt)?;
    Ok(new_txt_path)
}

#[test]
fn compression() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = copy_and_fix_newlines(Path::new("tests").join("green_eggs.txt"),&temp_dir)?;
    let cmp_path = Path::new("tests").join("green_eggs.huf");
    let out_path = temp_dir.path().join("green_eggs.huf");
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed 343 into 235"));
    match (std::fs::read(cmp_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn expansion() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = Path::new("tests").join("green_eggs.huf");
    let cmp_path = copy_and_fix_newlines(Path::new("tests").join("green_eggs.txt"),&temp_dir)?;
    let out_path = temp_dir.path().join("green_eggs.txt");
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("expanded 235 into 343"));
    match (std::fs::read(cmp_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn empty_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("empty.bin");
    let cmp_path = temp_dir.path().join("empty.huf");
    let out_path = temp_dir.path().join("empty.out");
    std::fs::write(&in_path,b"")?;
    Command::cargo_bin("huffpress")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(&cmp_path)?,hex::decode("485546010000000000000000")?);
    Command::cargo_bin("huffpress")?
        .arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(&out_path)?,Vec::<u8>::new());
    Ok(())
}

#[test]
fn info() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("info")
        .arg("-i").arg(Path::new("tests").join("green_eggs.huf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("original length: 343"));
    Ok(())
}

#[test]
fn not_a_container() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let out_path = temp_dir.path().join("out.txt");
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("expand")
        .arg("-i").arg(Path::new("tests").join("green_eggs.txt"))
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FileFormatMismatch"));
    assert!(!out_path.exists());
    Ok(())
}

#[test]
fn truncated_container() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("cut.huf");
    let out_path = temp_dir.path().join("out.txt");
    let dat = std::fs::read(Path::new("tests").join("green_eggs.huf"))?;
    std::fs::write(&in_path,&dat[0..dat.len()-1])?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CorruptData"));
    Ok(())
}
