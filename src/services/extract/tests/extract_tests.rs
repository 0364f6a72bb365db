use super::*;
use crate::services::encoding::{Candidate, EncodingCandidateList};
use crate::test_utils::{create_test_zip, init_test_logger, list_names, write_file};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn exts(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().to_string();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_extract_single_student_scenario() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    create_test_zip(
        &subs.join("bob"),
        "bob_hw1.zip",
        &[
            ("src/main.py", b"print('merhaba')\n"),
            ("notes.txt", b"caf\xe9 notes"),
        ],
    );

    let report = extract(&subs, &dest, &exts(&[".py"]), None, true).unwrap();

    assert_eq!(list_names(&dest.join("bob")), ["bob_hw1.zip%src%main.py"]);
    assert_eq!(
        fs::read(dest.join("bob").join("bob_hw1.zip%src%main.py")).unwrap(),
        b"print('merhaba')\n"
    );
    assert_eq!(report.units, 1);
    assert_eq!(report.files_written, 1);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_corrupt_archive_skips_only_that_student() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");

    for i in 0..10 {
        let student = subs.join(format!("student_{i}"));
        if i == 4 {
            write_file(&student, "hw.zip", b"this is not a zip archive");
        } else {
            create_test_zip(&student, "hw.zip", &[("main.c", b"int main(){return 0;}")]);
        }
    }

    let report = extract(&subs, &dest, &exts(&[".c"]), None, true).unwrap();

    assert_eq!(report.units, 10);
    assert_eq!(report.corrupt_archives, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("student_4"));
    assert_eq!(report.files_written, 9);
    for i in (0..10).filter(|i| *i != 4) {
        assert!(dest
            .join(format!("student_{i}"))
            .join("hw.zip%main.c")
            .exists());
    }
    assert!(!dest.join("student_4").join("hw.zip%main.c").exists());
}

#[test]
fn test_undecodable_member_is_deleted() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    create_test_zip(
        &subs.join("eve"),
        "eve.zip",
        &[("good.py", b"x = 1\n"), ("bad.py", b"\xff\xfe\xfd")],
    );

    let strict = EncodingCandidateList::try_new(vec![Candidate::Utf8]).unwrap();
    let options =
        ExtractOptions::new(ExtractMode::ArchiveInFolder, exts(&[".py"])).with_encodings(strict);
    let report = extract_with(&subs, &dest, &options).unwrap();

    assert_eq!(list_names(&dest.join("eve")), ["eve.zip%good.py"]);
    assert_eq!(report.files_written, 1);
    assert_eq!(report.files_discarded, 1);
    assert!(report.warnings[0].contains("couldn't be converted to UTF-8"));
}

#[test]
fn test_legacy_encoded_member_is_converted() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    create_test_zip(&subs.join("ali"), "odev.zip", &[("main.c", b"// caf\xe9\n")]);

    extract(&subs, &dest, &exts(&[".c"]), None, true).unwrap();

    let out = fs::read_to_string(dest.join("ali").join("odev.zip%main.c")).unwrap();
    assert_eq!(out, "// café\n");
}

#[test]
fn test_extraction_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    create_test_zip(
        &subs.join("bob"),
        "hw.zip",
        &[("a/main.py", b"\xef\xbb\xbfprint(1)"), ("b/util.py", b"# caf\xe9")],
    );
    create_test_zip(&subs.join("amy"), "hw.zip", &[("main.py", b"print(2)")]);

    let first_report = extract(&subs, &dest, &exts(&[".py"]), None, true).unwrap();
    let first = snapshot(&dest);
    let second_report = extract(&subs, &dest, &exts(&[".py"]), None, true).unwrap();
    let second = snapshot(&dest);

    assert_eq!(first, second);
    assert_eq!(first_report, second_report);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_name_filter_counts_rejected_members() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    create_test_zip(
        &subs.join("bob"),
        "hw.zip",
        &[("Solver.py", b"pass"), ("helper.py", b"pass"), ("x.txt", b"")],
    );

    let filter = vec!["solver".to_string()];
    let report = extract(&subs, &dest, &exts(&[".py"]), Some(&filter), false).unwrap();

    assert_eq!(list_names(&dest.join("bob")), ["Solver.py"]);
    assert_eq!(report.files_filtered, 1);
}

#[test]
fn test_single_archive_mode_uses_archive_stem() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    create_test_zip(&subs, "alice_123.zip", &[("lab/main.py", b"pass")]);
    write_file(&subs, "readme.md", b"ignored");

    let options = ExtractOptions::new(ExtractMode::SingleArchive, exts(&[".py"]));
    let report = extract_with(&subs, &dest, &options).unwrap();

    assert_eq!(report.units, 1);
    assert_eq!(
        list_names(&dest.join("alice_123")),
        ["alice_123.zip%lab%main.py"]
    );
}

#[test]
fn test_plain_directory_mode_walks_recursively() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    write_file(&subs, "carol/src/main.py", b"pass");
    write_file(&subs, "carol/src/deep/util.py", b"pass");
    write_file(&subs, "carol/report.pdf", b"%PDF");

    let options = ExtractOptions::new(ExtractMode::PlainDirectory, exts(&[".py"]));
    extract_with(&subs, &dest, &options).unwrap();

    assert_eq!(
        list_names(&dest.join("carol")),
        ["carol%src%deep%util.py", "carol%src%main.py"]
    );
}

#[test]
fn test_testbench_layout_keeps_base_names_per_archive() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("bench");
    create_test_zip(
        &subs.join("dave"),
        "dave_lab3.zip",
        &[("lab3/src/main.py", b"pass"), ("lab3/test.py", b"pass")],
    );

    let options = ExtractOptions::new(ExtractMode::ArchiveInFolder, exts(&[".py"]))
        .with_naming(NamingPolicy::BaseName)
        .with_grouping(Grouping::PerArchive);
    extract_with(&subs, &dest, &options).unwrap();

    assert_eq!(list_names(&dest.join("dave_lab3")), ["main.py", "test.py"]);
    assert!(!dest.join("dave").exists());
}

#[test]
fn test_base_name_collision_is_reported() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("bench");
    create_test_zip(
        &subs.join("dave"),
        "hw.zip",
        &[("v1/main.py", b"old"), ("v2/main.py", b"new")],
    );

    let options = ExtractOptions::new(ExtractMode::ArchiveInFolder, exts(&[".py"]))
        .with_naming(NamingPolicy::BaseName);
    let report = extract_with(&subs, &dest, &options).unwrap();

    assert_eq!(report.files_written, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        fs::read_to_string(dest.join("dave").join("main.py")).unwrap(),
        "new"
    );
}

#[test]
fn test_parallel_extraction_matches_sequential() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    for i in 0..12 {
        create_test_zip(
            &subs.join(format!("s{i:02}")),
            "hw.zip",
            &[("main.py", format!("print({i})").as_bytes())],
        );
    }

    let sequential_dest = dir.path().join("seq");
    let parallel_dest = dir.path().join("par");
    let base = ExtractOptions::new(ExtractMode::ArchiveInFolder, exts(&[".py"]));

    let seq = extract_with(&subs, &sequential_dest, &base).unwrap();
    let par = extract_with(&subs, &parallel_dest, &base.clone().with_workers(4)).unwrap();

    assert_eq!(seq, par);
    assert_eq!(snapshot(&sequential_dest), snapshot(&parallel_dest));
}

#[test]
fn test_stray_files_at_root_are_ignored() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    let dest = dir.path().join("test");
    write_file(&subs, "index.html", b"<html>");
    create_test_zip(&subs.join("bob"), "hw.zip", &[("a.py", b"pass")]);

    let report = extract(&subs, &dest, &exts(&[".py"]), None, true).unwrap();
    assert_eq!(report.units, 1);
    assert_eq!(list_names(&dest), ["bob"]);
}

#[test]
fn test_missing_submissions_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = extract(
        &dir.path().join("absent"),
        &dir.path().join("test"),
        &exts(&[".py"]),
        None,
        true,
    );
    assert!(result.is_err());
}

#[test]
fn test_scan_units_per_mode() {
    let dir = TempDir::new().unwrap();
    let subs = dir.path();
    fs::create_dir(subs.join("zed")).unwrap();
    fs::create_dir(subs.join("amy")).unwrap();
    write_file(subs, "bob.zip", b"");

    let folders = scan_units(subs, ExtractMode::ArchiveInFolder).unwrap();
    let names: Vec<&str> = folders.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["amy", "zed"]);

    let archives = scan_units(subs, ExtractMode::SingleArchive).unwrap();
    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0].name, "bob");
    assert_eq!(archives[0].source, UnitSource::Archive(subs.join("bob.zip")));
}

#[test]
fn test_shared_archive_folders_are_written_in_student_order() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let subs = dir.path().join("submissions");
    for i in 0..8 {
        let body = format!("# student {i}\n{}", "x = 1\n".repeat(2000));
        create_test_zip(
            &subs.join(format!("s{i}")),
            "hw.zip",
            &[("main.py", body.as_bytes())],
        );
    }

    let options = ExtractOptions::new(ExtractMode::ArchiveInFolder, exts(&[".py"]))
        .with_naming(NamingPolicy::BaseName)
        .with_grouping(Grouping::PerArchive);

    let seq_dest = dir.path().join("seq");
    let seq = extract_with(&subs, &seq_dest, &options).unwrap();

    for round in 0..3 {
        let par_dest = dir.path().join(format!("par{round}"));
        let par = extract_with(&subs, &par_dest, &options.clone().with_workers(4)).unwrap();
        assert_eq!(par.files_written, seq.files_written);
        assert_eq!(par.warnings.len(), seq.warnings.len());
        assert_eq!(snapshot(&par_dest), snapshot(&seq_dest));
    }

    let kept = fs::read_to_string(seq_dest.join("hw").join("main.py")).unwrap();
    assert!(kept.starts_with("# student 7\n"));
    assert_eq!(seq.files_written, 1);
    assert_eq!(seq.warnings.len(), 7);
    assert!(seq.warnings[0].contains("produced by more than one member"));
}
