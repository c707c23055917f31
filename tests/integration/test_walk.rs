//! End-to-end walk scenarios over real directory trees

use crate::fixtures::{CONN_LINE, SEVEN_KINDS, seven_kind_dir, set_mtime, write_gz_log, write_log};
use std::collections::BTreeSet;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use zingest::{Classifier, Error, LogKind, WalkErrorKind};

fn walk(root: &std::path::Path) -> zingest::Result<zingest::WalkSummary> {
    zingest::walk_logs(root, &Classifier::standard())
}

#[test]
fn flat_directory_with_all_seven_kinds() {
    let temp = TempDir::new().unwrap();
    seven_kind_dir(temp.path());

    let summary = walk(temp.path()).unwrap();
    assert!(summary.errors.is_empty());
    assert_eq!(summary.manifest.days.len(), 1);

    let hour0 = summary.manifest.days[0].hours[0].as_ref().unwrap();
    assert_eq!(hour0.kinds.len(), 7);
    for paths in hour0.kinds.values() {
        assert_eq!(paths.len(), 1);
    }
    for hour in &summary.manifest.days[0].hours[1..] {
        assert!(hour.is_none());
    }
}

#[test]
fn hour_range_files_select_hour_buckets() {
    let temp = TempDir::new().unwrap();
    write_log(&temp.path().join("conn.00:00:00-01:00:00.log"), "");
    write_log(&temp.path().join("conn.23:00:00-00:00:00.log"), "");

    let summary = walk(temp.path()).unwrap();
    assert!(summary.errors.is_empty());
    assert_eq!(summary.manifest.days.len(), 1);

    let day = &summary.manifest.days[0];
    let hour0 = day.hours[0].as_ref().unwrap();
    let hour23 = day.hours[23].as_ref().unwrap();
    assert_eq!(hour0.kinds.len(), 1);
    assert_eq!(hour23.kinds.len(), 1);
    assert_eq!(hour0.kinds[&LogKind::Conn].len(), 1);
    assert_eq!(hour23.kinds[&LogKind::Conn].len(), 1);
    for hour in &day.hours[1..23] {
        assert!(hour.is_none());
    }
}

#[test]
fn multiple_sensors_share_a_bucket_in_walk_order() {
    let temp = TempDir::new().unwrap();
    write_log(&temp.path().join("sensor1/conn.log"), "");
    write_log(&temp.path().join("sensor2/conn.log"), "");

    let summary = walk(temp.path()).unwrap();
    assert_eq!(summary.manifest.days.len(), 1);

    let hour0 = summary.manifest.days[0].hours[0].as_ref().unwrap();
    let conn = &hour0.kinds[&LogKind::Conn];
    assert_eq!(conn.len(), 2);
    // sensor1 sorts before sensor2
    assert!(conn[0].to_string_lossy().contains("sensor1"));
    assert!(conn[1].to_string_lossy().contains("sensor2"));
}

#[test]
fn day_directories_split_into_day_buckets() {
    let temp = TempDir::new().unwrap();
    for day in ["2024-04-29", "2024-05-01"] {
        for name in SEVEN_KINDS {
            write_log(&temp.path().join(day).join(name), "");
        }
    }
    write_log(&temp.path().join("2024-05-01/ssl_blue.log"), "");

    let summary = walk(temp.path()).unwrap();
    assert!(summary.errors.is_empty());
    assert_eq!(summary.manifest.days.len(), 2);

    let day0 = summary.manifest.days[0].hours[0].as_ref().unwrap();
    assert_eq!(day0.file_count(), 7);
    // the color-suffixed ssl log joins the ssl list of its day
    let day1 = summary.manifest.days[1].hours[0].as_ref().unwrap();
    assert_eq!(day1.kinds[&LogKind::Ssl].len(), 2);
}

#[test]
fn single_file_root_is_accepted() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("open_conn.log");
    write_log(&file, CONN_LINE);

    let summary = walk(&file).unwrap();
    assert_eq!(summary.manifest.file_count(), 1);
    let hour0 = summary.manifest.days[0].hours[0].as_ref().unwrap();
    assert!(hour0.kinds.contains_key(&LogKind::OpenConn));
}

#[test]
fn empty_tree_fails_with_dir_is_empty() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("a/b/c")).unwrap();

    let err = walk(temp.path()).unwrap_err();
    assert!(matches!(err, Error::DirIsEmpty(_)));
}

#[test]
fn all_invalid_files_fail_with_no_valid_files_found() {
    let temp = TempDir::new().unwrap();
    write_log(&temp.path().join("notes.txt"), "");
    write_log(&temp.path().join("smtp.log"), "");
    write_log(&temp.path().join("conn.24:00:00-01:00:00.log"), "");

    let err = walk(temp.path()).unwrap_err();
    assert!(matches!(err, Error::NoValidFilesFound(_)));
}

#[test]
fn invalid_files_are_catalogued_while_valid_ones_import() {
    let temp = TempDir::new().unwrap();
    write_log(&temp.path().join("conn.log"), "");
    write_log(&temp.path().join("notes.txt"), "");
    write_log(&temp.path().join("smtp.log"), "");
    write_log(&temp.path().join("dns.xx:00:00-01:00:00.log"), "");

    let summary = walk(temp.path()).unwrap();
    assert_eq!(summary.manifest.file_count(), 1);

    let kinds: BTreeSet<_> = summary.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        BTreeSet::from([
            WalkErrorKind::IncompatibleFileExtension,
            WalkErrorKind::InvalidLogType,
            WalkErrorKind::InvalidLogHourFormat,
        ])
    );
}

#[test]
fn every_file_lands_in_manifest_or_errors_never_both() {
    let temp = TempDir::new().unwrap();
    seven_kind_dir(temp.path());
    write_log(&temp.path().join("junk.txt"), "");
    write_log(&temp.path().join("sensor1/weird.log"), "");

    let summary = walk(temp.path()).unwrap();

    let manifest_paths: BTreeSet<String> = summary
        .manifest
        .hour_buckets()
        .flat_map(|(_, _, bucket)| bucket.kinds.values().flatten())
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let error_paths: BTreeSet<String> =
        summary.errors.iter().map(|e| e.path.clone()).collect();

    assert!(manifest_paths.is_disjoint(&error_paths));
    assert_eq!(manifest_paths.len() + error_paths.len(), 9);
}

#[test]
fn newer_compressed_rotation_wins_duplicate_resolution() {
    let temp = TempDir::new().unwrap();
    let plain = temp.path().join("conn.log");
    let gz = temp.path().join("conn.log.gz");
    write_log(&plain, "");
    write_gz_log(&gz, "");

    let older = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&plain, older);

    let summary = walk(temp.path()).unwrap();
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].kind, WalkErrorKind::SkippedDuplicateLog);
    assert_eq!(summary.errors[0].path, plain.to_string_lossy());

    let hour0 = summary.manifest.days[0].hours[0].as_ref().unwrap();
    assert_eq!(hour0.kinds[&LogKind::Conn], vec![gz]);
}

#[test]
fn newer_plain_rotation_wins_symmetrically() {
    let temp = TempDir::new().unwrap();
    let plain = temp.path().join("conn.log");
    let gz = temp.path().join("conn.log.gz");
    write_log(&plain, "");
    write_gz_log(&gz, "");

    let older = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&gz, older);

    let summary = walk(temp.path()).unwrap();
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].path, gz.to_string_lossy());

    let hour0 = summary.manifest.days[0].hours[0].as_ref().unwrap();
    assert_eq!(hour0.kinds[&LogKind::Conn], vec![plain]);
}

#[test]
fn duplicate_loser_never_reports_classification_errors() {
    // both rotations carry an unsupported kind; the losing one must only be
    // diagnosed as a skipped duplicate, the winner as the invalid kind
    let temp = TempDir::new().unwrap();
    write_log(&temp.path().join("conn.log"), "");
    let plain = temp.path().join("smtp.log");
    let gz = temp.path().join("smtp.log.gz");
    write_log(&plain, "");
    write_gz_log(&gz, "");

    let older = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&gz, older);

    let summary = walk(temp.path()).unwrap();
    assert_eq!(summary.errors.len(), 2);

    let for_path = |p: &std::path::Path| {
        summary
            .errors
            .iter()
            .find(|e| e.path == p.to_string_lossy())
            .map(|e| e.kind)
    };
    assert_eq!(for_path(&gz), Some(WalkErrorKind::SkippedDuplicateLog));
    assert_eq!(for_path(&plain), Some(WalkErrorKind::InvalidLogType));
}

#[test]
fn reclassifying_an_unchanged_tree_is_reproducible() {
    let temp = TempDir::new().unwrap();
    seven_kind_dir(temp.path());
    write_log(&temp.path().join("sensor1/conn.log"), "");

    let first = walk(temp.path()).unwrap();
    let second = walk(temp.path()).unwrap();

    let flatten = |summary: &zingest::WalkSummary| -> Vec<(usize, usize, String)> {
        summary
            .manifest
            .hour_buckets()
            .flat_map(|(day, hour, bucket)| {
                bucket
                    .kinds
                    .values()
                    .flatten()
                    .map(move |p| (day, hour, p.to_string_lossy().into_owned()))
            })
            .collect()
    };
    assert_eq!(flatten(&first), flatten(&second));
}
