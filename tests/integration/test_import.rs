//! Import orchestration against real log trees and the metadata store

use crate::fixtures::{CONN_LINE, seven_kind_dir, write_gz_log, write_log};
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;
use zingest::Classifier;
use zingest::io::metastore::Metastore;
use zingest::services::import::{
    CountingImporter, ImportOptions, MemoryImporter, assign_jobs, run_import,
};

fn walk(root: &std::path::Path) -> zingest::WalkSummary {
    zingest::walk_logs(root, &Classifier::standard()).unwrap()
}

#[test]
fn one_import_per_nonempty_hour_bucket() {
    let temp = TempDir::new().unwrap();
    for day in ["2024-04-29", "2024-05-01"] {
        write_log(
            &temp.path().join(day).join("conn.00:00:00-01:00:00.log"),
            "",
        );
        write_log(
            &temp.path().join(day).join("conn.23:00:00-00:00:00.log"),
            "",
        );
    }

    let summary = walk(temp.path());
    let jobs = assign_jobs(&summary.manifest);
    assert_eq!(jobs.len(), 4);

    let ids: HashSet<_> = jobs.iter().map(|job| job.import_id).collect();
    assert_eq!(ids.len(), 4, "import ids must be unique per bucket");
}

#[test]
fn counting_importer_decodes_plain_and_gzip_conn_logs() {
    let temp = TempDir::new().unwrap();
    write_log(
        &temp.path().join("conn.log"),
        &format!("{CONN_LINE}\n{CONN_LINE}\n"),
    );
    write_gz_log(&temp.path().join("dns.log.gz"), "{\"q\":1}\n#comment\n");

    let summary = walk(temp.path());
    let jobs = assign_jobs(&summary.manifest);
    let cancel = AtomicBool::new(false);

    let results = run_import(
        &jobs,
        &CountingImporter,
        &ImportOptions { workers: 2 },
        &cancel,
    )
    .unwrap();

    assert_eq!(results.len(), 1);
    // two conn records plus one dns line; the dns comment is skipped
    assert_eq!(results[0].records, 3);
    assert_eq!(results[0].paths.len(), 2);
}

#[test]
fn counting_importer_decodes_tab_separated_conn_logs() {
    let temp = TempDir::new().unwrap();
    let mut content = String::from(
        "#separator \\x09\n\
         #set_separator\t,\n\
         #empty_field\t(empty)\n\
         #unset_field\t-\n\
         #path\tconn\n\
         #fields\tts\tuid\tid.orig_h\tid.resp_h\n\
         #types\ttime\tstring\taddr\taddr\n",
    );
    for i in 1..=5 {
        content.push_str(&format!(
            "17156409{i:02}.367201\tCxT12{i}\t10.0.0.{i}\t52.12.0.{i}\n"
        ));
    }
    write_log(&temp.path().join("conn.log"), &content);

    let summary = walk(temp.path());
    let jobs = assign_jobs(&summary.manifest);
    let cancel = AtomicBool::new(false);

    let results = run_import(
        &jobs,
        &CountingImporter,
        &ImportOptions { workers: 1 },
        &cancel,
    )
    .unwrap();

    assert_eq!(results.len(), 1);
    // every data line decodes; the metadata header does not count
    assert_eq!(results[0].records, 5);
}

#[test]
fn worker_pool_handles_many_buckets() {
    let temp = TempDir::new().unwrap();
    for hour in 0..10 {
        write_log(
            &temp
                .path()
                .join(format!("conn.{hour:02}:00:00-{:02}:00:00.log", hour + 1)),
            &format!("{CONN_LINE}\n"),
        );
    }

    let summary = walk(temp.path());
    let jobs = assign_jobs(&summary.manifest);
    assert_eq!(jobs.len(), 10);

    let cancel = AtomicBool::new(false);
    let results = run_import(
        &jobs,
        &CountingImporter,
        &ImportOptions { workers: 4 },
        &cancel,
    )
    .unwrap();

    // results preserve manifest bucket order regardless of scheduling
    let hours: Vec<_> = results.iter().map(|r| r.hour).collect();
    assert_eq!(hours, (0..10).collect::<Vec<_>>());
    assert!(results.iter().all(|r| r.records == 1));
}

#[test]
fn metastore_records_and_queries_import_provenance() {
    let temp = TempDir::new().unwrap();
    seven_kind_dir(&temp.path().join("logs"));
    let store_path = temp.path().join("meta/zingest-meta.json");

    let summary = walk(&temp.path().join("logs"));
    let jobs = assign_jobs(&summary.manifest);
    let cancel = AtomicBool::new(false);
    let importer = MemoryImporter::new();
    let results = run_import(&jobs, &importer, &ImportOptions::default(), &cancel).unwrap();

    let mut store = Metastore::load(&store_path).unwrap();
    store.ensure_database("corp_edge", false).unwrap();
    for result in &results {
        store.record_import("corp_edge", result);
    }
    store.save(&store_path).unwrap();

    // read back from disk, query by (import id, database)
    let reloaded = Metastore::load(&store_path).unwrap();
    let id = results[0].import_id.to_hex();

    let paths = reloaded.paths_for_import(&id, "corp_edge").unwrap();
    assert_eq!(paths.len(), 7);

    let other_db = reloaded.paths_for_import(&id, "other_db").unwrap();
    assert!(other_db.is_empty());

    let unknown = reloaded
        .paths_for_import(&"00".repeat(16), "corp_edge")
        .unwrap();
    assert!(unknown.is_empty());

    assert!(reloaded.paths_for_import("not-hex", "corp_edge").is_err());
}

#[test]
fn rolling_flag_round_trips_through_the_store() {
    let temp = TempDir::new().unwrap();
    let store_path = temp.path().join("meta.json");

    let mut store = Metastore::default();
    store.ensure_database("rolling_db", true).unwrap();
    store.ensure_database("fixed_db", false).unwrap();
    store.save(&store_path).unwrap();

    let reloaded = Metastore::load(&store_path).unwrap();
    assert_eq!(reloaded.rolling("rolling_db"), Some(true));
    assert_eq!(reloaded.rolling("fixed_db"), Some(false));
    assert_eq!(reloaded.rolling("absent"), None);
}
