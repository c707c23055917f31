//! Output formatting for CLI

use crate::WalkSummary;
use crate::services::import::BucketResult;

/// Machine-readable rendering of a walk summary.
#[must_use]
pub fn format_json(summary: &WalkSummary) -> String {
    let value = serde_json::json!({
        "root": summary.root,
        "days": summary.manifest.days,
        "errors": summary.errors,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

/// Human-readable manifest listing: one line per (day, hour, kind) slot.
pub fn print_manifest_text(summary: &WalkSummary) {
    println!("Manifest for {}", summary.root);

    for (day_idx, day) in summary.manifest.days.iter().enumerate() {
        let label = if day.key.is_empty() {
            "(unsegmented)".to_string()
        } else {
            day.key.clone()
        };
        println!("Day {day_idx} {label}");

        for (hour_idx, hour) in day.hours.iter().enumerate() {
            let Some(bucket) = hour else { continue };
            for (kind, paths) in &bucket.kinds {
                for path in paths {
                    println!("  {hour_idx:02}:00 {:<9} {}", kind.as_token(), path.display());
                }
            }
        }
    }

    if !summary.errors.is_empty() {
        println!();
        println!("Skipped files:");
        for error in &summary.errors {
            println!("  {:<32} {}", error.kind.to_string(), error.path);
        }
    }

    println!();
    println!(
        "{} files across {} day bucket(s), {} skipped",
        summary.manifest.file_count(),
        summary.manifest.days.len(),
        summary.errors.len()
    );
}

/// Per-bucket import outcome listing.
pub fn print_import_results(results: &[BucketResult]) {
    for result in results {
        println!(
            "import {} day {} hour {:02}: {} files, {} records",
            result.import_id,
            result.day,
            result.hour,
            result.paths.len(),
            result.records
        );
    }
}
