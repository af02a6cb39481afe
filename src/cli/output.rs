//! Output formatting for CLI

use crate::io::report::ScanReport;
use crate::services::checkpoint::{GIB, KIB, MIB};
use crate::services::format::format_size;
use crate::{Checkpoint, Granularity, RateResult, Summary};

/// One progress line, e.g. `Checkpoint: ~5 GiB processed after 1.23 min (10 files)`.
#[must_use]
pub fn format_checkpoint(checkpoint: &Checkpoint, granularity: Granularity) -> String {
    let reached = match granularity {
        Granularity::Bytes(_) => format!("~{}", format_threshold(checkpoint.threshold)),
        Granularity::Files(_) => format!("~{}", format_size(checkpoint.processed_bytes)),
    };

    format!(
        "Checkpoint: {reached} processed after {:.2} min ({} files)",
        checkpoint.elapsed_minutes(),
        checkpoint.files_seen
    )
}

/// Thresholds are whole multiples of the granularity, so show them without decimals.
fn format_threshold(bytes: u64) -> String {
    for (unit, label) in [(GIB, "GiB"), (MIB, "MiB"), (KIB, "KiB")] {
        if bytes >= unit && bytes % unit == 0 {
            return format!("{} {label}", bytes / unit);
        }
    }
    format_size(bytes)
}

fn rates_lines(rates: &RateResult) -> [String; 3] {
    [
        format!("  rate_2xx = {:.4}", rates.rate_2xx),
        format!("  rate_4xx = {:.4}", rates.rate_4xx),
        format!("  rate_5xx = {:.4}", rates.rate_5xx),
    ]
}

/// Format summary as human-readable text
#[must_use]
pub fn format_text(summary: &Summary) -> String {
    let mut lines = vec![format!("Final results for {}:", summary.location)];
    lines.extend(rates_lines(&summary.rates));
    lines.push(format!(
        "  {} classified records ({} unclassified, {} malformed) in {} objects ({})",
        summary.totals.total,
        summary.totals.unclassified,
        summary.totals.malformed,
        summary.objects_scanned,
        format_size(summary.bytes_scanned)
    ));
    lines.push(format!(
        "Total elapsed time: {:.2} minutes",
        summary.elapsed_minutes()
    ));
    lines.join("\n")
}

/// Format summary as JSON
#[must_use]
pub fn format_json(summary: &Summary) -> String {
    let output = serde_json::json!({
        "location": summary.location,
        "rate_2xx": summary.rates.rate_2xx,
        "rate_4xx": summary.rates.rate_4xx,
        "rate_5xx": summary.rates.rate_5xx,
        "totals": summary.totals,
        "objects_scanned": summary.objects_scanned,
        "bytes_scanned": summary.bytes_scanned,
        "extractor": summary.extractor.as_str(),
        "checkpoints": summary.checkpoints,
        "elapsed_minutes": summary.elapsed_minutes(),
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Format a saved report as human-readable text
#[must_use]
pub fn format_report_text(report: &ScanReport) -> String {
    let meta = &report.meta;
    let mut lines = vec![
        format!("Report for {}", meta.location),
        format!(
            "  extractor {}, checkpoint every {}, {} objects ({})",
            meta.extractor,
            meta.granularity,
            meta.objects_scanned,
            format_size(meta.bytes_scanned)
        ),
    ];

    for checkpoint in &report.checkpoints {
        lines.push(format!(
            "  #{} at {} after {:.2} min ({} files)",
            checkpoint.sequence,
            checkpoint.threshold,
            checkpoint.elapsed_minutes(),
            checkpoint.files_seen
        ));
    }

    lines.extend(rates_lines(&report.totals.rates()));
    lines.join("\n")
}

/// Format a saved report as JSON
#[must_use]
pub fn format_report_json(report: &ScanReport) -> String {
    let rates = report.totals.rates();
    let output = serde_json::json!({
        "meta": report.meta,
        "rate_2xx": rates.rate_2xx,
        "rate_4xx": rates.rate_4xx,
        "rate_5xx": rates.rate_5xx,
        "totals": report.totals,
        "checkpoints": report.checkpoints,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
