//! Parquet scan report read/write operations
//!
//! A report holds one metadata row (location, timing, extractor, totals and
//! rates) followed by one row per checkpoint, all sharing a single nullable
//! schema. Reports are written after a successful scan and are never read
//! back by a scan.

use crate::{Checkpoint, Granularity, ReportMeta, RunningTotals, Summary};
use arrow_array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const ROW_META: &str = "meta";
const ROW_CHECKPOINT: &str = "checkpoint";

/// Everything a report file carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub meta: ReportMeta,
    pub totals: RunningTotals,
    pub checkpoints: Vec<Checkpoint>,
}

impl ScanReport {
    #[must_use]
    pub fn from_summary(summary: &Summary, granularity: Granularity) -> Self {
        Self {
            meta: ReportMeta {
                location: summary.location.clone(),
                started_at: epoch_millis(summary.started_at),
                finished_at: epoch_millis(summary.finished_at),
                extractor: summary.extractor.to_string(),
                granularity: granularity.to_string(),
                objects_scanned: summary.objects_scanned,
                bytes_scanned: summary.bytes_scanned,
            },
            totals: summary.totals,
            checkpoints: summary.checkpoints.clone(),
        }
    }
}

fn epoch_millis(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

/// Return the Arrow schema shared by report writers and readers.
#[must_use]
pub fn report_schema() -> Arc<Schema> {
    let u64_field = |name: &str| Field::new(name, DataType::UInt64, true);
    let str_field = |name: &str| Field::new(name, DataType::Utf8, true);
    let f64_field = |name: &str| Field::new(name, DataType::Float64, true);

    Arc::new(Schema::new(vec![
        Field::new("row_kind", DataType::Utf8, false),
        u64_field("sequence"),
        u64_field("threshold"),
        u64_field("processed_bytes"),
        u64_field("files_seen"),
        u64_field("elapsed_ms"),
        str_field("meta_location"),
        str_field("meta_started_at"),
        str_field("meta_finished_at"),
        str_field("meta_extractor"),
        str_field("meta_granularity"),
        u64_field("meta_objects_scanned"),
        u64_field("meta_bytes_scanned"),
        u64_field("total"),
        u64_field("count_2xx"),
        u64_field("count_4xx"),
        u64_field("count_5xx"),
        u64_field("unclassified"),
        u64_field("malformed"),
        f64_field("rate_2xx"),
        f64_field("rate_4xx"),
        f64_field("rate_5xx"),
    ]))
}

/// Write a report to a Parquet file.
pub fn write_report<P: AsRef<Path>>(path: P, report: &ScanReport) -> Result<()> {
    let file_path = path.as_ref();

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(file_path)?;
    let schema = report_schema();
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema.clone(), Some(props)).map_err(Error::other)?;

    let metadata_batch = create_metadata_batch(&schema, &report.meta, &report.totals)?;
    writer.write(&metadata_batch).map_err(Error::other)?;

    if !report.checkpoints.is_empty() {
        let batch = create_checkpoints_batch(&schema, &report.checkpoints)?;
        writer.write(&batch).map_err(Error::other)?;
    }

    writer.close().map_err(Error::other)?;
    Ok(())
}

/// Read a report from a Parquet file.
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<ScanReport> {
    let file = File::open(path)?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut reader = builder
        .build()
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut meta: Option<(ReportMeta, RunningTotals)> = None;
    let mut checkpoints = Vec::new();

    for batch_result in &mut reader {
        let batch = batch_result.map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

        for row_idx in 0..batch.num_rows() {
            let kind = get_string_value(&batch, "row_kind", row_idx)?;
            match kind.as_deref() {
                Some(ROW_META) if meta.is_none() => {
                    meta = Some(extract_metadata(&batch, row_idx)?);
                }
                Some(ROW_CHECKPOINT) => checkpoints.push(extract_checkpoint(&batch, row_idx)?),
                other => {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!("Unexpected report row kind: {other:?}"),
                    ));
                }
            }
        }
    }

    let (meta, totals) =
        meta.ok_or_else(|| Error::new(ErrorKind::InvalidData, "No metadata found"))?;
    checkpoints.sort_by_key(|checkpoint| checkpoint.sequence);

    Ok(ScanReport {
        meta,
        totals,
        checkpoints,
    })
}

fn strings(len: usize, value: Option<&str>) -> ArrayRef {
    Arc::new(StringArray::from(vec![value; len]))
}

fn u64s(values: Vec<Option<u64>>) -> ArrayRef {
    Arc::new(UInt64Array::from(values))
}

fn f64s(values: Vec<Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

pub fn create_checkpoints_batch(
    schema: &Arc<Schema>,
    checkpoints: &[Checkpoint],
) -> Result<RecordBatch> {
    let len = checkpoints.len();
    let field = |f: fn(&Checkpoint) -> u64| u64s(checkpoints.iter().map(|c| Some(f(c))).collect());

    let mut columns = vec![
        strings(len, Some(ROW_CHECKPOINT)),
        field(|c| c.sequence),
        field(|c| c.threshold),
        field(|c| c.processed_bytes),
        field(|c| c.files_seen),
        field(|c| c.elapsed_ms),
    ];
    columns.extend((0..5).map(|_| strings(len, None)));
    columns.extend((0..8).map(|_| u64s(vec![None; len])));
    columns.extend((0..3).map(|_| f64s(vec![None; len])));

    RecordBatch::try_new(schema.clone(), columns).map_err(Error::other)
}

pub fn create_metadata_batch(
    schema: &Arc<Schema>,
    meta: &ReportMeta,
    totals: &RunningTotals,
) -> Result<RecordBatch> {
    let rates = totals.rates();

    let mut columns = vec![strings(1, Some(ROW_META))];
    columns.extend((0..5).map(|_| u64s(vec![None])));
    columns.extend([
        strings(1, Some(meta.location.as_str())),
        strings(1, Some(meta.started_at.as_str())),
        strings(1, Some(meta.finished_at.as_str())),
        strings(1, Some(meta.extractor.as_str())),
        strings(1, Some(meta.granularity.as_str())),
        u64s(vec![Some(meta.objects_scanned)]),
        u64s(vec![Some(meta.bytes_scanned)]),
        u64s(vec![Some(totals.total)]),
        u64s(vec![Some(totals.count_2xx)]),
        u64s(vec![Some(totals.count_4xx)]),
        u64s(vec![Some(totals.count_5xx)]),
        u64s(vec![Some(totals.unclassified)]),
        u64s(vec![Some(totals.malformed)]),
        f64s(vec![Some(rates.rate_2xx)]),
        f64s(vec![Some(rates.rate_4xx)]),
        f64s(vec![Some(rates.rate_5xx)]),
    ]);

    RecordBatch::try_new(schema.clone(), columns).map_err(Error::other)
}

fn extract_metadata(batch: &RecordBatch, row: usize) -> Result<(ReportMeta, RunningTotals)> {
    let required_string = |name: &str| {
        get_string_value(batch, name, row)?
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, format!("Missing {name}")))
    };

    let meta = ReportMeta {
        location: required_string("meta_location")?,
        started_at: required_string("meta_started_at")?,
        finished_at: required_string("meta_finished_at")?,
        extractor: required_string("meta_extractor")?,
        granularity: required_string("meta_granularity")?,
        objects_scanned: required_u64(batch, "meta_objects_scanned", row)?,
        bytes_scanned: required_u64(batch, "meta_bytes_scanned", row)?,
    };

    let totals = RunningTotals {
        total: required_u64(batch, "total", row)?,
        count_2xx: required_u64(batch, "count_2xx", row)?,
        count_4xx: required_u64(batch, "count_4xx", row)?,
        count_5xx: required_u64(batch, "count_5xx", row)?,
        unclassified: required_u64(batch, "unclassified", row)?,
        malformed: required_u64(batch, "malformed", row)?,
    };

    Ok((meta, totals))
}

fn extract_checkpoint(batch: &RecordBatch, row: usize) -> Result<Checkpoint> {
    Ok(Checkpoint {
        sequence: required_u64(batch, "sequence", row)?,
        threshold: required_u64(batch, "threshold", row)?,
        processed_bytes: required_u64(batch, "processed_bytes", row)?,
        files_seen: required_u64(batch, "files_seen", row)?,
        elapsed_ms: required_u64(batch, "elapsed_ms", row)?,
    })
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a T> {
    let col = batch.column_by_name(col_name).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Missing column: {col_name}"),
        )
    })?;

    col.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Invalid type for: {col_name}"),
        )
    })
}

fn get_string_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<String>> {
    let array = column::<StringArray>(batch, col_name)?;
    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row).to_string()))
    }
}

fn required_u64(batch: &RecordBatch, col_name: &str, row: usize) -> Result<u64> {
    let array = column::<UInt64Array>(batch, col_name)?;
    if array.is_null(row) {
        Err(Error::new(
            ErrorKind::InvalidData,
            format!("Missing {col_name}"),
        ))
    } else {
        Ok(array.value(row))
    }
}
