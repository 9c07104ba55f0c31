//! Ties the stages together: repair, scan, normalize, classify. The core
//! `process` entry point is synchronous and stateless; `CreatorPipeline`
//! wraps it in the extract/transform/load shape the engine drives.

use crate::config::ParserConfig;
use crate::core::filter::{self, FollowerBounds, Outcome};
use crate::core::{normalize, repair, scanner};
use crate::core::repair::RepairStage;
use crate::core::scanner::ScanPath;
use crate::domain::model::ImportSummary;
use crate::domain::ports::{ConfigProvider, DedupStore, MemoryDedupStore, Pipeline, Storage};
use crate::utils::error::{ImportError, Result};
use crate::utils::export;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Runs the full extraction pipeline over one raw text blob. Fails only at
/// the document level; per-element anomalies are skipped or defaulted.
pub fn process(raw_text: &str, config: &ParserConfig) -> Result<ImportSummary> {
    process_inner(raw_text, config, None)
}

/// Like [`process`], with a uniqueness store demoting repeated-id records
/// from accepted to duplicate.
pub fn process_with_store(
    raw_text: &str,
    config: &ParserConfig,
    store: &mut dyn DedupStore,
) -> Result<ImportSummary> {
    process_inner(raw_text, config, Some(store))
}

fn process_inner(
    raw_text: &str,
    config: &ParserConfig,
    mut store: Option<&mut dyn DedupStore>,
) -> Result<ImportSummary> {
    let repaired = repair::repair(raw_text)?;
    if repaired.stage != RepairStage::Strict {
        tracing::info!(stage = ?repaired.stage, "input recovered by lenient parsing");
    }

    check_status_envelope(&repaired.value);

    let scan = scanner::find_record_array(&repaired.value, config)?;
    if let ScanPath::Discovered { path } = &scan.path {
        tracing::info!(%path, "record array discovered by structure scan");
    }

    let bounds = FollowerBounds::from_config(config);
    let mut processed = Vec::new();
    let mut accepted = 0usize;
    let mut filtered = 0usize;
    let mut duplicates = 0usize;

    for raw in &scan.records {
        let Some(record) = normalize::normalize(raw, config) else {
            tracing::debug!("skipping element without a usable identifier");
            continue;
        };

        match filter::classify(&record, &bounds) {
            Outcome::Accepted => {
                let duplicate = store
                    .as_deref_mut()
                    .map(|s| !s.insert(&record.identifier))
                    .unwrap_or(false);
                if duplicate {
                    tracing::debug!(id = %record.identifier, "duplicate id rejected by store");
                    duplicates += 1;
                } else {
                    accepted += 1;
                }
            }
            Outcome::Filtered => filtered += 1,
        }
        processed.push(record);
    }

    tracing::info!(
        total = processed.len(),
        accepted,
        filtered,
        duplicates,
        "pipeline finished"
    );

    Ok(ImportSummary {
        total: processed.len(),
        accepted,
        filtered,
        duplicates,
        min_followers: bounds.min,
        max_followers: bounds.max,
        processed_records: processed,
    })
}

/// Some export tools wrap payloads in a status envelope; a non-zero code
/// usually means the export itself was cut short.
fn check_status_envelope(root: &serde_json::Value) {
    let code = root
        .get("baseResp")
        .and_then(|base| base.get("StatusCode"))
        .and_then(serde_json::Value::as_i64);
    if let Some(code) = code {
        if code != 0 {
            tracing::warn!(status = code, "export status envelope reports a non-zero code");
        }
    }
}

pub struct CreatorPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CreatorPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CreatorPipeline<S, C> {
    async fn extract(&self) -> Result<String> {
        let data = self.storage.read_file(self.config.input_path()).await?;

        let limit = self.config.max_input_bytes();
        if data.len() as u64 > limit {
            return Err(ImportError::InvalidInput(format!(
                "input is {} bytes, limit is {}",
                data.len(),
                limit
            )));
        }

        String::from_utf8(data)
            .map_err(|e| ImportError::InvalidInput(format!("input is not UTF-8: {}", e)))
    }

    async fn transform(&self, raw: String) -> Result<ImportSummary> {
        let parser = self.config.parser_config();
        if self.config.count_duplicates() {
            let mut store = MemoryDedupStore::new();
            process_with_store(&raw, &parser, &mut store)
        } else {
            process(&raw, &parser)
        }
    }

    async fn load(&self, summary: ImportSummary) -> Result<String> {
        let records = &summary.processed_records;
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();

        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => files.push(("processed.csv", export::to_csv(records)?.into_bytes())),
                "tsv" => files.push(("processed.tsv", export::to_tsv(records)?.into_bytes())),
                "json" => files.push((
                    "summary.json",
                    serde_json::to_string_pretty(&summary)?.into_bytes(),
                )),
                other => {
                    return Err(ImportError::ConfigError {
                        message: format!("unsupported output format: {}", other),
                    })
                }
            }
        }

        let output_path = self.config.output_path();

        if self.config.bundle_outputs() {
            let archive_name = format!(
                "import_{}.zip",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            );

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            let archive_path = format!("{}/{}", output_path, archive_name);
            self.storage.write_file(&archive_path, &zip_data).await?;
            Ok(archive_path)
        } else {
            for (name, data) in &files {
                let file_path = format!("{}/{}", output_path, name);
                self.storage.write_file(&file_path, data).await?;
            }
            Ok(output_path.to_string())
        }
    }
}
