use crate::config::ParserConfig;
use crate::domain::model::{ImportSummary, RecordId};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle_outputs(&self) -> bool;
    fn count_duplicates(&self) -> bool;
    fn max_input_bytes(&self) -> u64;
    fn parser_config(&self) -> ParserConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, raw: String) -> Result<ImportSummary>;
    async fn load(&self, summary: ImportSummary) -> Result<String>;
}

/// Uniqueness constraint on record ids. The original system backs this with a
/// database unique index; anything enforcing "seen before" fits.
pub trait DedupStore {
    /// Records the id; returns false when it was already present.
    fn insert(&mut self, id: &RecordId) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    seen: HashSet<RecordId>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupStore for MemoryDedupStore {
    fn insert(&mut self, id: &RecordId) -> bool {
        self.seen.insert(id.clone())
    }
}
