pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, ParserConfig, TomlConfig};
pub use crate::core::engine::ImportEngine;
pub use crate::core::filter::{classify, FollowerBounds, Outcome};
pub use crate::core::normalize::normalize;
pub use crate::core::pipeline::{process, process_with_store, CreatorPipeline};
pub use crate::core::profiles::{import_profiles, ProfileRow};
pub use crate::core::repair::{repair, RepairStage, Repaired};
pub use crate::core::scanner::{find_record_array, ScanOutcome, ScanPath};
pub use crate::domain::model::{CreatorRecord, ImportSummary, RecordId};
pub use crate::domain::ports::{ConfigProvider, DedupStore, MemoryDedupStore, Pipeline, Storage};
pub use crate::utils::error::{ImportError, Result};
