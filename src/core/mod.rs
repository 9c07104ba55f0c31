pub mod engine;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod profiles;
pub mod repair;
pub mod scanner;

pub use crate::domain::model::{CreatorRecord, ImportSummary, RecordId};
pub use crate::domain::ports::{ConfigProvider, DedupStore, Pipeline, Storage};
pub use crate::utils::error::Result;
