pub mod etl;
pub mod features;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod standings;
pub mod winner;
pub mod writer;

pub use crate::domain::model::{SourceTables, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
