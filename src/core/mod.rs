pub mod date;
pub mod etl;
pub mod filter;
pub mod flatten;
pub mod pipeline;
pub mod price;
pub mod profile;

pub use crate::domain::model::{Dataset, Record, RunSummary, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
