use crate::core::date::YearWindow;
use crate::core::flatten::LabelTable;
use crate::core::price::RateTable;
use crate::core::profile::SourceKind;
use crate::domain::model::{Dataset, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> SourceKind;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn year_window(&self) -> YearWindow;
    fn tag_labels(&self) -> &LabelTable;
    fn currency_rates(&self) -> &RateTable;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
