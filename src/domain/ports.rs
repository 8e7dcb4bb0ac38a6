use crate::core::filter::CompetitivenessPolicy;
use crate::core::standings::DuplicateStandingsPolicy;
use crate::core::writer::{OutputFormat, OutputProfile};
use crate::domain::model::{SourceTables, TransformResult};
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
    fn data_path(&self) -> &str;
    fn match_file(&self) -> &str;
    fn group_file(&self) -> &str;
    fn output_file(&self) -> &str;
    fn competitiveness(&self) -> CompetitivenessPolicy;
    fn output_profile(&self) -> OutputProfile;

    fn duplicate_policy(&self) -> DuplicateStandingsPolicy {
        DuplicateStandingsPolicy::Reject
    }

    fn drop_undetermined(&self) -> bool {
        false
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        vec![OutputFormat::Csv]
    }

    /// 啟用壓縮時的 zip 檔名
    fn bundle_filename(&self) -> Option<String> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceTables>;
    async fn transform(&self, tables: SourceTables) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
