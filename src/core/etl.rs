use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting data model build");

        // Extract
        let tables = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Loaded {} tie(s) and {} standings row(s)",
            tables.matches.len(),
            tables.standings.len()
        );
        self.monitor.record_stage("Extract", tables.matches.len());

        // Transform
        let result = self.pipeline.transform(tables).await?;
        let summary = result.summary.clone();
        tracing::info!(
            "🔄 Enriched ties: {} anomalous excluded, {} undetermined, {} join miss(es), {} filtered out, {} kept",
            summary.anomalies_excluded,
            summary.undetermined_winners,
            summary.join_misses,
            summary.filtered_out,
            summary.written
        );
        self.monitor.record_stage("Transform", summary.written);

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.record_stage("Load", summary.written);
        self.monitor.log_final_stats(&summary);

        Ok(output_path)
    }
}
