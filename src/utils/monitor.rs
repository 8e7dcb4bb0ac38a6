use crate::domain::model::RunSummary;
use std::time::Duration;
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// 某個階段結束時的資源快照，連同該階段處理的對戰數
#[derive(Debug, Clone, PartialEq)]
pub struct StageSample {
    pub stage: &'static str,
    pub ties: usize,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub elapsed: Duration,
}

pub fn peak_memory_mb(samples: &[StageSample]) -> u64 {
    samples.iter().map(|s| s.memory_mb).max().unwrap_or(0)
}

/// 經過時間為零時無法計算
pub fn ties_per_second(ties: usize, elapsed: Duration) -> Option<f64> {
    let seconds = elapsed.as_secs_f64();
    (seconds > 0.0).then(|| ties as f64 / seconds)
}

#[cfg_attr(not(feature = "cli"), allow(dead_code))]
fn final_line(summary: &RunSummary, samples: &[StageSample], elapsed: Duration) -> String {
    let throughput = ties_per_second(summary.loaded_matches, elapsed)
        .map(|rate| format!("{:.0} ties/s", rate))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} tie(s) loaded, {} written in {:?}, Peak Memory: {}MB, Throughput: {}",
        summary.loaded_matches,
        summary.written,
        elapsed,
        peak_memory_mb(samples),
        throughput
    )
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    samples: Mutex<Vec<StageSample>>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };
        if enabled && pid.is_none() {
            tracing::warn!("Unable to resolve current PID, system stats disabled");
        }

        Self {
            system: Mutex::new(System::new()),
            pid,
            start_time: Instant::now(),
            samples: Mutex::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pid.is_some()
    }

    /// 記錄階段結束時的 CPU 與記憶體，`ties` 為該階段輸出的對戰數
    pub fn record_stage(&self, stage: &'static str, ties: usize) -> Option<StageSample> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = system.process(pid)?;

        let sample = StageSample {
            stage,
            ties,
            cpu_usage: process.cpu_usage(),
            memory_mb: process.memory() / 1024 / 1024,
            elapsed: self.start_time.elapsed(),
        };

        tracing::info!(
            "📊 {} - {} tie(s), CPU: {:.1}%, Memory: {}MB, Time: {:?}",
            sample.stage,
            sample.ties,
            sample.cpu_usage,
            sample.memory_mb,
            sample.elapsed
        );

        self.samples.lock().ok()?.push(sample.clone());
        Some(sample)
    }

    pub fn samples(&self) -> Vec<StageSample> {
        self.samples
            .lock()
            .map(|samples| samples.clone())
            .unwrap_or_default()
    }

    pub fn log_final_stats(&self, summary: &RunSummary) {
        if !self.is_enabled() {
            return;
        }
        tracing::info!(
            "📊 Final Stats - {}",
            final_line(summary, &self.samples(), self.start_time.elapsed())
        );
    }
}

// 非 CLI 環境沒有 sysinfo，只保留介面
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn record_stage(&self, _stage: &'static str, _ties: usize) -> Option<StageSample> {
        None
    }

    pub fn samples(&self) -> Vec<StageSample> {
        Vec::new()
    }

    pub fn log_final_stats(&self, _summary: &RunSummary) {}
}
