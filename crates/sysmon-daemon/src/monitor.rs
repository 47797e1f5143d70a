//! Poll driver: collects from a source, feeds the engine and records anomalies.

use std::future::Future;
use std::path::Path;

use sysmon_engine::{EngineError, HealthState, MetricEngine, SampleReport};
use tokio::time::{interval, MissedTickBehavior};

use crate::config::{DaemonConfig, MonitorConfig};
use crate::error::DaemonResult;
use crate::journal::{EventLog, Heatmap};
use crate::profile::ProfileRecorder;
use crate::render::report_line;
use crate::source::{self, MetricsSource, RawSample};

/// Why [`Monitor::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source has nothing more to deliver.
    Exhausted,
    /// `max_ticks` was reached.
    TickBudget,
    /// A profiling capture finished and the monitor was asked to stop then.
    ProfileComplete,
    /// The shutdown future resolved.
    Shutdown,
}

/// Single owner of the engine; drives one tick per polling period.
pub struct Monitor {
    engine: MetricEngine,
    source: Box<dyn MetricsSource>,
    config: MonitorConfig,
    journal: EventLog,
    heatmap: Heatmap,
    recorder: Option<ProfileRecorder>,
    stop_after_profile: bool,
    ticks: u64,
}

impl Monitor {
    pub fn new(
        engine: MetricEngine,
        source: Box<dyn MetricsSource>,
        config: MonitorConfig,
        max_events: usize,
    ) -> Self {
        Self {
            engine,
            source,
            config,
            journal: EventLog::new(max_events),
            heatmap: Heatmap::new(),
            recorder: None,
            stop_after_profile: false,
            ticks: 0,
        }
    }

    /// Build engine, source and recorder from a validated configuration.
    pub fn from_config(config: &DaemonConfig) -> DaemonResult<Self> {
        config.validate()?;
        let engine = MetricEngine::new(config.engine.clone())?;
        let source = source::from_config(&config.monitor)?;
        let recorder = ProfileRecorder::new(
            std::time::Duration::from_secs(config.profile.duration_secs),
            config.profile.resolve_output_dir(),
        );
        Ok(Self::new(engine, source, config.monitor.clone(), config.journal.max_events)
            .with_recorder(recorder))
    }

    pub fn with_recorder(mut self, recorder: ProfileRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Start a profiling capture. With `stop_when_done`, [`Monitor::run`]
    /// returns once the capture is saved.
    pub fn start_profiling(&mut self, stop_when_done: bool) -> bool {
        match self.recorder.as_mut() {
            Some(recorder) => {
                let started = recorder.start();
                if started {
                    self.stop_after_profile = stop_when_done;
                }
                started
            }
            None => {
                tracing::warn!("No profile recorder configured");
                false
            }
        }
    }

    pub fn engine(&self) -> &MetricEngine {
        &self.engine
    }

    pub fn journal(&self) -> &EventLog {
        &self.journal
    }

    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Collect once and evaluate every accepted sample.
    ///
    /// A rejected sample is logged and skipped; the rest of the batch is
    /// still evaluated.
    pub async fn tick(&mut self) -> DaemonResult<Vec<SampleReport>> {
        let samples = self.source.collect().await?;
        self.ticks += 1;

        let horizon = self.engine.config().forecast.horizon_minutes;
        let mut accepted: Vec<RawSample> = Vec::with_capacity(samples.len());
        let mut reports = Vec::with_capacity(samples.len());

        for sample in samples {
            if !self.config.accepts(sample.metric.as_str()) {
                continue;
            }
            let report = match self
                .engine
                .push_sample(sample.metric.clone(), sample.value, &sample.unit)
            {
                Ok(report) => report,
                Err(EngineError::NonFiniteSample { metric, value }) => {
                    tracing::warn!(metric = %metric, value, "Skipping non-finite sample");
                    continue;
                }
                Err(EngineError::StatisticsOverflow { metric, value }) => {
                    tracing::warn!(metric = %metric, value, "Skipping sample that overflows its baseline");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            self.note(&report);
            tracing::debug!("{}", report_line(&report, horizon));
            accepted.push(sample);
            reports.push(report);
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(&accepted);
        }

        Ok(reports)
    }

    fn note(&mut self, report: &SampleReport) {
        let status = &report.status;
        if !self.journal.record(status) {
            return;
        }
        self.heatmap.record(status.state);
        match status.state {
            HealthState::Alert => tracing::error!(
                metric = %status.metric,
                value = status.value,
                z = status.z_score.unwrap_or_default(),
                "Anomaly: ALERT"
            ),
            _ => tracing::warn!(
                metric = %status.metric,
                value = status.value,
                z = status.z_score.unwrap_or_default(),
                "Anomaly: WARN"
            ),
        }
    }

    /// Save the capture if its window has elapsed. Returns whether a capture
    /// finished on this call.
    fn finish_profile_if_complete(&mut self) -> bool {
        let Some(recorder) = self.recorder.as_mut() else {
            return false;
        };
        if !recorder.is_complete() {
            return false;
        }
        if let Err(e) = recorder.finish() {
            tracing::error!(error = %e, "Failed to save profiling capture");
        }
        true
    }

    /// Tick every polling period until the source is exhausted, the tick
    /// budget is spent, a capture completes (if requested) or `shutdown`
    /// resolves.
    pub async fn run<F>(&mut self, shutdown: F) -> DaemonResult<StopReason>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let period = self.engine.config().poll_interval();
        let mut ticker = interval(period);
        // Each sample stands for one period; a stalled poll must not be
        // followed by a burst of catch-up samples.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            source = self.source.name(),
            period_ms = period.as_millis() as u64,
            "Monitor started"
        );

        let reason = loop {
            if self.source.is_exhausted() {
                break StopReason::Exhausted;
            }
            if let Some(max) = self.config.max_ticks {
                if self.ticks >= max {
                    break StopReason::TickBudget;
                }
            }

            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::error!(error = %e, "Tick failed");
                    }
                    if self.finish_profile_if_complete() && self.stop_after_profile {
                        break StopReason::ProfileComplete;
                    }
                }
                _ = &mut shutdown => {
                    break StopReason::Shutdown;
                }
            }
        };

        if let Some(recorder) = self.recorder.as_mut() {
            if recorder.is_active() {
                if let Err(e) = recorder.finish() {
                    tracing::error!(error = %e, "Failed to save partial profiling capture");
                }
            }
        }

        tracing::info!(
            ticks = self.ticks,
            events = self.journal.len(),
            heatmap_weight = self.heatmap.total(),
            reason = ?reason,
            "Monitor stopped"
        );
        Ok(reason)
    }

    /// Export the anomaly log as JSON.
    pub fn export_journal(&self, path: &Path) -> DaemonResult<usize> {
        let written = self.journal.export_json(path)?;
        tracing::info!(path = %path.display(), events = written, "Event log exported");
        Ok(written)
    }

    /// Export the weekday × hour anomaly heatmap as JSON.
    pub fn export_heatmap(&self, path: &Path) -> DaemonResult<u32> {
        let weight = self.heatmap.export_json(path)?;
        tracing::info!(path = %path.display(), weight, "Heatmap exported");
        Ok(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaemonError;
    use crate::profile::{load_snapshots, ProfileSnapshot};
    use crate::source::ReplaySource;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Emits a scripted value per tick for a fixed metric set.
    struct ScriptedSource {
        cpu: Vec<f64>,
        next: usize,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl MetricsSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn collect(&mut self) -> DaemonResult<Vec<RawSample>> {
            let i = self.next;
            self.next += 1;
            if self.fail_at == Some(i) {
                return Err(DaemonError::Source("probe failed".into()));
            }
            let cpu = self.cpu.get(i).copied().unwrap_or(20.0);
            Ok(vec![
                RawSample::new("cpu", cpu, "%"),
                RawSample::new("ram", 40.0, "%"),
            ])
        }
    }

    fn scripted(cpu: Vec<f64>) -> Box<dyn MetricsSource> {
        Box::new(ScriptedSource {
            cpu,
            next: 0,
            fail_at: None,
        })
    }

    fn jittered(n: usize) -> Vec<f64> {
        (0..n).map(|i| 20.0 + (i % 3) as f64).collect()
    }

    #[tokio::test]
    async fn test_tick_evaluates_every_metric() {
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            scripted(vec![]),
            MonitorConfig::default(),
            100,
        );
        let reports = monitor.tick().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status.state, HealthState::Learn);
        assert_eq!(monitor.ticks(), 1);
    }

    #[tokio::test]
    async fn test_allow_list_filters_metrics() {
        let config = MonitorConfig {
            metrics: vec!["ram".into()],
            ..MonitorConfig::default()
        };
        let mut monitor = Monitor::new(MetricEngine::with_defaults(), scripted(vec![]), config, 100);
        let reports = monitor.tick().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status.metric.as_str(), "ram");
    }

    #[tokio::test]
    async fn test_non_finite_sample_is_skipped() {
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            scripted(vec![f64::NAN]),
            MonitorConfig::default(),
            100,
        );
        let reports = monitor.tick().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status.metric.as_str(), "ram");
    }

    #[tokio::test]
    async fn test_spike_is_journaled() {
        let mut cpu = jittered(30);
        cpu.push(95.0);
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            scripted(cpu),
            MonitorConfig::default(),
            100,
        );
        for _ in 0..31 {
            monitor.tick().await.unwrap();
        }
        assert_eq!(monitor.journal().len(), 1);
        let event = monitor.journal().events().next().unwrap();
        assert_eq!(event.status, HealthState::Alert);
        assert_eq!(event.metric.as_str(), "cpu");
        assert_eq!(monitor.heatmap().total(), 2);

        let path = std::env::temp_dir().join(format!("sysmon-heatmap-{}.json", uuid::Uuid::new_v4()));
        assert_eq!(monitor.export_heatmap(&path).unwrap(), 2);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_overflowing_sample_is_skipped() {
        let mut cpu = vec![1.0e308; 11];
        cpu.push(-1.0e308);
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            scripted(cpu),
            MonitorConfig::default(),
            100,
        );
        for _ in 0..11 {
            monitor.tick().await.unwrap();
        }
        let reports = monitor.tick().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status.metric.as_str(), "ram");
        assert_eq!(monitor.engine().detector().sample_count(&"cpu".into()), 11);
        assert_eq!(monitor.engine().forecaster().history(&"cpu".into()).unwrap().count(), 11);
    }

    /// Records when each poll starts and stalls on one of them.
    struct StallingSource {
        polls: Arc<Mutex<Vec<Instant>>>,
        stall_on: usize,
    }

    #[async_trait]
    impl MetricsSource for StallingSource {
        fn name(&self) -> &str {
            "stalling"
        }

        async fn collect(&mut self) -> DaemonResult<Vec<RawSample>> {
            let poll = {
                let mut polls = self.polls.lock().unwrap();
                polls.push(Instant::now());
                polls.len()
            };
            if poll == self.stall_on {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(vec![RawSample::new("cpu", 20.0, "%")])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_poll_does_not_burst() {
        let polls = Arc::new(Mutex::new(Vec::new()));
        let source = Box::new(StallingSource {
            polls: polls.clone(),
            stall_on: 2,
        });
        let config = MonitorConfig {
            max_ticks: Some(6),
            ..MonitorConfig::default()
        };
        let mut monitor = Monitor::new(MetricEngine::with_defaults(), source, config, 100);
        monitor.run(std::future::pending()).await.unwrap();

        let polls = polls.lock().unwrap();
        assert_eq!(polls.len(), 6);
        let gaps: Vec<Duration> = polls.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.iter().all(|g| *g >= Duration::from_secs(1)), "{gaps:?}");
        assert!(gaps[1] >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_tick_budget() {
        let config = MonitorConfig {
            max_ticks: Some(5),
            ..MonitorConfig::default()
        };
        let mut monitor = Monitor::new(MetricEngine::with_defaults(), scripted(vec![]), config, 100);
        let reason = monitor.run(std::future::pending()).await.unwrap();
        assert_eq!(reason, StopReason::TickBudget);
        assert_eq!(monitor.ticks(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_source_failure() {
        let source = Box::new(ScriptedSource {
            cpu: vec![],
            next: 0,
            fail_at: Some(1),
        });
        let config = MonitorConfig {
            max_ticks: Some(3),
            ..MonitorConfig::default()
        };
        let mut monitor = Monitor::new(MetricEngine::with_defaults(), source, config, 100);
        let reason = monitor.run(std::future::pending()).await.unwrap();
        assert_eq!(reason, StopReason::TickBudget);
        // The failed poll does not count as a tick.
        assert_eq!(monitor.ticks(), 3);
        assert_eq!(monitor.engine().detector().sample_count(&"cpu".into()), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_replays_until_exhausted() {
        let snapshots: Vec<ProfileSnapshot> = (0..15)
            .map(|i| {
                ProfileSnapshot::from_samples(
                    Utc::now(),
                    &[RawSample::new("disk", 10.0 * (i + 1) as f64, "%")],
                )
            })
            .collect();
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            Box::new(ReplaySource::from_snapshots(snapshots)),
            MonitorConfig::default(),
            100,
        );
        let reason = monitor.run(std::future::pending()).await.unwrap();
        assert_eq!(reason, StopReason::Exhausted);
        assert_eq!(monitor.ticks(), 15);
        let forecast = monitor
            .engine()
            .forecast_with_threshold(&"disk".into(), 80.0);
        assert_eq!(forecast.minutes(), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            scripted(vec![]),
            MonitorConfig::default(),
            100,
        );
        let reason = monitor
            .run(tokio::time::sleep(Duration::from_millis(3500)))
            .await
            .unwrap();
        assert_eq!(reason, StopReason::Shutdown);
        assert_eq!(monitor.ticks(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_capture_stops_run() {
        let dir = std::env::temp_dir().join(format!("sysmon-monitor-{}", uuid::Uuid::new_v4()));
        let mut monitor = Monitor::new(
            MetricEngine::with_defaults(),
            scripted(vec![]),
            MonitorConfig::default(),
            100,
        )
        .with_recorder(ProfileRecorder::new(Duration::from_secs(5), &dir));
        assert!(monitor.start_profiling(true));

        let reason = monitor.run(std::future::pending()).await.unwrap();
        assert_eq!(reason, StopReason::ProfileComplete);

        let saved: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(saved.len(), 1);
        let snapshots = load_snapshots(&saved[0]).unwrap();
        assert!(snapshots.len() >= 5);
        assert!(snapshots[0].metrics.contains_key("cpu"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
