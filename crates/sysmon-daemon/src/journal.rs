//! Anomaly event log and weekday × hour heatmap.
//!
//! Only WARN and ALERT outcomes are recorded; everything else the engine
//! reports is transient.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sysmon_engine::{HealthState, MetricKey, MetricStatus};

use crate::error::DaemonResult;
use crate::profile::write_atomic;

// ── Event Log ───────────────────────────────────────────────────────────

/// One recorded anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub timestamp: DateTime<Utc>,
    pub metric: MetricKey,
    pub status: HealthState,
    pub value: f64,
}

/// Bounded, oldest-first list of anomaly events.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<AnomalyEvent>,
    max_events: usize,
}

impl EventLog {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events: max_events.max(1),
        }
    }

    /// Record `status` if it is WARN or ALERT. Returns whether it was kept.
    pub fn record(&mut self, status: &MetricStatus) -> bool {
        if !status.state.is_loggable() {
            return false;
        }
        if self.events.len() == self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(AnomalyEvent {
            timestamp: status.evaluated_at,
            metric: status.metric.clone(),
            status: status.state,
            value: status.value,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &AnomalyEvent> {
        self.events.iter()
    }

    /// Write the log as a JSON array. An empty log writes nothing.
    pub fn export_json(&self, path: &Path) -> DaemonResult<usize> {
        if self.events.is_empty() {
            return Ok(0);
        }
        let events: Vec<&AnomalyEvent> = self.events.iter().collect();
        let json = serde_json::to_string_pretty(&events)?;
        write_atomic(path, json.as_bytes())?;
        Ok(events.len())
    }
}

// ── Heatmap ─────────────────────────────────────────────────────────────

/// Anomaly weight per weekday (Monday first) and local hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    cells: [[u32; 24]; 7],
}

impl Heatmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `state`'s weight to the cell for local time `at`.
    pub fn record_at(&mut self, state: HealthState, at: DateTime<Local>) {
        let weight = state.weight();
        if weight == 0 {
            return;
        }
        let day = at.weekday().num_days_from_monday() as usize;
        let hour = at.hour() as usize;
        self.cells[day][hour] = self.cells[day][hour].saturating_add(weight);
    }

    pub fn record(&mut self, state: HealthState) {
        self.record_at(state, Local::now());
    }

    /// Weight of one cell; out-of-range coordinates read as zero.
    pub fn get(&self, day: usize, hour: usize) -> u32 {
        self.cells
            .get(day)
            .and_then(|row| row.get(hour))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.cells.iter().flatten().sum()
    }

    /// Rows by weekday, Monday first.
    pub fn rows(&self) -> &[[u32; 24]; 7] {
        &self.cells
    }

    /// Write the grid as JSON: seven rows of 24 hourly weights. An empty
    /// heatmap writes nothing.
    pub fn export_json(&self, path: &Path) -> DaemonResult<u32> {
        let total = self.total();
        if total == 0 {
            return Ok(0);
        }
        let json = serde_json::to_string_pretty(&self.cells)?;
        write_atomic(path, json.as_bytes())?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn status(state: HealthState, value: f64) -> MetricStatus {
        MetricStatus {
            metric: MetricKey::new("cpu"),
            value,
            unit: "%".into(),
            state,
            mean: Some(10.0),
            stdev: Some(1.0),
            z_score: Some(value - 10.0),
            samples: 60,
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_warn_and_alert_are_logged() {
        let mut log = EventLog::new(10);
        assert!(!log.record(&status(HealthState::Ok, 10.5)));
        assert!(!log.record(&status(HealthState::Stable, 10.0)));
        assert!(!log.record(&status(HealthState::Learn, 10.0)));
        assert!(log.record(&status(HealthState::Warn, 12.0)));
        assert!(log.record(&status(HealthState::Alert, 15.0)));
        assert_eq!(log.len(), 2);
        let states: Vec<HealthState> = log.events().map(|e| e.status).collect();
        assert_eq!(states, vec![HealthState::Warn, HealthState::Alert]);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.record(&status(HealthState::Alert, i as f64));
        }
        let values: Vec<f64> = log.events().map(|e| e.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_export_round_trip() {
        let mut log = EventLog::new(10);
        let path = std::env::temp_dir().join(format!("sysmon-events-{}.json", uuid::Uuid::new_v4()));

        assert_eq!(log.export_json(&path).unwrap(), 0);
        assert!(!path.exists());

        log.record(&status(HealthState::Warn, 12.0));
        log.record(&status(HealthState::Alert, 16.0));
        assert_eq!(log.export_json(&path).unwrap(), 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        let events: Vec<AnomalyEvent> = serde_json::from_str(&raw).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].status, HealthState::Alert);
        assert_eq!(events[1].metric.as_str(), "cpu");
        assert!(raw.contains("\"status\": \"WARN\""));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_heatmap_weights() {
        let mut heatmap = Heatmap::new();
        // 2024-01-03 is a Wednesday.
        let at = Local.with_ymd_and_hms(2024, 1, 3, 14, 30, 0).unwrap();
        heatmap.record_at(HealthState::Warn, at);
        heatmap.record_at(HealthState::Alert, at);
        heatmap.record_at(HealthState::Ok, at);
        heatmap.record_at(HealthState::Learn, at);
        assert_eq!(heatmap.get(2, 14), 3);
        assert_eq!(heatmap.total(), 3);
        assert_eq!(heatmap.get(9, 99), 0);
        assert_eq!(heatmap.rows()[2][14], 3);
    }

    #[test]
    fn test_heatmap_export() {
        let path = std::env::temp_dir().join(format!("sysmon-heatmap-{}.json", uuid::Uuid::new_v4()));
        let mut heatmap = Heatmap::new();
        assert_eq!(heatmap.export_json(&path).unwrap(), 0);
        assert!(!path.exists());

        // 2024-01-07 is a Sunday.
        let at = Local.with_ymd_and_hms(2024, 1, 7, 23, 5, 0).unwrap();
        heatmap.record_at(HealthState::Alert, at);
        assert_eq!(heatmap.export_json(&path).unwrap(), 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<Vec<u32>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|r| r.len() == 24));
        assert_eq!(rows[6][23], 2);

        let _ = std::fs::remove_file(&path);
    }

    fn any_state() -> impl Strategy<Value = HealthState> {
        prop_oneof![
            Just(HealthState::Learn),
            Just(HealthState::Stable),
            Just(HealthState::Ok),
            Just(HealthState::Warn),
            Just(HealthState::Alert),
        ]
    }

    proptest! {
        #[test]
        fn log_keeps_most_recent_loggable_events(
            max in 1usize..20,
            states in proptest::collection::vec(any_state(), 0..100),
        ) {
            let mut log = EventLog::new(max);
            let mut heatmap = Heatmap::new();
            let at = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
            for (i, state) in states.iter().enumerate() {
                log.record(&status(*state, i as f64));
                heatmap.record_at(*state, at);
            }
            let loggable: Vec<f64> = states
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_loggable())
                .map(|(i, _)| i as f64)
                .collect();
            let start = loggable.len().saturating_sub(max);
            let kept: Vec<f64> = log.events().map(|e| e.value).collect();
            prop_assert_eq!(kept, loggable[start..].to_vec());

            let weight: u32 = states.iter().map(|s| s.weight()).sum();
            prop_assert_eq!(heatmap.total(), weight);
        }
    }
}
