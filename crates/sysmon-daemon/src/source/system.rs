//! Live host metrics via `sysinfo`.

use std::time::Instant;

use async_trait::async_trait;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};

use super::{MetricsSource, RawSample};
use crate::error::DaemonResult;

/// Reports `cpu`, `ram` and `disk` in percent and `net_down` / `net_up` in KB/s.
pub struct SystemSource {
    system: System,
    disks: Disks,
    networks: Networks,
    last_net: Option<NetTotals>,
}

#[derive(Debug, Clone, Copy)]
struct NetTotals {
    received: u64,
    transmitted: u64,
    at: Instant,
}

impl SystemSource {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            last_net: None,
        }
    }

    fn net_totals(&self) -> NetTotals {
        let (received, transmitted) = self
            .networks
            .list()
            .iter()
            .fold((0u64, 0u64), |(rx, tx), (_, data)| {
                (
                    rx.saturating_add(data.total_received()),
                    tx.saturating_add(data.total_transmitted()),
                )
            });
        NetTotals {
            received,
            transmitted,
            at: Instant::now(),
        }
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsSource for SystemSource {
    fn name(&self) -> &str {
        "system"
    }

    async fn collect(&mut self) -> DaemonResult<Vec<RawSample>> {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();
        self.disks.refresh(true);
        self.networks.refresh(true);

        let cpu = self.system.global_cpu_usage() as f64;
        let ram = used_percent(
            self.system.total_memory(),
            self.system.total_memory().saturating_sub(self.system.used_memory()),
        );

        let (disk_total, disk_available) = self
            .disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, avail), disk| {
                (
                    total.saturating_add(disk.total_space()),
                    avail.saturating_add(disk.available_space()),
                )
            });
        let disk = used_percent(disk_total, disk_available);

        let now = self.net_totals();
        let (down, up) = match self.last_net {
            Some(prev) => {
                let secs = now.at.duration_since(prev.at).as_secs_f64();
                (
                    rate_kb_per_sec(prev.received, now.received, secs),
                    rate_kb_per_sec(prev.transmitted, now.transmitted, secs),
                )
            }
            None => (0.0, 0.0),
        };
        self.last_net = Some(now);

        Ok(vec![
            RawSample::new("cpu", cpu, "%"),
            RawSample::new("ram", ram, "%"),
            RawSample::new("disk", disk, "%"),
            RawSample::new("net_down", down, "KB/s"),
            RawSample::new("net_up", up, "KB/s"),
        ])
    }
}

/// Share of `total` not in `available`, in percent.
fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    used as f64 / total as f64 * 100.0
}

/// Byte counter delta as KB/s. Counter resets read as zero.
fn rate_kb_per_sec(prev: u64, now: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    now.saturating_sub(prev) as f64 / 1024.0 / secs
}
