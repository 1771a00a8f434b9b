use std::time::{Duration, Instant};

use sysinfo::System;

use crate::event::{CpuStat, SingleCpu};

/// Reads CPU utilisation from the operating system.
#[derive(Debug)]
pub struct CpuSampler {
    system: System,
    last_update: Instant,
    update_interval: Duration,
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

impl CpuSampler {
    /// Usage figures are deltas between two refreshes, so the interval is
    /// never shorter than what sysinfo needs to produce them.
    pub fn new(update_interval: Duration) -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self {
            system,
            last_update: Instant::now(),
            update_interval: update_interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn set_update_interval(&mut self, interval: Duration) {
        self.update_interval = interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    }

    pub fn should_update(&self) -> bool {
        self.last_update.elapsed() >= self.update_interval
    }

    pub fn time_until_update(&self) -> Duration {
        self.update_interval.saturating_sub(self.last_update.elapsed())
    }

    pub fn refresh(&mut self) {
        self.system.refresh_cpu_all();
        self.last_update = Instant::now();
    }

    pub fn stat(&self) -> CpuStat {
        let cpus: Vec<SingleCpu> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| SingleCpu {
                usage: cpu.cpu_usage(),
                frequency: cpu.frequency(),
            })
            .collect();

        let frequency = if cpus.is_empty() {
            0
        } else {
            cpus.iter().map(|c| c.frequency).sum::<u64>() / cpus.len() as u64
        };

        CpuStat {
            cpu: SingleCpu {
                usage: self.system.global_cpu_usage(),
                frequency,
            },
            cpus,
        }
    }
}
