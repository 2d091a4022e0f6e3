// Copyright 2025 The adbfreq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The public facade over one Android device: one-shot queries, frequency
//! pinning, and sampler lifecycle.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adb::{Adb, CommandChannel};
use crate::config::AppConfig;
use crate::cpufreq::{cpufreq_path, CoreId, CpufreqReader, Snapshot};
use crate::error::{Error, Result};
use crate::parsing::{parse_int, parse_key_value_dump};
use crate::sampler::FreqSampler;

/// An attached Android device, observed and controlled over a
/// [`CommandChannel`].
pub struct AndroidDevice {
    channel: Arc<dyn CommandChannel>,
    reader: CpufreqReader,
    sampler: FreqSampler,
}

impl AndroidDevice {
    /// Wrap an [`Adb`] handle with the default polling interval.
    pub fn new(adb: Adb) -> Self {
        Self::with_channel(
            Arc::new(adb),
            Duration::from_millis(AppConfig::DEFAULT_POLL_INTERVAL_MS),
        )
    }

    /// Build a device over an arbitrary channel, e.g. a scripted one in
    /// tests, with an explicit sampler polling interval.
    pub fn with_channel(channel: Arc<dyn CommandChannel>, poll_interval: Duration) -> Self {
        let reader = CpufreqReader::new(channel.clone());
        let sampler = FreqSampler::new(channel.clone(), poll_interval);
        Self {
            channel,
            reader,
            sampler,
        }
    }

    /// Battery state from `dumpsys battery` as trimmed key/value pairs.
    pub fn battery(&self) -> Result<BTreeMap<String, String>> {
        let dump = self.channel.execute("dumpsys battery")?;
        Ok(parse_key_value_dump(&dump))
    }

    /// The device's model string, trimmed.
    pub fn product_model(&self) -> Result<String> {
        let out = self.channel.execute("getprop ro.product.model")?;
        let model = out.trim();
        if model.is_empty() {
            return Err(Error::Parse("device reports no product model".to_string()));
        }
        Ok(model.to_string())
    }

    /// Read one snapshot of every frequency domain.
    pub fn read_snapshot(&self) -> Result<Snapshot> {
        self.reader.read_snapshot()
    }

    /// Pin the given core's domain to `khz` under the `userspace` governor.
    ///
    /// Returns the frequency the device actually reports afterwards.
    /// Devices clamp requests to the nearest supported step, so the return
    /// value, not the request, is ground truth.
    pub fn set_cpu_freq(&self, core: CoreId, khz: u64) -> Result<u64> {
        let path = cpufreq_path(core);
        self.channel
            .execute(&format!("echo 'userspace' > {path}/scaling_governor"))?;
        for file in ["scaling_min_freq", "scaling_max_freq", "scaling_setspeed"] {
            self.channel.execute(&format!("echo {khz} > {path}/{file}"))?;
        }
        let reported = self
            .channel
            .execute(&format!("cat {path}/cpuinfo_cur_freq"))?;
        let achieved = parse_int(&reported)?;
        info!(core, requested_khz = khz, achieved_khz = achieved, "frequency pinned");
        Ok(achieved)
    }

    /// Pin every frequency domain to its maximum supported step.
    ///
    /// Returns the device-reported frequency per domain representative.
    pub fn push_to_max_freq(&self) -> Result<BTreeMap<CoreId, u64>> {
        let snapshot = self.read_snapshot()?;
        let mut achieved = BTreeMap::new();
        for (core, domain) in &snapshot {
            let target = domain.max_available_khz().ok_or_else(|| {
                Error::Parse(format!("cpu{core} reports no available frequencies"))
            })?;
            achieved.insert(*core, self.set_cpu_freq(*core, target)?);
        }
        Ok(achieved)
    }

    /// Start sampling per-domain frequency into a CSV file.
    pub fn start_monitor(&mut self, log_path: impl AsRef<Path>) -> Result<()> {
        self.sampler.start(log_path)
    }

    /// Stop the sampler and wait for the log to be closed.
    pub fn stop_monitor(&mut self) -> Result<()> {
        self.sampler.stop()
    }

    /// Whether the sampler is currently running.
    pub fn is_monitoring(&self) -> bool {
        self.sampler.is_running()
    }
}
