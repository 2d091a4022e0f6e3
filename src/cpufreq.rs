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

//! Reads per-domain CPU frequency state from the device's cpufreq sysfs.
//!
//! Cores sharing one scaling policy (`related_cpus`) form a frequency
//! domain, keyed by its lowest core id. A [`Snapshot`] holds one entry per
//! domain, not per core, so big.LITTLE devices report one column per
//! cluster rather than one per core.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::adb::CommandChannel;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::parsing::{parse_int, parse_int_list};

/// Logical CPU core index as reported by the device.
pub type CoreId = u32;

/// Scaling state of one frequency domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyDomain {
    /// Hardware-reported current frequency in kHz.
    pub current_khz: u64,
    /// Active scaling governor, trimmed.
    pub governor: String,
    /// Supported frequency steps in kHz, ascending, never empty.
    pub available_khz: Vec<u64>,
    /// Cores governed by this domain's policy, ascending.
    pub related_cores: Vec<CoreId>,
}

impl FrequencyDomain {
    /// The highest supported frequency step.
    pub fn max_available_khz(&self) -> Option<u64> {
        self.available_khz.last().copied()
    }
}

/// One complete read of all frequency domains, keyed by each domain's
/// representative (lowest) core id. Iterates in ascending core order.
pub type Snapshot = BTreeMap<CoreId, FrequencyDomain>;

// Only single-digit core indices are discovered; see `core_count`.
static CPU_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^cpu[0-9]$").unwrap());

pub(crate) fn cpufreq_path(core: CoreId) -> String {
    format!("{}/cpu{core}/cpufreq", AppConfig::CPU_SYSFS_ROOT)
}

/// Fetches and parses cpufreq state over a [`CommandChannel`].
pub struct CpufreqReader {
    channel: Arc<dyn CommandChannel>,
}

impl CpufreqReader {
    pub fn new(channel: Arc<dyn CommandChannel>) -> Self {
        Self { channel }
    }

    /// Count the device's cores by listing the cpu sysfs directory.
    ///
    /// Known boundary: only entries named `cpu0`..`cpu9` are recognized,
    /// so cores with indices >= 10 are not discovered.
    pub fn core_count(&self) -> Result<u32> {
        let listing = self
            .channel
            .execute(&format!("ls {}", AppConfig::CPU_SYSFS_ROOT))?;
        let count = listing
            .lines()
            .filter(|entry| CPU_ENTRY.is_match(entry.trim()))
            .count();
        Ok(count as u32)
    }

    /// Cores sharing the given core's scaling policy, ascending.
    pub fn related_cores(&self, core: CoreId) -> Result<Vec<CoreId>> {
        let out = self
            .channel
            .execute(&format!("cat {}/related_cpus", cpufreq_path(core)))?;
        let cores = parse_int_list(&out)?;
        if cores.is_empty() {
            return Err(Error::Parse(format!("cpu{core} reports no related cores")));
        }
        cores
            .into_iter()
            .map(|c| {
                CoreId::try_from(c).map_err(|_| {
                    Error::Parse(format!("cpu{core} related core {c} is out of range"))
                })
            })
            .collect()
    }

    /// Supported frequency steps for the given core's domain, ascending.
    pub fn available_frequencies(&self, core: CoreId) -> Result<Vec<u64>> {
        let out = self.channel.execute(&format!(
            "cat {}/scaling_available_frequencies",
            cpufreq_path(core)
        ))?;
        let frequencies = parse_int_list(&out)?;
        if frequencies.is_empty() {
            return Err(Error::Parse(format!(
                "cpu{core} reports no available frequencies"
            )));
        }
        Ok(frequencies)
    }

    /// Hardware-reported current frequency of the given core's domain.
    pub fn current_khz(&self, core: CoreId) -> Result<u64> {
        let out = self
            .channel
            .execute(&format!("cat {}/cpuinfo_cur_freq", cpufreq_path(core)))?;
        parse_int(&out)
    }

    /// Active scaling governor of the given core's domain.
    pub fn governor(&self, core: CoreId) -> Result<String> {
        let out = self
            .channel
            .execute(&format!("cat {}/scaling_governor", cpufreq_path(core)))?;
        let governor = out.trim();
        if governor.is_empty() {
            return Err(Error::Parse(format!("cpu{core} reports no governor")));
        }
        Ok(governor.to_string())
    }

    /// Read one snapshot of every frequency domain.
    ///
    /// Cores that are not the minimum of their `related_cpus` set are
    /// folded into their domain representative and produce no entry of
    /// their own. Reads are sequential; the snapshot is atomic only from
    /// the reader's perspective.
    pub fn read_snapshot(&self) -> Result<Snapshot> {
        let count = self.core_count()?;
        let mut snapshot = Snapshot::new();
        for core in 0..count {
            let related = self.related_cores(core)?;
            if related.first() != Some(&core) {
                continue;
            }
            let domain = FrequencyDomain {
                current_khz: self.current_khz(core)?,
                governor: self.governor(core)?,
                available_khz: self.available_frequencies(core)?,
                related_cores: related,
            };
            snapshot.insert(core, domain);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    struct MapChannel {
        responses: Mutex<HashMap<String, String>>,
    }

    impl MapChannel {
        fn new(entries: &[(&str, &str)]) -> Arc<Self> {
            let responses = entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    impl CommandChannel for MapChannel {
        fn execute(&self, command: &str) -> Result<String> {
            self.responses
                .lock()
                .unwrap()
                .get(command)
                .cloned()
                .ok_or_else(|| Error::DeviceCommand(format!("no response for `{command}`")))
        }
    }

    #[test]
    fn test_cpu_entry_pattern() {
        assert!(CPU_ENTRY.is_match("cpu0"));
        assert!(CPU_ENTRY.is_match("cpu9"));
        assert!(!CPU_ENTRY.is_match("cpu10"));
        assert!(!CPU_ENTRY.is_match("cpufreq"));
        assert!(!CPU_ENTRY.is_match("cpuidle"));
    }

    #[test]
    fn test_core_count_ignores_non_core_entries() {
        let channel = MapChannel::new(&[(
            "ls /sys/devices/system/cpu",
            "cpu0\ncpu1\ncpufreq\ncpuidle\nkernel_max\npossible\n",
        )]);
        let reader = CpufreqReader::new(channel);
        assert_eq!(reader.core_count().unwrap(), 2);
    }

    #[test]
    fn test_read_snapshot_folds_domains() {
        let channel = MapChannel::new(&[
            ("ls /sys/devices/system/cpu", "cpu0\ncpu1\n"),
            (
                "cat /sys/devices/system/cpu/cpu0/cpufreq/related_cpus",
                "0 1\n",
            ),
            (
                "cat /sys/devices/system/cpu/cpu1/cpufreq/related_cpus",
                "0 1\n",
            ),
            (
                "cat /sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_cur_freq",
                "600000\n",
            ),
            (
                "cat /sys/devices/system/cpu/cpu0/cpufreq/scaling_governor",
                "schedutil\n",
            ),
            (
                "cat /sys/devices/system/cpu/cpu0/cpufreq/scaling_available_frequencies",
                "1800000 300000 600000\n",
            ),
        ]);
        let reader = CpufreqReader::new(channel);
        let snapshot = reader.read_snapshot().unwrap();

        assert_eq!(snapshot.len(), 1);
        let domain = snapshot.get(&0).unwrap();
        assert_eq!(domain.current_khz, 600_000);
        assert_eq!(domain.governor, "schedutil");
        assert_eq!(domain.available_khz, vec![300_000, 600_000, 1_800_000]);
        assert_eq!(domain.related_cores, vec![0, 1]);
        assert_eq!(domain.max_available_khz(), Some(1_800_000));
    }

    #[test]
    fn test_read_snapshot_empty_device() {
        let channel = MapChannel::new(&[("ls /sys/devices/system/cpu", "cpufreq\npossible\n")]);
        let reader = CpufreqReader::new(channel);
        assert!(reader.read_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_read_snapshot_surfaces_parse_errors() {
        let channel = MapChannel::new(&[
            ("ls /sys/devices/system/cpu", "cpu0\n"),
            (
                "cat /sys/devices/system/cpu/cpu0/cpufreq/related_cpus",
                "zero\n",
            ),
        ]);
        let reader = CpufreqReader::new(channel);
        assert!(matches!(reader.read_snapshot(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_related_cores_out_of_range_is_parse_error() {
        // A value that cannot be a core index must surface, not wrap.
        let channel = MapChannel::new(&[
            ("ls /sys/devices/system/cpu", "cpu0\n"),
            (
                "cat /sys/devices/system/cpu/cpu0/cpufreq/related_cpus",
                "0 4294967296\n",
            ),
        ]);
        let reader = CpufreqReader::new(channel);
        let err = reader.read_snapshot().unwrap_err();
        match err {
            Error::Parse(msg) => assert!(msg.contains("out of range")),
            other => panic!("expected Parse error, got: {other}"),
        }
    }

    #[test]
    fn test_read_snapshot_surfaces_channel_errors() {
        let channel = MapChannel::new(&[("ls /sys/devices/system/cpu", "cpu0\n")]);
        let reader = CpufreqReader::new(channel);
        assert!(matches!(
            reader.read_snapshot(),
            Err(Error::DeviceCommand(_))
        ));
    }
}
