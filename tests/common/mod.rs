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

//! Scripted command channels standing in for an attached device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use adbfreq::{CommandChannel, Error, Result};

/// Replays canned responses keyed by the exact command line and records
/// every command it is asked to run.
pub struct ScriptedChannel {
    responses: Mutex<HashMap<String, String>>,
    executed: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedChannel {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn script(&self, command: &str, output: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(command.to_string(), output.to_string());
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl CommandChannel for ScriptedChannel {
    fn execute(&self, command: &str) -> Result<String> {
        self.executed.lock().unwrap().push(command.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .ok_or_else(|| Error::DeviceCommand(format!("no response scripted for `{command}`")))
    }
}

/// A channel on which every command fails, simulating a disconnected
/// device.
pub struct DeadChannel;

impl CommandChannel for DeadChannel {
    fn execute(&self, command: &str) -> Result<String> {
        Err(Error::DeviceCommand(format!(
            "device gone while running `{command}`"
        )))
    }
}

fn script_core(channel: &ScriptedChannel, core: u32, related: &str) {
    channel.script(
        &format!("cat /sys/devices/system/cpu/cpu{core}/cpufreq/related_cpus"),
        related,
    );
}

fn script_domain(channel: &ScriptedChannel, rep: u32, cur: &str, governor: &str, available: &str) {
    let path = format!("/sys/devices/system/cpu/cpu{rep}/cpufreq");
    channel.script(&format!("cat {path}/cpuinfo_cur_freq"), cur);
    channel.script(&format!("cat {path}/scaling_governor"), governor);
    channel.script(&format!("cat {path}/scaling_available_frequencies"), available);
}

/// Four cores in two domains: cores 0-1 behind representative 0, cores
/// 2-3 behind representative 2 (a small big.LITTLE layout).
#[allow(dead_code)]
pub fn four_core_two_domain_channel() -> Arc<ScriptedChannel> {
    let channel = ScriptedChannel::new();
    channel.script(
        "ls /sys/devices/system/cpu",
        "cpu0\ncpu1\ncpu2\ncpu3\ncpufreq\ncpuidle\nkernel_max\npossible\npresent\n",
    );
    script_core(&channel, 0, "0 1\n");
    script_core(&channel, 1, "0 1\n");
    script_core(&channel, 2, "2 3\n");
    script_core(&channel, 3, "2 3\n");
    script_domain(&channel, 0, "1800000\n", "schedutil\n", "300000 600000 1800000\n");
    script_domain(&channel, 2, "2400000\n", "performance\n", "500000 1200000 2400000\n");
    Arc::new(channel)
}

/// Script the write-side of a `set_cpu_freq(core, khz)` call. Echo
/// commands produce no output; the readback is scripted separately via
/// the domain fixture.
#[allow(dead_code)]
pub fn script_freq_write(channel: &ScriptedChannel, core: u32, khz: u64) {
    let path = format!("/sys/devices/system/cpu/cpu{core}/cpufreq");
    channel.script(&format!("echo 'userspace' > {path}/scaling_governor"), "");
    for file in ["scaling_min_freq", "scaling_max_freq", "scaling_setspeed"] {
        channel.script(&format!("echo {khz} > {path}/{file}"), "");
    }
}
