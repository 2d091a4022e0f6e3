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

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Serial of the target device, as listed by `adb devices`.
    #[arg(short, long)]
    pub serial: String,
    /// Run device-side commands through `su` (needed for cpufreq writes).
    #[arg(long)]
    pub su: bool,
    /// Path to the adb executable.
    #[arg(long, default_value = AppConfig::DEFAULT_ADB_PATH)]
    pub adb_path: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the battery status dump as key/value pairs.
    Battery,
    /// Print the device model string.
    Model,
    /// Print every frequency domain and its scaling state.
    Inspect,
    /// Pin a core's frequency domain to the given frequency in kHz.
    SetFreq(SetFreqArgs),
    /// Pin every frequency domain to its maximum supported frequency.
    MaxFreq,
    /// Sample per-domain frequency into a CSV file.
    Monitor(MonitorArgs),
}

#[derive(Parser)]
pub struct SetFreqArgs {
    /// Core index; any core in the target domain works.
    pub core: u32,
    /// Requested frequency in kHz. The device may clamp it.
    pub khz: u64,
}

#[derive(Parser)]
pub struct MonitorArgs {
    /// Output CSV path.
    pub output: PathBuf,
    /// Poll interval in milliseconds.
    #[arg(short, long, default_value_t = AppConfig::DEFAULT_POLL_INTERVAL_MS)]
    pub interval_ms: u64,
    /// Stop after this many seconds instead of waiting for Enter.
    #[arg(short, long)]
    pub duration_secs: Option<u64>,
}
