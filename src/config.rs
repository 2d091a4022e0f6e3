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

/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Device bridge
    pub const DEFAULT_ADB_PATH: &'static str = "adb";

    // Sysfs layout on the device
    pub const CPU_SYSFS_ROOT: &'static str = "/sys/devices/system/cpu";

    // Sampling
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
}
