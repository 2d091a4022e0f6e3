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

//! Control and observe CPU frequency scaling on Android devices over adb.

pub mod adb;
pub mod cli;
pub mod config;
pub mod cpufreq;
pub mod device;
pub mod error;
pub mod parsing;
pub mod sampler;

pub use adb::{Adb, CommandChannel};
pub use cpufreq::{CoreId, CpufreqReader, FrequencyDomain, Snapshot};
pub use device::AndroidDevice;
pub use error::{Error, Result};
pub use sampler::FreqSampler;
