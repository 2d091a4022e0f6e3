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

//! Unified error types for the adbfreq library.
//!
//! # Example
//!
//! ```rust,no_run
//! use adbfreq::{Adb, AndroidDevice, Result};
//!
//! fn main() -> Result<()> {
//!     let device = AndroidDevice::new(Adb::new("emulator-5554", false));
//!     let battery = device.battery()?;
//!     println!("battery level: {:?}", battery.get("level"));
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for adbfreq operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The device bridge failed to run a command.
    ///
    /// Covers transport failures (adb not found, device offline) and
    /// device-side commands that exited with a non-zero status. The
    /// command did not complete; its output must not be trusted.
    #[error("device command failed: {0}")]
    DeviceCommand(String),

    /// Device output did not match the expected shape.
    ///
    /// Raised when a sysfs read, property dump, or battery dump returns
    /// text the parsers cannot interpret. Absence of expected text is
    /// treated as a parse failure, never as success.
    #[error("unparseable device output: {0}")]
    Parse(String),

    /// `start` was called while a sampling run was already active.
    #[error("sampler is already running")]
    AlreadyRunning,

    /// `stop` was called with no active sampling run.
    #[error("sampler is not running")]
    NotRunning,

    /// An I/O error occurred while spawning adb or writing the sample log.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for adbfreq operations.
pub type Result<T> = std::result::Result<T, Error>;
