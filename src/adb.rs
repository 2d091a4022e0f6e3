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

//! The device command channel: a synchronous shim over the `adb` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::AppConfig;
use crate::error::{Error, Result};

/// A synchronous channel that runs one textual command on the device and
/// returns its raw output.
///
/// [`Adb`] is the production implementation; tests substitute scripted
/// channels so readers and samplers can run without an attached device.
pub trait CommandChannel: Send + Sync {
    fn execute(&self, command: &str) -> Result<String>;
}

/// Handle to one device reachable through the `adb` binary.
#[derive(Debug, Clone)]
pub struct Adb {
    device_id: String,
    su: bool,
    adb_path: String,
}

impl Adb {
    /// Create a handle for the device with the given serial.
    ///
    /// When `su` is set, device-side commands run through `su`, which is
    /// required for writing cpufreq sysfs files on most devices.
    pub fn new(device_id: impl Into<String>, su: bool) -> Self {
        Self::with_adb_path(device_id, su, AppConfig::DEFAULT_ADB_PATH)
    }

    /// Create a handle using an explicit path to the `adb` executable.
    pub fn with_adb_path(device_id: impl Into<String>, su: bool, adb_path: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            su,
            adb_path: adb_path.into(),
        }
    }

    /// Run a shell command on the device and return its stdout.
    ///
    /// The command line is fed to `adb -s <serial> shell [su]` over stdin.
    /// A non-zero adb exit status is a [`Error::DeviceCommand`]; output is
    /// decoded as UTF-8 with invalid sequences replaced.
    pub fn shell(&self, command: &str) -> Result<String> {
        let mut cmd = Command::new(&self.adb_path);
        cmd.args(["-s", &self.device_id, "shell"]);
        if self.su {
            cmd.arg("su");
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(command.as_bytes())?;
            stdin.write_all(b"\n")?;
            // Dropping stdin closes the pipe so the device-side shell exits.
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DeviceCommand(format!(
                "`{command}` exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(command, bytes = stdout.len(), "shell round-trip");
        Ok(stdout)
    }

    /// Evaluate a shell `[ ... ]` test expression on the device.
    pub fn shell_bool(&self, expr: &str) -> Result<bool> {
        let out = self.shell(&format!("if [ {expr} ]; then echo 1; else echo 0; fi"))?;
        match out.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(Error::Parse(format!("`{other}` is not a shell boolean"))),
        }
    }

    /// Copy a local file to the device.
    pub fn push(&self, local: impl AsRef<Path>, remote: &str) -> Result<()> {
        self.transfer("push", &local.as_ref().to_string_lossy(), remote)
    }

    /// Copy a file from the device to a local path.
    pub fn pull(&self, remote: &str, local: impl AsRef<Path>) -> Result<()> {
        self.transfer("pull", remote, &local.as_ref().to_string_lossy())
    }

    fn transfer(&self, verb: &str, from: &str, to: &str) -> Result<()> {
        let output = Command::new(&self.adb_path)
            .args(["-s", &self.device_id, verb, from, to])
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DeviceCommand(format!(
                "adb {verb} {from} {to} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        debug!(verb, from, to, "file transfer complete");
        Ok(())
    }
}

impl CommandChannel for Adb {
    fn execute(&self, command: &str) -> Result<String> {
        self.shell(command)
    }
}
