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

//! Background frequency sampler with cooperative shutdown.
//!
//! [`FreqSampler`] runs `Idle -> Running -> Stopping -> Idle`. `start`
//! spawns a dedicated OS thread that polls one [`Snapshot`] per interval
//! and appends one CSV row per poll, flushing after every row so an abrupt
//! termination loses at most the in-flight row. The thread owns the log
//! file exclusively until `stop` joins it.
//!
//! Shutdown is a single-slot `sync_channel`: `stop` sends the one pending
//! stop signal and blocks until the loop has observed it, written its last
//! row, and closed the log. A read in flight when stop is requested
//! completes and its row is written, bounding shutdown latency by one read
//! plus at most one interval.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, error, info};

use crate::adb::CommandChannel;
use crate::cpufreq::{CoreId, CpufreqReader, Snapshot};
use crate::error::{Error, Result};

// Matches the rendering of a local wall-clock timestamp with microseconds,
// e.g. `2025-08-23 14:03:07.123456`. Lexicographic order equals time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Polls per-domain CPU frequency on a background thread into a CSV log.
pub struct FreqSampler {
    channel: Arc<dyn CommandChannel>,
    interval: Duration,
    run: Option<SamplerRun>,
}

struct SamplerRun {
    stop_tx: SyncSender<()>,
    handle: JoinHandle<Result<()>>,
}

impl FreqSampler {
    pub fn new(channel: Arc<dyn CommandChannel>, interval: Duration) -> Self {
        Self {
            channel,
            interval,
            run: None,
        }
    }

    /// Whether a sampling run is active.
    ///
    /// Stays `true` after a run dies from a read failure; the error is
    /// only retired by the `stop` call that observes it.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Start sampling into the file at `log_path`.
    ///
    /// Fails with [`Error::AlreadyRunning`] if a run is active. The log is
    /// created on the caller's thread, so a failed open surfaces here and
    /// leaves the sampler idle with no handle retained.
    pub fn start(&mut self, log_path: impl AsRef<Path>) -> Result<()> {
        if self.run.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let log_path = log_path.as_ref();
        let file = File::create(log_path)?;
        let (stop_tx, stop_rx) = mpsc::sync_channel(1);
        let reader = CpufreqReader::new(self.channel.clone());
        let interval = self.interval;

        info!(path = %log_path.display(), interval_ms = interval.as_millis() as u64, "starting frequency sampler");
        let handle = thread::Builder::new()
            .name("freq-sampler".to_string())
            .spawn(move || sample_to_log(&reader, file, interval, &stop_rx))?;

        self.run = Some(SamplerRun { stop_tx, handle });
        Ok(())
    }

    /// Stop the active run and wait for it to terminate.
    ///
    /// Fails with [`Error::NotRunning`] when idle; a second `stop` is
    /// rejected, not ignored. Returns only after the background thread has
    /// exited and the log is flushed and closed. If the run died early on
    /// a read failure, that error is returned here.
    pub fn stop(&mut self) -> Result<()> {
        let run = self.run.take().ok_or(Error::NotRunning)?;
        // A run that already died has dropped its receiver; the send then
        // fails and the stored error surfaces through the join below.
        let _ = run.stop_tx.try_send(());
        info!("stopping frequency sampler");
        match run.handle.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::DeviceCommand("sampler thread panicked".to_string())),
        }
    }
}

impl Drop for FreqSampler {
    fn drop(&mut self) {
        if self.run.is_some() {
            let _ = self.stop();
        }
    }
}

/// Loop body run on the sampler thread. Ensures the log is flushed and the
/// handle released even when a read fails mid-run.
fn sample_to_log(
    reader: &CpufreqReader,
    file: File,
    interval: Duration,
    stop_rx: &Receiver<()>,
) -> Result<()> {
    let mut log = BufWriter::new(file);
    let outcome = sample_loop(reader, &mut log, interval, stop_rx);
    let flush = log.flush().map_err(Error::from);
    if let Err(e) = &outcome {
        error!("sampling run aborted: {e}");
    }
    outcome.and(flush)
}

fn sample_loop(
    reader: &CpufreqReader,
    log: &mut BufWriter<File>,
    interval: Duration,
    stop_rx: &Receiver<()>,
) -> Result<()> {
    // The column set is fixed by the first snapshot of the run.
    let mut columns: Option<Vec<CoreId>> = None;
    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return Ok(()),
            Err(TryRecvError::Empty) => {}
        }

        let snapshot = reader.read_snapshot()?;
        if columns.is_none() {
            let representatives: Vec<CoreId> = snapshot.keys().copied().collect();
            write_header(log, &representatives)?;
            columns = Some(representatives);
        }
        if let Some(representatives) = &columns {
            write_row(log, representatives, &snapshot)?;
            debug!(domains = representatives.len(), "sample appended");
        }
        // Flush before sleeping: each row is durable before the next poll.
        log.flush()?;

        match stop_rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

fn write_header(log: &mut impl Write, representatives: &[CoreId]) -> Result<()> {
    let mut row = String::from("time");
    for core in representatives {
        row.push_str(&format!(",cpu{core}_freq"));
    }
    writeln!(log, "{row}")?;
    Ok(())
}

fn write_row(log: &mut impl Write, representatives: &[CoreId], snapshot: &Snapshot) -> Result<()> {
    let mut row = Local::now().format(TIMESTAMP_FORMAT).to_string();
    for core in representatives {
        let domain = snapshot.get(core).ok_or_else(|| {
            Error::Parse(format!("domain cpu{core} missing from snapshot"))
        })?;
        row.push_str(&format!(",{}", domain.current_khz));
    }
    writeln!(log, "{row}")?;
    Ok(())
}
