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

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use adbfreq::cli::{Cli, Commands, MonitorArgs};
use adbfreq::{Adb, AndroidDevice, Result};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let adb = Adb::with_adb_path(&cli.serial, cli.su, &cli.adb_path);

    match cli.command {
        Commands::Battery => {
            let device = AndroidDevice::new(adb);
            for (key, value) in device.battery()? {
                println!("{key}: {value}");
            }
        }
        Commands::Model => {
            let device = AndroidDevice::new(adb);
            println!("{}", device.product_model()?);
        }
        Commands::Inspect => {
            let device = AndroidDevice::new(adb);
            for (core, domain) in device.read_snapshot()? {
                println!(
                    "cpu{core}: {} kHz, governor {}, cores {:?}, steps {:?}",
                    domain.current_khz, domain.governor, domain.related_cores, domain.available_khz
                );
            }
        }
        Commands::SetFreq(args) => {
            let device = AndroidDevice::new(adb);
            let achieved = device.set_cpu_freq(args.core, args.khz)?;
            println!("cpu{}: {achieved} kHz", args.core);
        }
        Commands::MaxFreq => {
            let device = AndroidDevice::new(adb);
            for (core, khz) in device.push_to_max_freq()? {
                println!("cpu{core}: {khz} kHz");
            }
        }
        Commands::Monitor(args) => run_monitor(adb, &args)?,
    }
    Ok(())
}

fn run_monitor(adb: Adb, args: &MonitorArgs) -> Result<()> {
    let mut device = AndroidDevice::with_channel(
        std::sync::Arc::new(adb),
        Duration::from_millis(args.interval_ms),
    );
    device.start_monitor(&args.output)?;

    match args.duration_secs {
        Some(secs) => thread::sleep(Duration::from_secs(secs)),
        None => {
            println!(
                "sampling to {} every {} ms; press Enter to stop",
                args.output.display(),
                args.interval_ms
            );
            let mut line = String::new();
            let _ = std::io::stdin().lock().read_line(&mut line);
        }
    }

    device.stop_monitor()
}
