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

// Parsers for the semi-structured text shapes adb shell commands return:
// `key: value` dumps, whitespace-separated integer lists, and single
// integer readbacks.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Parse a `key: value`-per-line dump (e.g. `dumpsys battery`) into a map.
///
/// Each line is split on its first `:`; both sides are trimmed. Lines
/// without a colon, or with an empty key or value, are dropped.
pub fn parse_key_value_dump(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse a whitespace-separated integer list (e.g. `related_cpus`,
/// `scaling_available_frequencies`) into an ascending `Vec<u64>`.
///
/// Empty tokens are skipped; any non-integer token is a parse error.
pub fn parse_int_list(text: &str) -> Result<Vec<u64>> {
    let mut values = Vec::new();
    for token in text.split_whitespace() {
        let value = token
            .parse::<u64>()
            .map_err(|_| Error::Parse(format!("`{token}` is not an integer")))?;
        values.push(value);
    }
    values.sort_unstable();
    Ok(values)
}

/// Parse a single integer readback (e.g. `cpuinfo_cur_freq`), trimming
/// surrounding whitespace.
pub fn parse_int(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    trimmed
        .parse::<u64>()
        .map_err(|_| Error::Parse(format!("`{trimmed}` is not an integer")))
}
