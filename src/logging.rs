// Copyright 2026 gsc-query Authors
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

use std::io::Write;

use log::LevelFilter;

/// Level picked by `-v`/`--quiet`. `None` leaves `RUST_LOG` in charge.
pub fn level_for(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    if quiet {
        return Some(LevelFilter::Error);
    }
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
pub fn init(verbose: u8, quiet: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    match level_for(verbose, quiet) {
        Some(level) => {
            builder.filter_level(level);
        }
        None if std::env::var_os("RUST_LOG").is_none() => {
            builder.filter_level(LevelFilter::Warn);
        }
        None => {}
    }
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.target(env_logger::Target::Stderr);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {}] {}",
            record.level().as_str().to_lowercase(),
            record.target(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
