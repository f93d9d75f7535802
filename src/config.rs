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

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::enums::DataState;
use crate::enums::MAX_ROW_LIMIT;
use crate::enums::SearchType;
use crate::inspection::DEFAULT_TTL;
use crate::pagination::FetchPolicy;
use crate::transport::HttpTransport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub token_env: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub max_rows: Option<u64>,
    pub report_dir: PathBuf,
    pub data_state: DataState,
    pub search_type: SearchType,
    pub inspection_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://searchconsole.googleapis.com".to_string(),
            token_env: "GSC_ACCESS_TOKEN".to_string(),
            timeout_secs: 30,
            page_size: MAX_ROW_LIMIT,
            max_rows: None,
            report_dir: PathBuf::from("."),
            data_state: DataState::Final,
            search_type: SearchType::Web,
            inspection_ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl Config {
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            page_size: self.page_size,
            max_rows: self.max_rows,
        }
    }

    pub fn inspection_ttl(&self) -> Duration {
        Duration::from_secs(self.inspection_ttl_secs)
    }

    pub fn http_transport(&self) -> Result<HttpTransport> {
        HttpTransport::from_env(
            &self.api_base,
            &self.token_env,
            Duration::from_secs(self.timeout_secs.max(1)),
        )
    }
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("gsc").join("gsc.toml"))
}

/// Missing file means defaults.
pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut config: Config = toml::from_str(&text).context("parse gsc.toml")?;
    config.page_size = config.page_size.clamp(1, MAX_ROW_LIMIT);
    Ok(config)
}
