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

//! URL Inspection: a bag of URLs checked against one webproperty, one
//! request per URL, with recent results reused.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::info;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::enums::describe_inspection_code;
use crate::error::ConfigError;
use crate::error::PersistenceError;
use crate::error::RemoteQueryError;
use crate::error::Result;
use crate::payload;
use crate::report;
use crate::report::Cell;
use crate::report::CsvSink;
use crate::report::INSPECTION_FORMAT;
use crate::report::Table;
use crate::report::TableSink;
use crate::transport::Endpoint;
use crate::transport::Transport;

pub const DEFAULT_TTL: Duration = Duration::from_secs(450);

/// What an inspection report was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionState {
    pub site_url: String,
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone)]
struct Cached {
    at: Instant,
    result: Value,
}

#[derive(Debug, Clone)]
pub struct InspectUrl {
    site_url: String,
    urls: Vec<String>,
    language_code: Option<String>,
    ttl: Duration,
    cache: HashMap<String, Cached>,
}

impl InspectUrl {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            urls: Vec::new(),
            language_code: None,
            ttl: DEFAULT_TTL,
            cache: HashMap::new(),
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn ttl(&mut self, ttl: Duration) -> &mut Self {
        self.ttl = ttl;
        self
    }

    /// BCP-47 code for translated issue messages.
    pub fn language(&mut self, code: impl Into<String>) -> &mut Self {
        self.language_code = Some(code.into());
        self
    }

    /// Queues `url`. A URL already queued is left alone unless `overwrite`
    /// is set, which moves it to the end and forgets its cached result.
    pub fn add_url(&mut self, url: impl Into<String>, overwrite: bool) -> &mut Self {
        let url = url.into();
        if let Some(pos) = self.urls.iter().position(|u| *u == url) {
            if !overwrite {
                return self;
            }
            self.urls.remove(pos);
            self.cache.remove(&url);
        }
        self.urls.push(url);
        self
    }

    pub fn add_urls<I, S>(&mut self, urls: I, overwrite: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            self.add_url(url, overwrite);
        }
        self
    }

    pub fn remove_url(&mut self, url: &str) -> &mut Self {
        self.urls.retain(|u| u != url);
        self
    }

    pub fn remove_url_at(&mut self, index: usize) -> &mut Self {
        if index < self.urls.len() {
            self.urls.remove(index);
        }
        self
    }

    pub fn remove_all_urls(&mut self) -> &mut Self {
        self.urls.clear();
        self
    }

    pub fn state(&self) -> InspectionState {
        InspectionState {
            site_url: self.site_url.clone(),
            urls: self.urls.clone(),
            language_code: self.language_code.clone(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::NoInspectionUrls);
        }
        self.urls.iter().try_for_each(|url| check_url(&self.site_url, url))
    }

    /// Inspects every queued URL in order and returns the raw results, each
    /// tagged with its `inspectionUrl`.
    pub fn execute<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Vec<Value>> {
        self.validate()?;
        let endpoint = Endpoint::UrlInspection;
        let mut results = Vec::with_capacity(self.urls.len());
        let mut reused = 0usize;
        for (idx, url) in self.urls.iter().enumerate() {
            if let Some(hit) = self.cache.get(url)
                && hit.at.elapsed() < self.ttl
            {
                reused += 1;
                results.push(hit.result.clone());
                continue;
            }
            let offset = idx as u32;
            let body = payload::inspection(url, &self.site_url, self.language_code.as_deref());
            debug!("{endpoint}: {url}");
            let response = transport
                .submit(&endpoint, &body)
                .map_err(|source| RemoteQueryError::Transport {
                    endpoint: endpoint.to_string(),
                    offset,
                    source,
                })?;
            let Some(Value::Object(mut result)) = response.get("inspectionResult").cloned() else {
                return Err(RemoteQueryError::MalformedResponse {
                    endpoint: endpoint.to_string(),
                    offset,
                    reason: "missing inspectionResult object".to_string(),
                }
                .into());
            };
            result.insert("inspectionUrl".to_string(), Value::String(url.clone()));
            let result = Value::Object(result);
            self.cache.insert(
                url.clone(),
                Cached {
                    at: Instant::now(),
                    result: result.clone(),
                },
            );
            results.push(result);
        }
        info!(
            "inspected {} URLs for {} ({} from cache)",
            results.len(),
            self.site_url,
            reused
        );
        Ok(results)
    }

    pub fn get<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<InspectionReport> {
        let results = self.execute(transport)?;
        Ok(InspectionReport::new(self.state(), results))
    }
}

fn check_url(site: &str, url: &str) -> std::result::Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidInspectionUrl {
        url: url.to_string(),
        site: site.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|_| invalid("not an absolute URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("only http and https URLs can be inspected"));
    }
    match site.strip_prefix("sc-domain:") {
        Some(domain) => {
            let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
            let host = parsed.host_str().unwrap_or_default();
            let inside = host == domain || host.strip_suffix(domain.as_str()).is_some_and(|rest| rest.ends_with('.'));
            if !inside {
                return Err(invalid("host is outside the domain property"));
            }
        }
        None => {
            if !url.starts_with(site) {
                return Err(invalid("URL is outside the URL-prefix property"));
            }
        }
    }
    Ok(())
}

/// Flattens nested objects into `a.b` keys and list items into `a.0.b`.
pub fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(String::new(), value, &mut out);
    out
}

fn flatten_into(prefix: String, value: &Value, out: &mut Vec<(String, Value)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(join(key), item, out);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(join(&idx.to_string()), item, out);
            }
        }
        leaf => out.push((prefix, leaf.clone())),
    }
}

fn cell(key: &str, value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::String(text) => Cell::Text(
            describe_inspection_code(key, text)
                .map(str::to_string)
                .unwrap_or_else(|| text.clone()),
        ),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::Bool(b) => Cell::Text(b.to_string()),
        Value::Array(_) | Value::Object(_) => Cell::Text(value.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct InspectionReport {
    webproperty: String,
    query: InspectionState,
    results: Vec<Value>,
    table: OnceLock<Table>,
}

impl PartialEq for InspectionReport {
    fn eq(&self, other: &Self) -> bool {
        self.webproperty == other.webproperty && self.query == other.query && self.results == other.results
    }
}

impl InspectionReport {
    pub fn new(query: InspectionState, results: Vec<Value>) -> Self {
        Self {
            webproperty: query.site_url.clone(),
            query,
            results,
            table: OnceLock::new(),
        }
    }

    pub fn webproperty(&self) -> &str {
        &self.webproperty
    }

    pub fn query(&self) -> &InspectionState {
        &self.query
    }

    pub fn results(&self) -> &[Value] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.results.iter()
    }

    pub fn first(&self) -> Option<&Value> {
        self.results.first()
    }

    pub fn last(&self) -> Option<&Value> {
        self.results.last()
    }

    pub fn get(&self, url: &str) -> Option<&Value> {
        self.results
            .iter()
            .find(|r| r.get("inspectionUrl").and_then(Value::as_str) == Some(url))
    }

    /// `inspectionUrl` first, then the flattened keys of each result in
    /// sorted order. Keys first seen in a later result are appended.
    pub fn export<S: TableSink>(&self, sink: &mut S) -> std::result::Result<(), S::Error> {
        let flat: Vec<Map<String, Value>> = self
            .results
            .iter()
            .map(|r| flatten(r).into_iter().collect())
            .collect();
        let mut columns = vec!["inspectionUrl".to_string()];
        for row in &flat {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        sink.columns(&columns)?;
        for row in &flat {
            let cells = columns
                .iter()
                .map(|key| row.get(key).map(|v| cell(key, v)).unwrap_or(Cell::Empty))
                .collect();
            sink.row(cells)?;
        }
        Ok(())
    }

    pub fn to_table(&self) -> &Table {
        self.table
            .get_or_init(|| report::build_table(|table| self.export(table)))
    }

    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.to_table().records()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> std::result::Result<(), csv::Error> {
        let mut sink = CsvSink::new(writer);
        self.export(&mut sink)?;
        sink.finish()
    }

    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, PersistenceError> {
        report::encode(INSPECTION_FORMAT, &self.webproperty, &self.query, &self.results)
    }

    pub fn from_datastream(bytes: &[u8]) -> std::result::Result<Self, PersistenceError> {
        let (webproperty, query, results) = report::decode(INSPECTION_FORMAT, bytes)?;
        Ok(Self {
            webproperty,
            query,
            results,
            table: OnceLock::new(),
        })
    }

    pub fn default_file_name(&self) -> std::result::Result<String, PersistenceError> {
        report::default_file_name(&self.webproperty, &self.query)
    }

    pub fn to_disk(&self, path: Option<&Path>) -> std::result::Result<PathBuf, PersistenceError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(self.default_file_name()?),
        };
        report::write_file(&path, &self.to_bytes()?)?;
        Ok(path)
    }

    pub fn to_disk_in(&self, dir: &Path) -> std::result::Result<PathBuf, PersistenceError> {
        let path = dir.join(self.default_file_name()?);
        self.to_disk(Some(&path))
    }

    pub fn from_disk(path: &Path) -> std::result::Result<Self, PersistenceError> {
        Self::from_datastream(&report::read_file(path)?)
    }
}
