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

//! The "submit payload, get JSON back" capability the engine runs on.
//!
//! Authentication is the transport's business: [`HttpTransport`] only
//! carries a bearer token it is handed. Nothing here retries.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    SearchAnalytics { site_url: String },
    UrlInspection,
    Sites,
}

impl Endpoint {
    pub fn search_analytics(site_url: impl Into<String>) -> Self {
        Endpoint::SearchAnalytics {
            site_url: site_url.into(),
        }
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::SearchAnalytics { site_url } => vec![
                "webmasters",
                "v3",
                "sites",
                site_url.as_str(),
                "searchAnalytics",
                "query",
            ],
            Endpoint::UrlInspection => vec!["v1", "urlInspection", "index:inspect"],
            Endpoint::Sites => vec!["webmasters", "v3", "sites"],
        }
    }

    /// Resolves the endpoint against `base`; the site URL is one
    /// percent-encoded path segment.
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base).with_context(|| format!("parse api base '{base}'"))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("api base '{base}' cannot carry a path"))?
            .pop_if_empty()
            .extend(self.segments());
        Ok(url)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Endpoint::Sites)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::SearchAnalytics { site_url } => write!(f, "searchAnalytics.query({site_url})"),
            Endpoint::UrlInspection => f.write_str("urlInspection.index.inspect"),
            Endpoint::Sites => f.write_str("sites.list"),
        }
    }
}

pub trait Transport {
    fn submit(&self, endpoint: &Endpoint, payload: &Value) -> Result<Value>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn submit(&self, endpoint: &Endpoint, payload: &Value) -> Result<Value> {
        (**self).submit(endpoint, payload)
    }
}

pub struct HttpTransport {
    client: Client,
    api_base: String,
    token: String,
}

impl HttpTransport {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gsc-query/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Reads the bearer token from the environment variable `token_env`.
    pub fn from_env(api_base: &str, token_env: &str, timeout: Duration) -> Result<Self> {
        let token = std::env::var(token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("no access token; set {token_env}"))?;
        Self::new(api_base, token.trim(), timeout)
    }
}

impl Transport for HttpTransport {
    fn submit(&self, endpoint: &Endpoint, payload: &Value) -> Result<Value> {
        let url = endpoint.url(&self.api_base)?;
        let request = if endpoint.is_read_only() {
            self.client.get(url)
        } else {
            self.client.post(url).json(payload)
        };
        let response = request
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("send request to {endpoint}"))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("read response body from {endpoint}"))?;
        if !status.is_success() {
            anyhow::bail!("{endpoint} returned {status}: {}", body.trim());
        }
        serde_json::from_str(&body).with_context(|| format!("parse response from {endpoint} (status {status})"))
    }
}

/// Plays back recorded responses in order and remembers every request.
///
/// A recorded response shaped like an API error (`{"error": {...}}`) is
/// returned as a transport failure, the way [`HttpTransport`] reports a
/// non-2xx status.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    responses: RefCell<VecDeque<Value>>,
    calls: RefCell<Vec<(Endpoint, Value)>>,
}

impl ReplayTransport {
    pub fn new(responses: impl IntoIterator<Item = Value>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// One JSON document per non-blank line.
    pub fn from_jsonl(text: &str) -> Result<Self> {
        let responses = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).with_context(|| format!("parse recorded response on line {}", idx + 1))
            })
            .collect::<Result<Vec<Value>>>()?;
        Ok(Self::new(responses))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_jsonl(&text)
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ReplayTransport {
    fn submit(&self, endpoint: &Endpoint, payload: &Value) -> Result<Value> {
        self.calls.borrow_mut().push((endpoint.clone(), payload.clone()));
        let response = self
            .responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no recorded response left for {endpoint}"))?;
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            anyhow::bail!("{endpoint} returned an error: {message}");
        }
        Ok(response)
    }
}
