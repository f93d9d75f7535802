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

use std::fmt;

use log::debug;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::RemoteQueryError;
use crate::inspection::InspectUrl;
use crate::query::Query;
use crate::transport::Endpoint;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionLevel {
    #[serde(rename = "siteOwner")]
    Owner,
    #[serde(rename = "siteFullUser")]
    FullUser,
    #[serde(rename = "siteRestrictedUser")]
    RestrictedUser,
    #[serde(rename = "siteUnverifiedUser")]
    UnverifiedUser,
    #[serde(other)]
    Unknown,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::Owner => "siteOwner",
            PermissionLevel::FullUser => "siteFullUser",
            PermissionLevel::RestrictedUser => "siteRestrictedUser",
            PermissionLevel::UnverifiedUser => "siteUnverifiedUser",
            PermissionLevel::Unknown => "unknown",
        }
    }

    /// Unverified users cannot read any data.
    pub fn can_query(self) -> bool {
        matches!(
            self,
            PermissionLevel::Owner | PermissionLevel::FullUser | PermissionLevel::RestrictedUser
        )
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebProperty {
    pub site_url: String,
    pub permission_level: PermissionLevel,
}

impl WebProperty {
    pub fn is_domain_property(&self) -> bool {
        self.site_url.starts_with("sc-domain:")
    }

    pub fn query(&self) -> Query {
        Query::new(&self.site_url)
    }

    pub fn inspect(&self) -> InspectUrl {
        InspectUrl::new(&self.site_url)
    }
}

#[derive(Deserialize)]
struct SitesResponse {
    #[serde(default, rename = "siteEntry")]
    site_entry: Vec<WebProperty>,
}

/// Webproperties visible to the credentials behind a transport. The list
/// is fetched once and kept.
#[derive(Debug, Clone, Default)]
pub struct Account {
    properties: Option<Vec<WebProperty>>,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn webproperties<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<&[WebProperty], RemoteQueryError> {
        if self.properties.is_none() {
            self.properties = Some(list_sites(transport)?);
        }
        Ok(self.properties.as_deref().unwrap_or_default())
    }

    pub fn find<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        site_url: &str,
    ) -> Result<Option<&WebProperty>, RemoteQueryError> {
        let properties = self.webproperties(transport)?;
        Ok(properties.iter().find(|p| p.site_url == site_url))
    }

    /// Drops the cached list so the next call asks the API again.
    pub fn refresh(&mut self) {
        self.properties = None;
    }
}

fn list_sites<T: Transport + ?Sized>(transport: &T) -> Result<Vec<WebProperty>, RemoteQueryError> {
    let endpoint = Endpoint::Sites;
    debug!("{endpoint}");
    let response = transport
        .submit(&endpoint, &Value::Null)
        .map_err(|source| RemoteQueryError::Transport {
            endpoint: endpoint.to_string(),
            offset: 0,
            source,
        })?;
    let parsed: SitesResponse =
        serde_json::from_value(response).map_err(|e| RemoteQueryError::MalformedResponse {
            endpoint: endpoint.to_string(),
            offset: 0,
            reason: e.to_string(),
        })?;
    Ok(parsed.site_entry)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::ReplayTransport;

    #[test]
    fn lists_once_and_finds_by_exact_url() {
        let transport = ReplayTransport::new([json!({
            "siteEntry": [
                {"siteUrl": "https://www.example.com/", "permissionLevel": "siteOwner"},
                {"siteUrl": "sc-domain:example.org", "permissionLevel": "siteUnverifiedUser"},
                {"siteUrl": "https://new.example.net/", "permissionLevel": "siteSomethingElse"}
            ]
        })]);
        let mut account = Account::new();
        let properties = account.webproperties(&transport).expect("list");
        assert_eq!(properties.len(), 3);
        assert_eq!(properties[0].permission_level, PermissionLevel::Owner);
        assert!(properties[1].is_domain_property());
        assert!(!properties[1].permission_level.can_query());
        assert_eq!(properties[2].permission_level, PermissionLevel::Unknown);

        let found = account
            .find(&transport, "sc-domain:example.org")
            .expect("find")
            .expect("present");
        assert_eq!(found.inspect().site_url(), "sc-domain:example.org");
        assert!(account.find(&transport, "https://example.org/").expect("find").is_none());
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn missing_site_entry_means_no_properties() {
        let transport = ReplayTransport::new([json!({})]);
        let mut account = Account::new();
        assert!(account.webproperties(&transport).expect("list").is_empty());
    }

    #[test]
    fn transport_failure_is_remote_error() {
        let transport = ReplayTransport::default();
        let mut account = Account::new();
        let err = account.webproperties(&transport).unwrap_err();
        assert_eq!(err.endpoint(), "sites.list");
    }
}
