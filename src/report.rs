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

//! The report container, its tabular export and the byte-stream bridge.
//!
//! A persisted report is a JSON envelope:
//! `{format, version, webproperty, query, rows}`. The query echo travels
//! with the rows, so a report read back from disk is indistinguishable
//! from a freshly fetched one.

use std::convert::Infallible;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;

use crate::enums::Metric;
use crate::error::PersistenceError;
use crate::query::QueryState;

pub const SEARCH_ANALYTICS_FORMAT: &str = "gsc-query/search-analytics";
pub const INSPECTION_FORMAT: &str = "gsc-query/inspection";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub keys: Vec<String>,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&Cell> for Value {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Text(text) => Value::String(text.clone()),
            Cell::Number(n) => Value::from(*n),
            Cell::Empty => Value::Null,
        }
    }
}

/// Receives a report as a header followed by rows of cells.
pub trait TableSink {
    type Error;

    fn columns(&mut self, columns: &[String]) -> Result<(), Self::Error>;

    fn row(&mut self, cells: Vec<Cell>) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// One column → value map per row.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|cells| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(cells.iter().map(Value::from))
                    .collect()
            })
            .collect()
    }
}

impl TableSink for Table {
    type Error = Infallible;

    fn columns(&mut self, columns: &[String]) -> Result<(), Self::Error> {
        self.columns = columns.to_vec();
        self.rows.clear();
        Ok(())
    }

    fn row(&mut self, cells: Vec<Cell>) -> Result<(), Self::Error> {
        self.rows.push(cells);
        Ok(())
    }
}

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn finish(mut self) -> Result<(), csv::Error> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> TableSink for CsvSink<W> {
    type Error = csv::Error;

    fn columns(&mut self, columns: &[String]) -> Result<(), Self::Error> {
        self.writer.write_record(columns)
    }

    fn row(&mut self, cells: Vec<Cell>) -> Result<(), Self::Error> {
        self.writer.write_record(cells.iter().map(Cell::to_string))
    }
}

pub(crate) fn build_table(export: impl FnOnce(&mut Table) -> Result<(), Infallible>) -> Table {
    let mut table = Table::default();
    match export(&mut table) {
        Ok(()) => table,
        Err(never) => match never {},
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    webproperty: String,
    query: QueryState,
    rows: Vec<Row>,
    table: OnceLock<Table>,
}

impl PartialEq for Report {
    fn eq(&self, other: &Self) -> bool {
        self.webproperty == other.webproperty && self.query == other.query && self.rows == other.rows
    }
}

impl Report {
    pub fn new(query: QueryState, rows: Vec<Row>) -> Self {
        Self {
            webproperty: query.site_url.clone(),
            query,
            rows,
            table: OnceLock::new(),
        }
    }

    pub fn webproperty(&self) -> &str {
        &self.webproperty
    }

    /// The resolved query that produced these rows.
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&Row> {
        self.rows.last()
    }

    /// Requested dimensions followed by the metrics the search type reports.
    pub fn columns(&self) -> Vec<String> {
        self.query
            .dimensions
            .iter()
            .map(|d| d.as_str().to_string())
            .chain(
                Metric::for_search_type(self.query.search_type)
                    .into_iter()
                    .map(|m| m.as_str().to_string()),
            )
            .collect()
    }

    pub fn export<S: TableSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        let metrics = Metric::for_search_type(self.query.search_type);
        sink.columns(&self.columns())?;
        for row in &self.rows {
            let mut cells: Vec<Cell> = row.keys.iter().cloned().map(Cell::Text).collect();
            cells.extend(metrics.iter().map(|metric| match metric {
                Metric::Clicks => Cell::Number(row.clicks),
                Metric::Impressions => Cell::Number(row.impressions),
                Metric::Ctr => Cell::Number(row.ctr),
                Metric::Position => row.position.map(Cell::Number).unwrap_or(Cell::Empty),
            }));
            sink.row(cells)?;
        }
        Ok(())
    }

    /// Built on first use, then reused.
    pub fn to_table(&self) -> &Table {
        self.table.get_or_init(|| build_table(|table| self.export(table)))
    }

    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.to_table().records()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut sink = CsvSink::new(writer);
        self.export(&mut sink)?;
        sink.finish()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        encode(SEARCH_ANALYTICS_FORMAT, &self.webproperty, &self.query, &self.rows)
    }

    pub fn from_datastream(bytes: &[u8]) -> Result<Self, PersistenceError> {
        let (webproperty, query, rows) = decode(SEARCH_ANALYTICS_FORMAT, bytes)?;
        Ok(Self {
            webproperty,
            query,
            rows,
            table: OnceLock::new(),
        })
    }

    pub fn default_file_name(&self) -> Result<String, PersistenceError> {
        default_file_name(&self.webproperty, &self.query)
    }

    /// Writes the report to `path`, or to its default file name in the
    /// current directory. An existing file is overwritten.
    pub fn to_disk(&self, path: Option<&Path>) -> Result<PathBuf, PersistenceError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(self.default_file_name()?),
        };
        write_file(&path, &self.to_bytes()?)?;
        Ok(path)
    }

    pub fn to_disk_in(&self, dir: &Path) -> Result<PathBuf, PersistenceError> {
        let path = dir.join(self.default_file_name()?);
        self.to_disk(Some(&path))
    }

    pub fn from_disk(path: &Path) -> Result<Self, PersistenceError> {
        Self::from_datastream(&read_file(path)?)
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, Q, R> {
    format: &'a str,
    version: u32,
    webproperty: &'a str,
    query: &'a Q,
    rows: &'a [R],
}

#[derive(Deserialize)]
struct Header {
    format: String,
    version: u32,
}

#[derive(Deserialize)]
struct EnvelopeIn<Q, R> {
    webproperty: String,
    query: Q,
    rows: Vec<R>,
}

pub(crate) fn encode<Q: Serialize, R: Serialize>(
    format: &str,
    webproperty: &str,
    query: &Q,
    rows: &[R],
) -> Result<Vec<u8>, PersistenceError> {
    let envelope = EnvelopeOut {
        format,
        version: FORMAT_VERSION,
        webproperty,
        query,
        rows,
    };
    serde_json::to_vec(&envelope).map_err(PersistenceError::Encode)
}

pub(crate) fn decode<Q: DeserializeOwned, R: DeserializeOwned>(
    format: &'static str,
    bytes: &[u8],
) -> Result<(String, Q, Vec<R>), PersistenceError> {
    let header: Header = serde_json::from_slice(bytes).map_err(PersistenceError::Decode)?;
    if header.format != format {
        return Err(PersistenceError::KindMismatch {
            found: header.format,
            expected: format,
        });
    }
    if header.version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: header.version,
            expected: FORMAT_VERSION,
        });
    }
    let envelope: EnvelopeIn<Q, R> = serde_json::from_slice(bytes).map_err(PersistenceError::Decode)?;
    Ok((envelope.webproperty, envelope.query, envelope.rows))
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    std::fs::write(path, bytes).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, PersistenceError> {
    std::fs::read(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `<site>_<hash>.gsc.json`, where the hash covers the whole query echo so
/// reruns of one query land on the same file.
pub fn default_file_name<Q: Serialize>(webproperty: &str, query: &Q) -> Result<String, PersistenceError> {
    let encoded = serde_json::to_vec(query).map_err(PersistenceError::Encode)?;
    let digest = hex::encode(Sha256::digest(&encoded));
    Ok(format!("{}_{}.gsc.json", sanitize_site(webproperty), &digest[..16]))
}

fn sanitize_site(site: &str) -> String {
    let bare = site
        .trim_start_matches("sc-domain:")
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let name: String = bare
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let name = name.trim_matches('_');
    if name.is_empty() {
        "report".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use time::macros::date;

    use super::*;
    use crate::enums::Dimension;
    use crate::enums::SearchType;
    use crate::query::Query;

    fn report(search_type: SearchType) -> Report {
        let mut query = Query::new("https://www.example.com/");
        query
            .today(date!(2024 - 03 - 10))
            .search_type(search_type)
            .dimensions([Dimension::Page, Dimension::Device]);
        let state = query.resolve().expect("resolve");
        let rows = vec![
            Row {
                keys: vec!["https://www.example.com/a".to_string(), "MOBILE".to_string()],
                clicks: 12.0,
                impressions: 340.0,
                ctr: 0.035,
                position: Some(4.5),
            },
            Row {
                keys: vec!["https://www.example.com/b".to_string(), "DESKTOP".to_string()],
                clicks: 3.0,
                impressions: 90.0,
                ctr: 0.033,
                position: None,
            },
        ];
        Report::new(state, rows)
    }

    #[test]
    fn datastream_round_trip_keeps_rows_and_query() {
        let original = report(SearchType::Web);
        let bytes = original.to_bytes().expect("encode");
        let back = Report::from_datastream(&bytes).expect("decode");
        assert_eq!(back, original);
        assert_eq!(back.query(), original.query());
        assert_eq!(back.webproperty(), "https://www.example.com/");
    }

    #[test]
    fn disk_round_trip_under_default_name() {
        let dir = tempdir().expect("tempdir");
        let original = report(SearchType::Web);
        let path = original.to_disk_in(dir.path()).expect("write");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("www_example_com_"));
        assert!(name.ends_with(".gsc.json"));
        assert_eq!(name.len(), "www_example_com_".len() + 16 + ".gsc.json".len());

        let again = original.to_disk_in(dir.path()).expect("overwrite");
        assert_eq!(again, path);
        assert_eq!(Report::from_disk(&path).expect("read"), original);
    }

    #[test]
    fn default_name_follows_query() {
        let web = report(SearchType::Web);
        let image = report(SearchType::Image);
        assert_eq!(
            web.default_file_name().expect("name"),
            report(SearchType::Web).default_file_name().expect("name")
        );
        assert_ne!(
            web.default_file_name().expect("name"),
            image.default_file_name().expect("name")
        );
    }

    #[test]
    fn unreadable_streams_are_persistence_errors() {
        assert!(matches!(
            Report::from_datastream(b"not json"),
            Err(PersistenceError::Decode(_))
        ));
        let future = br#"{"format":"gsc-query/search-analytics","version":9,"webproperty":"x","query":{},"rows":[]}"#;
        assert!(matches!(
            Report::from_datastream(future),
            Err(PersistenceError::UnsupportedVersion { found: 9, .. })
        ));
        let other = br#"{"format":"gsc-query/inspection","version":1,"webproperty":"x","query":{},"rows":[]}"#;
        assert!(matches!(
            Report::from_datastream(other),
            Err(PersistenceError::KindMismatch { .. })
        ));
        let missing = tempdir().expect("tempdir");
        assert!(matches!(
            Report::from_disk(&missing.path().join("absent.gsc.json")),
            Err(PersistenceError::Io { .. })
        ));
    }

    #[test]
    fn table_is_built_once() {
        let report = report(SearchType::Web);
        let first: *const Table = report.to_table();
        let second: *const Table = report.to_table();
        assert_eq!(first, second);
        let table = report.to_table();
        assert_eq!(
            table.columns,
            vec!["page", "device", "clicks", "impressions", "ctr", "position"]
        );
        assert_eq!(table.rows[1][5], Cell::Empty);
        let records = report.records();
        assert_eq!(records[0]["device"], "MOBILE");
        assert_eq!(records[0]["position"], 4.5);
        assert!(records[1]["position"].is_null());
    }

    #[test]
    fn discover_report_has_no_position_column() {
        let report = report(SearchType::Discover);
        assert_eq!(report.columns(), vec!["page", "device", "clicks", "impressions", "ctr"]);
        assert_eq!(report.to_table().rows[0].len(), 5);
    }

    #[test]
    fn csv_export() {
        let report = report(SearchType::Web);
        let mut out = Vec::new();
        report.write_csv(&mut out).expect("csv");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "page,device,clicks,impressions,ctr,position");
        assert_eq!(lines[1], "https://www.example.com/a,MOBILE,12,340,0.035,4.5");
        assert_eq!(lines[2], "https://www.example.com/b,DESKTOP,3,90,0.033,");
    }
}
