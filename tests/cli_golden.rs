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

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use jsonschema::JSONSchema;
use predicates::prelude::*;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

const SITE: &str = "https://www.example.com/";
const TODAY: &str = "2024-03-10";

fn gsc_cmd(config_root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gsc"));
    cmd.env("XDG_CONFIG_HOME", config_root);
    cmd.env("HOME", config_root);
    cmd.env("APPDATA", config_root);
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("GSC_ACCESS_TOKEN");
    cmd
}

fn global_config_path(config_root: &Path) -> PathBuf {
    let base = if cfg!(target_os = "macos") {
        config_root.join("Library").join("Application Support")
    } else {
        config_root.to_path_buf()
    };
    base.join("gsc").join("gsc.toml")
}

fn compile_schema(text: &str) -> JSONSchema {
    let schema_json: Value = serde_json::from_str(text).expect("schema json");
    JSONSchema::options()
        .compile(&schema_json)
        .expect("compile schema")
}

fn request_schema() -> JSONSchema {
    compile_schema(include_str!("../schemas/search_analytics_request.schema.json"))
}

fn response_schema() -> JSONSchema {
    compile_schema(include_str!("../schemas/response.schema.json"))
}

fn assert_schema(schema: &JSONSchema, value: &Value) {
    if let Err(errors) = schema.validate(value) {
        let msgs: Vec<String> = errors.map(|e| e.to_string()).collect();
        panic!("schema validation failed:\n{}", msgs.join("\n"));
    }
}

fn normalize_json(mut value: Value) -> Value {
    if let Some(stats) = value.get_mut("stats")
        && let Some(obj) = stats.as_object_mut()
    {
        obj.insert("took_ms".to_string(), json!(0));
    }
    value
}

fn run_json(cmd: &mut Command, cwd: &Path) -> Value {
    let output = cmd.current_dir(cwd).output().expect("run command");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("parse json")
}

fn write_replay(dir: &Path, name: &str, responses: &[Value]) -> PathBuf {
    let path = dir.join(name);
    let lines: Vec<String> = responses.iter().map(|r| r.to_string()).collect();
    fs::write(&path, lines.join("\n")).expect("write replay");
    path
}

fn page_row(page: &str, clicks: f64) -> Value {
    json!({
        "keys": [page],
        "clicks": clicks,
        "impressions": clicks * 10.0,
        "ctr": 0.1,
        "position": 4.5,
    })
}

#[test]
fn dry_run_request_payload() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let request_schema = request_schema();
    let response_schema = response_schema();

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args([
        "query",
        SITE,
        "--today",
        TODAY,
        "--last",
        "7",
        "-d",
        "page",
        "-d",
        "query",
        "--filter",
        "page:contains:/blog/",
        "--and-filter",
        "query:notContains:brand",
        "--page",
        "--limit",
        "100",
        "--offset",
        "200",
        "--dry-run",
        "--json",
    ]);
    let resp = run_json(&mut cmd, temp.path());
    assert_schema(&response_schema, &resp);
    assert_eq!(resp["ok"], json!(true));
    assert_eq!(resp["webproperty"], json!(SITE));

    let request = resp["request"].clone();
    assert_schema(&request_schema, &request);
    insta::assert_json_snapshot!(request, @r#"
    {
      "aggregationType": "auto",
      "dataState": "final",
      "dimensionFilterGroups": [
        {
          "filters": [
            {
              "dimension": "page",
              "expression": "/blog/",
              "operator": "contains"
            },
            {
              "dimension": "query",
              "expression": "brand",
              "operator": "notContains"
            }
          ],
          "groupType": "and"
        }
      ],
      "dimensions": [
        "page",
        "query"
      ],
      "endDate": "2024-03-09",
      "rowLimit": 100,
      "startDate": "2024-03-03",
      "startRow": 200,
      "type": "web"
    }
    "#);
}

#[test]
fn dry_run_without_page_uses_page_size() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let schema = request_schema();

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args([
        "query",
        "sc-domain:example.com",
        "--today",
        TODAY,
        "--start",
        "2024-03-01",
        "--end",
        "2024-03-05",
        "--search-type",
        "discover",
        "--data-state",
        "fresh",
        "--dry-run",
    ]);
    let request = run_json(&mut cmd, temp.path());
    assert_schema(&schema, &request);
    assert_eq!(request["type"], json!("discover"));
    assert_eq!(request["dataState"], json!("all"));
    assert_eq!(request["rowLimit"], json!(25000));
    assert_eq!(request["startRow"], json!(0));
    assert!(request.get("dimensions").is_none());
    assert!(request.get("dimensionFilterGroups").is_none());
}

#[test]
fn config_file_sets_defaults() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let config_path = global_config_path(config_temp.path());
    fs::create_dir_all(config_path.parent().expect("config parent")).expect("config dir");
    fs::write(
        &config_path,
        "page_size = 50000\nsearch_type = \"image\"\ndata_state = \"all\"\n",
    )
    .expect("write config");

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["config", "--json"]);
    let resp = run_json(&mut cmd, temp.path());
    assert_schema(&response_schema(), &resp);
    assert_eq!(resp["config"]["exists"], json!(true));
    assert_eq!(resp["config"]["values"]["page_size"], json!(25000));
    assert_eq!(resp["config"]["values"]["search_type"], json!("image"));

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["query", SITE, "--today", TODAY, "--dry-run"]);
    let request = run_json(&mut cmd, temp.path());
    assert_eq!(request["type"], json!("image"));
    assert_eq!(request["dataState"], json!("all"));
    assert_eq!(request["startDate"], json!("2024-03-08"));
    assert_eq!(request["endDate"], json!("2024-03-09"));
}

#[test]
fn configuration_errors_use_error_envelope() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let schema = response_schema();

    let cases: [&[&str]; 5] = [
        &["--start", "2022-01-01", "--end", "2022-01-31"],
        &["--last", "0"],
        &["--start", "2024-03-05", "--end", "2024-03-01"],
        &["--search-type", "discover", "-d", "query"],
        &["-d", "page", "-d", "page"],
    ];
    for extra in cases {
        let mut cmd = gsc_cmd(config_temp.path());
        cmd.args(["query", SITE, "--today", TODAY, "--dry-run", "--json"]);
        cmd.args(extra);
        let resp = run_json(&mut cmd, temp.path());
        assert_schema(&schema, &resp);
        assert_eq!(resp["ok"], json!(false), "{extra:?}");
        assert_eq!(resp["error"]["code"], json!("invalid_query"), "{extra:?}");
    }

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["query", SITE, "--today", TODAY, "--end", "2024-03-10", "--dry-run"]);
    cmd.current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn replay_collects_every_page() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    let schema = response_schema();
    let replay = write_replay(
        root,
        "pages.jsonl",
        &[
            json!({"rows": [page_row("/a", 30.0), page_row("/b", 20.0)]}),
            json!({"rows": [page_row("/c", 10.0)]}),
        ],
    );
    let saved = root.join("report.gsc.json");

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["query", SITE, "--today", TODAY, "-d", "page", "--limit", "2", "--json"]);
    cmd.arg("--replay").arg(&replay);
    cmd.arg("--save").arg(&saved);
    let resp = normalize_json(run_json(&mut cmd, root));
    assert_schema(&schema, &resp);
    assert_eq!(
        resp["columns"],
        json!(["page", "clicks", "impressions", "ctr", "position"])
    );
    assert_eq!(resp["stats"]["rows"], json!(3));
    assert_eq!(resp["query"]["start_row"], json!(0));
    assert_eq!(resp["query"]["row_limit"], json!(2));
    assert_eq!(resp["results"][2]["page"], json!("/c"));
    assert_eq!(resp["results"][0]["impressions"], json!(300.0));
    assert!(resp.get("next_offset").is_none());
    assert!(saved.exists());

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["report", "show", "--json"]).arg(&saved);
    let shown = run_json(&mut cmd, root);
    assert_schema(&schema, &shown);
    assert_eq!(shown["columns"], resp["columns"]);
    assert_eq!(shown["results"], resp["results"]);
    assert_eq!(shown["query"], resp["query"]);

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["report", "csv"]).arg(&saved);
    let output = cmd.current_dir(root).output().expect("report csv");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "page,clicks,impressions,ctr,position");
    assert!(lines[1].starts_with("/a,30"));
}

#[test]
fn replay_single_page_reports_next_offset() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    let replay = write_replay(
        root,
        "page.jsonl",
        &[json!({"rows": [page_row("/a", 3.0), page_row("/b", 2.0)]})],
    );

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args([
        "query", SITE, "--today", TODAY, "-d", "page", "--page", "--limit", "2", "--offset", "4",
        "--json",
    ]);
    cmd.arg("--replay").arg(&replay);
    let resp = normalize_json(run_json(&mut cmd, root));
    assert_schema(&response_schema(), &resp);
    assert_eq!(resp["stats"]["requests"], json!(1));
    assert_eq!(resp["next_offset"], json!(6));
    assert_eq!(resp["query"]["start_row"], json!(4));
}

#[test]
fn remote_failure_reports_offset() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    let replay = write_replay(
        root,
        "fail.jsonl",
        &[
            json!({"rows": [page_row("/a", 3.0), page_row("/b", 2.0)]}),
            json!({"error": {"message": "quota exceeded"}}),
        ],
    );

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["query", SITE, "--today", TODAY, "-d", "page", "--limit", "2", "--json"]);
    cmd.arg("--replay").arg(&replay);
    let resp = run_json(&mut cmd, root);
    assert_schema(&response_schema(), &resp);
    assert_eq!(resp["ok"], json!(false));
    assert_eq!(resp["error"]["code"], json!("remote_error"));
    let details = resp["error"]["details"].as_str().expect("details");
    assert!(details.ends_with("offset 2"), "{details}");
    assert!(resp.get("results").is_none());
}

#[test]
fn sites_from_replay() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    let replay = write_replay(
        root,
        "sites.jsonl",
        &[json!({"siteEntry": [
            {"siteUrl": "sc-domain:example.com", "permissionLevel": "siteOwner"},
            {"siteUrl": "https://blog.example.org/", "permissionLevel": "siteRestrictedUser"}
        ]})],
    );

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["sites", "--json"]).arg("--replay").arg(&replay);
    let resp = normalize_json(run_json(&mut cmd, root));
    assert_schema(&response_schema(), &resp);
    assert_eq!(
        resp["results"],
        json!([
            {"siteUrl": "sc-domain:example.com", "permissionLevel": "siteOwner"},
            {"siteUrl": "https://blog.example.org/", "permissionLevel": "siteRestrictedUser"}
        ])
    );

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["sites"]).arg("--replay").arg(&replay);
    cmd.current_dir(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("sc-domain:example.com\tsiteOwner"));
}

#[test]
fn inspect_from_replay() {
    let config_temp = TempDir::new().expect("config tempdir");
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    let replay = write_replay(
        root,
        "inspect.jsonl",
        &[json!({"inspectionResult": {
            "inspectionResultLink": "https://search.google.com/search-console/inspect",
            "indexStatusResult": {"coverageState": "Submitted and indexed"}
        }})],
    );
    let saved = root.join("inspect.gsc.json");

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["inspect", SITE, "https://www.example.com/about", "--json"]);
    cmd.arg("--replay").arg(&replay);
    cmd.arg("--save").arg(&saved);
    let resp = normalize_json(run_json(&mut cmd, root));
    assert_schema(&response_schema(), &resp);
    assert_eq!(resp["columns"][0], json!("inspectionUrl"));
    assert_eq!(
        resp["results"][0]["inspectionUrl"],
        json!("https://www.example.com/about")
    );
    assert_eq!(
        resp["results"][0]["indexStatusResult.coverageState"],
        json!("Submitted and indexed")
    );

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["report", "show", "--json"]).arg(&saved);
    let shown = run_json(&mut cmd, root);
    assert_eq!(shown["results"], resp["results"]);

    let mut cmd = gsc_cmd(config_temp.path());
    cmd.args(["inspect", SITE, "https://other.example.net/", "--json"]);
    cmd.arg("--replay").arg(&replay);
    let resp = run_json(&mut cmd, root);
    assert_eq!(resp["error"]["code"], json!("invalid_query"));
}
