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

mod cli;
mod logging;
mod output;

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use gsc_query::Account;
use gsc_query::ConfigError;
use gsc_query::Error;
use gsc_query::InspectUrl;
use gsc_query::InspectionReport;
use gsc_query::PersistenceError;
use gsc_query::Query;
use gsc_query::RemoteQueryError;
use gsc_query::Report;
use gsc_query::Transport;
use gsc_query::config::Config;
use gsc_query::config::global_config_path;
use gsc_query::config::load_global_config;
use gsc_query::dates::parse_iso_date;
use gsc_query::payload;
use gsc_query::transport::ReplayTransport;
use serde_json::Map;
use serde_json::Value;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::InspectArgs;
use crate::cli::QueryArgs;
use crate::cli::ReportCommands;
use crate::output::JsonResponse;
use crate::output::StatsOut;
use crate::output::print_json;
use crate::output::print_table;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    match cli.command {
        Commands::Sites(args) => handle_result(cmd_sites(args.replay.as_deref(), args.json), args.json),
        Commands::Query(args) => {
            let json = args.json;
            handle_result(cmd_query(args), json)
        }
        Commands::Inspect(args) => {
            let json = args.json;
            handle_result(cmd_inspect(args), json)
        }
        Commands::Report { command } => match command {
            ReportCommands::Show { path, json } => handle_result(cmd_report_show(&path, json), json),
            ReportCommands::Csv { path, out } => cmd_report_csv(&path, out),
        },
        Commands::Config { json } => handle_result(cmd_config(json), json),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let (code, details) = describe_error(&err);
                let resp = JsonResponse::error(code, &err.to_string()).with_details(details, None);
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn describe_error(err: &anyhow::Error) -> (&'static str, Option<String>) {
    let remote = |e: &RemoteQueryError| Some(format!("endpoint {} offset {}", e.endpoint(), e.offset()));
    if let Some(err) = err.downcast_ref::<Error>() {
        return match err {
            Error::Config(_) => ("invalid_query", None),
            Error::Remote(e) => ("remote_error", remote(e)),
            Error::Persistence(_) => ("persistence_error", None),
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return ("invalid_query", None);
    }
    if let Some(e) = err.downcast_ref::<RemoteQueryError>() {
        return ("remote_error", remote(e));
    }
    if err.downcast_ref::<PersistenceError>().is_some() {
        return ("persistence_error", None);
    }
    ("error", None)
}

fn open_transport(config: &Config, replay: Option<&Path>) -> Result<Box<dyn Transport>> {
    match replay {
        Some(path) => Ok(Box::new(ReplayTransport::from_file(path)?)),
        None => Ok(Box::new(config.http_transport()?)),
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    started.elapsed().as_millis() as i64
}

fn save_report(
    save: &Option<Option<PathBuf>>,
    config: &Config,
    explicit: impl FnOnce(&Path) -> std::result::Result<PathBuf, PersistenceError>,
    automatic: impl FnOnce(&Path) -> std::result::Result<PathBuf, PersistenceError>,
) -> Result<Option<String>> {
    let path = match save {
        None => return Ok(None),
        Some(Some(path)) => explicit(path)?,
        Some(None) => automatic(&config.report_dir)?,
    };
    Ok(Some(path.display().to_string()))
}

fn cmd_sites(replay: Option<&Path>, json: bool) -> Result<()> {
    let config = load_global_config()?;
    let transport = open_transport(&config, replay)?;
    let started = Instant::now();
    let mut account = Account::new();
    let properties = account.webproperties(transport.as_ref())?;

    if json {
        let results = properties
            .iter()
            .map(|p| match serde_json::to_value(p) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Ok(Map::new()),
                Err(e) => Err(e),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let resp = JsonResponse::ok().with_results(results).with_stats(StatsOut {
            took_ms: elapsed_ms(started),
            rows: properties.len() as u64,
            requests: Some(1),
            from_cache: None,
        });
        print_json(&resp)?;
    } else {
        for property in properties {
            println!("{}\t{}", property.site_url, property.permission_level);
        }
    }
    Ok(())
}

fn apply_dates(query: &mut Query, args: &QueryArgs) {
    if let Some(days) = args.last {
        query.last_days(days);
        return;
    }
    match (&args.start, &args.end) {
        (Some(start), Some(end)) => query.range_iso(start, end),
        (Some(start), None) if args.days.is_some() || args.months.is_some() => query.range_relative(
            start.as_str(),
            args.days.unwrap_or(0),
            args.months.unwrap_or(0),
        ),
        (Some(start), None) => query.start_date(start.as_str()),
        (None, Some(end)) => query.end_date(end.as_str()),
        (None, None) => query.default_range(),
    };
}

fn build_query(args: &QueryArgs, config: &Config) -> Result<Query> {
    let mut query = Query::new(&args.site);
    if let Some(today) = &args.today {
        query.today(parse_iso_date(today)?);
    }
    query
        .search_type(args.search_type.unwrap_or(config.search_type))
        .data_state(args.data_state.unwrap_or(config.data_state))
        .dimensions(args.dimensions.iter().copied());
    if let Some(aggregation) = args.aggregation {
        query.aggregation(aggregation);
    }
    apply_dates(&mut query, args);
    for filter in &args.filters {
        query.filter(filter.clone());
    }
    for filter in &args.and_filters {
        query.and_filter(filter.clone());
    }
    query.page_size(config.page_size);
    match (args.limit, args.page) {
        (Some(limit), true) => {
            query.limit(limit);
        }
        (Some(limit), false) => {
            query.page_size(limit);
        }
        (None, _) => {}
    }
    if let Some(offset) = args.offset {
        query.offset(offset);
    }
    if let Some(max_rows) = args.max_rows.or(config.max_rows) {
        query.max_rows(max_rows);
    }
    Ok(query)
}

fn cmd_query(args: QueryArgs) -> Result<()> {
    let config = load_global_config()?;
    let mut query = build_query(&args, &config)?;
    let state = query.resolve()?;

    if args.dry_run {
        let (start_row, row_limit) = if args.page {
            (state.start_row, state.row_limit)
        } else {
            (0, query.policy().page_size)
        };
        let request = payload::search_analytics(&state, start_row, row_limit);
        if args.json {
            let resp = JsonResponse::ok()
                .with_webproperty(&state.site_url)
                .with_query(serde_json::to_value(&state).context("encode query")?)
                .with_request(request);
            print_json(&resp)?;
        } else {
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        return Ok(());
    }

    let transport = open_transport(&config, args.replay.as_deref())?;
    let started = Instant::now();
    let (report, requests, next_offset) = if args.page {
        let report = query.execute_report(transport.as_ref())?;
        let window = report.query();
        let next = (report.len() as u64 >= u64::from(window.row_limit))
            .then(|| u64::from(window.start_row) + report.len() as u64);
        (report, Some(1), next)
    } else {
        (query.get(transport.as_ref())?, None, None)
    };
    let took_ms = elapsed_ms(started);

    let saved = save_report(
        &args.save,
        &config,
        |path| report.to_disk(Some(path)),
        |dir| report.to_disk_in(dir),
    )?;

    if args.json {
        let resp = JsonResponse::ok()
            .with_webproperty(report.webproperty())
            .with_query(serde_json::to_value(report.query()).context("encode query")?)
            .with_table(report.to_table())
            .with_stats(StatsOut {
                took_ms,
                rows: report.len() as u64,
                requests,
                from_cache: None,
            })
            .with_saved(saved)
            .with_next_offset(next_offset);
        print_json(&resp)?;
    } else {
        print_table(report.to_table());
        if let Some(path) = saved {
            eprintln!("saved {path}");
        }
        if let Some(next) = next_offset {
            eprintln!("more rows may follow; rerun with --offset {next}");
        }
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let config = load_global_config()?;
    let mut inspect = InspectUrl::new(&args.site);
    inspect.ttl(config.inspection_ttl()).add_urls(args.urls.iter().cloned(), false);
    if let Some(language) = &args.language {
        inspect.language(language.as_str());
    }
    inspect.validate()?;

    let transport = open_transport(&config, args.replay.as_deref())?;
    let started = Instant::now();
    let report = inspect.get(transport.as_ref())?;
    let took_ms = elapsed_ms(started);

    let saved = save_report(
        &args.save,
        &config,
        |path| report.to_disk(Some(path)),
        |dir| report.to_disk_in(dir),
    )?;

    if args.json {
        let resp = JsonResponse::ok()
            .with_webproperty(report.webproperty())
            .with_query(serde_json::to_value(report.query()).context("encode query")?)
            .with_table(report.to_table())
            .with_stats(StatsOut {
                took_ms,
                rows: report.len() as u64,
                requests: Some(report.len() as u64),
                from_cache: None,
            })
            .with_saved(saved);
        print_json(&resp)?;
    } else {
        print_table(report.to_table());
        if let Some(path) = saved {
            eprintln!("saved {path}");
        }
    }
    Ok(())
}

enum SavedReport {
    SearchAnalytics(Report),
    Inspection(InspectionReport),
}

fn load_saved(path: &Path) -> Result<SavedReport> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    match Report::from_datastream(&bytes) {
        Ok(report) => Ok(SavedReport::SearchAnalytics(report)),
        Err(PersistenceError::KindMismatch { .. }) => {
            Ok(SavedReport::Inspection(InspectionReport::from_datastream(&bytes)?))
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_report_show(path: &Path, json: bool) -> Result<()> {
    let saved = load_saved(path)?;
    let (webproperty, query, table) = match &saved {
        SavedReport::SearchAnalytics(report) => (
            report.webproperty(),
            serde_json::to_value(report.query())?,
            report.to_table(),
        ),
        SavedReport::Inspection(report) => (
            report.webproperty(),
            serde_json::to_value(report.query())?,
            report.to_table(),
        ),
    };
    if json {
        let resp = JsonResponse::ok()
            .with_webproperty(webproperty)
            .with_query(query)
            .with_table(table);
        print_json(&resp)?;
    } else {
        print_table(table);
    }
    Ok(())
}

fn cmd_report_csv(path: &Path, out: Option<PathBuf>) -> Result<()> {
    let saved = load_saved(path)?;
    let mut writer: Box<dyn Write> = match &out {
        Some(out) => Box::new(
            std::fs::File::create(out).with_context(|| format!("create {}", out.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    match &saved {
        SavedReport::SearchAnalytics(report) => report.write_csv(&mut writer)?,
        SavedReport::Inspection(report) => report.write_csv(&mut writer)?,
    }
    writer.flush()?;
    if let Some(out) = out {
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_config(json: bool) -> Result<()> {
    let config = load_global_config()?;
    let path = global_config_path();
    if json {
        let resp = JsonResponse::ok().with_config(serde_json::json!({
            "path": path.as_ref().map(|p| p.display().to_string()),
            "exists": path.as_ref().is_some_and(|p| p.exists()),
            "values": serde_json::to_value(&config)?,
        }));
        print_json(&resp)?;
    } else {
        match &path {
            Some(path) => println!("# {}", path.display()),
            None => println!("# config directory unavailable"),
        }
        print!("{}", toml::to_string_pretty(&config).context("encode config")?);
    }
    Ok(())
}
