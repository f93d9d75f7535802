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

use std::path::PathBuf;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use gsc_query::AggregationType;
use gsc_query::DataState;
use gsc_query::Dimension;
use gsc_query::Filter;
use gsc_query::SearchType;

#[derive(Parser, Debug)]
#[command(
    name = "gsc",
    version,
    about = "Query builder and report engine for Search Console"
)]
pub struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List accessible webproperties
    Sites(SitesArgs),

    /// Run a Search Analytics query
    Query(QueryArgs),

    /// Inspect URLs of a webproperty
    Inspect(InspectArgs),

    /// Work with saved reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Show the effective configuration
    Config {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct SitesArgs {
    /// Read responses from a recorded JSONL file instead of the API
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Webproperty, e.g. https://www.example.com/ or sc-domain:example.com
    pub site: String,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["days", "months"])]
    pub end: Option<String>,

    /// Days from --start to the end of the window (negative looks back)
    #[arg(long, requires = "start", allow_hyphen_values = true)]
    pub days: Option<i64>,

    /// Months from --start to the end of the window (negative looks back)
    #[arg(long, requires = "start", allow_hyphen_values = true)]
    pub months: Option<i32>,

    /// The last N days of available data
    #[arg(long, conflicts_with_all = ["start", "end", "days", "months"])]
    pub last: Option<u32>,

    /// Pretend today is this date (UTC)
    #[arg(long, hide = true)]
    pub today: Option<String>,

    /// Group by dimension (repeatable, order kept)
    #[arg(long = "dimension", short = 'd')]
    pub dimensions: Vec<Dimension>,

    /// Filter as DIM:OP:EXPR; replaces earlier filters on DIM
    #[arg(long = "filter", short = 'f')]
    pub filters: Vec<Filter>,

    /// Filter as DIM:OP:EXPR; ANDed with earlier filters on DIM
    #[arg(long = "and-filter")]
    pub and_filters: Vec<Filter>,

    /// web, image, video, news, discover or googleNews
    #[arg(long)]
    pub search_type: Option<SearchType>,

    /// final or fresh
    #[arg(long)]
    pub data_state: Option<DataState>,

    /// auto, byPage or byProperty
    #[arg(long)]
    pub aggregation: Option<AggregationType>,

    /// Rows per request (with --page) or per page
    #[arg(long)]
    pub limit: Option<u32>,

    /// First row (with --page)
    #[arg(long)]
    pub offset: Option<u32>,

    /// Fetch a single page instead of every row
    #[arg(long)]
    pub page: bool,

    /// Stop after this many rows
    #[arg(long)]
    pub max_rows: Option<u64>,

    /// Print the request payload without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Save the report (to PATH, or an automatic name in report_dir)
    #[arg(long, num_args = 0..=1)]
    pub save: Option<Option<PathBuf>>,

    /// Read responses from a recorded JSONL file instead of the API
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Webproperty the URLs belong to
    pub site: String,

    /// URLs to inspect
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Language for issue messages (BCP-47)
    #[arg(long)]
    pub language: Option<String>,

    /// Save the report (to PATH, or an automatic name in report_dir)
    #[arg(long, num_args = 0..=1)]
    pub save: Option<Option<PathBuf>>,

    /// Read responses from a recorded JSONL file instead of the API
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Print a saved report
    Show {
        /// Saved report file
        path: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a saved report to CSV
    Csv {
        /// Saved report file
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
