use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

/// Browse a published spreadsheet as a paginated, sortable table
#[derive(Parser, Debug)]
#[command(name = "sheetgrid", version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Login marker file (defaults to the platform data directory)
    #[arg(long, global = true, env = "SHEETGRID_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve pages of the sheet over HTTP at /api/data
    Serve(ServeArgs),
    /// Fetch one page and print the rows visible in a viewport
    Browse(BrowseArgs),
    /// Mark this machine as logged in
    Login,
    /// Remove the login mark
    Logout,
}

/// Where the sheet lives and how to decode it.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Published gviz URL of the sheet
    #[arg(long = "source-url", env = "SHEETGRID_SOURCE_URL")]
    pub url: Option<String>,

    /// Column the filter applies to
    #[arg(long, default_value = sheetgrid_lib::page::DEFAULT_FILTER_COLUMN)]
    pub filter_column: String,

    /// Bytes of JSONP wrapper before the payload
    #[arg(long, default_value_t = sheetgrid_lib::source::DEFAULT_PREFIX_LEN)]
    pub prefix_len: usize,

    /// Bytes of JSONP wrapper after the payload
    #[arg(long, default_value_t = sheetgrid_lib::source::DEFAULT_SUFFIX_LEN)]
    pub suffix_len: usize,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SHEETGRID_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Fetch pages from a running `sheetgrid serve` instead of the sheet
    #[arg(long, conflicts_with = "url")]
    pub remote: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: i64,

    /// Substring filter
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Column to sort the page by
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Scroll offset into the page
    #[arg(long, default_value_t = 0.0)]
    pub scroll: f64,

    /// Viewport height
    #[arg(long, default_value_t = sheetgrid_table::DEFAULT_VIEWPORT_HEIGHT)]
    pub height: f64,

    /// Estimated row height
    #[arg(long, default_value_t = sheetgrid_table::DEFAULT_ROW_HEIGHT)]
    pub row_height: f64,

    /// Extra rows above and below the viewport
    #[arg(long, default_value_t = sheetgrid_table::DEFAULT_OVERSCAN)]
    pub overscan: usize,
}
