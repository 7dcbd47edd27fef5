//! CLI argument definitions (clap derive)

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Seconds to wait between accepted submissions
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Disable outlink capture for URLs containing this substring
    #[arg(short = 'n', long)]
    pub no_outlinks_for: Option<String>,

    /// Newline-delimited list of URLs to archive
    pub url_list: PathBuf,

    /// Append accepted job records (raw response JSON lines) here
    pub session_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Session file written by the save command
    pub session_file: PathBuf,

    /// Append status lines here instead of printing to stdout
    pub status_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AvailableArgs {
    /// Newline-delimited list of URLs to look up
    pub url_list: PathBuf,
}
