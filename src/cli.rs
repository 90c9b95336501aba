//! Command-line interface definition using clap.
//!
//! [`Args`] maps the command line onto the library operations:
//!
//! ```rust
//! use clap::Parser;
//! use tgspyder::cli::Args;
//!
//! let args = Args::parse_from(["tgspyder", "@osint", "--members", "--crawl-invites"]);
//! assert!(args.members);
//! assert!(args.crawl_options().links);
//! assert!(!args.crawl_options().transcript);
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::config::{CrawlOptions, SpyderConfig};
use crate::error::Result;

/// Telegram OSINT from the terminal: members, message history,
/// invite links, sticker-pack creators.
#[derive(Parser, Debug, Clone)]
#[command(name = "tgspyder")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    tgspyder @channel --members
    tgspyder https://t.me/+AbC123 --chats --crawl-invites
    tgspyder --sticker-pack https://t.me/addstickers/CoolCats
    tgspyder --user @username
    tgspyder --user 123456789 --snapshot ./snapshot")]
pub struct Args {
    /// Group or channel: @handle, t.me link, invite link, or numeric id
    pub target: Option<String>,

    /// Download the member list
    #[arg(long, requires = "target")]
    pub members: bool,

    /// Save the message transcript
    #[arg(long, requires = "target")]
    pub chats: bool,

    /// Harvest private invite links from the message history
    #[arg(long, requires = "target")]
    pub crawl_invites: bool,

    /// Identify the creator of a sticker pack (short name or full URL)
    #[arg(short = 's', long, value_name = "PACK")]
    pub sticker_pack: Option<String>,

    /// Look up a user by @username or numeric id
    #[arg(long = "user", value_name = "USER")]
    pub user_lookup: Option<String>,

    /// Snapshot directory to read from (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub snapshot: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root of the output tree (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Crawl artifacts requested on the command line.
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions::new()
            .with_transcript(self.chats)
            .with_links(self.crawl_invites)
    }

    /// Returns `true` if at least one operation was requested.
    pub fn has_work(&self) -> bool {
        self.target.is_some() || self.sticker_pack.is_some() || self.user_lookup.is_some()
    }

    /// Loads the config file, if any, and applies command-line overrides.
    pub fn resolve_config(&self) -> Result<SpyderConfig> {
        let mut config = match &self.config {
            Some(path) => SpyderConfig::load(path)?,
            None => SpyderConfig::default(),
        };
        if let Some(root) = &self.output_root {
            config.output_root.clone_from(root);
        }
        if let Some(dir) = &self.snapshot {
            config.snapshot_dir = Some(dir.clone());
        }
        Ok(config)
    }
}
