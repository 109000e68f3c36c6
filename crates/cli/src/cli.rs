//! Command-line surface.

use clap::{Parser, Subcommand};

/// Offline response cache proxy.
///
/// Each subcommand fires one lifecycle event at the proxy, backed by the
/// configured SQLite partition store and origin.
#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Precache the manifest into the static partition
    Install,

    /// Delete partitions outside the current-version set
    Activate,

    /// Answer a request through the proxy
    Fetch {
        /// Path-relative or absolute request URL
        url: String,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Write the response body to stdout instead of a summary
        #[arg(long)]
        body: bool,
    },

    /// Show how a request would be classified and routed
    Route {
        url: String,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
    },

    /// Post a JSON message payload to the proxy
    Message {
        /// e.g. '{"type":"GET_CACHE_SIZE"}'
        payload: String,
    },

    /// List partitions with their entry counts
    Partitions,

    /// Total stored body bytes across all partitions
    CacheSize,
}
