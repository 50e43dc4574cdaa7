//! Command-line and environment configuration.

use clap::Parser;
use greenledger_core::default_log_level;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_FILE_NAME: &str = "greenledger.sqlite3";

/// Green Ledger carbon entry API server
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "GREENLEDGER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "GREENLEDGER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file, created when missing
    #[arg(long, env = "GREENLEDGER_DB_PATH", default_value = DEFAULT_DB_FILE_NAME)]
    pub db_path: PathBuf,

    /// Use a throwaway in-memory database instead of `--db-path`
    #[arg(long, conflicts_with = "db_path")]
    pub in_memory: bool,

    /// One of trace|debug|info|warn|error
    #[arg(long, env = "GREENLEDGER_LOG_LEVEL", default_value = default_log_level())]
    pub log_level: String,

    /// Absolute directory for rotated log files; stderr when unset
    #[arg(long, env = "GREENLEDGER_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
