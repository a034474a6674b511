use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use jiff::Timestamp;
use linkzap_core::shortcode::{MAX_LENGTH, MIN_LENGTH};
use linkzap_core::ShortCode;
use std::fmt::{Display, Formatter};

pub const REDIS_URL_ENV: &str = "LINKZAP_REDIS_URL";
pub const DATABASE_URL_ENV: &str = "LINKZAP_DATABASE_URL";
pub const COUNTER_KEY_ENV: &str = "LINKZAP_COUNTER_KEY";
pub const CODE_LENGTH_ENV: &str = "LINKZAP_CODE_LENGTH";
pub const LOG_FORMAT_ENV: &str = "LINKZAP_LOG_FORMAT";

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_CODE_LENGTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linkzap", version, about = "Counter-allocated short links")]
pub struct CLI {
    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = DATABASE_URL_ENV)]
    pub database_url: String,

    #[arg(long, env = COUNTER_KEY_ENV, default_value = linkzap_core::DEFAULT_COUNTER_KEY)]
    pub counter_key: String,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = DEFAULT_CODE_LENGTH,
        value_parser = RangedU64ValueParser::<usize>::new()
            .range(MIN_LENGTH as u64..=MAX_LENGTH as u64),
    )]
    pub code_length: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the allocation counter if it does not exist.
    InitCounter,
    /// Shorten a URL.
    Shorten {
        url: String,
        /// Expire this many seconds from now.
        #[arg(long, conflicts_with = "expires_at")]
        expires_in: Option<u64>,
        /// Expire at an RFC 3339 timestamp.
        #[arg(long)]
        expires_at: Option<Timestamp>,
    },
    /// Print the URL a short code redirects to.
    Resolve { code: ShortCode },
    /// Change an existing link.
    Update {
        id: i64,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long, conflicts_with = "no_expiry")]
        expires_at: Option<Timestamp>,
        /// Remove the expiry.
        #[arg(long)]
        no_expiry: bool,
    },
    /// Print a link by id.
    Show { id: i64 },
}
