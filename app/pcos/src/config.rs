//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::error::AppError;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const MIN_SESSION_TTL_SECS: u64 = 60;
const MAX_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Environment variable holding an `env_logger` filter, e.g. `pcos=debug`.
pub const LOG_ENV: &str = "PCOS_LOG";

#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Path to the JSON model artifact
    #[arg(long, env = "PCOS_MODEL_PATH", value_name = "PATH")]
    pub model: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Address to listen on
    #[arg(long, env = "PCOS_ADDR", default_value = DEFAULT_ADDR, value_name = "ADDR")]
    pub addr: String,

    /// Idle time after which a session and its history are discarded
    #[arg(
        long,
        env = "PCOS_SESSION_TTL_SECS",
        default_value_t = DEFAULT_SESSION_TTL_SECS,
        value_name = "SECS"
    )]
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    pub model_path: PathBuf,
    pub addr: SocketAddr,
    pub session_ttl: Duration,
}

impl ServeConfig {
    pub fn from_args(args: &ServeArgs) -> Result<Self, AppError> {
        let addr = args
            .addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| AppError::Address {
                addr: args.addr.clone(),
                source,
            })?;
        let ttl_secs = clamp_session_ttl(args.session_ttl_secs);
        if ttl_secs != args.session_ttl_secs {
            log::warn!(
                "session TTL {}s out of range, using {ttl_secs}s",
                args.session_ttl_secs
            );
        }
        Ok(Self {
            model_path: args.model.model.clone(),
            addr,
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

fn clamp_session_ttl(secs: u64) -> u64 {
    secs.clamp(MIN_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS)
}

/// Default log level for a `-v` count; `PCOS_LOG` overrides it.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbose: u8) {
    let env = env_logger::Env::default().filter_or(LOG_ENV, log_level(verbose));
    env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .init();
}
