mod cli;

use crate::cli::{Command, LogFormat, CLI};
use anyhow::Context;
use clap::Parser;
use linkzap_allocator::{Allocator, AllocatorSettings};
use linkzap_cache::RedisStore;
use linkzap_core::{ExpirationPolicy, LinkRecord};
use linkzap_resolver::Resolver;
use linkzap_shortener::{LinkUpdate, ShortenParams, Shortener, ShortenerError, ShortenerService};
use linkzap_storage::PostgresLinkStore;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        redis_url = %config.redis_url,
        counter_key = %config.counter_key,
        code_length = config.code_length,
        "starting linkzap"
    );

    let redis = RedisStore::connect(&config.redis_url)
        .await
        .context("failed to connect to Redis")?;
    let allocator = Allocator::new(
        redis.clone(),
        AllocatorSettings::builder()
            .counter_key(config.counter_key)
            .length(config.code_length)
            .build(),
    );

    if let Command::InitCounter = config.command {
        let created = allocator.ensure_counter().await?;
        println!("{}", if created { "created" } else { "exists" });
        return Ok(ExitCode::SUCCESS);
    }

    let store = PostgresLinkStore::connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    store.create_schema().await?;

    if let Command::Shorten { .. } = config.command {
        allocator.ensure_counter().await?;
    }

    let service = ShortenerService::new(allocator, Resolver::new(store, redis));

    let outcome = match config.command {
        Command::InitCounter => return Ok(ExitCode::SUCCESS),
        Command::Shorten {
            url,
            expires_in,
            expires_at,
        } => {
            let expiration = match (expires_in, expires_at) {
                (Some(secs), _) => ExpirationPolicy::AfterDuration(Duration::from_secs(secs)),
                (None, at) => ExpirationPolicy::from(at),
            };
            service
                .shorten(ShortenParams::new(url).with_expiration(expiration))
                .await
                .and_then(print_record)
        }
        Command::Resolve { code } => service.resolve(&code).await.map(|url| println!("{url}")),
        Command::Update {
            id,
            url,
            active,
            expires_at,
            no_expiry,
        } => {
            let expiration = if no_expiry {
                Some(ExpirationPolicy::Never)
            } else {
                expires_at.map(ExpirationPolicy::AtTimestamp)
            };
            let update = LinkUpdate {
                original_url: url,
                expiration,
                is_active: active,
            };
            service.update(id, update).await.and_then(print_record)
        }
        Command::Show { id } => service.link(id).await.and_then(print_record),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err @ (ShortenerError::NotFound(_) | ShortenerError::Expired(_))) => {
            eprintln!("{err}");
            Ok(exit_code(&err))
        }
        Err(err) => Err(err.into()),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn print_record(record: LinkRecord) -> Result<(), ShortenerError> {
    let json = serde_json::to_string_pretty(&record)
        .map_err(|e| ShortenerError::Storage(format!("failed to render record: {e}")))?;
    println!("{json}");
    Ok(())
}

fn exit_code(err: &ShortenerError) -> ExitCode {
    match err.status_code() {
        404 => ExitCode::from(2),
        410 => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}
