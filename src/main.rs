/*!
# love2love - Maintenance Tool

Command-line access to the Love2Love encryption codec and image cache, for operators
inspecting stored documents, running migrations, or reclaiming cache disk space.

## Usage

```
love2love [OPTIONS] <COMMAND>

Commands:
  cache-report    Show the memory budget and disk usage of the image cache
  cache-clear     Remove every cached image from memory and disk
  seal-location   Print the storage fields for a coordinate pair as JSON
  read-location   Decode the location of a stored JSON document
  migrate         Migrate a JSON array of documents to the encrypted location shape

Options:
  -v, --verbose   Enable verbose output
  -h, --help      Print help information
  -V, --version   Print version information
```

## Configuration

See `love2love::config` for the `LOVE2LOVE_*` environment variables. Logging honours
`RUST_LOG` and `LOVE2LOVE_LOG_FORMAT` (`text` or `json`).
*/

use clap::Parser;
use love2love::cli::{CliArgs, Command};
use love2love::codec::{Document, EncryptionCodec};
use love2love::config::Config;
use love2love::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_LOG_FORMAT, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use love2love::crypto::KeyringKeyProvider;
use love2love::errors::{AppError, AppResult};
use love2love::ImageCache;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) -> AppResult<()> {
    let default_level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let format = std::env::var(ENV_VAR_LOG_FORMAT).unwrap_or_else(|_| LOG_FORMAT_TEXT.to_string());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format.as_str() {
        LOG_FORMAT_JSON => builder.json().init(),
        LOG_FORMAT_TEXT => builder.init(),
        other => {
            return Err(AppError::Config(format!(
                "{} must be '{}' or '{}', got '{}'",
                ENV_VAR_LOG_FORMAT, LOG_FORMAT_TEXT, LOG_FORMAT_JSON, other
            )))
        }
    }
    Ok(())
}

fn load_codec(config: &Config) -> AppResult<EncryptionCodec> {
    let keys = KeyringKeyProvider::new(&config.keyring_service);
    EncryptionCodec::new(config.codec.clone(), &keys)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

async fn run(args: CliArgs, config: Config) -> AppResult<()> {
    match args.command {
        Command::CacheReport => {
            let cache = ImageCache::new(&config.cache)?;
            println!("{}", cache.size_report());
        }
        Command::CacheClear => {
            let cache = ImageCache::new(&config.cache)?;
            cache.clear();
            cache.flush().await;
            info!("Image cache cleared");
            println!("{}", cache.size_report());
        }
        Command::SealLocation { lat, lon, context } => {
            let codec = load_codec(&config)?;
            let fields = codec.write_location(love2love::Coordinate::new(lat, lon), &context);
            if fields.is_empty() {
                return Err(AppError::Config(
                    "Could not produce location fields (non-finite coordinate or encryption failure)"
                        .to_string(),
                ));
            }
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Command::ReadLocation { file } => {
            let codec = load_codec(&config)?;
            let document: Document = read_json(&file)?;
            match codec.read_location(&document) {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => {
                    return Err(AppError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "No readable location in document",
                    )))
                }
            }
        }
        Command::Migrate { file, in_place } => {
            let codec = load_codec(&config)?;
            let mut documents: Vec<Document> = read_json(&file)?;
            let report = codec.migrate_entries(&mut documents);
            let output = serde_json::to_string_pretty(&documents)?;

            if in_place {
                fs::write(&file, output)?;
            } else {
                println!("{}", output);
            }
            eprintln!(
                "Migrated {} of {} documents ({} already current, {} failed)",
                report.migrated,
                report.total(),
                report.not_needed,
                report.failed
            );
        }
    }
    Ok(())
}

/// The main entry point for the love2love maintenance tool.
///
/// 1. Parses command-line arguments
/// 2. Initializes structured logging
/// 3. Loads and validates configuration
/// 4. Runs the requested command inside a root tracing span
///
/// Errors are logged once here, at the application boundary.
#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose)?;

    let correlation_id = uuid::Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );

    async move {
        info!("Starting love2love");

        let config = Config::load()?;
        config.validate()?;
        debug!("Configuration: {:?}", config);

        let result = run(args, config).await;
        if let Err(e) = &result {
            error!(error = %e, "Command failed");
        }
        result
    }
    .instrument(root_span)
    .await
}
