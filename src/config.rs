use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub region: String,
    pub bucket: String,
    pub base_prefix: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Shared photo stream server")]
pub struct Args {
    /// Host to bind to (overrides PHOTO_STREAM_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PHOTO_STREAM_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// AWS region of the photo bucket (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// S3 bucket holding the photos (overrides PHOTO_STREAM_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix under which all streams live (overrides PHOTO_STREAM_PREFIX)
    #[arg(long)]
    pub base_prefix: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    ///
    /// The bucket is the one required setting: without it there is nothing to
    /// serve and the process refuses to start.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PHOTO_STREAM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PHOTO_STREAM_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PHOTO_STREAM_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PHOTO_STREAM_PORT"),
        };
        let env_region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into());
        let env_bucket = env::var("PHOTO_STREAM_BUCKET").ok();
        let env_prefix = env::var("PHOTO_STREAM_PREFIX").unwrap_or_else(|_| "photo-stream".into());

        let bucket = args
            .bucket
            .or(env_bucket)
            .context("PHOTO_STREAM_BUCKET is required; refusing to start without a bucket")?;

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            region: args.region.unwrap_or(env_region),
            bucket,
            base_prefix: args.base_prefix.unwrap_or(env_prefix),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
