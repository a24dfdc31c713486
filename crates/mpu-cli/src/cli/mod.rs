//! CLI for MPU.

mod commands;
mod usage;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use mpu_core::config::{self, MpuConfig};
use mpu_core::etag::ChunkSize;
use mpu_core::logging;
use mpu_core::power;
use mpu_core::remote::{CredentialSource, ObjectLocation, SessionOptions};
use mpu_core::transfer::TransferSettings;
use std::path::{Path, PathBuf};

use commands::{run_local_etag, run_remote_etag, run_upload};
pub use usage::{Mode, UsageError};

/// Top-level CLI. A single command whose behaviour is selected with `--mode`.
#[derive(Debug, Parser)]
#[command(name = "mpu", version)]
#[command(about = "MPU: S3 multipart upload with local ETag verification", long_about = None)]
pub struct Cli {
    /// Mode is either 'upload' or 'getlocaletag' or 'gets3etag'.
    #[arg(long)]
    pub mode: Option<String>,

    /// File to be uploaded or hashed; the object key in gets3etag mode.
    #[arg(long)]
    pub filename: Option<String>,

    /// S3 bucket for uploading, or for reading the S3 ETag in gets3etag mode.
    #[arg(long)]
    pub destbucket: Option<String>,

    /// Size of individual parts in GB.
    #[arg(long, allow_negative_numbers = true)]
    pub partsize: Option<i64>,

    /// AWS access key (requires --secretkey).
    #[arg(long)]
    pub accesskey: Option<String>,

    /// AWS secret key (requires --accesskey).
    #[arg(long)]
    pub secretkey: Option<String>,

    /// AWS region, e.g. eu-central-1.
    #[arg(long)]
    pub region: Option<String>,

    /// Print an example for upload or getlocaletag or gets3etag.
    #[arg(long, value_name = "MODE")]
    pub example: Option<String>,

    /// Power off the host after a successful run ('yes' to enable).
    #[arg(long, value_name = "yes")]
    pub shutdown: Option<String>,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,
}

/// A validated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LocalEtag {
        path: PathBuf,
        part_size: ChunkSize,
    },
    RemoteEtag {
        location: ObjectLocation,
    },
    Upload {
        path: PathBuf,
        bucket: String,
        part_size: ChunkSize,
    },
}

impl Request {
    /// File the run log is named after.
    pub fn log_subject(&self) -> &Path {
        match self {
            Request::LocalEtag { path, .. } | Request::Upload { path, .. } => path,
            Request::RemoteEtag { location } => Path::new(&location.key),
        }
    }
}

fn required<T>(value: Option<T>, flag: &'static str, mode: Mode) -> Result<T, UsageError> {
    value.ok_or(UsageError::MissingArgument { flag, mode })
}

impl Cli {
    /// Check the arguments for `mode` without touching the network or disk.
    pub fn validate(&self, mode: Mode) -> Result<Request, UsageError> {
        let filename = required(self.filename.as_deref(), "filename", mode)?;
        let part_size = |mode: Mode| -> Result<ChunkSize, UsageError> {
            let gib = required(self.partsize, "partsize", mode)?;
            ChunkSize::from_gib(gib).map_err(UsageError::InvalidPartSize)
        };
        match mode {
            Mode::GetLocalEtag => Ok(Request::LocalEtag {
                path: PathBuf::from(filename),
                part_size: part_size(mode)?,
            }),
            Mode::GetS3Etag => {
                let bucket = required(self.destbucket.as_deref(), "destbucket", mode)?;
                Ok(Request::RemoteEtag {
                    location: ObjectLocation::new(bucket, filename),
                })
            }
            Mode::Upload => {
                let bucket = required(self.destbucket.clone(), "destbucket", mode)?;
                Ok(Request::Upload {
                    path: PathBuf::from(filename),
                    bucket,
                    part_size: part_size(mode)?,
                })
            }
        }
    }

    /// Resolve `--mode`, printing the usage examples when it is missing or unknown.
    pub fn resolve_mode(&self) -> Result<Mode, UsageError> {
        match self.mode.as_deref().map(str::parse::<Mode>) {
            Some(Ok(mode)) => Ok(mode),
            _ => {
                usage::print_usage();
                Err(UsageError::InvalidMode)
            }
        }
    }

    fn session_options(&self, cfg: &MpuConfig) -> Result<SessionOptions> {
        Ok(SessionOptions {
            region: self.region.clone().or_else(|| cfg.default_region.clone()),
            credentials: CredentialSource::from_keys(self.accesskey.clone(), self.secretkey.clone())?,
            endpoint_url: cfg.endpoint_url.clone(),
            force_path_style: cfg.force_path_style,
        })
    }

    pub async fn run(self) -> Result<()> {
        if let Some(shell) = self.completions {
            clap_complete::generate(shell, &mut Cli::command(), "mpu", &mut std::io::stdout());
            return Ok(());
        }

        let mode = self.resolve_mode()?;
        // An unrecognised --example value is ignored.
        if let Some(example) = self.example.as_deref().and_then(|e| e.parse::<Mode>().ok()) {
            println!("{}", example.example());
        }
        let request = self.validate(mode).map_err(|err| {
            println!("{}", mode.example());
            err
        })?;

        let cwd = std::env::current_dir()?;
        if let Err(err) = logging::init_run_log(&cwd, request.log_subject()) {
            eprintln!("mpu: file logging unavailable ({:#}), logging to stderr", err);
            logging::init_logging_stderr();
        }
        let cfg = config::load_or_init().unwrap_or_else(|err| {
            tracing::warn!("could not load config, using defaults: {:#}", err);
            MpuConfig::default()
        });
        tracing::debug!("loaded config: {:?}", cfg);

        match request {
            Request::LocalEtag { path, part_size } => {
                run_local_etag(&path, part_size).await?;
            }
            Request::RemoteEtag { location } => {
                run_remote_etag(&self.session_options(&cfg)?, &location).await?;
            }
            Request::Upload {
                path,
                bucket,
                part_size,
            } => {
                let settings = TransferSettings::new(part_size).with_concurrency(cfg.concurrency);
                run_upload(&self.session_options(&cfg)?, &path, &bucket, &settings).await?;
            }
        }

        if power::shutdown_requested(self.shutdown.as_deref()) {
            power::power_off(cfg.shutdown_command.as_deref())?;
        } else if let Some(value) = self.shutdown.as_deref() {
            tracing::warn!("ignoring --shutdown {}: only 'yes' powers off the host", value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
