//! Usage templates and argument errors.

use std::fmt;
use std::str::FromStr;

use mpu_core::etag::FingerprintError;

/// Operating mode selected with `--mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Upload,
    GetLocalEtag,
    GetS3Etag,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Upload, Mode::GetS3Etag, Mode::GetLocalEtag];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Upload => "upload",
            Mode::GetLocalEtag => "getlocaletag",
            Mode::GetS3Etag => "gets3etag",
        }
    }

    /// Example command line for this mode.
    pub fn example(self) -> &'static str {
        match self {
            Mode::Upload => "mpu --mode upload --filename file.7z --destbucket testbucket --partsize 5 --accesskey 1234ABCD --secretkey 1234ABCD --region eu-central-1",
            Mode::GetS3Etag => "mpu --mode gets3etag --filename file.7z --destbucket testbucket",
            Mode::GetLocalEtag => "mpu --mode getlocaletag --filename file.7z --partsize 5",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Mode::Upload),
            "getlocaletag" => Ok(Mode::GetLocalEtag),
            "gets3etag" => Ok(Mode::GetS3Etag),
            _ => Err(UsageError::InvalidMode),
        }
    }
}

/// The command line does not describe a runnable request.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("--mode must be one of upload, getlocaletag, gets3etag")]
    InvalidMode,
    #[error("--{flag} is required in {mode} mode")]
    MissingArgument { flag: &'static str, mode: Mode },
    #[error("invalid --partsize: {0}")]
    InvalidPartSize(#[source] FingerprintError),
}

/// One example line per mode.
pub fn usage_text() -> String {
    Mode::ALL
        .iter()
        .map(|m| m.example())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_usage() {
    println!("{}", usage_text());
}
