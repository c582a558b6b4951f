//! Request types assembled once from parsed arguments. No ambient globals;
//! whatever a run needs travels in these values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Compression strength offered by the site, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    #[default]
    High,
    Medium,
    Low,
}

impl CompressionLevel {
    /// Lowercase name, as the site keys its level options.
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionLevel::High => "high",
            CompressionLevel::Medium => "medium",
            CompressionLevel::Low => "low",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(CompressionLevel::High),
            "medium" => Ok(CompressionLevel::Medium),
            "low" => Ok(CompressionLevel::Low),
            other => Err(Error::InvalidLevel(other.to_string())),
        }
    }
}

/// Everything one compression run needs.
///
/// The level is already validated by construction; the input path should be
/// absolute because the browser process resolves it, not this one.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    /// PDF handed to the site's file input.
    pub input: PathBuf,
    pub level: CompressionLevel,
    /// Where the finalizer leaves the compressed file.
    pub out_file: PathBuf,
    /// Reserved flag; accepted and warned about, currently a no-op.
    pub estimate: bool,
}

impl CompressionRequest {
    pub fn new(input: PathBuf, level: CompressionLevel, out_file: PathBuf) -> Self {
        Self {
            input,
            level,
            out_file,
            estimate: false,
        }
    }

    pub fn with_estimate(mut self, enabled: bool) -> Self {
        self.estimate = enabled;
        self
    }
}
