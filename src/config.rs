use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::OutputFormat;
use crate::error::{DocscopeError, Result};

/// File names probed in the working directory when no config path is given
pub const CONFIG_CANDIDATES: [&str; 3] = ["docscope.toml", "Docscope.toml", ".docscope.toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files are analyzed
    pub scan: ScanConfig,

    /// How reports are written
    pub output: OutputConfig,

    /// Coverage gate
    pub coverage: CoverageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions analyzed when walking directories
    pub extensions: Vec<String>,

    /// Glob patterns excluded from directory walks
    pub ignore_patterns: Vec<String>,

    /// Whether `.gitignore` files are honoured
    pub respect_gitignore: bool,

    /// Maximum file size to analyze (in bytes)
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Pretty-print JSON output
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Fail when any file's coverage percentage is below this value
    pub fail_under: Option<f64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            ignore_patterns: vec![
                ".venv/".to_string(),
                "venv/".to_string(),
                "__pycache__/".to_string(),
                ".git/".to_string(),
            ],
            respect_gitignore: true,
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DocscopeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocscopeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(DocscopeError::Config(format!(
                        "config file {} does not exist",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                for candidate in &CONFIG_CANDIDATES {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            return Err(DocscopeError::Config("scan.extensions must not be empty".to_string()));
        }
        if let Some(threshold) = self.coverage.fail_under {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(DocscopeError::Config(format!(
                    "coverage.fail_under must be between 0 and 100, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }

    /// Whether a path carries one of the configured extensions
    pub fn is_analyzable(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.scan.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }
}
