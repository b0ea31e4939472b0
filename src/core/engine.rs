// src/core/engine.rs
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tokio::io::AsyncReadExt;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{Config, CONFIG_CANDIDATES};
use crate::error::DocscopeError;
use super::analyzer::analyze;
use super::model::AnalysisReport;
use super::render::{OutputFormat, ReportRenderer};

/// Outcome of analyzing one file
#[derive(Debug)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub outcome: std::result::Result<AnalysisReport, DocscopeError>,
}

/// Options of one `analyze` invocation, already merged with the config
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub fail_under: Option<f64>,
}

/// Feeds files to the analysis core and writes the results.
///
/// The engine owns everything the core deliberately leaves out: finding
/// files, reading and decoding bytes, running analyses side by side and
/// rendering reports.
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Ok(Self { config })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Analyze files and directories, then render and gate the results
    pub async fn analyze(&self, paths: &[PathBuf], options: AnalyzeOptions) -> Result<()> {
        let analyses = self.analyze_paths(paths).await?;
        let total = analyses.len();

        let mut reports = Vec::with_capacity(total);
        let mut failures = 0;
        for analysis in analyses {
            match analysis.outcome {
                Ok(report) => reports.push(report),
                Err(e) => {
                    failures += 1;
                    warn!("❌ {}", e);
                }
            }
        }

        self.emit(&reports, &options).await?;

        if failures > 0 {
            bail!("{} of {} files could not be analyzed", failures, total);
        }
        Ok(())
    }

    /// Analyze source text read from standard input
    pub async fn analyze_stdin(&self, name: &str, options: AnalyzeOptions) -> Result<()> {
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .context("Failed to read standard input")?;

        let report = analyze_bytes(name, bytes, self.config.scan.max_file_size)?;
        self.emit(&[report], &options).await
    }

    /// Analyze every discovered file, each on its own blocking task.
    ///
    /// Results come back in discovery order regardless of completion order.
    pub async fn analyze_paths(&self, paths: &[PathBuf]) -> Result<Vec<FileAnalysis>> {
        let files = self.discover(paths)?;
        info!("🔍 Analyzing {} file(s)", files.len());

        let limit = self.config.scan.max_file_size;
        let mut tasks = JoinSet::new();
        for (index, path) in files.into_iter().enumerate() {
            tasks.spawn_blocking(move || {
                let outcome = analyze_file(&path, limit);
                (index, FileAnalysis { path, outcome })
            });
        }

        let mut indexed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            indexed.push(joined.context("Analysis task failed")?);
        }
        indexed.sort_by_key(|(index, _)| *index);

        Ok(indexed.into_iter().map(|(_, analysis)| analysis).collect())
    }

    /// Expand directories into analyzable files.
    ///
    /// Explicit file arguments must carry a configured extension; directory
    /// walks silently skip anything else.
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_dir() {
                files.extend(self.walk_directory(path)?);
            } else if !path.exists() {
                bail!("Path {} does not exist", path.display());
            } else if self.config.is_analyzable(path) {
                files.push(path.clone());
            } else {
                return Err(DocscopeError::UnsupportedFile(path.clone()).into());
            }
        }

        Ok(files)
    }

    fn walk_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut overrides = OverrideBuilder::new(dir);
        for pattern in &self.config.scan.ignore_patterns {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| DocscopeError::Config(format!("Invalid ignore pattern {}: {}", pattern, e)))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| DocscopeError::Config(e.to_string()))?;

        // Use ignore crate to respect .gitignore and custom patterns
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(self.config.scan.respect_gitignore)
            .overrides(overrides)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| DocscopeError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if path.is_file() && self.config.is_analyzable(path) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        debug!("Found {} file(s) under {}", files.len(), dir.display());
        Ok(files)
    }

    async fn emit(&self, reports: &[AnalysisReport], options: &AnalyzeOptions) -> Result<()> {
        let format = options.format.unwrap_or(self.config.output.format);
        let renderer = ReportRenderer::new(self.config.output.pretty)?;
        let rendered = renderer.render(reports, format)?;

        match &options.output {
            Some(path) => {
                tokio::fs::write(path, rendered.as_bytes())
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("📝 Wrote {} report(s) to {}", reports.len(), path.display());
            }
            None => println!("{}", rendered),
        }

        for report in reports {
            info!(
                "📊 {}: {}/{} documented ({:.1}%)",
                report.file_name,
                report.coverage.documented,
                report.coverage.total,
                report.coverage.percentage
            );
        }

        let threshold = options.fail_under.or(self.config.coverage.fail_under);
        if let Some(threshold) = threshold {
            let below: Vec<_> = reports
                .iter()
                .filter(|r| r.coverage.percentage < threshold)
                .map(|r| r.file_name.as_str())
                .collect();
            if !below.is_empty() {
                bail!(
                    "Documentation coverage below {:.1}% in: {}",
                    threshold,
                    below.join(", ")
                );
            }
        }

        Ok(())
    }

    /// Write the default configuration file
    pub fn init(&self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let target = path.unwrap_or_else(|| PathBuf::from(CONFIG_CANDIDATES[0]));
        let target = if target.is_dir() {
            target.join(CONFIG_CANDIDATES[0])
        } else {
            target
        };

        if target.exists() && !force {
            bail!(
                "{} already exists (use --force to overwrite)",
                target.display()
            );
        }

        Config::default().save(&target)?;
        info!("Initialized Docscope configuration in: {}", target.display());
        Ok(())
    }
}

/// Read, size-check and decode one file, then run the core on it
fn analyze_file(path: &Path, limit: u64) -> std::result::Result<AnalysisReport, DocscopeError> {
    let read_error = |e: std::io::Error| DocscopeError::FileSystem(format!("{}: {}", path.display(), e));

    let size = std::fs::metadata(path).map_err(read_error)?.len();
    if size > limit {
        return Err(DocscopeError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    let bytes = std::fs::read(path).map_err(read_error)?;
    analyze_bytes(&path.display().to_string(), bytes, limit)
}

/// Decode raw bytes as UTF-8 and analyze them under the given name
pub fn analyze_bytes(name: &str, bytes: Vec<u8>, limit: u64) -> std::result::Result<AnalysisReport, DocscopeError> {
    let size = bytes.len() as u64;
    if size > limit {
        return Err(DocscopeError::FileTooLarge {
            path: PathBuf::from(name),
            size,
            limit,
        });
    }

    let source = String::from_utf8(bytes).map_err(|source| DocscopeError::Encoding {
        path: name.to_string(),
        source,
    })?;

    // Never log the source itself
    debug!("Analyzing file: {}, Size: {} chars", name, source.chars().count());

    analyze(&source, name).map_err(|source| DocscopeError::Parse {
        path: name.to_string(),
        source,
    })
}
