use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: log::LevelFilter,
    pub file_output: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(level: log::LevelFilter) -> Self {
        Self {
            level,
            file_output: None,
        }
    }

    pub fn with_file_output(mut self, path: PathBuf) -> Self {
        self.file_output = Some(path);
        self
    }

    pub fn is_file_output_enabled(&self) -> bool {
        self.file_output.is_some()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(log::LevelFilter::Warn)
    }
}

fn builder(config: &LogConfig) -> anyhow::Result<env_logger::Builder> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .filter_module("suite_shortcuts", config.level)
        .parse_default_env();

    if let Some(path) = &config.file_output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    Ok(builder)
}

/// Installs the global logger. `RUST_LOG` still overrides the configured
/// level.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    builder(config)?
        .try_init()
        .context("Failed to initialize logger")
}
