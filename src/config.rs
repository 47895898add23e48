use crate::edit::DEFAULT_LABEL;
use crate::layout::LayoutOptions;
use crate::reorganize::CommandReorganizer;
use crate::session::SessionOptions;
use clap::Parser;
use config::{
    Config as ConfigCrate, ConfigError as ConfigCrateError, Environment, File, Map, Source, Value,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const APP_NAME: &str = "zenmap-rs";
const ENV_PREFIX: &str = "ZENMAP";
const DEFAULT_PROJECT: &str = "default";
const DEFAULT_MAX_UNDO: usize = 0;
const DEFAULT_SIBLING_SEPARATION: f64 = 1.5;
const DEFAULT_COUSIN_SEPARATION: f64 = 2.0;
const DEFAULT_HORIZONTAL_PADDING: f64 = 2.0;
const DEFAULT_VERTICAL_PADDING: f64 = 0.0;
const DEFAULT_RESERVED_WIDTH: f64 = 20.0;
const DEFAULT_RESERVED_HEIGHT: f64 = 1.0;
const DEFAULT_REORGANIZE_TIMEOUT_SECS: u64 = 120;
const LOG_FILE_NAME: &str = "zenmap.log";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] ConfigCrateError),
    #[error("Failed to determine data directory")]
    DirectoryNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

// Every field optional so the file and environment layers can be partial.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    project: Option<String>,
    default_label: Option<String>,
    max_undo_steps: Option<usize>,
    sibling_separation: Option<f64>,
    cousin_separation: Option<f64>,
    horizontal_padding: Option<f64>,
    vertical_padding: Option<f64>,
    reserved_width: Option<f64>,
    reserved_height: Option<f64>,
    reorganize_command: Option<String>,
    reorganize_timeout_secs: Option<u64>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub project: String,
    pub default_label: String,
    /// 0 keeps every step.
    pub max_undo_steps: usize,
    pub sibling_separation: f64,
    pub cousin_separation: f64,
    pub horizontal_padding: f64,
    pub vertical_padding: f64,
    pub reserved_width: f64,
    pub reserved_height: f64,
    pub reorganize_command: Option<String>,
    pub reorganize_timeout_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("."),
            project: DEFAULT_PROJECT.to_string(),
            default_label: DEFAULT_LABEL.to_string(),
            max_undo_steps: DEFAULT_MAX_UNDO,
            sibling_separation: DEFAULT_SIBLING_SEPARATION,
            cousin_separation: DEFAULT_COUSIN_SEPARATION,
            horizontal_padding: DEFAULT_HORIZONTAL_PADDING,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
            reserved_width: DEFAULT_RESERVED_WIDTH,
            reserved_height: DEFAULT_RESERVED_HEIGHT,
            reorganize_command: None,
            reorganize_timeout_secs: DEFAULT_REORGANIZE_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            sibling_separation: self.sibling_separation,
            cousin_separation: self.cousin_separation,
            horizontal_padding: self.horizontal_padding,
            vertical_padding: self.vertical_padding,
            reserved_width: self.reserved_width,
            reserved_height: self.reserved_height,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_label: self.default_label.clone(),
            max_undo_steps: self.max_undo_steps,
        }
    }

    pub fn reorganizer(&self) -> CommandReorganizer {
        CommandReorganizer::new(self.reorganize_command.clone())
            .with_timeout(Duration::from_secs(self.reorganize_timeout_secs))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(LOG_FILE_NAME))
    }
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Keyboard-driven mind map editor", long_about = None)]
pub struct CliArgs {
    /// Project to open
    pub project: Option<String>,

    /// Path to a custom configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding project maps, inboxes and the log
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub default_label: Option<String>,
    #[arg(long)]
    pub max_undo_steps: Option<usize>,
    #[arg(long)]
    pub sibling_separation: Option<f64>,
    #[arg(long)]
    pub cousin_separation: Option<f64>,
    #[arg(long)]
    pub horizontal_padding: Option<f64>,
    #[arg(long)]
    pub vertical_padding: Option<f64>,
    #[arg(long)]
    pub reserved_width: Option<f64>,
    #[arg(long)]
    pub reserved_height: Option<f64>,

    /// Shell command that files inbox ideas into the map
    #[arg(long)]
    pub reorganize_command: Option<String>,

    /// Seconds before a running reorganize command is killed
    #[arg(long)]
    pub reorganize_timeout_secs: Option<u64>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the merged configuration and exit
    #[arg(long)]
    pub debug_config: bool,
}

/// Loads configuration from all sources: defaults, config file, `ZENMAP__*`
/// environment variables and the command line, in increasing priority.
pub fn load_config(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let env_source = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true);
    // Missing variables are fine; only a malformed environment fails here.
    let env_map: Map<String, Value> = env_source.collect().unwrap_or_else(|_| Map::new());

    build_config_from_args(args, Some(env_map))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

// Separate from `load_config` so tests can supply their own overrides.
fn build_config_from_args(
    args: &CliArgs,
    override_source: Option<Map<String, Value>>,
) -> Result<AppConfig, ConfigError> {
    let config_file_path = args
        .config
        .clone()
        .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join("config.toml")));

    let mut config_builder = ConfigCrate::builder();
    if let Some(ref path) = config_file_path {
        config_builder = config_builder.add_source(File::from(path.clone()).required(false));
    }
    // Overrides win over the file.
    if let Some(overrides) = override_source {
        for (key, value) in overrides {
            config_builder = config_builder.set_override(&key, value)?;
        }
    }
    let loaded: FileConfig = config_builder.build()?.try_deserialize()?;

    let data_dir = match args.data_dir.clone().or(loaded.data_dir) {
        Some(dir) => dir,
        None => project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::DirectoryNotFound)?,
    };

    let config = AppConfig {
        data_dir,
        project: args
            .project
            .clone()
            .or(loaded.project)
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
        default_label: args
            .default_label
            .clone()
            .or(loaded.default_label)
            .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        max_undo_steps: args
            .max_undo_steps
            .or(loaded.max_undo_steps)
            .unwrap_or(DEFAULT_MAX_UNDO),
        sibling_separation: args
            .sibling_separation
            .or(loaded.sibling_separation)
            .unwrap_or(DEFAULT_SIBLING_SEPARATION),
        cousin_separation: args
            .cousin_separation
            .or(loaded.cousin_separation)
            .unwrap_or(DEFAULT_COUSIN_SEPARATION),
        horizontal_padding: args
            .horizontal_padding
            .or(loaded.horizontal_padding)
            .unwrap_or(DEFAULT_HORIZONTAL_PADDING),
        vertical_padding: args
            .vertical_padding
            .or(loaded.vertical_padding)
            .unwrap_or(DEFAULT_VERTICAL_PADDING),
        reserved_width: args
            .reserved_width
            .or(loaded.reserved_width)
            .unwrap_or(DEFAULT_RESERVED_WIDTH),
        reserved_height: args
            .reserved_height
            .or(loaded.reserved_height)
            .unwrap_or(DEFAULT_RESERVED_HEIGHT),
        reorganize_command: args
            .reorganize_command
            .clone()
            .or(loaded.reorganize_command)
            .filter(|command| !command.trim().is_empty()),
        reorganize_timeout_secs: args
            .reorganize_timeout_secs
            .or(loaded.reorganize_timeout_secs)
            .unwrap_or(DEFAULT_REORGANIZE_TIMEOUT_SECS),
        log_file: args.log_file.clone().or(loaded.log_file),
    };

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if !crate::gateway::is_valid_project_name(&config.project) {
        return Err(ConfigError::ValidationError(format!(
            "project name {:?} may only contain letters, digits, '-' and '_'",
            config.project
        )));
    }
    if config.default_label.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "default_label must not be blank".to_string(),
        ));
    }
    if !(config.sibling_separation > 0.0) || !(config.cousin_separation > 0.0) {
        return Err(ConfigError::ValidationError(
            "separations must be greater than zero".to_string(),
        ));
    }
    if config.cousin_separation < config.sibling_separation {
        return Err(ConfigError::ValidationError(
            "cousin_separation must not be smaller than sibling_separation".to_string(),
        ));
    }
    if config.reorganize_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "reorganize_timeout_secs must be greater than zero".to_string(),
        ));
    }
    let sizes = [
        ("horizontal_padding", config.horizontal_padding),
        ("vertical_padding", config.vertical_padding),
        ("reserved_width", config.reserved_width),
        ("reserved_height", config.reserved_height),
    ];
    for (name, value) in sizes {
        if !(value >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must not be negative"
            )));
        }
    }
    Ok(())
}
