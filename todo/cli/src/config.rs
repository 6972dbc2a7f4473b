use serde::Deserialize;
use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "todo.toml";
pub const ENV_PREFIX: &str = "TODO";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolves the choice against the current terminal.
    ///
    /// `Auto` only colours when stdout is a terminal and `TERM` is not `dumb`.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::io::stdout().is_terminal()
                    && std::env::var("TERM").map_or(true, |term| term != "dumb")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub color: ColorChoice,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: ColorChoice::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file and `TODO_*` environment variables.
    ///
    /// An explicit `path` must exist. Without one, `todo.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_in(Path::new("."), path)
    }

    /// Like [`Config::load`], resolving the default file against `dir`.
    fn load_in(dir: &Path, path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::new(
                &dir.join(DEFAULT_CONFIG_FILE).to_string_lossy(),
                config::FileFormat::Toml,
            )
            .required(false),
        };
        let builder = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX));

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.level()?;
        Ok(config)
    }

    /// The maximum level for log output.
    pub fn level(&self) -> anyhow::Result<tracing::Level> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("unknown log level '{}'", self.log_level))
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
