use std::path::PathBuf;
use tokio::time::Duration;

pub const DEFAULT_START_URL: &str = "https://www.skiresort.info/ski-resorts/";
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.skiresort.info";

/// Resorts listed on one index page of the site.
const RESORTS_PER_PAGE: usize = 50;
const DEFAULT_MAX_PAGES: usize = 21;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Run parameters. There are no command line flags, everything is fixed
/// here or overridden through `SKIRESORT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub start_url: String,
    pub site_origin: String,
    pub max_pages: usize,
    pub max_resorts: usize,
    pub output_path: PathBuf,
    pub request_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start_url: DEFAULT_START_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            max_resorts: DEFAULT_MAX_PAGES * RESORTS_PER_PAGE,
            output_path: PathBuf::from("skiResort.csv"),
            request_delay: Duration::from_millis(1000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key))
    }

    /// Builds the config from any env-like lookup, so it can be exercised
    /// with a plain map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let defaults = Config::default();

        let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
            match lookup(var) {
                Ok(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: e.to_string(),
                    }),
                Err(_) => Ok(default),
            }
        };

        let parse_url = |var: &str, default: String| -> Result<String, ConfigError> {
            match lookup(var) {
                Ok(raw) => {
                    let raw = raw.trim().to_string();
                    reqwest::Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: e.to_string(),
                    })?;
                    Ok(raw)
                }
                Err(_) => Ok(default),
            }
        };

        let start_url = parse_url("SKIRESORT_START_URL", defaults.start_url)?;
        let site_origin = parse_url("SKIRESORT_SITE_ORIGIN", defaults.site_origin)?
            .trim_end_matches('/')
            .to_string();
        let max_pages = parse_usize("SKIRESORT_MAX_PAGES", defaults.max_pages)?;
        let max_resorts = parse_usize("SKIRESORT_MAX_RESORTS", defaults.max_resorts)?;
        let output_path = lookup("SKIRESORT_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_path);
        let delay_ms = parse_usize(
            "SKIRESORT_REQUEST_DELAY_MS",
            defaults.request_delay.as_millis() as usize,
        )?;

        Ok(Config {
            start_url,
            site_origin,
            max_pages,
            max_resorts,
            output_path,
            request_delay: Duration::from_millis(delay_ms as u64),
        })
    }
}
