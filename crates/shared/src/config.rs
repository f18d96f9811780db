use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "daily-brief";

/// Run-wide settings, resolved once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: PathBuf,
    pub content_path: Option<PathBuf>,
    pub news_file: PathBuf,
    pub publish: bool,
}

/// Values supplied on the command line; each one wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub content_path: Option<PathBuf>,
    pub news_file: Option<PathBuf>,
    pub publish: bool,
}

impl Config {
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let output_dir = overrides
            .output_dir
            .or_else(|| env::var_os("DAILY_BRIEF_DIR").map(PathBuf::from))
            .unwrap_or_else(default_output_dir);

        let content_path = overrides
            .content_path
            .or_else(|| env::var_os("DAILY_BRIEF_CONTENT").map(PathBuf::from))
            .or_else(|| {
                let candidate = output_dir.join("content.json");
                candidate.exists().then_some(candidate)
            });

        let news_file = overrides
            .news_file
            .or_else(|| env::var_os("DAILY_BRIEF_NEWS_FILE").map(PathBuf::from))
            .unwrap_or_else(|| output_dir.join("breaking-news.json"));

        let publish = overrides.publish
            || env::var("DAILY_BRIEF_PUBLISH")
                .map(|v| parse_flag(&v))
                .unwrap_or(false);

        Ok(Self {
            output_dir,
            content_path,
            news_file,
            publish,
        })
    }

    /// Make sure the output directory exists before anything is written into it.
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/daily-brief/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
