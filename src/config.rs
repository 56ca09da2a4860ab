// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Datelike, Utc};
use dotenvy::dotenv;
use thiserror::Error;

/// Subjects offered by the exam composer.
pub const SUBJECTS: [&str; 15] = [
    "Mathematics",
    "English",
    "Physics",
    "Chemistry",
    "Biology",
    "Government",
    "Computer Science",
    "Agricultural Science",
    "History",
    "Animal Husbandry",
    "Data Processing",
    "Economics",
    "Civic Education",
    "Geography",
    "Literature in English",
];

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 300;
pub const MAX_SUBJECT_CHARS: usize = 100;

/// Client storage key holding the JSON-encoded exam header.
pub const EXAM_DATA_KEY: &str = "preptab_exam_data";
/// Client storage key holding the JSON-encoded staged question list.
pub const QUESTIONS_KEY: &str = "preptab_questions";

/// Request header identifying the draft a request operates on.
pub const SESSION_HEADER: &str = "x-draft-session";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Connection pool policy.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Connections kept open at all times.
    pub size: u32,
    /// Connections allowed on top of `size` under load.
    pub max_overflow: u32,
    /// Connections older than this are closed and replaced.
    pub recycle: Duration,
    /// How long a checkout may wait before failing.
    pub timeout: Duration,
    pub command_timeout: Duration,
    pub application_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 10,
            max_overflow: 20,
            recycle: Duration::from_secs(3600),
            timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(60),
            application_name: "preptab_backend".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub log_dir: String,
    pub listen_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub run_migrations: bool,
    pub exam_years: RangeInclusive<i32>,
    /// Drafts untouched for this long are dropped.
    pub draft_idle_timeout: Duration,
    /// Most drafts kept at once; the least recently used goes first.
    pub max_drafts: usize,
    pub pool: PoolConfig,
}

impl Config {
    /// Defaults for everything except the database location.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            run_migrations: false,
            exam_years: 2015..=2025,
            draft_idle_timeout: Duration::from_secs(24 * 60 * 60),
            max_drafts: 10_000,
            pool: PoolConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let mut config = Self::new(database_url);

        if let Ok(rust_log) = env::var("RUST_LOG") {
            config.rust_log = rust_log;
        }
        if let Ok(log_dir) = env::var("LOG_DIR") {
            config.log_dir = log_dir;
        }
        if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.listen_addr = parse_or("LISTEN_ADDR", config.listen_addr)?;
        config.run_migrations = parse_or("RUN_MIGRATIONS", config.run_migrations)?;

        let year_min = parse_or("EXAM_YEAR_MIN", *config.exam_years.start())?;
        let year_max = parse_or("EXAM_YEAR_MAX", *config.exam_years.end())?;
        if year_min > year_max {
            return Err(ConfigError::Invalid {
                name: "EXAM_YEAR_MIN",
                value: format!("{year_min} is after EXAM_YEAR_MAX {year_max}"),
            });
        }
        config.exam_years = year_min..=year_max;

        config.draft_idle_timeout = Duration::from_secs(parse_or(
            "DRAFT_IDLE_TIMEOUT_SECS",
            config.draft_idle_timeout.as_secs(),
        )?);
        config.max_drafts = parse_or("MAX_DRAFT_SESSIONS", config.max_drafts)?;

        let pool = &mut config.pool;
        pool.size = parse_or("DB_POOL_SIZE", pool.size)?;
        pool.max_overflow = parse_or("DB_MAX_OVERFLOW", pool.max_overflow)?;
        pool.recycle = Duration::from_secs(parse_or("DB_POOL_RECYCLE_SECS", pool.recycle.as_secs())?);
        pool.timeout = Duration::from_secs(parse_or("DB_POOL_TIMEOUT_SECS", pool.timeout.as_secs())?);
        pool.command_timeout = Duration::from_secs(parse_or(
            "DB_COMMAND_TIMEOUT_SECS",
            pool.command_timeout.as_secs(),
        )?);

        Ok(config)
    }

    /// Year preselected for a fresh exam: the current year, kept inside the
    /// configured range.
    pub fn default_exam_year(&self) -> i32 {
        default_exam_year(&self.exam_years)
    }

    pub fn year_in_range(&self, year: i32) -> bool {
        self.exam_years.contains(&year)
    }
}

/// The current year, kept inside `years`.
pub fn default_exam_year(years: &RangeInclusive<i32>) -> i32 {
    Utc::now().year().clamp(*years.start(), *years.end())
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exam_year_stays_in_range() {
        let mut config = Config::new("postgres://localhost/preptab");

        config.exam_years = 1990..=2000;
        assert_eq!(config.default_exam_year(), 2000);

        config.exam_years = 3000..=3010;
        assert_eq!(config.default_exam_year(), 3000);
    }

    #[test]
    fn year_range_check() {
        let config = Config::new("postgres://localhost/preptab");
        assert!(config.year_in_range(2015));
        assert!(config.year_in_range(2025));
        assert!(!config.year_in_range(2014));
        assert!(!config.year_in_range(2026));
    }
}
