//! Run configuration.
//!
//! `PipelineConfig` is built once (defaults + CLI overrides) and passed by
//! reference into every stage. The country groups and indicators are fixed
//! here; the CLI cannot change them.
//!
//! `DatabaseConfig` is the only part read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";
pub const DEFAULT_TABLE: &str = "economic_indicators";
pub const DEFAULT_START_YEAR: i32 = 2000;
pub const DEFAULT_END_YEAR: i32 = 2024;
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BATCH_SIZE: usize = 500;

const COUNTRY_GROUPS: &[(&str, &[&str])] = &[
    ("G7", &["USA", "GBR", "DEU", "FRA", "ITA", "CAN", "JPN"]),
    ("AFRICA_TOP5", &["NGA", "ZAF", "EGY", "DZA", "MAR"]),
];

const INDICATORS: &[(&str, &str)] = &[
    ("NY.GDP.MKTP.KD.ZG", "GDP Growth (%)"),
    ("FP.CPI.TOTL.ZG", "Inflation (%)"),
    ("BX.KLT.DINV.WD.GD.ZS", "FDI (% of GDP)"),
    ("FS.AST.PRVT.GD.ZS", "Private Credit (% of GDP)"),
    ("SL.UEM.TOTL.ZS", "Unemployment (%)"),
    ("GC.DOD.TOTL.GD.ZS", "Central Gov Debt (% of GDP)"),
    ("EG.ELC.ACCS.ZS", "Access to Electricity (%)"),
    ("NE.EXP.GNFS.ZS", "Exports (% of GDP)"),
];

/// A named, curated set of country codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryGroup {
    pub name: String,
    pub countries: Vec<String>,
}

impl CountryGroup {
    pub fn new(name: impl Into<String>, countries: &[&str]) -> Self {
        Self {
            name: name.into(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// An indicator code and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorDef {
    pub code: String,
    pub name: String,
}

impl IndicatorDef {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Inclusive year range requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::config(format!(
                "Invalid year range {start}:{end} (start must not exceed end)."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// Everything a run needs, besides database credentials.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub country_groups: Vec<CountryGroup>,
    pub indicators: Vec<IndicatorDef>,
    pub years: YearRange,
    /// Size of the fetch worker pool (max requests in flight).
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub base_url: String,
    pub table: String,
    /// Rows per INSERT statement during load.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            country_groups: COUNTRY_GROUPS
                .iter()
                .map(|(name, countries)| CountryGroup::new(*name, countries))
                .collect(),
            indicators: INDICATORS
                .iter()
                .map(|(code, name)| IndicatorDef::new(*code, *name))
                .collect(),
            years: YearRange {
                start: DEFAULT_START_YEAR,
                end: DEFAULT_END_YEAR,
            },
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Reject settings no stage can work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.concurrency == 0 {
            return Err(AppError::config("Concurrency must be at least 1."));
        }
        if self.batch_size == 0 {
            return Err(AppError::config("Batch size must be at least 1."));
        }
        if self.request_timeout.is_zero() {
            return Err(AppError::config("Request timeout must be positive."));
        }
        if self.years.start > self.years.end {
            return Err(AppError::config(format!(
                "Invalid year range {}:{}.",
                self.years.start, self.years.end
            )));
        }
        validate_table_name(&self.table)?;
        Ok(())
    }

    /// Look up the display name of a configured indicator.
    pub fn indicator_name(&self, code: &str) -> Option<&str> {
        self.indicators
            .iter()
            .find(|i| i.code == code)
            .map(|i| i.name.as_str())
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_table_name(table: &str) -> Result<(), AppError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::config(format!(
            "Invalid table name '{table}' (expected letters, digits, and underscores)."
        )))
    }
}

/// Database credentials from the environment (`.env` is honored).
#[derive(Clone)]
pub struct DatabaseConfig {
    pub user: String,
    password: String,
    /// Directory that hosts the database file.
    pub host: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host: host.into(),
            name: name.into(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the four `DB_*` keys through `lookup`; every key is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::config(format!("Missing {key} in environment (.env).")))
        };
        Ok(Self {
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            host: require("DB_HOST")?,
            name: require("DB_NAME")?,
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Location of the SQLite database: `{host}/{name}.sqlite3`.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.host).join(format!("{}.sqlite3", self.name))
    }

    /// Connection string handed to the sink; safe to log.
    pub fn connection_string(&self) -> String {
        format!("sqlite://{}@{}", self.user, self.database_path().display())
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("name", &self.name)
            .finish()
    }
}
