//! Application configuration.
//!
//! Every recognized option is declared here with its constraints, resolved
//! once at load and passed into the engine — nothing is read ad hoc
//! mid-pipeline, and the engine holds no process-wide mutable state.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Environment variable carrying the ledger session key.
pub const SESSION_KEY_ENV: &str = "HPX_SESSION_KEY";

/// Environment variable naming the config file (overridden by `--config`).
pub const CONFIG_PATH_ENV: &str = "HPX_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ledger gateway base URL.
    pub ledger_url: String,
    /// Indexer GraphQL endpoint URL.
    pub index_url: String,
    /// Maker wallet address.
    pub maker_address: String,

    /// Skip all ledger writes, log what would have been done.
    #[serde(default)]
    pub dry_run: bool,
    /// Address whose position/orders to read in dry-run mode (lets a
    /// dry run shadow a live maker).
    #[serde(default)]
    pub dry_run_address: Option<String>,

    /// Risk aversion coefficient of the reservation price model.
    pub risk_aversion: Decimal,
    /// Total quoted spread in collateral units. Must be divisible by the
    /// ledger tick size (checked against the live tick at run time).
    pub spread_amount: Decimal,
    /// Number of ladder levels per side.
    #[serde(default = "default_grid_levels")]
    pub grid_levels: u32,
    /// Maximum net position in contracts used to normalize inventory.
    pub max_position: Decimal,
    /// Fraction of the float actively deployed as quotes.
    #[serde(default = "default_active_quoting_ratio")]
    pub active_quoting_ratio: Decimal,
    /// Target margin account balance. Topped up from the wallet when below.
    pub float_amount: Decimal,
    /// Geometric decay ratio of per-level budget allocations.
    #[serde(default = "default_taper_ratio")]
    pub taper_ratio: Decimal,

    /// Minimum gas-asset balance required to attempt an iteration.
    #[serde(default = "default_min_gas_balance")]
    pub min_gas_balance: Decimal,
    /// Minimum total collateral (wallet + margin) required to quote.
    #[serde(default = "default_min_collateral_balance")]
    pub min_collateral_balance: Decimal,

    /// Daily settlement checkpoint, seconds after UTC midnight.
    #[serde(default)]
    pub checkpoint_time_secs: u32,
    /// Length of the price-history window fed to the volatility estimator.
    #[serde(default = "default_volatility_window_secs")]
    pub volatility_window_secs: i64,
    /// Resampling bucket width for the volatility estimator.
    #[serde(default = "default_resample_interval_secs")]
    pub resample_interval_secs: i64,

    /// Confirm a submitted batch became visible on the indexer.
    #[serde(default = "default_true")]
    pub confirm_indexed: bool,
    /// Attempts before the indexer confirmation poll gives up.
    #[serde(default = "default_index_poll_attempts")]
    pub index_poll_attempts: u32,
    /// Delay between indexer confirmation polls (milliseconds).
    #[serde(default = "default_index_poll_delay_ms")]
    pub index_poll_delay_ms: u64,

    /// Ledger session key, resolved from the environment, never from the
    /// config file.
    #[serde(skip)]
    pub session_key: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_grid_levels() -> u32 {
    4
}
fn default_active_quoting_ratio() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_taper_ratio() -> Decimal {
    Decimal::new(7, 1) // 0.7
}
fn default_min_gas_balance() -> Decimal {
    Decimal::new(1, 2) // 0.01 gas units
}
fn default_min_collateral_balance() -> Decimal {
    Decimal::new(10, 0) // 10 collateral units
}
fn default_volatility_window_secs() -> i64 {
    30 * 24 * 3600 // 30 days
}
fn default_resample_interval_secs() -> i64 {
    3600 // hourly closes
}
fn default_index_poll_attempts() -> u32 {
    10
}
fn default_index_poll_delay_ms() -> u64 {
    1000
}

impl AppConfig {
    /// Load from a TOML file and merge environment secrets.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read config {path}: {e}")))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("failed to parse config {path}: {e}")))?;

        config.session_key = std::env::var(SESSION_KEY_ENV).ok();
        config.validate()?;
        Ok(config)
    }

    /// Validate option ranges. Called once at load.
    pub fn validate(&self) -> AppResult<()> {
        if self.risk_aversion < Decimal::ZERO {
            return Err(AppError::Config("risk_aversion must be >= 0".to_string()));
        }
        if self.spread_amount <= Decimal::ZERO {
            return Err(AppError::Config("spread_amount must be > 0".to_string()));
        }
        if self.grid_levels == 0 {
            return Err(AppError::Config("grid_levels must be >= 1".to_string()));
        }
        if self.max_position <= Decimal::ZERO {
            return Err(AppError::Config("max_position must be > 0".to_string()));
        }
        if self.active_quoting_ratio < Decimal::ZERO || self.active_quoting_ratio > Decimal::ONE {
            return Err(AppError::Config(
                "active_quoting_ratio must be in [0, 1]".to_string(),
            ));
        }
        if self.float_amount < Decimal::ZERO {
            return Err(AppError::Config("float_amount must be >= 0".to_string()));
        }
        if self.taper_ratio <= Decimal::ZERO || self.taper_ratio >= Decimal::ONE {
            return Err(AppError::Config(
                "taper_ratio must be in (0, 1)".to_string(),
            ));
        }
        if self.checkpoint_time_secs >= 86_400 {
            return Err(AppError::Config(
                "checkpoint_time_secs must be within one day".to_string(),
            ));
        }
        if self.resample_interval_secs <= 0 {
            return Err(AppError::Config(
                "resample_interval_secs must be > 0".to_string(),
            ));
        }
        if self.volatility_window_secs <= 0 {
            return Err(AppError::Config(
                "volatility_window_secs must be > 0".to_string(),
            ));
        }
        if !self.dry_run && self.session_key.is_none() {
            return Err(AppError::Config(format!(
                "{SESSION_KEY_ENV} is required for live runs"
            )));
        }
        Ok(())
    }

    /// Address used for indexer reads: the dry-run override when set,
    /// otherwise the maker wallet.
    pub fn quoting_address(&self) -> &str {
        if self.dry_run {
            if let Some(address) = &self.dry_run_address {
                return address;
            }
        }
        &self.maker_address
    }

    /// Notional budget actively deployed as quotes this iteration.
    pub fn quoting_budget(&self) -> Decimal {
        self.float_amount * self.active_quoting_ratio
    }
}
