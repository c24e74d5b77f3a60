use std::{fmt, fs, io, path::Path};

use common_constants::{MAX_ASSET_DECIMALS, USD_DECIMALS};
use common_structs::MarketReferenceCurrency;
use log::debug;
use multiversx_sc::{api::ManagedTypeApi, types::BigUint};
use serde::Deserialize;

/// Host settings shared by every computation: the market reference currency
/// and how formatted decimals are rendered.
///
/// ```toml
/// [market]
/// reference_currency_decimals = 8
/// reference_price_in_usd = "100000000"
///
/// [output]
/// fraction_digits = 6
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub reference_currency_decimals: usize,
    /// Raw integer, `usd_decimals` decimals.
    pub reference_price_in_usd: String,
    #[serde(default = "default_usd_decimals")]
    pub usd_decimals: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Round formatted values half up to this many fraction digits.
    pub fraction_digits: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub fraction_digits: Option<usize>,
}

fn default_usd_decimals() -> usize {
    USD_DECIMALS
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    InvalidNumber { field: &'static str, value: String },
    UnsupportedDecimals { field: &'static str, value: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "cannot read config: {}", err),
            ConfigError::Parse(err) => write!(f, "invalid config: {}", err),
            ConfigError::InvalidNumber { field, value } => {
                write!(f, "{} is not an unsigned integer: {:?}", field, value)
            },
            ConfigError::UnsupportedDecimals { field, value } => {
                write!(f, "{} = {} exceeds {} decimals", field, value, MAX_ASSET_DECIMALS)
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("loading config from {}", path.display());

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.reference_price_in_usd()?;

        let decimals = [
            ("market.reference_currency_decimals", self.market.reference_currency_decimals),
            ("market.usd_decimals", self.market.usd_decimals),
        ];
        for (field, value) in decimals {
            if value > MAX_ASSET_DECIMALS {
                return Err(ConfigError::UnsupportedDecimals { field, value });
            }
        }

        Ok(())
    }

    fn reference_price_in_usd(&self) -> Result<u128, ConfigError> {
        let raw = self.market.reference_price_in_usd.trim();
        raw.parse::<u128>().map_err(|_| ConfigError::InvalidNumber {
            field: "market.reference_price_in_usd",
            value: raw.to_string(),
        })
    }

    pub fn market_reference<M: ManagedTypeApi>(
        &self,
    ) -> Result<MarketReferenceCurrency<M>, ConfigError> {
        Ok(MarketReferenceCurrency {
            decimals: self.market.reference_currency_decimals,
            price_in_usd: BigUint::from(self.reference_price_in_usd()?),
            usd_decimals: self.market.usd_decimals,
        })
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            fraction_digits: self.output.fraction_digits,
        }
    }
}
