#![no_std]

pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;
pub const HALF_RAY: u128 = 500_000_000_000_000_000_000_000_000;
pub const RAY_PRECISION: usize = 27;

/// Token balances are treated as WAD when converted into RAY space
pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const HALF_WAD: u128 = 500_000_000_000_000_000;
pub const WAD_PRECISION: usize = 18;

pub const WAD_RAY_RATIO: u64 = 1_000_000_000;
pub const HALF_WAD_RAY_RATIO: u64 = 500_000_000;

/// Protocol year used by every rate, 365 days
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

pub const BPS: usize = 10_000; // 100%
pub const BPS_PRECISION: usize = 4;

/// Decimals of the market reference currency price expressed in USD
pub const USD_DECIMALS: usize = 8;

/// Upper bound for asset, debt ceiling and reward token decimals, values are
/// rescaled into RAY precision without loss
pub const MAX_ASSET_DECIMALS: usize = RAY_PRECISION;

/// Digits parsed per step when reading decimal strings, fits in a u64
pub const PARSE_CHUNK_DIGITS: usize = 18;
pub const PARSE_CHUNK_BASE: u64 = 1_000_000_000_000_000_000;

/// Health factor reported when a position has no debt
pub const HEALTH_FACTOR_NO_DEBT: &str = "-1";
