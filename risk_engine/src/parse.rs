//! Raw snapshots as returned by the on-chain data providers: every big
//! number is a base-10 string, field names are the providers' camelCase.

use common_constants::MAX_ASSET_DECIMALS;
use common_errors::{ERROR_MALFORMED_NUMBER, ERROR_UNKNOWN_RESERVE, ERROR_UNSUPPORTED_DECIMALS};
use common_math::Ray;
use common_structs::{
    IncentiveSide, IncentiveStream, ReserveIncentives, ReserveSnapshot, UserIncentiveSide,
    UserReserveIncentives, UserReservePosition, UserRewardState,
};
use serde::{Deserialize, Serialize};

multiversx_sc::imports!();

fn zero() -> String {
    String::from("0")
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReserveSnapshot {
    pub underlying_asset: String,
    #[serde(default)]
    pub symbol: String,
    pub decimals: usize,
    pub liquidity_index: String,
    pub liquidity_rate: String,
    pub variable_borrow_index: String,
    pub variable_borrow_rate: String,
    #[serde(default = "zero")]
    pub stable_borrow_rate: String,
    #[serde(default = "zero")]
    pub average_stable_rate: String,
    pub total_scaled_variable_debt: String,
    #[serde(default = "zero")]
    pub total_principal_stable_debt: String,
    pub available_liquidity: String,
    #[serde(default = "zero")]
    pub unbacked: String,
    pub last_update_timestamp: u64,
    #[serde(default)]
    pub stable_debt_last_update_timestamp: u64,
    #[serde(rename = "baseLTVasCollateral")]
    pub base_ltv_as_collateral: String,
    pub reserve_liquidation_threshold: String,
    pub reserve_liquidation_bonus: String,
    #[serde(default = "zero")]
    pub reserve_factor: String,
    pub usage_as_collateral_enabled: bool,
    #[serde(default = "enabled")]
    pub borrowing_enabled: bool,
    #[serde(default)]
    pub stable_borrow_rate_enabled: bool,
    #[serde(default = "enabled")]
    pub is_active: bool,
    #[serde(default)]
    pub is_frozen: bool,
    pub price_in_market_reference_currency: String,
    #[serde(default = "zero")]
    pub supply_cap: String,
    #[serde(default = "zero")]
    pub borrow_cap: String,
    #[serde(default = "zero")]
    pub debt_ceiling: String,
    #[serde(default)]
    pub debt_ceiling_decimals: usize,
    #[serde(default = "zero")]
    pub isolation_mode_total_debt: String,
    #[serde(default)]
    pub e_mode_category_id: u8,
    #[serde(default = "zero")]
    pub e_mode_ltv: String,
    #[serde(default = "zero")]
    pub e_mode_liquidation_threshold: String,
    #[serde(default = "zero")]
    pub e_mode_liquidation_bonus: String,
    #[serde(default)]
    pub e_mode_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserReserve {
    pub underlying_asset: String,
    pub scaled_a_token_balance: String,
    pub usage_as_collateral_enabled_on_user: bool,
    #[serde(default = "zero")]
    pub scaled_variable_debt: String,
    #[serde(default = "zero")]
    pub principal_stable_debt: String,
    #[serde(default = "zero")]
    pub stable_borrow_rate: String,
    #[serde(default)]
    pub stable_borrow_last_update_timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncentiveStream {
    pub reward_token_address: String,
    #[serde(default)]
    pub reward_token_symbol: String,
    pub emission_per_second: String,
    pub incentives_last_update_timestamp: u64,
    pub token_incentives_index: String,
    pub emission_end_timestamp: u64,
    pub reward_price_feed: String,
    pub price_feed_decimals: usize,
    pub reward_token_decimals: usize,
    pub precision: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncentiveSide {
    pub token_address: String,
    pub incentive_controller_address: String,
    #[serde(default)]
    pub rewards_token_information: Vec<RawIncentiveStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReserveIncentives {
    pub underlying_asset: String,
    #[serde(default)]
    pub a_incentive_data: RawIncentiveSide,
    #[serde(default)]
    pub v_incentive_data: RawIncentiveSide,
    #[serde(default)]
    pub s_incentive_data: RawIncentiveSide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserRewardState {
    pub reward_token_address: String,
    #[serde(default)]
    pub reward_token_symbol: String,
    pub token_incentives_user_index: String,
    pub user_unclaimed_rewards: String,
    pub reward_price_feed: String,
    pub price_feed_decimals: usize,
    pub reward_token_decimals: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserIncentiveSide {
    pub token_address: String,
    pub incentive_controller_address: String,
    #[serde(default)]
    pub user_rewards_information: Vec<RawUserRewardState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserReserveIncentives {
    pub underlying_asset: String,
    #[serde(default)]
    pub a_token_incentives_user_data: RawUserIncentiveSide,
    #[serde(default)]
    pub v_token_incentives_user_data: RawUserIncentiveSide,
    #[serde(default)]
    pub s_token_incentives_user_data: RawUserIncentiveSide,
}

/// Everything fetched for one user at one block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub current_timestamp: u64,
    #[serde(default)]
    pub user_e_mode_category_id: u8,
    #[serde(default)]
    pub reserves: Vec<RawReserveSnapshot>,
    #[serde(default)]
    pub user_reserves: Vec<RawUserReserve>,
    #[serde(default)]
    pub reserve_incentives: Vec<RawReserveIncentives>,
    #[serde(default)]
    pub user_incentives: Vec<RawUserReserveIncentives>,
}

impl RawSnapshot {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Validating constructors from raw snapshots into the typed model.
///
/// Malformed numbers, bps values that do not fit a `u64` and decimals above
/// RAY precision fail before any math runs.
#[multiversx_sc::module]
pub trait ParseModule: common_math::SharedMathModule {
    fn parse_amount(&self, value: &str) -> BigUint<Self::Api> {
        self.biguint_from_str(value)
    }

    fn parse_ray(&self, value: &str) -> Ray<Self::Api> {
        Ray::from_raw_units(self.biguint_from_str(value))
    }

    fn parse_bps(&self, value: &str) -> u64 {
        match self.biguint_from_str(value).to_u64() {
            Some(bps) => bps,
            None => sc_panic!(ERROR_MALFORMED_NUMBER),
        }
    }

    fn parse_decimals(&self, decimals: usize) -> usize {
        require!(decimals <= MAX_ASSET_DECIMALS, ERROR_UNSUPPORTED_DECIMALS);
        decimals
    }

    /// Addresses are compared case-insensitively.
    fn parse_address(&self, value: &str) -> ManagedBuffer<Self::Api> {
        ManagedBuffer::from(value.trim().to_ascii_lowercase().as_str())
    }

    fn parse_reserve(&self, raw: &RawReserveSnapshot) -> ReserveSnapshot<Self::Api> {
        ReserveSnapshot {
            underlying_asset: self.parse_address(&raw.underlying_asset),
            symbol: ManagedBuffer::from(raw.symbol.as_str()),
            decimals: self.parse_decimals(raw.decimals),
            liquidity_index: self.parse_ray(&raw.liquidity_index),
            liquidity_rate: self.parse_ray(&raw.liquidity_rate),
            variable_borrow_index: self.parse_ray(&raw.variable_borrow_index),
            variable_borrow_rate: self.parse_ray(&raw.variable_borrow_rate),
            stable_borrow_rate: self.parse_ray(&raw.stable_borrow_rate),
            average_stable_rate: self.parse_ray(&raw.average_stable_rate),
            total_scaled_variable_debt: self.parse_amount(&raw.total_scaled_variable_debt),
            total_principal_stable_debt: self.parse_amount(&raw.total_principal_stable_debt),
            available_liquidity: self.parse_amount(&raw.available_liquidity),
            unbacked: self.parse_amount(&raw.unbacked),
            last_update_timestamp: raw.last_update_timestamp,
            stable_debt_last_update_timestamp: raw.stable_debt_last_update_timestamp,
            base_ltv_as_collateral: self.parse_bps(&raw.base_ltv_as_collateral),
            reserve_liquidation_threshold: self.parse_bps(&raw.reserve_liquidation_threshold),
            reserve_liquidation_bonus: self.parse_bps(&raw.reserve_liquidation_bonus),
            reserve_factor: self.parse_bps(&raw.reserve_factor),
            usage_as_collateral_enabled: raw.usage_as_collateral_enabled,
            borrowing_enabled: raw.borrowing_enabled,
            stable_borrow_rate_enabled: raw.stable_borrow_rate_enabled,
            is_active: raw.is_active,
            is_frozen: raw.is_frozen,
            price_in_market_reference_currency: self
                .parse_amount(&raw.price_in_market_reference_currency),
            supply_cap: self.parse_amount(&raw.supply_cap),
            borrow_cap: self.parse_amount(&raw.borrow_cap),
            debt_ceiling: self.parse_amount(&raw.debt_ceiling),
            debt_ceiling_decimals: self.parse_decimals(raw.debt_ceiling_decimals),
            isolation_mode_total_debt: self.parse_amount(&raw.isolation_mode_total_debt),
            e_mode_category_id: raw.e_mode_category_id,
            e_mode_ltv: self.parse_bps(&raw.e_mode_ltv),
            e_mode_liquidation_threshold: self.parse_bps(&raw.e_mode_liquidation_threshold),
            e_mode_liquidation_bonus: self.parse_bps(&raw.e_mode_liquidation_bonus),
            e_mode_label: ManagedBuffer::from(raw.e_mode_label.as_str()),
        }
    }

    fn parse_reserves(&self, raw: &[RawReserveSnapshot]) -> Vec<ReserveSnapshot<Self::Api>> {
        raw.iter().map(|reserve| self.parse_reserve(reserve)).collect()
    }

    fn parse_user_reserve(
        &self,
        raw: &RawUserReserve,
        reserve: ReserveSnapshot<Self::Api>,
    ) -> UserReservePosition<Self::Api> {
        UserReservePosition {
            reserve,
            scaled_a_token_balance: self.parse_amount(&raw.scaled_a_token_balance),
            scaled_variable_debt: self.parse_amount(&raw.scaled_variable_debt),
            principal_stable_debt: self.parse_amount(&raw.principal_stable_debt),
            stable_borrow_rate: self.parse_ray(&raw.stable_borrow_rate),
            stable_borrow_last_update_timestamp: raw.stable_borrow_last_update_timestamp,
            usage_as_collateral_enabled_on_user: raw.usage_as_collateral_enabled_on_user,
        }
    }

    /// Pairs every user reserve with its reserve snapshot by underlying asset.
    fn parse_user_reserves(
        &self,
        reserves: &[ReserveSnapshot<Self::Api>],
        raw: &[RawUserReserve],
    ) -> Vec<UserReservePosition<Self::Api>> {
        raw.iter()
            .map(|user_reserve| {
                let asset = self.parse_address(&user_reserve.underlying_asset);
                let reserve = reserves
                    .iter()
                    .find(|reserve| reserve.underlying_asset == asset);
                match reserve {
                    Some(reserve) => self.parse_user_reserve(user_reserve, reserve.clone()),
                    None => sc_panic!(ERROR_UNKNOWN_RESERVE),
                }
            })
            .collect()
    }

    fn parse_incentive_stream(&self, raw: &RawIncentiveStream) -> IncentiveStream<Self::Api> {
        IncentiveStream {
            reward_token_address: self.parse_address(&raw.reward_token_address),
            reward_token_symbol: ManagedBuffer::from(raw.reward_token_symbol.as_str()),
            emission_per_second: self.parse_amount(&raw.emission_per_second),
            incentives_last_update_timestamp: raw.incentives_last_update_timestamp,
            token_incentives_index: self.parse_amount(&raw.token_incentives_index),
            emission_end_timestamp: raw.emission_end_timestamp,
            reward_price_feed: self.parse_amount(&raw.reward_price_feed),
            price_feed_decimals: self.parse_decimals(raw.price_feed_decimals),
            reward_token_decimals: self.parse_decimals(raw.reward_token_decimals),
            precision: self.parse_decimals(raw.precision),
        }
    }

    fn parse_incentive_side(&self, raw: &RawIncentiveSide) -> IncentiveSide<Self::Api> {
        IncentiveSide {
            token_address: self.parse_address(&raw.token_address),
            incentive_controller_address: self.parse_address(&raw.incentive_controller_address),
            rewards: raw
                .rewards_token_information
                .iter()
                .map(|stream| self.parse_incentive_stream(stream))
                .collect(),
        }
    }

    fn parse_reserve_incentives(
        &self,
        raw: &RawReserveIncentives,
    ) -> ReserveIncentives<Self::Api> {
        ReserveIncentives {
            underlying_asset: self.parse_address(&raw.underlying_asset),
            supply: self.parse_incentive_side(&raw.a_incentive_data),
            variable_debt: self.parse_incentive_side(&raw.v_incentive_data),
            stable_debt: self.parse_incentive_side(&raw.s_incentive_data),
        }
    }

    fn parse_user_reward_state(&self, raw: &RawUserRewardState) -> UserRewardState<Self::Api> {
        UserRewardState {
            reward_token_address: self.parse_address(&raw.reward_token_address),
            reward_token_symbol: ManagedBuffer::from(raw.reward_token_symbol.as_str()),
            token_incentives_user_index: self.parse_amount(&raw.token_incentives_user_index),
            user_unclaimed_rewards: self.parse_amount(&raw.user_unclaimed_rewards),
            reward_price_feed: self.parse_amount(&raw.reward_price_feed),
            price_feed_decimals: self.parse_decimals(raw.price_feed_decimals),
            reward_token_decimals: self.parse_decimals(raw.reward_token_decimals),
        }
    }

    fn parse_user_incentive_side(
        &self,
        raw: &RawUserIncentiveSide,
    ) -> UserIncentiveSide<Self::Api> {
        UserIncentiveSide {
            token_address: self.parse_address(&raw.token_address),
            incentive_controller_address: self.parse_address(&raw.incentive_controller_address),
            user_rewards: raw
                .user_rewards_information
                .iter()
                .map(|reward| self.parse_user_reward_state(reward))
                .collect(),
        }
    }

    fn parse_user_reserve_incentives(
        &self,
        raw: &RawUserReserveIncentives,
    ) -> UserReserveIncentives<Self::Api> {
        UserReserveIncentives {
            underlying_asset: self.parse_address(&raw.underlying_asset),
            supply: self.parse_user_incentive_side(&raw.a_token_incentives_user_data),
            variable_debt: self.parse_user_incentive_side(&raw.v_token_incentives_user_data),
            stable_debt: self.parse_user_incentive_side(&raw.s_token_incentives_user_data),
        }
    }
}
