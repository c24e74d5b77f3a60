#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use common_math::Ray;

multiversx_sc::imports!();

/// On-chain state of one reserve as read from the pool data provider.
///
/// Balances are in the asset's smallest unit, rates and indexes are RAY and
/// risk parameters are basis points. `price_in_market_reference_currency`
/// carries the market reference currency decimals.
#[derive(Clone)]
pub struct ReserveSnapshot<M: ManagedTypeApi> {
    pub underlying_asset: ManagedBuffer<M>,
    pub symbol: ManagedBuffer<M>,
    pub decimals: usize,
    pub liquidity_index: Ray<M>,
    pub liquidity_rate: Ray<M>,
    pub variable_borrow_index: Ray<M>,
    pub variable_borrow_rate: Ray<M>,
    pub stable_borrow_rate: Ray<M>,
    pub average_stable_rate: Ray<M>,
    pub total_scaled_variable_debt: BigUint<M>,
    pub total_principal_stable_debt: BigUint<M>,
    pub available_liquidity: BigUint<M>,
    pub unbacked: BigUint<M>,
    pub last_update_timestamp: u64,
    pub stable_debt_last_update_timestamp: u64,
    pub base_ltv_as_collateral: u64,
    pub reserve_liquidation_threshold: u64,
    pub reserve_liquidation_bonus: u64,
    pub reserve_factor: u64,
    pub usage_as_collateral_enabled: bool,
    pub borrowing_enabled: bool,
    pub stable_borrow_rate_enabled: bool,
    pub is_active: bool,
    pub is_frozen: bool,
    pub price_in_market_reference_currency: BigUint<M>,
    /// Whole tokens, zero means uncapped.
    pub supply_cap: BigUint<M>,
    /// Whole tokens, zero means uncapped.
    pub borrow_cap: BigUint<M>,
    pub debt_ceiling: BigUint<M>,
    pub debt_ceiling_decimals: usize,
    pub isolation_mode_total_debt: BigUint<M>,
    pub e_mode_category_id: u8,
    pub e_mode_ltv: u64,
    pub e_mode_liquidation_threshold: u64,
    pub e_mode_liquidation_bonus: u64,
    pub e_mode_label: ManagedBuffer<M>,
}

impl<M: ManagedTypeApi> ReserveSnapshot<M> {
    pub fn can_be_collateral(&self) -> bool {
        self.usage_as_collateral_enabled
    }

    /// A non-zero debt ceiling puts any borrower using this asset as
    /// collateral in isolation mode.
    pub fn is_isolated(&self) -> bool {
        self.debt_ceiling != BigUint::zero()
    }

    pub fn is_in_e_mode_category(&self, category_id: u8) -> bool {
        category_id != 0 && self.e_mode_category_id == category_id
    }

    pub fn ltv_for(&self, user_e_mode_category: u8) -> u64 {
        if self.is_in_e_mode_category(user_e_mode_category) {
            self.e_mode_ltv
        } else {
            self.base_ltv_as_collateral
        }
    }

    pub fn liquidation_threshold_for(&self, user_e_mode_category: u8) -> u64 {
        if self.is_in_e_mode_category(user_e_mode_category) {
            self.e_mode_liquidation_threshold
        } else {
            self.reserve_liquidation_threshold
        }
    }
}

/// One user's scaled balances in one reserve, together with that reserve.
#[derive(Clone)]
pub struct UserReservePosition<M: ManagedTypeApi> {
    pub reserve: ReserveSnapshot<M>,
    pub scaled_a_token_balance: BigUint<M>,
    pub scaled_variable_debt: BigUint<M>,
    pub principal_stable_debt: BigUint<M>,
    pub stable_borrow_rate: Ray<M>,
    pub stable_borrow_last_update_timestamp: u64,
    pub usage_as_collateral_enabled_on_user: bool,
}

impl<M: ManagedTypeApi> UserReservePosition<M> {
    /// Both the reserve and the user must allow the asset as collateral.
    pub fn is_collateral(&self) -> bool {
        self.reserve.can_be_collateral() && self.usage_as_collateral_enabled_on_user
    }

    pub fn has_supply(&self) -> bool {
        self.scaled_a_token_balance != BigUint::zero()
    }

    pub fn has_borrows(&self) -> bool {
        self.scaled_variable_debt != BigUint::zero()
            || self.principal_stable_debt != BigUint::zero()
    }
}

/// The currency every reserve price is quoted in, plus its USD price.
#[derive(Clone)]
pub struct MarketReferenceCurrency<M: ManagedTypeApi> {
    pub decimals: usize,
    /// Price of one reference unit in USD, `usd_decimals` decimals.
    pub price_in_usd: BigUint<M>,
    pub usd_decimals: usize,
}

/// One reward emitted for holders of one token.
#[derive(Clone)]
pub struct IncentiveStream<M: ManagedTypeApi> {
    pub reward_token_address: ManagedBuffer<M>,
    pub reward_token_symbol: ManagedBuffer<M>,
    pub emission_per_second: BigUint<M>,
    pub incentives_last_update_timestamp: u64,
    pub token_incentives_index: BigUint<M>,
    pub emission_end_timestamp: u64,
    pub reward_price_feed: BigUint<M>,
    pub price_feed_decimals: usize,
    pub reward_token_decimals: usize,
    /// Decimals of `token_incentives_index`.
    pub precision: usize,
}

impl<M: ManagedTypeApi> IncentiveStream<M> {
    pub fn is_emitting(&self) -> bool {
        self.emission_per_second != BigUint::zero()
            && self.emission_end_timestamp > self.incentives_last_update_timestamp
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum IncentiveSideKind {
    Supply,
    VariableDebt,
    StableDebt,
}

/// Rewards attached to one of the reserve's tokens.
#[derive(Clone)]
pub struct IncentiveSide<M: ManagedTypeApi> {
    pub token_address: ManagedBuffer<M>,
    pub incentive_controller_address: ManagedBuffer<M>,
    pub rewards: Vec<IncentiveStream<M>>,
}

#[derive(Clone)]
pub struct ReserveIncentives<M: ManagedTypeApi> {
    pub underlying_asset: ManagedBuffer<M>,
    pub supply: IncentiveSide<M>,
    pub variable_debt: IncentiveSide<M>,
    pub stable_debt: IncentiveSide<M>,
}

impl<M: ManagedTypeApi> ReserveIncentives<M> {
    pub fn side(&self, kind: IncentiveSideKind) -> &IncentiveSide<M> {
        match kind {
            IncentiveSideKind::Supply => &self.supply,
            IncentiveSideKind::VariableDebt => &self.variable_debt,
            IncentiveSideKind::StableDebt => &self.stable_debt,
        }
    }
}

/// User bookkeeping for one reward stream.
#[derive(Clone)]
pub struct UserRewardState<M: ManagedTypeApi> {
    pub reward_token_address: ManagedBuffer<M>,
    pub reward_token_symbol: ManagedBuffer<M>,
    pub token_incentives_user_index: BigUint<M>,
    pub user_unclaimed_rewards: BigUint<M>,
    pub reward_price_feed: BigUint<M>,
    pub price_feed_decimals: usize,
    pub reward_token_decimals: usize,
}

#[derive(Clone)]
pub struct UserIncentiveSide<M: ManagedTypeApi> {
    pub token_address: ManagedBuffer<M>,
    pub incentive_controller_address: ManagedBuffer<M>,
    pub user_rewards: Vec<UserRewardState<M>>,
}

#[derive(Clone)]
pub struct UserReserveIncentives<M: ManagedTypeApi> {
    pub underlying_asset: ManagedBuffer<M>,
    pub supply: UserIncentiveSide<M>,
    pub variable_debt: UserIncentiveSide<M>,
    pub stable_debt: UserIncentiveSide<M>,
}

impl<M: ManagedTypeApi> UserReserveIncentives<M> {
    pub fn side(&self, kind: IncentiveSideKind) -> &UserIncentiveSide<M> {
        match kind {
            IncentiveSideKind::Supply => &self.supply,
            IncentiveSideKind::VariableDebt => &self.variable_debt,
            IncentiveSideKind::StableDebt => &self.stable_debt,
        }
    }
}

/// Debt and liquidity of a reserve accrued to a timestamp, smallest units.
#[derive(Clone)]
pub struct ReserveDebtTotals<M: ManagedTypeApi> {
    pub total_variable_debt: BigUint<M>,
    pub total_stable_debt: BigUint<M>,
    pub total_debt: BigUint<M>,
    pub total_liquidity: BigUint<M>,
}

/// Balances of one position accrued to a timestamp.
///
/// `*_market_reference` values are RAY decimals counted in the smallest unit
/// of the market reference currency. `*_usd` values are RAY decimals in whole
/// USD.
#[derive(Clone)]
pub struct UserReserveSummary<M: ManagedTypeApi> {
    pub position: UserReservePosition<M>,
    pub underlying_balance: BigUint<M>,
    pub underlying_balance_market_reference: ManagedDecimal<M, NumDecimals>,
    pub underlying_balance_usd: ManagedDecimal<M, NumDecimals>,
    pub variable_borrows: BigUint<M>,
    pub variable_borrows_market_reference: ManagedDecimal<M, NumDecimals>,
    pub variable_borrows_usd: ManagedDecimal<M, NumDecimals>,
    pub stable_borrows: BigUint<M>,
    pub stable_borrows_market_reference: ManagedDecimal<M, NumDecimals>,
    pub stable_borrows_usd: ManagedDecimal<M, NumDecimals>,
    pub total_borrows: BigUint<M>,
    pub total_borrows_market_reference: ManagedDecimal<M, NumDecimals>,
    pub total_borrows_usd: ManagedDecimal<M, NumDecimals>,
}

/// Sums over all positions of a user, before ratios are derived.
///
/// The weighted fields hold `collateral * ltv` and
/// `collateral * liquidation_threshold` with the parameters in whole basis
/// points, so the averages can be truncated to basis points exactly.
#[derive(Clone)]
pub struct UserReserveTotals<M: ManagedTypeApi> {
    pub total_liquidity_market_reference: ManagedDecimal<M, NumDecimals>,
    pub total_collateral_market_reference: ManagedDecimal<M, NumDecimals>,
    pub total_borrows_market_reference: ManagedDecimal<M, NumDecimals>,
    pub weighted_ltv_market_reference: ManagedDecimal<M, NumDecimals>,
    pub weighted_liquidation_threshold_market_reference: ManagedDecimal<M, NumDecimals>,
    pub is_in_isolation_mode: bool,
    pub isolated_reserve: Option<ReserveSnapshot<M>>,
}

#[derive(Clone)]
pub enum HealthFactor<M: ManagedTypeApi> {
    /// No borrows, reported as `-1`.
    NoDebt,
    /// WAD decimal.
    Ratio(ManagedDecimal<M, NumDecimals>),
}

impl<M: ManagedTypeApi> HealthFactor<M> {
    pub fn is_no_debt(&self) -> bool {
        matches!(self, HealthFactor::NoDebt)
    }

    pub fn ratio(&self) -> Option<&ManagedDecimal<M, NumDecimals>> {
        match self {
            HealthFactor::NoDebt => None,
            HealthFactor::Ratio(value) => Some(value),
        }
    }
}

#[derive(Clone)]
pub struct UserAggregateSummary<M: ManagedTypeApi> {
    pub total_liquidity_market_reference: ManagedDecimal<M, NumDecimals>,
    pub total_collateral_market_reference: ManagedDecimal<M, NumDecimals>,
    pub total_borrows_market_reference: ManagedDecimal<M, NumDecimals>,
    pub available_borrows_market_reference: ManagedDecimal<M, NumDecimals>,
    /// Whole basis points, scale 4.
    pub current_ltv: ManagedDecimal<M, NumDecimals>,
    /// Whole basis points, scale 4.
    pub current_liquidation_threshold: ManagedDecimal<M, NumDecimals>,
    pub health_factor: HealthFactor<M>,
    pub is_in_isolation_mode: bool,
    pub isolated_reserve: Option<ReserveSnapshot<M>>,
}

#[derive(Clone)]
pub struct IncentiveApr<M: ManagedTypeApi> {
    pub reward_token_address: ManagedBuffer<M>,
    pub reward_token_symbol: ManagedBuffer<M>,
    /// RAY fraction, `0.05` for 5%.
    pub apr: ManagedDecimal<M, NumDecimals>,
}

#[derive(Clone)]
pub struct ReserveIncentiveAprs<M: ManagedTypeApi> {
    pub underlying_asset: ManagedBuffer<M>,
    pub supply: Vec<IncentiveApr<M>>,
    pub variable_debt: Vec<IncentiveApr<M>>,
    pub stable_debt: Vec<IncentiveApr<M>>,
}

/// Reward accrued by one user on one token since the last on-chain update.
#[derive(Clone)]
pub struct AccruedReward<M: ManagedTypeApi> {
    pub incentive_controller_address: ManagedBuffer<M>,
    pub token_address: ManagedBuffer<M>,
    pub reward_token_address: ManagedBuffer<M>,
    pub reward_token_symbol: ManagedBuffer<M>,
    /// Smallest reward token units, scale is the stream precision.
    pub accrued: ManagedDecimal<M, NumDecimals>,
    pub unclaimed: BigUint<M>,
    pub reward_price_feed: BigUint<M>,
    pub price_feed_decimals: usize,
    pub reward_token_decimals: usize,
}

/// Everything one user can claim of one reward token from one controller.
#[derive(Clone)]
pub struct ClaimableRewards<M: ManagedTypeApi> {
    pub incentive_controller_address: ManagedBuffer<M>,
    pub reward_token_address: ManagedBuffer<M>,
    pub reward_token_symbol: ManagedBuffer<M>,
    pub asset_addresses: Vec<ManagedBuffer<M>>,
    /// Smallest reward token units.
    pub claimable_rewards: ManagedDecimal<M, NumDecimals>,
    pub reward_price_feed: BigUint<M>,
    pub price_feed_decimals: usize,
    pub reward_token_decimals: usize,
}
