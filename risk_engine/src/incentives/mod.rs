use serde::Serialize;

pub mod accrual;
pub mod apr;
pub mod claimable;

use common_structs::IncentiveSideKind;

/// Sides in the order the data providers report them.
pub const INCENTIVE_SIDES: [IncentiveSideKind; 3] = [
    IncentiveSideKind::Supply,
    IncentiveSideKind::VariableDebt,
    IncentiveSideKind::StableDebt,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedIncentiveApr {
    pub reward_token_address: String,
    pub reward_token_symbol: String,
    /// Fraction, `0.05` for 5%.
    pub incentive_apr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedReserveIncentives {
    pub underlying_asset: String,
    pub supply_incentives: Vec<FormattedIncentiveApr>,
    pub variable_debt_incentives: Vec<FormattedIncentiveApr>,
    pub stable_debt_incentives: Vec<FormattedIncentiveApr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedClaimableReward {
    pub incentive_controller_address: String,
    pub reward_token_address: String,
    pub reward_token_symbol: String,
    pub asset_addresses: Vec<String>,
    /// Whole reward tokens.
    pub claimable_rewards: String,
    /// Valued with the reward price feed.
    pub claimable_rewards_usd: String,
}
