use serde::Serialize;

pub mod account;
pub mod summary;
pub mod totals;

/// One position accrued to a timestamp, normalized for display.
///
/// `*_market_reference` values are whole market reference units, `*_usd`
/// values whole USD.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedUserReserve {
    pub underlying_asset: String,
    pub symbol: String,
    pub usage_as_collateral_enabled_on_user: bool,
    pub underlying_balance: String,
    pub underlying_balance_market_reference: String,
    pub underlying_balance_usd: String,
    pub variable_borrows: String,
    pub variable_borrows_market_reference: String,
    pub variable_borrows_usd: String,
    pub stable_borrows: String,
    pub stable_borrows_market_reference: String,
    pub stable_borrows_usd: String,
    pub total_borrows: String,
    pub total_borrows_market_reference: String,
    pub total_borrows_usd: String,
    pub stable_borrow_apr: String,
    pub stable_borrow_apy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedUserSummary {
    pub user_reserves: Vec<FormattedUserReserve>,
    pub user_e_mode_category_id: u8,
    pub total_liquidity_market_reference: String,
    pub total_liquidity_usd: String,
    pub total_collateral_market_reference: String,
    pub total_collateral_usd: String,
    pub total_borrows_market_reference: String,
    pub total_borrows_usd: String,
    /// Negative when borrows exceed supplied liquidity.
    pub net_worth_usd: String,
    pub available_borrows_market_reference: String,
    pub available_borrows_usd: String,
    pub current_loan_to_value: String,
    pub current_liquidation_threshold: String,
    /// `-1` without borrows.
    pub health_factor: String,
    pub is_in_isolation_mode: bool,
    pub isolated_reserve_asset: Option<String>,
}
