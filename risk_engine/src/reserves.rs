use common_constants::{BPS, BPS_PRECISION, MAX_ASSET_DECIMALS, RAY_PRECISION, SECONDS_PER_YEAR};
use common_errors::ERROR_UNSUPPORTED_DECIMALS;
use common_math::Ray;
use common_structs::{MarketReferenceCurrency, ReserveDebtTotals, ReserveSnapshot};
use log::debug;
use serde::Serialize;

use crate::{
    config::FormatOptions,
    format::{buffer_to_string, FormatModule},
};

multiversx_sc::imports!();

/// Human readable view of a reserve accrued to a timestamp.
///
/// Amounts are normalized by the asset decimals, ratios and rates are
/// fractions (`0.05` is 5%), prices and USD totals are whole units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedReserve {
    pub underlying_asset: String,
    pub symbol: String,
    pub decimals: usize,
    pub is_active: bool,
    pub is_frozen: bool,
    pub borrowing_enabled: bool,
    pub stable_borrow_rate_enabled: bool,
    pub usage_as_collateral_enabled: bool,
    pub total_variable_debt: String,
    pub total_stable_debt: String,
    pub total_debt: String,
    pub total_liquidity: String,
    pub available_liquidity: String,
    pub unbacked: String,
    pub borrow_usage_ratio: String,
    pub supply_usage_ratio: String,
    pub liquidity_index: String,
    pub variable_borrow_index: String,
    pub supply_apr: String,
    pub supply_apy: String,
    pub variable_borrow_apr: String,
    pub variable_borrow_apy: String,
    pub stable_borrow_apr: String,
    pub stable_borrow_apy: String,
    pub base_ltv_as_collateral: String,
    pub reserve_liquidation_threshold: String,
    pub reserve_liquidation_bonus: String,
    pub reserve_factor: String,
    pub supply_cap: String,
    pub borrow_cap: String,
    pub debt_ceiling: String,
    pub isolation_mode_total_debt: String,
    pub price_in_market_reference_currency: String,
    pub price_in_usd: String,
    pub total_liquidity_usd: String,
    pub total_debt_usd: String,
    pub e_mode_category_id: u8,
    pub e_mode_ltv: String,
    pub e_mode_liquidation_threshold: String,
    pub e_mode_liquidation_bonus: String,
    pub e_mode_label: String,
}

/// The ReserveModule rebuilds a reserve's supply and debt at a timestamp and
/// prices amounts in the market reference currency and in USD.
#[multiversx_sc::module]
pub trait ReserveModule:
    common_rates::InterestRates + common_math::SharedMathModule + crate::format::FormatModule
{
    /// Accrues both debt types of a reserve to `current_timestamp`.
    ///
    /// **Formula**:
    /// - `totalVariableDebt = rayMul(rayMul(scaledDebt, borrowIndex), compounded(variableRate))`
    /// - `totalStableDebt = rayMul(principalStable, compounded(averageStableRate))`
    /// - `totalLiquidity = totalVariableDebt + totalStableDebt + availableLiquidity`
    ///
    /// # Returns
    /// - `ReserveDebtTotals`: amounts in the asset's smallest unit.
    fn calculate_reserve_debt(
        &self,
        reserve: &ReserveSnapshot<Self::Api>,
        current_timestamp: u64,
    ) -> ReserveDebtTotals<Self::Api> {
        let variable_interest = self.calculate_compounded_interest(
            &reserve.variable_borrow_rate,
            reserve.last_update_timestamp,
            current_timestamp,
        );
        let scaled_variable_debt = self.ray_mul_amount(
            &reserve.total_scaled_variable_debt,
            &reserve.variable_borrow_index,
        );
        let total_variable_debt = self.ray_mul_amount(&scaled_variable_debt, &variable_interest);

        let stable_interest = self.calculate_compounded_interest(
            &reserve.average_stable_rate,
            reserve.stable_debt_last_update_timestamp,
            current_timestamp,
        );
        let total_stable_debt =
            self.ray_mul_amount(&reserve.total_principal_stable_debt, &stable_interest);

        let total_debt = &total_variable_debt + &total_stable_debt;
        let total_liquidity = &total_debt + &reserve.available_liquidity;

        ReserveDebtTotals {
            total_variable_debt,
            total_stable_debt,
            total_debt,
            total_liquidity,
        }
    }

    /// `amount * price / 10^decimals`, RAY decimal counted in the smallest
    /// unit of the market reference currency.
    fn get_market_reference_value(
        &self,
        amount: &BigUint<Self::Api>,
        price_in_market_reference: &BigUint<Self::Api>,
        decimals: usize,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        require!(decimals <= MAX_ASSET_DECIMALS, ERROR_UNSUPPORTED_DECIMALS);

        self.to_decimal(amount * price_in_market_reference, decimals)
            .rescale(RAY_PRECISION)
    }

    /// Market reference value into whole USD through the normalized
    /// reference price: `value * priceInUsdNormalized / 10^marketRefDecimals`.
    fn get_usd_value_normalized(
        &self,
        market_reference_value: &ManagedDecimal<Self::Api, NumDecimals>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let value = self.rescale_half_up(market_reference_value, RAY_PRECISION);
        let raw = value.into_raw_units() * &market_reference.price_in_usd;
        let scale = RAY_PRECISION + market_reference.usd_decimals + market_reference.decimals;

        self.rescale_half_up(&self.to_decimal(raw, scale), RAY_PRECISION)
    }

    /// Market reference value times the raw USD price over `10^usdDecimals`,
    /// still counted in market reference units.
    fn get_usd_value_in_reference_units(
        &self,
        market_reference_value: &ManagedDecimal<Self::Api, NumDecimals>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let value = self.rescale_half_up(market_reference_value, RAY_PRECISION);
        let raw = value.into_raw_units() * &market_reference.price_in_usd;
        let scale = RAY_PRECISION + market_reference.usd_decimals;

        self.rescale_half_up(&self.to_decimal(raw, scale), RAY_PRECISION)
    }

    /// `numerator / denominator` as a RAY fraction, zero when the denominator is.
    fn usage_ratio(
        &self,
        numerator: &BigUint<Self::Api>,
        denominator: &BigUint<Self::Api>,
    ) -> Ray<Self::Api> {
        if denominator == &BigUint::zero() {
            return Ray::zero();
        }

        Ray::from_raw_units(self.ray_div_amount(numerator, &Ray::from_raw_units(denominator.clone())))
    }

    fn format_bps(&self, value: u64, options: &FormatOptions) -> String {
        self.format_raw(&BigUint::from(value), BPS_PRECISION, options)
    }

    fn format_reserve(
        &self,
        reserve: &ReserveSnapshot<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
        current_timestamp: u64,
        options: &FormatOptions,
    ) -> FormattedReserve {
        let totals = self.calculate_reserve_debt(reserve, current_timestamp);
        self.format_reserve_with_totals(reserve, &totals, market_reference, options)
    }

    /// Formats a reserve from debt totals computed elsewhere, typically a
    /// `ReserveCache`.
    fn format_reserve_with_totals(
        &self,
        reserve: &ReserveSnapshot<Self::Api>,
        totals: &ReserveDebtTotals<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
        options: &FormatOptions,
    ) -> FormattedReserve {
        let underlying_asset = buffer_to_string(&reserve.underlying_asset);
        debug!(
            "formatting reserve {} at {} decimals",
            underlying_asset, reserve.decimals
        );

        let decimals = reserve.decimals;
        let price = &reserve.price_in_market_reference_currency;

        let borrow_usage_ratio = self.usage_ratio(&totals.total_debt, &totals.total_liquidity);
        let supply_usage_ratio = self.usage_ratio(
            &totals.total_debt,
            &(&totals.total_liquidity + &reserve.unbacked),
        );

        let supply_apy = self.calculate_compounded_rate(&reserve.liquidity_rate, SECONDS_PER_YEAR);
        let variable_borrow_apy =
            self.calculate_compounded_rate(&reserve.variable_borrow_rate, SECONDS_PER_YEAR);
        let stable_borrow_apy =
            self.calculate_compounded_rate(&reserve.stable_borrow_rate, SECONDS_PER_YEAR);

        let unit_price = self.to_decimal(price.clone(), 0).rescale(RAY_PRECISION);
        let price_in_usd = self.get_usd_value_normalized(&unit_price, market_reference);
        let total_liquidity_usd = self.get_usd_value_normalized(
            &self.get_market_reference_value(&totals.total_liquidity, price, decimals),
            market_reference,
        );
        let total_debt_usd = self.get_usd_value_normalized(
            &self.get_market_reference_value(&totals.total_debt, price, decimals),
            market_reference,
        );

        let bonus = reserve.reserve_liquidation_bonus.saturating_sub(BPS as u64);
        let e_mode_bonus = reserve.e_mode_liquidation_bonus.saturating_sub(BPS as u64);

        FormattedReserve {
            underlying_asset,
            symbol: buffer_to_string(&reserve.symbol),
            decimals,
            is_active: reserve.is_active,
            is_frozen: reserve.is_frozen,
            borrowing_enabled: reserve.borrowing_enabled,
            stable_borrow_rate_enabled: reserve.stable_borrow_rate_enabled,
            usage_as_collateral_enabled: reserve.usage_as_collateral_enabled,
            total_variable_debt: self.format_raw(&totals.total_variable_debt, decimals, options),
            total_stable_debt: self.format_raw(&totals.total_stable_debt, decimals, options),
            total_debt: self.format_raw(&totals.total_debt, decimals, options),
            total_liquidity: self.format_raw(&totals.total_liquidity, decimals, options),
            available_liquidity: self.format_raw(&reserve.available_liquidity, decimals, options),
            unbacked: self.format_raw(&reserve.unbacked, decimals, options),
            borrow_usage_ratio: self.format_ray(&borrow_usage_ratio, options),
            supply_usage_ratio: self.format_ray(&supply_usage_ratio, options),
            liquidity_index: self.format_ray(&reserve.liquidity_index, options),
            variable_borrow_index: self.format_ray(&reserve.variable_borrow_index, options),
            supply_apr: self.format_ray(&reserve.liquidity_rate, options),
            supply_apy: self.format_ray(&supply_apy, options),
            variable_borrow_apr: self.format_ray(&reserve.variable_borrow_rate, options),
            variable_borrow_apy: self.format_ray(&variable_borrow_apy, options),
            stable_borrow_apr: self.format_ray(&reserve.stable_borrow_rate, options),
            stable_borrow_apy: self.format_ray(&stable_borrow_apy, options),
            base_ltv_as_collateral: self.format_bps(reserve.base_ltv_as_collateral, options),
            reserve_liquidation_threshold: self
                .format_bps(reserve.reserve_liquidation_threshold, options),
            reserve_liquidation_bonus: self.format_bps(bonus, options),
            reserve_factor: self.format_bps(reserve.reserve_factor, options),
            supply_cap: self.format_raw(&reserve.supply_cap, 0, options),
            borrow_cap: self.format_raw(&reserve.borrow_cap, 0, options),
            debt_ceiling: self.format_raw(
                &reserve.debt_ceiling,
                reserve.debt_ceiling_decimals,
                options,
            ),
            isolation_mode_total_debt: self.format_raw(
                &reserve.isolation_mode_total_debt,
                reserve.debt_ceiling_decimals,
                options,
            ),
            price_in_market_reference_currency: self.format_raw(
                price,
                market_reference.decimals,
                options,
            ),
            price_in_usd: self.format_decimal(&price_in_usd, 0, options),
            total_liquidity_usd: self.format_decimal(&total_liquidity_usd, 0, options),
            total_debt_usd: self.format_decimal(&total_debt_usd, 0, options),
            e_mode_category_id: reserve.e_mode_category_id,
            e_mode_ltv: self.format_bps(reserve.e_mode_ltv, options),
            e_mode_liquidation_threshold: self
                .format_bps(reserve.e_mode_liquidation_threshold, options),
            e_mode_liquidation_bonus: self.format_bps(e_mode_bonus, options),
            e_mode_label: buffer_to_string(&reserve.e_mode_label),
        }
    }
}
