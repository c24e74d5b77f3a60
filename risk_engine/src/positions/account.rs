use common_constants::{BPS_PRECISION, RAY_PRECISION, SECONDS_PER_YEAR, WAD_PRECISION};
use common_structs::{
    HealthFactor, MarketReferenceCurrency, ReserveSnapshot, UserAggregateSummary,
    UserReservePosition, UserReserveSummary,
};
use log::debug;

use crate::{
    config::FormatOptions,
    format::{buffer_to_string, FormatModule},
    positions::{
        summary::ReserveSummaryModule, totals::ReserveTotalsModule, FormattedUserReserve,
        FormattedUserSummary,
    },
    reserves::ReserveModule,
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait AccountModule:
    common_rates::InterestRates
    + common_math::SharedMathModule
    + crate::format::FormatModule
    + crate::reserves::ReserveModule
    + crate::positions::summary::ReserveSummaryModule
    + crate::positions::totals::ReserveTotalsModule
{
    /// Health factor from market reference balances and a liquidation
    /// threshold in basis points.
    ///
    /// **Formula**:
    /// - `healthFactor = collateral * threshold / borrows`
    ///
    /// # Returns
    /// - `HealthFactor::NoDebt` when `borrows` is zero, otherwise a WAD ratio.
    fn calculate_health_factor_from_balances(
        &self,
        collateral: &ManagedDecimal<Self::Api, NumDecimals>,
        borrows: &ManagedDecimal<Self::Api, NumDecimals>,
        liquidation_threshold_bps: u64,
    ) -> HealthFactor<Self::Api> {
        let threshold =
            self.to_decimal(BigUint::from(liquidation_threshold_bps), BPS_PRECISION);
        self.calculate_health_factor_from_balances_big_units(collateral, borrows, &threshold)
    }

    /// Same as `calculate_health_factor_from_balances` with the threshold
    /// already a fraction, `0.8` for 80%.
    fn calculate_health_factor_from_balances_big_units(
        &self,
        collateral: &ManagedDecimal<Self::Api, NumDecimals>,
        borrows: &ManagedDecimal<Self::Api, NumDecimals>,
        liquidation_threshold: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> HealthFactor<Self::Api> {
        if self.is_zero_decimal(borrows) {
            return HealthFactor::NoDebt;
        }

        let weighted_collateral = self.mul_half_up(collateral, liquidation_threshold, RAY_PRECISION);
        let ratio = self.div_half_up(&weighted_collateral, borrows, RAY_PRECISION);

        HealthFactor::Ratio(self.rescale_half_up(&ratio, WAD_PRECISION))
    }

    /// `max(0, collateral * ltv - borrows)` in market reference units.
    fn calculate_available_borrows(
        &self,
        total_collateral: &ManagedDecimal<Self::Api, NumDecimals>,
        total_borrows: &ManagedDecimal<Self::Api, NumDecimals>,
        current_ltv: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let borrowing_power = self.mul_half_up(total_collateral, current_ltv, RAY_PRECISION);
        self.sub_floor_zero(&borrowing_power, total_borrows)
    }

    /// Debt an isolated reserve still accepts, converted from the debt
    /// ceiling's USD units into the smallest market reference unit.
    ///
    /// **Formula**:
    /// - `headroom = max(0, debtCeiling - isolationModeTotalDebt)`
    /// - `value = headroom / 10^ceilingDecimals * 10^marketRefDecimals / priceInUsdNormalized`
    fn calculate_isolation_headroom(
        &self,
        reserve: &ReserveSnapshot<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if reserve.isolation_mode_total_debt >= reserve.debt_ceiling {
            return self.ray_zero();
        }

        let headroom = &reserve.debt_ceiling - &reserve.isolation_mode_total_debt;
        let widened = headroom * self.ten_pow(market_reference.decimals + market_reference.usd_decimals);
        let headroom_units = self.to_decimal(widened, reserve.debt_ceiling_decimals);
        let price = self.to_decimal(market_reference.price_in_usd.clone(), 0);

        self.div_half_up(&headroom_units, &price, RAY_PRECISION)
    }

    /// Aggregates accrued positions into the user's account summary.
    ///
    /// **Formula**:
    /// - `currentLtv = weightedLtv / totalCollateral` in whole basis points,
    ///   truncated, zero without collateral
    /// - `currentLiquidationThreshold = weightedThreshold / totalCollateral`, likewise
    /// - `availableBorrows = max(0, totalCollateral * currentLtv - totalBorrows)`,
    ///   capped by the isolated reserve's debt ceiling headroom
    /// - `healthFactor = totalCollateral * currentLiquidationThreshold / totalBorrows`
    fn generate_raw_user_summary(
        &self,
        summaries: &[UserReserveSummary<Self::Api>],
        market_reference: &MarketReferenceCurrency<Self::Api>,
        user_e_mode_category_id: u8,
    ) -> UserAggregateSummary<Self::Api> {
        let totals = self.calculate_user_reserve_totals(summaries, user_e_mode_category_id);
        let total_collateral = &totals.total_collateral_market_reference;
        let total_borrows = &totals.total_borrows_market_reference;

        let current_ltv =
            self.average_bps(&totals.weighted_ltv_market_reference, total_collateral);
        let current_liquidation_threshold = self.average_bps(
            &totals.weighted_liquidation_threshold_market_reference,
            total_collateral,
        );

        let mut available_borrows =
            self.calculate_available_borrows(total_collateral, total_borrows, &current_ltv);
        if let Some(isolated) = &totals.isolated_reserve {
            let headroom = self.calculate_isolation_headroom(isolated, market_reference);
            available_borrows = self.get_min(available_borrows, headroom);
        }

        let health_factor = self.calculate_health_factor_from_balances_big_units(
            total_collateral,
            total_borrows,
            &current_liquidation_threshold,
        );

        UserAggregateSummary {
            total_liquidity_market_reference: totals.total_liquidity_market_reference.clone(),
            total_collateral_market_reference: total_collateral.clone(),
            total_borrows_market_reference: total_borrows.clone(),
            available_borrows_market_reference: available_borrows,
            current_ltv,
            current_liquidation_threshold,
            health_factor,
            is_in_isolation_mode: totals.is_in_isolation_mode,
            isolated_reserve: totals.isolated_reserve.clone(),
        }
    }

    /// `weighted / total` truncated to whole basis points, as the pool
    /// computes its average LTV and liquidation threshold.
    fn average_bps(
        &self,
        weighted: &ManagedDecimal<Self::Api, NumDecimals>,
        total: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if self.is_zero_decimal(total) {
            return self.to_decimal(BigUint::zero(), BPS_PRECISION);
        }

        let weighted = weighted.rescale(RAY_PRECISION);
        let total = total.rescale(RAY_PRECISION);
        let bps = weighted.into_raw_units() / total.into_raw_units();

        self.to_decimal(bps, BPS_PRECISION)
    }

    fn format_user_reserve(
        &self,
        summary: &UserReserveSummary<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
        options: &FormatOptions,
    ) -> FormattedUserReserve {
        let reserve = &summary.position.reserve;
        let decimals = reserve.decimals;
        let reference_decimals = market_reference.decimals;
        let stable_borrow_apy =
            self.calculate_compounded_rate(&summary.position.stable_borrow_rate, SECONDS_PER_YEAR);

        FormattedUserReserve {
            underlying_asset: buffer_to_string(&reserve.underlying_asset),
            symbol: buffer_to_string(&reserve.symbol),
            usage_as_collateral_enabled_on_user: summary
                .position
                .usage_as_collateral_enabled_on_user,
            underlying_balance: self.format_raw(&summary.underlying_balance, decimals, options),
            underlying_balance_market_reference: self.format_decimal(
                &summary.underlying_balance_market_reference,
                reference_decimals,
                options,
            ),
            underlying_balance_usd: self.format_decimal(&summary.underlying_balance_usd, 0, options),
            variable_borrows: self.format_raw(&summary.variable_borrows, decimals, options),
            variable_borrows_market_reference: self.format_decimal(
                &summary.variable_borrows_market_reference,
                reference_decimals,
                options,
            ),
            variable_borrows_usd: self.format_decimal(&summary.variable_borrows_usd, 0, options),
            stable_borrows: self.format_raw(&summary.stable_borrows, decimals, options),
            stable_borrows_market_reference: self.format_decimal(
                &summary.stable_borrows_market_reference,
                reference_decimals,
                options,
            ),
            stable_borrows_usd: self.format_decimal(&summary.stable_borrows_usd, 0, options),
            total_borrows: self.format_raw(&summary.total_borrows, decimals, options),
            total_borrows_market_reference: self.format_decimal(
                &summary.total_borrows_market_reference,
                reference_decimals,
                options,
            ),
            total_borrows_usd: self.format_decimal(&summary.total_borrows_usd, 0, options),
            stable_borrow_apr: self.format_ray(&summary.position.stable_borrow_rate, options),
            stable_borrow_apy: self.format_ray(&stable_borrow_apy, options),
        }
    }

    /// Accrues, aggregates and formats every position of a user.
    fn format_user_summary(
        &self,
        positions: &[UserReservePosition<Self::Api>],
        market_reference: &MarketReferenceCurrency<Self::Api>,
        user_e_mode_category_id: u8,
        current_timestamp: u64,
        options: &FormatOptions,
    ) -> FormattedUserSummary {
        debug!(
            "formatting user summary: {} positions, e-mode {}, at {}",
            positions.len(),
            user_e_mode_category_id,
            current_timestamp
        );

        let summaries =
            self.generate_user_reserve_summaries(positions, market_reference, current_timestamp);
        let aggregate =
            self.generate_raw_user_summary(&summaries, market_reference, user_e_mode_category_id);

        let reference_decimals = market_reference.decimals;
        let total_liquidity_usd = self
            .get_usd_value_normalized(&aggregate.total_liquidity_market_reference, market_reference);
        let total_collateral_usd = self.get_usd_value_normalized(
            &aggregate.total_collateral_market_reference,
            market_reference,
        );
        let total_borrows_usd = self
            .get_usd_value_normalized(&aggregate.total_borrows_market_reference, market_reference);
        let available_borrows_usd = self.get_usd_value_normalized(
            &aggregate.available_borrows_market_reference,
            market_reference,
        );

        FormattedUserSummary {
            user_reserves: summaries
                .iter()
                .map(|summary| self.format_user_reserve(summary, market_reference, options))
                .collect(),
            user_e_mode_category_id,
            total_liquidity_market_reference: self.format_decimal(
                &aggregate.total_liquidity_market_reference,
                reference_decimals,
                options,
            ),
            total_liquidity_usd: self.format_decimal(&total_liquidity_usd, 0, options),
            total_collateral_market_reference: self.format_decimal(
                &aggregate.total_collateral_market_reference,
                reference_decimals,
                options,
            ),
            total_collateral_usd: self.format_decimal(&total_collateral_usd, 0, options),
            total_borrows_market_reference: self.format_decimal(
                &aggregate.total_borrows_market_reference,
                reference_decimals,
                options,
            ),
            total_borrows_usd: self.format_decimal(&total_borrows_usd, 0, options),
            net_worth_usd: self.format_signed_difference(
                &total_liquidity_usd,
                &total_borrows_usd,
                0,
                options,
            ),
            available_borrows_market_reference: self.format_decimal(
                &aggregate.available_borrows_market_reference,
                reference_decimals,
                options,
            ),
            available_borrows_usd: self.format_decimal(&available_borrows_usd, 0, options),
            current_loan_to_value: self.format_decimal(&aggregate.current_ltv, 0, options),
            current_liquidation_threshold: self.format_decimal(
                &aggregate.current_liquidation_threshold,
                0,
                options,
            ),
            health_factor: self.format_health_factor(&aggregate.health_factor, options),
            is_in_isolation_mode: aggregate.is_in_isolation_mode,
            isolated_reserve_asset: aggregate
                .isolated_reserve
                .as_ref()
                .map(|reserve| buffer_to_string(&reserve.underlying_asset)),
        }
    }
}
