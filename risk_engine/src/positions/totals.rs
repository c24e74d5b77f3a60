use common_structs::{UserReserveSummary, UserReserveTotals};
use log::trace;

use crate::format::buffer_to_string;

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait ReserveTotalsModule: common_math::SharedMathModule {
    /// Folds per-reserve summaries into the user's totals.
    ///
    /// Only reserves that both the pool and the user flag as collateral count
    /// towards collateral and the weighted LTV and liquidation threshold.
    /// Reserves in the user's e-mode category weigh with their e-mode
    /// parameters. Supplying an asset with a debt ceiling as collateral puts
    /// the user in isolation mode.
    ///
    /// # Arguments
    /// - `summaries`: Accrued positions, see `generate_user_reserve_summaries`.
    /// - `user_e_mode_category_id`: The user's e-mode category, `0` for none.
    fn calculate_user_reserve_totals(
        &self,
        summaries: &[UserReserveSummary<Self::Api>],
        user_e_mode_category_id: u8,
    ) -> UserReserveTotals<Self::Api> {
        let mut total_liquidity = self.ray_zero();
        let mut total_collateral = self.ray_zero();
        let mut total_borrows = self.ray_zero();
        let mut weighted_ltv = self.ray_zero();
        let mut weighted_liquidation_threshold = self.ray_zero();
        let mut isolated_reserve = None;

        for summary in summaries {
            let reserve = &summary.position.reserve;

            total_liquidity =
                self.add_exact(&total_liquidity, &summary.underlying_balance_market_reference);
            total_borrows =
                self.add_exact(&total_borrows, &summary.total_borrows_market_reference);

            if !summary.position.is_collateral() {
                continue;
            }

            let collateral = &summary.underlying_balance_market_reference;
            let ltv_bps = reserve.ltv_for(user_e_mode_category_id);
            let threshold_bps = reserve.liquidation_threshold_for(user_e_mode_category_id);

            total_collateral = self.add_exact(&total_collateral, collateral);
            weighted_ltv =
                self.add_exact(&weighted_ltv, &self.weigh_by_bps(collateral, ltv_bps));
            weighted_liquidation_threshold = self.add_exact(
                &weighted_liquidation_threshold,
                &self.weigh_by_bps(collateral, threshold_bps),
            );

            if reserve.is_isolated() && !self.is_zero_decimal(collateral) {
                isolated_reserve = Some(reserve.clone());
            }

            trace!(
                "collateral {} ltv {} threshold {} bps",
                buffer_to_string(&reserve.underlying_asset),
                ltv_bps,
                threshold_bps
            );
        }

        UserReserveTotals {
            total_liquidity_market_reference: total_liquidity,
            total_collateral_market_reference: total_collateral,
            total_borrows_market_reference: total_borrows,
            weighted_ltv_market_reference: weighted_ltv,
            weighted_liquidation_threshold_market_reference: weighted_liquidation_threshold,
            is_in_isolation_mode: isolated_reserve.is_some(),
            isolated_reserve,
        }
    }

    /// `value * bps` at the scale of `value`, exact.
    fn weigh_by_bps(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        bps: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value.into_raw_units() * &BigUint::from(bps), value.scale())
    }
}
