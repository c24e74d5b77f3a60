use common_constants::{RAY_PRECISION, SECONDS_PER_YEAR};
use common_errors::ERROR_RESERVE_MISMATCH;
use common_structs::{
    IncentiveApr, IncentiveSide, IncentiveStream, MarketReferenceCurrency, ReserveDebtTotals,
    ReserveIncentiveAprs, ReserveIncentives, ReserveSnapshot,
};
use log::debug;

use crate::{
    config::FormatOptions,
    format::{buffer_to_string, FormatModule},
    incentives::{FormattedIncentiveApr, FormattedReserveIncentives},
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait IncentiveAprModule: common_math::SharedMathModule + crate::format::FormatModule {
    /// Yearly reward value over the value of the incentivized token supply.
    ///
    /// **Formula**:
    /// - `apr = (emission / 10^rewardDecimals * rewardPrice * SECONDS_PER_YEAR)
    ///   / (totalSupply / 10^assetDecimals * assetPrice)`
    ///
    /// Reward and asset prices must be quoted in the same currency.
    ///
    /// # Returns
    /// - RAY fraction, rounded half up; zero when nothing is emitted, the
    ///   emission ended or the supply is empty.
    fn calculate_incentive_apr(
        &self,
        stream: &IncentiveStream<Self::Api>,
        total_token_supply: &BigUint<Self::Api>,
        asset_decimals: usize,
        asset_price: &BigUint<Self::Api>,
        asset_price_decimals: usize,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if !stream.is_emitting()
            || total_token_supply == &BigUint::zero()
            || asset_price == &BigUint::zero()
        {
            return self.ray_zero();
        }

        let numerator = &stream.emission_per_second
            * &stream.reward_price_feed
            * BigUint::from(SECONDS_PER_YEAR)
            * self.ten_pow(RAY_PRECISION + asset_decimals + asset_price_decimals);
        let denominator = total_token_supply
            * asset_price
            * self.ten_pow(stream.reward_token_decimals + stream.price_feed_decimals);
        let half_denominator = &denominator / 2u64;

        self.to_decimal((numerator + half_denominator) / denominator, RAY_PRECISION)
    }

    fn calculate_side_aprs(
        &self,
        side: &IncentiveSide<Self::Api>,
        total_token_supply: &BigUint<Self::Api>,
        reserve: &ReserveSnapshot<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
    ) -> Vec<IncentiveApr<Self::Api>> {
        side.rewards
            .iter()
            .map(|stream| IncentiveApr {
                reward_token_address: stream.reward_token_address.clone(),
                reward_token_symbol: stream.reward_token_symbol.clone(),
                apr: self.calculate_incentive_apr(
                    stream,
                    total_token_supply,
                    reserve.decimals,
                    &reserve.price_in_market_reference_currency,
                    market_reference.decimals,
                ),
            })
            .collect()
    }

    /// APR of every reward stream of a reserve, per side.
    ///
    /// Supply rewards are spread over the total liquidity, debt rewards over
    /// the matching total debt, all accrued to the same timestamp as `totals`.
    fn calculate_reserve_incentives(
        &self,
        incentives: &ReserveIncentives<Self::Api>,
        reserve: &ReserveSnapshot<Self::Api>,
        totals: &ReserveDebtTotals<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
    ) -> ReserveIncentiveAprs<Self::Api> {
        require!(
            incentives.underlying_asset == reserve.underlying_asset,
            ERROR_RESERVE_MISMATCH
        );
        debug!(
            "incentive aprs for {}",
            buffer_to_string(&reserve.underlying_asset)
        );

        ReserveIncentiveAprs {
            underlying_asset: reserve.underlying_asset.clone(),
            supply: self.calculate_side_aprs(
                &incentives.supply,
                &totals.total_liquidity,
                reserve,
                market_reference,
            ),
            variable_debt: self.calculate_side_aprs(
                &incentives.variable_debt,
                &totals.total_variable_debt,
                reserve,
                market_reference,
            ),
            stable_debt: self.calculate_side_aprs(
                &incentives.stable_debt,
                &totals.total_stable_debt,
                reserve,
                market_reference,
            ),
        }
    }

    fn format_incentive_aprs(
        &self,
        aprs: &[IncentiveApr<Self::Api>],
        options: &FormatOptions,
    ) -> Vec<FormattedIncentiveApr> {
        aprs.iter()
            .map(|apr| FormattedIncentiveApr {
                reward_token_address: buffer_to_string(&apr.reward_token_address),
                reward_token_symbol: buffer_to_string(&apr.reward_token_symbol),
                incentive_apr: self.format_decimal(&apr.apr, 0, options),
            })
            .collect()
    }

    fn format_reserve_incentives(
        &self,
        aprs: &ReserveIncentiveAprs<Self::Api>,
        options: &FormatOptions,
    ) -> FormattedReserveIncentives {
        FormattedReserveIncentives {
            underlying_asset: buffer_to_string(&aprs.underlying_asset),
            supply_incentives: self.format_incentive_aprs(&aprs.supply, options),
            variable_debt_incentives: self.format_incentive_aprs(&aprs.variable_debt, options),
            stable_debt_incentives: self.format_incentive_aprs(&aprs.stable_debt, options),
        }
    }
}
