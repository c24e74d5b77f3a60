use common_structs::{MarketReferenceCurrency, UserReservePosition, UserReserveSummary};
use log::{debug, trace};

use crate::{
    format::{buffer_to_string, FormatModule},
    reserves::ReserveModule,
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait ReserveSummaryModule:
    common_rates::InterestRates
    + common_math::SharedMathModule
    + crate::format::FormatModule
    + crate::reserves::ReserveModule
{
    /// Accrues one position to `current_timestamp` and prices every balance.
    ///
    /// **Formula**:
    /// - `underlyingBalance = rayToWad(rayMul(wadToRay(scaledATokenBalance), normalizedIncome))`
    /// - `variableBorrows = rayToWad(rayMul(wadToRay(scaledVariableDebt), normalizedVariableDebt))`
    /// - `stableBorrows` compounds on the user's own stable rate since the
    ///   user's last stable update.
    ///
    /// # Arguments
    /// - `position`: Scaled balances of the user with the reserve snapshot.
    /// - `market_reference`: Currency reserve prices are quoted in.
    /// - `current_timestamp`: Timestamp to accrue to, seconds.
    ///
    /// # Returns
    /// - `UserReserveSummary`: token amounts, market reference values and USD values.
    fn generate_user_reserve_summary(
        &self,
        position: &UserReservePosition<Self::Api>,
        market_reference: &MarketReferenceCurrency<Self::Api>,
        current_timestamp: u64,
    ) -> UserReserveSummary<Self::Api> {
        let reserve = &position.reserve;

        let underlying_balance = self.get_linear_balance(
            &position.scaled_a_token_balance,
            &reserve.liquidity_index,
            &reserve.liquidity_rate,
            reserve.last_update_timestamp,
            current_timestamp,
        );
        let variable_borrows = self.get_compounded_balance(
            &position.scaled_variable_debt,
            &reserve.variable_borrow_index,
            &reserve.variable_borrow_rate,
            reserve.last_update_timestamp,
            current_timestamp,
        );
        let stable_borrows = self.get_compounded_stable_balance(
            &position.principal_stable_debt,
            &position.stable_borrow_rate,
            position.stable_borrow_last_update_timestamp,
            current_timestamp,
        );
        let total_borrows = &variable_borrows + &stable_borrows;

        let price = &reserve.price_in_market_reference_currency;
        let underlying_balance_market_reference =
            self.get_market_reference_value(&underlying_balance, price, reserve.decimals);
        let variable_borrows_market_reference =
            self.get_market_reference_value(&variable_borrows, price, reserve.decimals);
        let stable_borrows_market_reference =
            self.get_market_reference_value(&stable_borrows, price, reserve.decimals);
        let total_borrows_market_reference = self.add_exact(
            &variable_borrows_market_reference,
            &stable_borrows_market_reference,
        );

        trace!(
            "position {} accrued to {}: supplied {}, borrowed {}",
            buffer_to_string(&reserve.underlying_asset),
            current_timestamp,
            self.biguint_to_string(&underlying_balance),
            self.biguint_to_string(&total_borrows)
        );

        UserReserveSummary {
            position: position.clone(),
            underlying_balance_usd: self
                .get_usd_value_normalized(&underlying_balance_market_reference, market_reference),
            variable_borrows_usd: self
                .get_usd_value_normalized(&variable_borrows_market_reference, market_reference),
            stable_borrows_usd: self
                .get_usd_value_normalized(&stable_borrows_market_reference, market_reference),
            total_borrows_usd: self
                .get_usd_value_normalized(&total_borrows_market_reference, market_reference),
            underlying_balance,
            underlying_balance_market_reference,
            variable_borrows,
            variable_borrows_market_reference,
            stable_borrows,
            stable_borrows_market_reference,
            total_borrows,
            total_borrows_market_reference,
        }
    }

    fn generate_user_reserve_summaries(
        &self,
        positions: &[UserReservePosition<Self::Api>],
        market_reference: &MarketReferenceCurrency<Self::Api>,
        current_timestamp: u64,
    ) -> Vec<UserReserveSummary<Self::Api>> {
        debug!(
            "summarizing {} positions at {}",
            positions.len(),
            current_timestamp
        );

        positions
            .iter()
            .map(|position| {
                self.generate_user_reserve_summary(position, market_reference, current_timestamp)
            })
            .collect()
    }
}
