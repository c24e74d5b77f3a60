use common_errors::ERROR_USER_INDEX_AHEAD_OF_RESERVE;
use common_structs::{IncentiveSideKind, IncentiveStream, ReserveSnapshot, UserReservePosition};

use crate::reserves::ReserveModule;

multiversx_sc::imports!();

/// Rebuilds reward indexes the way the incentives controller updates them,
/// so rewards accrued since the last on-chain update can be shown.
#[multiversx_sc::module]
pub trait IncentiveAccrualModule:
    common_rates::InterestRates
    + common_math::SharedMathModule
    + crate::format::FormatModule
    + crate::reserves::ReserveModule
{
    /// Reward index of a stream at `current_timestamp`.
    ///
    /// **Formula**:
    /// - `index + emission * (min(now, emissionEnd) - lastUpdate) * 10^precision / totalSupply`
    ///
    /// The index does not move when the snapshot is already current, the
    /// emission has ended before the last update or nothing is supplied.
    /// Division truncates like the controller.
    fn calculate_current_index(
        &self,
        stream: &IncentiveStream<Self::Api>,
        total_supply: &BigUint<Self::Api>,
        current_timestamp: u64,
    ) -> BigUint<Self::Api> {
        let last_update = stream.incentives_last_update_timestamp;
        if total_supply == &BigUint::zero()
            || stream.emission_per_second == BigUint::zero()
            || last_update >= current_timestamp
            || last_update >= stream.emission_end_timestamp
        {
            return stream.token_incentives_index.clone();
        }

        let until = core::cmp::min(current_timestamp, stream.emission_end_timestamp);
        let time_delta = BigUint::from(until - last_update);
        let index_increase = &stream.emission_per_second
            * &time_delta
            * self.ten_pow(stream.precision)
            / total_supply;

        &stream.token_incentives_index + &index_increase
    }

    /// `principal * (reserveIndex - userIndex) / 10^precision`, kept exact as a
    /// decimal with `precision` fractional digits of the smallest reward unit.
    fn calculate_accrued_incentives(
        &self,
        principal: &BigUint<Self::Api>,
        reserve_index: &BigUint<Self::Api>,
        user_index: &BigUint<Self::Api>,
        precision: usize,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        require!(reserve_index >= user_index, ERROR_USER_INDEX_AHEAD_OF_RESERVE);

        let index_delta = reserve_index - user_index;
        self.to_decimal(principal * &index_delta, precision)
    }

    /// Token supply the controller divides emissions by on each side: scaled
    /// supply and scaled variable debt, principal stable debt.
    ///
    /// Scaled supply is the total liquidity at the snapshot's own timestamp
    /// divided by the liquidity index.
    fn calculate_incentive_total_supply(
        &self,
        reserve: &ReserveSnapshot<Self::Api>,
        kind: IncentiveSideKind,
    ) -> BigUint<Self::Api> {
        match kind {
            IncentiveSideKind::Supply => {
                let totals =
                    self.calculate_reserve_debt(reserve, reserve.last_update_timestamp);
                self.ray_div_amount(&totals.total_liquidity, &reserve.liquidity_index)
            },
            IncentiveSideKind::VariableDebt => reserve.total_scaled_variable_debt.clone(),
            IncentiveSideKind::StableDebt => reserve.total_principal_stable_debt.clone(),
        }
    }

    /// The balance rewards accrue on for one side of a position.
    fn incentive_principal(
        &self,
        position: Option<&UserReservePosition<Self::Api>>,
        kind: IncentiveSideKind,
    ) -> BigUint<Self::Api> {
        match position {
            None => BigUint::zero(),
            Some(position) => match kind {
                IncentiveSideKind::Supply => position.scaled_a_token_balance.clone(),
                IncentiveSideKind::VariableDebt => position.scaled_variable_debt.clone(),
                IncentiveSideKind::StableDebt => position.principal_stable_debt.clone(),
            },
        }
    }
}
