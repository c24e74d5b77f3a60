#![no_std]
use common_constants::SECONDS_PER_YEAR;
use common_errors::ERROR_NEGATIVE_ELAPSED_TIME;
use common_math::{Ray, Wad};

multiversx_sc::imports!();

/// The InterestRates module reconstructs interest accrued by a reserve
/// between its last on-chain update and a later timestamp.
///
/// **Scope**: Liquidity index growth (linear), variable and stable debt growth
/// (compounded), and the balances derived from scaled amounts.
///
/// **Goal**: Reproduce, digit for digit, what the pool stores when it touches
/// the reserve at the same timestamp.
#[multiversx_sc::module]
pub trait InterestRates: common_math::SharedMathModule {
    /// Seconds between the last update and `current_timestamp`.
    ///
    /// Fails with `ERROR_NEGATIVE_ELAPSED_TIME` when the snapshot is newer than
    /// the requested timestamp.
    fn elapsed_seconds(&self, last_update_timestamp: u64, current_timestamp: u64) -> u64 {
        require!(
            current_timestamp >= last_update_timestamp,
            ERROR_NEGATIVE_ELAPSED_TIME
        );

        current_timestamp - last_update_timestamp
    }

    /// Yearly RAY rate into a per-second RAY rate, truncating.
    fn rate_per_second(&self, yearly_rate: &Ray<Self::Api>) -> Ray<Self::Api> {
        yearly_rate.clone() / SECONDS_PER_YEAR
    }

    /// Calculates the interest factor accrued by suppliers with simple interest.
    ///
    /// **Formula**:
    /// - `factor = RAY + rayMul(rate, rayDiv(wadToRay(elapsed), wadToRay(SECONDS_PER_YEAR)))`
    ///
    /// # Arguments
    /// - `rate`: Yearly liquidity rate, RAY.
    /// - `last_update_timestamp`: Timestamp of the snapshot, seconds.
    /// - `current_timestamp`: Timestamp to accrue to, seconds.
    ///
    /// # Returns
    /// - `Ray<Self::Api>`: The accumulation factor, `RAY` when no time passed.
    fn calculate_linear_interest(
        &self,
        rate: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> Ray<Self::Api> {
        let elapsed = self.elapsed_seconds(last_update_timestamp, current_timestamp);

        let elapsed_ray = self.wad_to_ray(&Wad::from_raw_units(BigUint::from(elapsed)));
        let year_ray = self.wad_to_ray(&Wad::from_raw_units(BigUint::from(SECONDS_PER_YEAR)));
        let year_fraction = self.ray_div(&elapsed_ray, &year_ray);

        self.ray_mul(rate, &year_fraction) + Ray::one()
    }

    /// Calculates the interest factor accrued by borrowers.
    ///
    /// **Formula**:
    /// - `x = rate / SECONDS_PER_YEAR` (truncated), `n = elapsed`
    /// - `factor = 1 + n*x + n*(n-1)/2*x^2 + n*(n-1)*(n-2)/6*x^3`
    ///
    /// # Arguments
    /// - `rate`: Yearly borrow rate, RAY.
    /// - `last_update_timestamp`: Timestamp the debt was last compounded at.
    /// - `current_timestamp`: Timestamp to accrue to.
    ///
    /// # Returns
    /// - `Ray<Self::Api>`: The accumulation factor, `RAY` when no time passed.
    fn calculate_compounded_interest(
        &self,
        rate: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> Ray<Self::Api> {
        let elapsed = self.elapsed_seconds(last_update_timestamp, current_timestamp);
        let rate_per_second = self.rate_per_second(rate);

        self.binomial_approximated_ray_pow(&rate_per_second, elapsed)
    }

    /// Liquidity index as the pool would store it at `current_timestamp`.
    ///
    /// A zero liquidity rate leaves the index untouched.
    fn get_reserve_normalized_income(
        &self,
        rate: &Ray<Self::Api>,
        index: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> Ray<Self::Api> {
        if rate.is_zero() {
            return index.clone();
        }

        let cumulated = self.calculate_linear_interest(rate, last_update_timestamp, current_timestamp);
        self.ray_mul(&cumulated, index)
    }

    /// Variable borrow index as the pool would store it at `current_timestamp`.
    fn get_reserve_normalized_variable_debt(
        &self,
        rate: &Ray<Self::Api>,
        index: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> Ray<Self::Api> {
        let cumulated =
            self.calculate_compounded_interest(rate, last_update_timestamp, current_timestamp);
        self.ray_mul(&cumulated, index)
    }

    /// Underlying balance of a scaled supply position.
    ///
    /// **Formula**:
    /// - `balance = rayToWad(rayMul(wadToRay(scaled), normalizedIncome))`
    fn get_linear_balance(
        &self,
        scaled_balance: &BigUint<Self::Api>,
        index: &Ray<Self::Api>,
        rate: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> BigUint<Self::Api> {
        if scaled_balance == &BigUint::zero() {
            return BigUint::zero();
        }

        let income =
            self.get_reserve_normalized_income(rate, index, last_update_timestamp, current_timestamp);
        self.scale_balance(scaled_balance, &income)
    }

    /// Current debt of a scaled variable position.
    ///
    /// **Formula**:
    /// - `debt = rayToWad(rayMul(wadToRay(principal), rayMul(compounded, index)))`
    fn get_compounded_balance(
        &self,
        principal: &BigUint<Self::Api>,
        index: &Ray<Self::Api>,
        rate: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> BigUint<Self::Api> {
        if principal == &BigUint::zero() {
            return BigUint::zero();
        }

        let normalized_debt = self.get_reserve_normalized_variable_debt(
            rate,
            index,
            last_update_timestamp,
            current_timestamp,
        );
        self.scale_balance(principal, &normalized_debt)
    }

    /// Current debt of a stable position, compounded on the user's own rate.
    fn get_compounded_stable_balance(
        &self,
        principal: &BigUint<Self::Api>,
        user_stable_rate: &Ray<Self::Api>,
        last_update_timestamp: u64,
        current_timestamp: u64,
    ) -> BigUint<Self::Api> {
        if principal == &BigUint::zero() {
            return BigUint::zero();
        }

        let cumulated = self.calculate_compounded_interest(
            user_stable_rate,
            last_update_timestamp,
            current_timestamp,
        );
        self.scale_balance(principal, &cumulated)
    }

    /// `rayToWad(rayMul(wadToRay(amount), factor))`, the round trip balances
    /// take through RAY space.
    fn scale_balance(
        &self,
        amount: &BigUint<Self::Api>,
        factor: &Ray<Self::Api>,
    ) -> BigUint<Self::Api> {
        let amount_ray = self.wad_to_ray(&Wad::from_raw_units(amount.clone()));
        self.ray_to_wad(&self.ray_mul(&amount_ray, factor)).into_raw()
    }

    /// Exact compounding of a yearly rate over `duration` seconds, minus one.
    ///
    /// Display only; use `calculate_compounded_interest` for balances.
    fn calculate_compounded_rate(&self, rate: &Ray<Self::Api>, duration: u64) -> Ray<Self::Api> {
        let base = self.rate_per_second(rate) + Ray::one();
        self.ray_pow(&base, duration) - Ray::one()
    }
}
