#![no_std]

use core::cmp::Ordering;

use common_constants::{
    HALF_RAY, HALF_WAD, HALF_WAD_RAY_RATIO, PARSE_CHUNK_BASE, PARSE_CHUNK_DIGITS, RAY,
    RAY_PRECISION, WAD, WAD_RAY_RATIO,
};
use common_errors::{
    ERROR_DIVISION_BY_ZERO, ERROR_EMPTY_NUMBER, ERROR_MALFORMED_NUMBER, ERROR_NEGATIVE_VALUE,
};

pub mod fixed;

pub use fixed::{Fixed, FixedScale, Ray, RayScale, Wad, WadScale};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait SharedMathModule {
    /// Multiplies two RAY values, rounding half up: `(a * b + RAY / 2) / RAY`.
    fn ray_mul(&self, a: &Ray<Self::Api>, b: &Ray<Self::Api>) -> Ray<Self::Api> {
        Ray::from_raw_units(self.ray_mul_amount(a.into_raw_units(), b))
    }

    /// `rayMul` where the left operand keeps its own scale, e.g. a scaled
    /// token balance multiplied by a RAY index stays in token units.
    fn ray_mul_amount(
        &self,
        amount: &BigUint<Self::Api>,
        factor: &Ray<Self::Api>,
    ) -> BigUint<Self::Api> {
        let product = amount * factor.into_raw_units();
        (product + BigUint::from(HALF_RAY)) / BigUint::from(RAY)
    }

    /// Divides two RAY values, rounding half up: `(a * RAY + b / 2) / b`.
    fn ray_div(&self, a: &Ray<Self::Api>, b: &Ray<Self::Api>) -> Ray<Self::Api> {
        Ray::from_raw_units(self.ray_div_amount(a.into_raw_units(), b))
    }

    /// `rayDiv` where the numerator keeps its own scale.
    fn ray_div_amount(
        &self,
        amount: &BigUint<Self::Api>,
        divisor: &Ray<Self::Api>,
    ) -> BigUint<Self::Api> {
        require!(!divisor.is_zero(), ERROR_DIVISION_BY_ZERO);

        let divisor_raw = divisor.into_raw_units();
        let half_divisor = divisor_raw / &BigUint::from(2u64);
        (amount * &BigUint::from(RAY) + half_divisor) / divisor_raw
    }

    fn wad_mul(&self, a: &Wad<Self::Api>, b: &Wad<Self::Api>) -> Wad<Self::Api> {
        let product = a.into_raw_units() * b.into_raw_units();
        Wad::from_raw_units((product + BigUint::from(HALF_WAD)) / BigUint::from(WAD))
    }

    fn wad_div(&self, a: &Wad<Self::Api>, b: &Wad<Self::Api>) -> Wad<Self::Api> {
        require!(!b.is_zero(), ERROR_DIVISION_BY_ZERO);

        let divisor = b.into_raw_units();
        let half_divisor = divisor / &BigUint::from(2u64);
        Wad::from_raw_units((a.into_raw_units() * &BigUint::from(WAD) + half_divisor) / divisor)
    }

    /// Exact, widening by `10^9`.
    fn wad_to_ray(&self, value: &Wad<Self::Api>) -> Ray<Self::Api> {
        Ray::from_raw_units(value.into_raw_units() * &BigUint::from(WAD_RAY_RATIO))
    }

    /// Narrows by `10^9`, rounding half up.
    fn ray_to_wad(&self, value: &Ray<Self::Api>) -> Wad<Self::Api> {
        let half_ratio = BigUint::from(HALF_WAD_RAY_RATIO);
        Wad::from_raw_units(
            (value.into_raw_units() + &half_ratio) / BigUint::from(WAD_RAY_RATIO),
        )
    }

    /// Exact exponentiation by squaring, each step rounded through `ray_mul`.
    ///
    /// Only used for displayed yields; balances compound with
    /// `binomial_approximated_ray_pow` to match what the pool stores.
    fn ray_pow(&self, base: &Ray<Self::Api>, exponent: u64) -> Ray<Self::Api> {
        let mut x = base.clone();
        let mut n = exponent;
        let mut z = if n % 2 != 0 { x.clone() } else { Ray::one() };

        n /= 2;
        while n != 0 {
            x = self.ray_mul(&x, &x);
            if n % 2 != 0 {
                z = self.ray_mul(&z, &x);
            }
            n /= 2;
        }

        z
    }

    /// Third order binomial expansion of `(1 + x)^n` used by the pool to
    /// compound debt:
    ///
    /// `1 + n*x + n*(n-1)/2*x^2 + n*(n-1)*(n-2)/6*x^3`
    ///
    /// `x^2` and `x^3` go through `ray_mul`, the binomial coefficients are
    /// integer products truncated by the final division.
    ///
    /// # Arguments
    /// - `rate_per_second`: per-second rate, RAY.
    /// - `exponent`: elapsed seconds.
    fn binomial_approximated_ray_pow(
        &self,
        rate_per_second: &Ray<Self::Api>,
        exponent: u64,
    ) -> Ray<Self::Api> {
        if exponent == 0 {
            return Ray::one();
        }

        let exp = BigUint::from(exponent);
        let exp_minus_one = BigUint::from(exponent - 1);
        let exp_minus_two = BigUint::from(if exponent > 2 { exponent - 2 } else { 0 });

        let base_power_two = self.ray_mul(rate_per_second, rate_per_second);
        let base_power_three = self.ray_mul(&base_power_two, rate_per_second);

        let first_term = &exp * rate_per_second.into_raw_units();
        let second_term = (&exp * &exp_minus_one) * base_power_two.into_raw_units()
            / BigUint::from(2u64);
        let third_term = (&exp * &exp_minus_one) * &exp_minus_two
            * base_power_three.into_raw_units()
            / BigUint::from(6u64);

        Ray::from_raw_units(Ray::<Self::Api>::one().into_raw() + first_term + second_term + third_term)
    }

    fn mul_half_up(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_a = a.rescale(precision);
        let scaled_b = b.rescale(precision);

        let product = scaled_a.into_raw_units() * scaled_b.into_raw_units();

        let scaled = BigUint::from(10u64).pow(precision as u32);
        let half_scaled = &scaled / &BigUint::from(2u64);

        let rounded_product = (product + half_scaled) / scaled;

        self.to_decimal(rounded_product, precision)
    }

    fn div_half_up(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_a = a.rescale(precision);
        let scaled_b = b.rescale(precision);

        let denominator = scaled_b.into_raw_units();
        require!(denominator != &BigUint::zero(), ERROR_DIVISION_BY_ZERO);

        let scaled = BigUint::from(10u64).pow(precision as u32);
        let numerator = scaled_a.into_raw_units() * &scaled;

        let half_denominator = denominator / &BigUint::from(2u64);
        let rounded_quotient = (numerator + half_denominator) / denominator;

        self.to_decimal(rounded_quotient, precision)
    }

    /// Adds two decimals without losing digits: the result carries the
    /// larger of the two scales.
    fn add_exact(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = core::cmp::max(a.scale(), b.scale());
        let sum = a.rescale(precision).into_raw_units() + b.rescale(precision).into_raw_units();

        self.to_decimal(sum, precision)
    }

    /// `a - b` at the larger of the two scales, failing when `b > a`.
    fn sub_exact(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = core::cmp::max(a.scale(), b.scale());
        let left = a.rescale(precision);
        let right = b.rescale(precision);
        require!(
            left.into_raw_units() >= right.into_raw_units(),
            ERROR_NEGATIVE_VALUE
        );

        self.to_decimal(left.into_raw_units() - right.into_raw_units(), precision)
    }

    /// `max(0, a - b)` at the larger of the two scales.
    fn sub_floor_zero(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = core::cmp::max(a.scale(), b.scale());
        if self.cmp_exact(a, b) != Ordering::Greater {
            return self.to_decimal(BigUint::zero(), precision);
        }

        self.sub_exact(a, b)
    }

    fn cmp_exact(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> Ordering {
        let precision = core::cmp::max(a.scale(), b.scale());
        let left = a.rescale(precision);
        let right = b.rescale(precision);

        left.into_raw_units().cmp(right.into_raw_units())
    }

    fn is_zero_decimal(&self, value: &ManagedDecimal<Self::Api, NumDecimals>) -> bool {
        value.into_raw_units() == &BigUint::zero()
    }

    /// `10^exponent` as an integer.
    fn ten_pow(&self, exponent: usize) -> BigUint<Self::Api> {
        BigUint::from(10u64).pow(exponent as u32)
    }

    /// Parses an unsigned base-10 integer such as `"1070766170735867540788710974"`.
    fn biguint_from_str(&self, value: &str) -> BigUint<Self::Api> {
        let digits = value.trim().as_bytes();
        require!(!digits.is_empty(), ERROR_EMPTY_NUMBER);
        require!(
            digits.iter().all(|digit| digit.is_ascii_digit()),
            ERROR_MALFORMED_NUMBER
        );

        let mut result = BigUint::zero();
        for chunk in digits.chunks(PARSE_CHUNK_DIGITS) {
            let mut chunk_value = 0u64;
            for digit in chunk {
                chunk_value = chunk_value * 10 + u64::from(digit - b'0');
            }
            let multiplier = if chunk.len() == PARSE_CHUNK_DIGITS {
                BigUint::from(PARSE_CHUNK_BASE)
            } else {
                self.ten_pow(chunk.len())
            };
            result = result * multiplier + BigUint::from(chunk_value);
        }

        result
    }

    /// Parses a non-negative decimal such as `"1.05"`; the scale of the
    /// result is the number of fractional digits written.
    fn decimal_from_str(&self, value: &str) -> ManagedDecimal<Self::Api, NumDecimals> {
        let trimmed = value.trim();
        match trimmed.split_once('.') {
            Some((integer, fraction)) => {
                let integer = if integer.is_empty() { "0" } else { integer };
                let integer_part = self.biguint_from_str(integer);
                if fraction.is_empty() {
                    return self.to_decimal(integer_part, 0);
                }
                let fraction_part = self.biguint_from_str(fraction);
                let raw = integer_part * self.ten_pow(fraction.len()) + fraction_part;
                self.to_decimal(raw, fraction.len())
            },
            None => self.to_decimal(self.biguint_from_str(trimmed), 0),
        }
    }

    fn ray_zero(self) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        self.to_decimal(BigUint::zero(), RAY_PRECISION)
    }

    fn to_decimal(
        self,
        value: BigUint,
        precision: NumDecimals,
    ) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        ManagedDecimal::from_raw_units(value, precision)
    }

    fn rescale_half_up(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        new_precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let old_precision = value.scale();
        let raw_value = value.into_raw_units();

        match new_precision.cmp(&old_precision) {
            Ordering::Equal => value.clone(),
            Ordering::Less => {
                let precision_diff = old_precision - new_precision;
                let factor = BigUint::from(10u64).pow(precision_diff as u32);
                let half_factor = &factor / 2u64;

                let rounded_downscaled_value = (raw_value + &half_factor) / factor;
                ManagedDecimal::from_raw_units(rounded_downscaled_value, new_precision)
            },
            Ordering::Greater => value.rescale(new_precision),
        }
    }

    fn get_min(
        self,
        a: ManagedDecimal<Self::Api, NumDecimals>,
        b: ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if self.cmp_exact(&a, &b) == Ordering::Less {
            a
        } else {
            b
        }
    }
}
