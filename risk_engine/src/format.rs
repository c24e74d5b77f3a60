use common_constants::{HEALTH_FACTOR_NO_DEBT, PARSE_CHUNK_BASE, PARSE_CHUNK_DIGITS, RAY_PRECISION};
use common_math::Ray;
use common_structs::HealthFactor;

use crate::config::FormatOptions;

multiversx_sc::imports!();

/// Lossy UTF-8 view of a managed buffer, for identifiers and logs.
pub fn buffer_to_string<M: ManagedTypeApi>(buffer: &ManagedBuffer<M>) -> String {
    String::from_utf8_lossy(buffer.to_boxed_bytes().as_slice()).into_owned()
}

/// Renders fixed-point values as human readable decimal strings.
///
/// A value is normalized by `10^decimals`, trailing zeros are dropped and no
/// exponent notation is used: raw `1500000` with 6 decimals becomes `"1.5"`.
#[multiversx_sc::module]
pub trait FormatModule: common_math::SharedMathModule {
    fn biguint_to_string(&self, value: &BigUint<Self::Api>) -> String {
        let chunk_base = BigUint::from(PARSE_CHUNK_BASE);
        let mut remaining = value.clone();
        let mut chunks: Vec<u64> = Vec::new();

        while remaining > BigUint::zero() {
            let quotient = &remaining / &chunk_base;
            let chunk = &remaining - &(&quotient * &chunk_base);
            chunks.push(chunk.to_u64().unwrap_or_default());
            remaining = quotient;
        }

        match chunks.split_last() {
            None => String::from("0"),
            Some((most_significant, rest)) => {
                let mut digits = most_significant.to_string();
                for chunk in rest.iter().rev() {
                    digits.push_str(&format!("{:0width$}", chunk, width = PARSE_CHUNK_DIGITS));
                }
                digits
            },
        }
    }

    /// `raw / 10^decimals` as a decimal string.
    fn format_raw(
        &self,
        raw: &BigUint<Self::Api>,
        decimals: usize,
        options: &FormatOptions,
    ) -> String {
        let (raw, decimals) = match options.fraction_digits {
            Some(digits) if digits < decimals => {
                let value = ManagedDecimal::from_raw_units(raw.clone(), decimals);
                let rounded = self.rescale_half_up(&value, digits);
                (rounded.into_raw_units().clone(), digits)
            },
            _ => (raw.clone(), decimals),
        };

        let digits = self.biguint_to_string(&raw);
        if decimals == 0 {
            return digits;
        }

        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (integer, fraction) = padded.split_at(padded.len() - decimals);
        let fraction = fraction.trim_end_matches('0');

        if fraction.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, fraction)
        }
    }

    /// Normalizes by the decimal's own scale plus `extra_decimals`, the
    /// decimals of the unit the value is counted in.
    fn format_decimal(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        extra_decimals: usize,
        options: &FormatOptions,
    ) -> String {
        self.format_raw(value.into_raw_units(), value.scale() + extra_decimals, options)
    }

    fn format_ray(&self, value: &Ray<Self::Api>, options: &FormatOptions) -> String {
        self.format_raw(value.into_raw_units(), RAY_PRECISION, options)
    }

    /// Signed difference `a - b`, both normalized the same way.
    fn format_signed_difference(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        extra_decimals: usize,
        options: &FormatOptions,
    ) -> String {
        if self.cmp_exact(a, b) == core::cmp::Ordering::Less {
            let magnitude = self.sub_exact(b, a);
            let formatted = self.format_decimal(&magnitude, extra_decimals, options);
            if formatted == "0" {
                return formatted;
            }
            return format!("-{}", formatted);
        }

        self.format_decimal(&self.sub_exact(a, b), extra_decimals, options)
    }

    fn format_health_factor(
        &self,
        health_factor: &HealthFactor<Self::Api>,
        options: &FormatOptions,
    ) -> String {
        match health_factor {
            HealthFactor::NoDebt => String::from(HEALTH_FACTOR_NO_DEBT),
            HealthFactor::Ratio(value) => self.format_decimal(value, 0, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;
    use multiversx_sc_scenario::api::StaticApi;

    fn engine() -> Engine<StaticApi> {
        Engine::new()
    }

    fn raw(value: u128) -> BigUint<StaticApi> {
        BigUint::from(value)
    }

    #[test]
    fn formats_integers_across_chunk_boundaries() {
        let engine = engine();

        assert_eq!(engine.biguint_to_string(&raw(0)), "0");
        assert_eq!(engine.biguint_to_string(&raw(1_000_000_000_000_000_000)), "1000000000000000000");
        assert_eq!(
            engine.biguint_to_string(&raw(1_070_766_170_735_867_540_788_710_974)),
            "1070766170735867540788710974"
        );
    }

    #[test]
    fn normalizes_and_trims() {
        let engine = engine();
        let options = FormatOptions::default();

        assert_eq!(engine.format_raw(&raw(1_500_000), 6, &options), "1.5");
        assert_eq!(engine.format_raw(&raw(42), 6, &options), "0.000042");
        assert_eq!(engine.format_raw(&raw(3_000_000), 6, &options), "3");
        assert_eq!(engine.format_raw(&raw(0), 18, &options), "0");
        assert_eq!(engine.format_raw(&raw(7), 0, &options), "7");
    }

    #[test]
    fn rounds_to_requested_fraction_digits() {
        let engine = engine();
        let options = FormatOptions {
            fraction_digits: Some(2),
        };

        assert_eq!(engine.format_raw(&raw(1_234_567), 6, &options), "1.23");
        assert_eq!(engine.format_raw(&raw(1_235_000), 6, &options), "1.24");
        assert_eq!(engine.format_raw(&raw(15), 1, &options), "1.5");
    }

    #[test]
    fn health_factor_sentinel() {
        let engine = engine();

        let formatted = engine.format_health_factor(&HealthFactor::NoDebt, &FormatOptions::default());

        assert_eq!(formatted, "-1");
    }

    #[test]
    fn signed_difference() {
        let engine = engine();
        let options = FormatOptions::default();
        let small = ManagedDecimal::<StaticApi, NumDecimals>::from_raw_units(raw(150), 2);
        let large = ManagedDecimal::<StaticApi, NumDecimals>::from_raw_units(raw(4), 0);

        assert_eq!(engine.format_signed_difference(&large, &small, 0, &options), "2.5");
        assert_eq!(engine.format_signed_difference(&small, &large, 0, &options), "-2.5");
        assert_eq!(engine.format_signed_difference(&small, &small, 0, &options), "0");
    }
}
