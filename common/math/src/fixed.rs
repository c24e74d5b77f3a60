use core::{
    cmp::Ordering,
    fmt,
    marker::PhantomData,
    ops::{Add, Div, Sub},
};

use common_constants::{RAY_PRECISION, WAD_PRECISION};
use multiversx_sc::{
    api::ManagedTypeApi,
    types::{BigUint, ManagedDecimal, NumDecimals},
};

/// Compile-time precision of a fixed-point value.
pub trait FixedScale {
    const PRECISION: usize;
}

/// 27 decimals, used for rates, indexes and interest factors.
pub struct RayScale;

impl FixedScale for RayScale {
    const PRECISION: usize = RAY_PRECISION;
}

/// 18 decimals, used for balances moved in and out of RAY space.
pub struct WadScale;

impl FixedScale for WadScale {
    const PRECISION: usize = WAD_PRECISION;
}

/// Unsigned fixed-point number whose precision is part of its type, so a RAY
/// value can never be passed where a WAD value is expected.
pub struct Fixed<M: ManagedTypeApi, S: FixedScale> {
    raw: BigUint<M>,
    _scale: PhantomData<S>,
}

pub type Ray<M> = Fixed<M, RayScale>;
pub type Wad<M> = Fixed<M, WadScale>;

impl<M: ManagedTypeApi, S: FixedScale> Fixed<M, S> {
    pub fn from_raw_units(raw: BigUint<M>) -> Self {
        Fixed {
            raw,
            _scale: PhantomData,
        }
    }

    pub fn zero() -> Self {
        Self::from_raw_units(BigUint::zero())
    }

    /// `1.0` at this precision, i.e. `10^PRECISION` raw units.
    pub fn one() -> Self {
        Self::from_raw_units(BigUint::from(10u64).pow(S::PRECISION as u32))
    }

    pub fn precision() -> usize {
        S::PRECISION
    }

    pub fn into_raw_units(&self) -> &BigUint<M> {
        &self.raw
    }

    pub fn into_raw(self) -> BigUint<M> {
        self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw == BigUint::zero()
    }

    pub fn to_decimal(&self) -> ManagedDecimal<M, NumDecimals> {
        ManagedDecimal::from_raw_units(self.raw.clone(), S::PRECISION)
    }

    /// Truncates when the decimal carries more digits than this precision.
    pub fn from_decimal(value: &ManagedDecimal<M, NumDecimals>) -> Self {
        Self::from_raw_units(value.rescale(S::PRECISION).into_raw_units().clone())
    }
}

impl<M: ManagedTypeApi, S: FixedScale> Clone for Fixed<M, S> {
    fn clone(&self) -> Self {
        Self::from_raw_units(self.raw.clone())
    }
}

impl<M: ManagedTypeApi, S: FixedScale> PartialEq for Fixed<M, S> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<M: ManagedTypeApi, S: FixedScale> PartialOrd for Fixed<M, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.raw.partial_cmp(&other.raw)
    }
}

impl<M: ManagedTypeApi, S: FixedScale> fmt::Debug for Fixed<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixed")
            .field("raw", &self.raw)
            .field("precision", &S::PRECISION)
            .finish()
    }
}

impl<M: ManagedTypeApi, S: FixedScale> Add for Fixed<M, S> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_raw_units(self.raw + rhs.raw)
    }
}

impl<'a, M: ManagedTypeApi, S: FixedScale> Add<&'a Fixed<M, S>> for &'a Fixed<M, S> {
    type Output = Fixed<M, S>;

    fn add(self, rhs: &'a Fixed<M, S>) -> Fixed<M, S> {
        Fixed::from_raw_units(&self.raw + &rhs.raw)
    }
}

// Underflow signals an error through the managed API, same as `BigUint`.
impl<M: ManagedTypeApi, S: FixedScale> Sub for Fixed<M, S> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_raw_units(self.raw - rhs.raw)
    }
}

impl<'a, M: ManagedTypeApi, S: FixedScale> Sub<&'a Fixed<M, S>> for &'a Fixed<M, S> {
    type Output = Fixed<M, S>;

    fn sub(self, rhs: &'a Fixed<M, S>) -> Fixed<M, S> {
        Fixed::from_raw_units(&self.raw - &rhs.raw)
    }
}

/// Integer division by a plain scalar, truncating, e.g. a yearly rate into a
/// per-second rate.
impl<M: ManagedTypeApi, S: FixedScale> Div<u64> for Fixed<M, S> {
    type Output = Self;

    fn div(self, rhs: u64) -> Self {
        Self::from_raw_units(self.raw / BigUint::from(rhs))
    }
}
