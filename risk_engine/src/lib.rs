use core::marker::PhantomData;

use multiversx_sc::{api::VMApi, contract_base::ContractBase};

pub mod cache;
pub mod config;
pub mod format;
pub mod incentives;
pub mod parse;
pub mod positions;
pub mod reserves;

pub use cache::ReserveCache;
pub use common_errors::*;
pub use common_math::{Ray, Wad};
pub use common_structs::*;
pub use config::{Config, ConfigError, FormatOptions};

/// Off-chain host for the accounting modules.
///
/// Every operation is a pure function of its arguments, so one engine can be
/// shared freely. Tests and services instantiate it with
/// `multiversx_sc_scenario::api::StaticApi`.
pub struct Engine<A: VMApi> {
    _api: PhantomData<A>,
}

impl<A: VMApi> Engine<A> {
    pub fn new() -> Self {
        Engine { _api: PhantomData }
    }
}

impl<A: VMApi> Default for Engine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: VMApi> ContractBase for Engine<A> {
    type Api = A;
}

impl<A: VMApi> common_math::SharedMathModule for Engine<A> {}
impl<A: VMApi> common_rates::InterestRates for Engine<A> {}
impl<A: VMApi> format::FormatModule for Engine<A> {}
impl<A: VMApi> parse::ParseModule for Engine<A> {}
impl<A: VMApi> reserves::ReserveModule for Engine<A> {}
impl<A: VMApi> positions::summary::ReserveSummaryModule for Engine<A> {}
impl<A: VMApi> positions::totals::ReserveTotalsModule for Engine<A> {}
impl<A: VMApi> positions::account::AccountModule for Engine<A> {}
impl<A: VMApi> incentives::apr::IncentiveAprModule for Engine<A> {}
impl<A: VMApi> incentives::accrual::IncentiveAccrualModule for Engine<A> {}
impl<A: VMApi> incentives::claimable::ClaimableRewardsModule for Engine<A> {}
