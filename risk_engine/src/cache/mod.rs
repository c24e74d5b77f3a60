use std::collections::BTreeMap;

use common_structs::{MarketReferenceCurrency, ReserveDebtTotals, ReserveSnapshot};
use log::trace;

use crate::{
    config::FormatOptions,
    reserves::{FormattedReserve, ReserveModule},
};

/// Identifies one reserve snapshot accrued to one timestamp.
type CacheKey = (Vec<u8>, u64, u64);

/// Caller-owned memo of reserve debt totals.
///
/// Entries are keyed by underlying asset, snapshot update timestamp and the
/// timestamp accrued to, so a newer snapshot of the same reserve never hits a
/// stale entry. Nothing is evicted implicitly.
pub struct ReserveCache<'a, C>
where
    C: ReserveModule,
{
    sc_ref: &'a C,
    reserve_debts: BTreeMap<CacheKey, ReserveDebtTotals<C::Api>>,
}

impl<'a, C> ReserveCache<'a, C>
where
    C: ReserveModule,
{
    pub fn new(sc_ref: &'a C) -> Self {
        ReserveCache {
            sc_ref,
            reserve_debts: BTreeMap::new(),
        }
    }

    fn key(reserve: &ReserveSnapshot<C::Api>, current_timestamp: u64) -> CacheKey {
        (
            reserve.underlying_asset.to_boxed_bytes().as_slice().to_vec(),
            reserve.last_update_timestamp,
            current_timestamp,
        )
    }

    pub fn get_reserve_debt(
        &mut self,
        reserve: &ReserveSnapshot<C::Api>,
        current_timestamp: u64,
    ) -> ReserveDebtTotals<C::Api> {
        let key = Self::key(reserve, current_timestamp);
        if let Some(totals) = self.reserve_debts.get(&key) {
            trace!("reserve debt cache hit at {}", current_timestamp);
            return totals.clone();
        }

        let totals = self.sc_ref.calculate_reserve_debt(reserve, current_timestamp);
        self.reserve_debts.insert(key, totals.clone());
        totals
    }

    pub fn format_reserve(
        &mut self,
        reserve: &ReserveSnapshot<C::Api>,
        market_reference: &MarketReferenceCurrency<C::Api>,
        current_timestamp: u64,
        options: &FormatOptions,
    ) -> FormattedReserve {
        let totals = self.get_reserve_debt(reserve, current_timestamp);
        self.sc_ref
            .format_reserve_with_totals(reserve, &totals, market_reference, options)
    }

    pub fn contains(&self, reserve: &ReserveSnapshot<C::Api>, current_timestamp: u64) -> bool {
        self.reserve_debts
            .contains_key(&Self::key(reserve, current_timestamp))
    }

    pub fn len(&self) -> usize {
        self.reserve_debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserve_debts.is_empty()
    }

    pub fn clear(&mut self) {
        self.reserve_debts.clear();
    }

    /// Drops every entry accrued to a timestamp before `timestamp`.
    pub fn evict_before(&mut self, timestamp: u64) {
        self.reserve_debts
            .retain(|(_, _, accrued_to), _| *accrued_to >= timestamp);
    }
}
