#![allow(dead_code)]

use multiversx_sc::types::{BigUint, ManagedBuffer, ManagedDecimal, NumDecimals};
use multiversx_sc_scenario::api::StaticApi;
use risk_engine::{
    parse::{ParseModule, RawSnapshot},
    Config, Engine, MarketReferenceCurrency, Ray, ReserveIncentives, ReserveSnapshot,
    UserReserveIncentives, UserReservePosition,
};

pub const SNAPSHOT: &str = include_str!("../fixtures/snapshot.toml");
pub const CONFIG: &str = include_str!("../fixtures/config.toml");

/// `currentTimestamp` of the snapshot fixture.
pub const NOW: u64 = 1_629_942_075;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn engine() -> Engine<StaticApi> {
    init_logger();
    Engine::new()
}

pub fn config() -> Config {
    Config::from_toml_str(CONFIG).expect("config fixture parses")
}

pub fn market_reference() -> MarketReferenceCurrency<StaticApi> {
    config()
        .market_reference()
        .expect("config fixture has a valid reference price")
}

pub fn raw_snapshot() -> RawSnapshot {
    RawSnapshot::from_toml_str(SNAPSHOT).expect("snapshot fixture parses")
}

/// The snapshot fixture after the validating parse.
pub struct Snapshot {
    pub current_timestamp: u64,
    pub user_e_mode_category_id: u8,
    pub reserves: Vec<ReserveSnapshot<StaticApi>>,
    pub positions: Vec<UserReservePosition<StaticApi>>,
    pub reserve_incentives: Vec<ReserveIncentives<StaticApi>>,
    pub user_incentives: Vec<UserReserveIncentives<StaticApi>>,
}

impl Snapshot {
    pub fn reserve(&self, asset: &str) -> ReserveSnapshot<StaticApi> {
        let asset = ManagedBuffer::from(asset);
        self.reserves
            .iter()
            .find(|reserve| reserve.underlying_asset == asset)
            .cloned()
            .expect("reserve exists in the fixture")
    }

    pub fn position(&self, asset: &str) -> UserReservePosition<StaticApi> {
        let asset = ManagedBuffer::from(asset);
        self.positions
            .iter()
            .find(|position| position.reserve.underlying_asset == asset)
            .cloned()
            .expect("position exists in the fixture")
    }
}

pub fn snapshot(engine: &Engine<StaticApi>) -> Snapshot {
    let raw = raw_snapshot();
    let reserves = engine.parse_reserves(&raw.reserves);
    let positions = engine.parse_user_reserves(&reserves, &raw.user_reserves);

    Snapshot {
        current_timestamp: raw.current_timestamp,
        user_e_mode_category_id: raw.user_e_mode_category_id,
        positions,
        reserve_incentives: raw
            .reserve_incentives
            .iter()
            .map(|incentives| engine.parse_reserve_incentives(incentives))
            .collect(),
        user_incentives: raw
            .user_incentives
            .iter()
            .map(|incentives| engine.parse_user_reserve_incentives(incentives))
            .collect(),
        reserves,
    }
}

pub fn ray(raw: u128) -> Ray<StaticApi> {
    Ray::from_raw_units(BigUint::from(raw))
}

pub fn amount(raw: u128) -> BigUint<StaticApi> {
    BigUint::from(raw)
}

pub fn dec(raw: u128, scale: usize) -> ManagedDecimal<StaticApi, NumDecimals> {
    ManagedDecimal::from_raw_units(BigUint::from(raw), scale)
}
