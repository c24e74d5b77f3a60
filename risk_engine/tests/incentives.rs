use risk_engine::{
    format::FormatModule,
    incentives::{
        accrual::IncentiveAccrualModule, apr::IncentiveAprModule,
        claimable::ClaimableRewardsModule,
    },
    reserves::ReserveModule,
    FormatOptions, IncentiveSideKind, ReserveIncentives,
};
use multiversx_sc::types::ManagedBuffer;
use multiversx_sc_scenario::api::StaticApi;

pub mod setup;
use setup::*;

fn incentives_of(snapshot: &Snapshot, asset: &str) -> ReserveIncentives<StaticApi> {
    let asset = ManagedBuffer::from(asset);
    snapshot
        .reserve_incentives
        .iter()
        .find(|incentives| incentives.underlying_asset == asset)
        .cloned()
        .expect("incentives exist in the fixture")
}

#[test]
fn incentive_aprs_per_side() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let options = FormatOptions::default();

    let weth = snapshot.reserve("0xweth");
    let totals = engine.calculate_reserve_debt(&weth, NOW);
    let aprs = engine.calculate_reserve_incentives(
        &incentives_of(&snapshot, "0xweth"),
        &weth,
        &totals,
        &market_reference(),
    );
    let formatted = engine.format_reserve_incentives(&aprs, &options);

    assert_eq!(formatted.underlying_asset, "0xweth");
    assert_eq!(formatted.supply_incentives.len(), 1);
    assert_eq!(formatted.supply_incentives[0].reward_token_symbol, "RWD");
    assert_eq!(formatted.supply_incentives[0].incentive_apr, "0.15768");
    assert!(formatted.variable_debt_incentives.is_empty());
    assert!(formatted.stable_debt_incentives.is_empty());

    let dai = snapshot.reserve("0xdai");
    let totals = engine.calculate_reserve_debt(&dai, NOW);
    let aprs = engine.calculate_reserve_incentives(
        &incentives_of(&snapshot, "0xdai"),
        &dai,
        &totals,
        &market_reference(),
    );
    let formatted = engine.format_reserve_incentives(&aprs, &options);

    assert_eq!(
        formatted.variable_debt_incentives[0].incentive_apr,
        "12294842.497042308264934718501031062"
    );
}

#[test]
fn apr_is_zero_once_emission_ended() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let weth = snapshot.reserve("0xweth");
    let mut stream = incentives_of(&snapshot, "0xweth").supply.rewards[0].clone();
    stream.emission_end_timestamp = stream.incentives_last_update_timestamp;

    let apr = engine.calculate_incentive_apr(
        &stream,
        &amount(100_000_000_000_000_000_000),
        weth.decimals,
        &weth.price_in_market_reference_currency,
        8,
    );

    assert_eq!(engine.format_decimal(&apr, 0, &FormatOptions::default()), "0");
}

#[test]
fn apr_is_zero_without_supply() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let weth = snapshot.reserve("0xweth");
    let stream = incentives_of(&snapshot, "0xweth").supply.rewards[0].clone();

    let apr = engine.calculate_incentive_apr(
        &stream,
        &amount(0),
        weth.decimals,
        &weth.price_in_market_reference_currency,
        8,
    );

    assert_eq!(engine.format_decimal(&apr, 0, &FormatOptions::default()), "0");
}

#[test]
fn current_index_follows_emission() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let mut stream = incentives_of(&snapshot, "0xweth").supply.rewards[0].clone();
    let total_supply =
        engine.calculate_incentive_total_supply(&snapshot.reserve("0xweth"), IncentiveSideKind::Supply);
    assert_eq!(total_supply, amount(100_000_000_000_000_000_000));

    let index = engine.calculate_current_index(&stream, &total_supply, NOW);
    assert_eq!(index, amount(1_000_000_005_000_000));

    // Emission stopped 40 seconds after the last update.
    stream.emission_end_timestamp = stream.incentives_last_update_timestamp + 40;
    let capped = engine.calculate_current_index(&stream, &total_supply, NOW);
    assert_eq!(capped, amount(400_000_005_000_000));

    let unchanged =
        engine.calculate_current_index(&stream, &total_supply, stream.incentives_last_update_timestamp);
    assert_eq!(unchanged, amount(5_000_000));

    let empty = engine.calculate_current_index(&stream, &amount(0), NOW);
    assert_eq!(empty, amount(5_000_000));
}

#[test]
fn accrued_incentives_keep_precision() {
    let engine = engine();

    let accrued = engine.calculate_accrued_incentives(
        &amount(10_000_000_000_000_000),
        &amount(1_000_000_005_000_000),
        &amount(5_000_000),
        18,
    );

    assert_eq!(
        engine.format_decimal(&accrued, 18, &FormatOptions::default()),
        "0.00001"
    );
}

#[test]
#[should_panic]
fn user_index_ahead_of_reserve_is_rejected() {
    let engine = engine();

    engine.calculate_accrued_incentives(&amount(1), &amount(5), &amount(6), 18);
}

#[test]
fn claimable_rewards_per_controller_and_reward() {
    let engine = engine();
    let snapshot = snapshot(&engine);

    let claimables = engine.calculate_all_user_incentives(
        &snapshot.reserves,
        &snapshot.positions,
        &snapshot.reserve_incentives,
        &snapshot.user_incentives,
        NOW,
    );
    let formatted = engine.format_claimable_rewards(&claimables, &FormatOptions::default());

    assert_eq!(formatted.len(), 1);
    let reward = &formatted[0];
    assert_eq!(reward.incentive_controller_address, "0xcontroller");
    assert_eq!(reward.reward_token_address, "0xrwd");
    assert_eq!(reward.asset_addresses, vec!["0xaweth", "0xvdai"]);
    assert_eq!(reward.claimable_rewards, "0.168992514210535308024");
    assert_eq!(reward.claimable_rewards_usd, "0.168992514210535308024");
}

#[test]
fn missing_positions_only_carry_unclaimed_rewards() {
    let engine = engine();
    let snapshot = snapshot(&engine);

    let claimables = engine.calculate_all_user_incentives(
        &snapshot.reserves,
        &[],
        &snapshot.reserve_incentives,
        &snapshot.user_incentives,
        NOW,
    );
    let formatted = engine.format_claimable_rewards(&claimables, &FormatOptions::default());

    assert_eq!(formatted[0].claimable_rewards, "0.002");
}

#[test]
#[should_panic]
fn incentives_of_another_reserve_are_rejected() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let weth = snapshot.reserve("0xweth");
    let position = snapshot.position("0xweth");

    engine.calculate_user_reserve_incentives(
        &incentives_of(&snapshot, "0xdai"),
        &snapshot.user_incentives[0],
        &weth,
        Some(&position),
        NOW,
    );
}

#[test]
fn rewards_split_by_incentive_controller() {
    let engine = engine();
    let mut snapshot = snapshot(&engine);
    let second_controller = ManagedBuffer::from("0xc2");
    for incentives in snapshot.reserve_incentives.iter_mut() {
        incentives.variable_debt.incentive_controller_address = second_controller.clone();
    }
    for incentives in snapshot.user_incentives.iter_mut() {
        incentives.variable_debt.incentive_controller_address = second_controller.clone();
    }

    let claimables = engine.calculate_all_user_incentives(
        &snapshot.reserves,
        &snapshot.positions,
        &snapshot.reserve_incentives,
        &snapshot.user_incentives,
        NOW,
    );
    let formatted = engine.format_claimable_rewards(&claimables, &FormatOptions::default());

    assert_eq!(formatted.len(), 2);

    assert_eq!(formatted[0].incentive_controller_address, "0xcontroller");
    assert_eq!(formatted[0].reward_token_address, "0xrwd");
    assert_eq!(formatted[0].asset_addresses, vec!["0xaweth"]);
    assert_eq!(formatted[0].claimable_rewards, "0.00201");

    assert_eq!(formatted[1].incentive_controller_address, "0xc2");
    assert_eq!(formatted[1].reward_token_address, "0xrwd");
    assert_eq!(formatted[1].asset_addresses, vec!["0xvdai"]);
    assert_eq!(formatted[1].claimable_rewards, "0.168982514210535308024");
}

#[test]
fn side_without_supply_accrues_nothing() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let mut dai = snapshot.reserve("0xdai");
    dai.total_scaled_variable_debt = amount(0);
    let mut incentives = incentives_of(&snapshot, "0xdai");
    // Reserve index ahead of the user's, with nothing left to divide by.
    incentives.variable_debt.rewards[0].token_incentives_index = amount(5_000_000);
    let position = snapshot.position("0xdai");
    let user_incentives = snapshot
        .user_incentives
        .iter()
        .find(|user| user.underlying_asset == ManagedBuffer::from("0xdai"))
        .cloned()
        .expect("user incentives exist in the fixture");

    let rewards = engine.calculate_user_reserve_incentives(
        &incentives,
        &user_incentives,
        &dai,
        Some(&position),
        NOW,
    );

    assert_eq!(rewards.len(), 1);
    assert_eq!(
        engine.format_decimal(&rewards[0].accrued, 18, &FormatOptions::default()),
        "0"
    );
    assert_eq!(rewards[0].unclaimed, amount(2_000_000_000_000_000));
}
