use risk_engine::{
    format::FormatModule,
    positions::{
        account::AccountModule, summary::ReserveSummaryModule, totals::ReserveTotalsModule,
    },
    FormatOptions, HealthFactor,
};

pub mod setup;
use setup::*;

#[test]
fn summarizes_each_position() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let options = FormatOptions::default();

    let weth = engine.generate_user_reserve_summary(
        &snapshot.position("0xweth"),
        &market_reference(),
        NOW,
    );
    assert_eq!(weth.underlying_balance, amount(10_000_000_000_000_000));
    assert_eq!(weth.total_borrows, amount(0));
    assert_eq!(
        engine.format_decimal(&weth.underlying_balance_market_reference, 8, &options),
        "20"
    );
    assert_eq!(engine.format_decimal(&weth.underlying_balance_usd, 0, &options), "20");

    let dai = engine.generate_user_reserve_summary(
        &snapshot.position("0xdai"),
        &market_reference(),
        NOW,
    );
    assert_eq!(dai.underlying_balance, amount(0));
    assert_eq!(dai.variable_borrows, amount(4_283_064_682_943_470));
    assert_eq!(dai.stable_borrows, amount(0));
    assert_eq!(dai.total_borrows, amount(4_283_064_682_943_470));
    assert_eq!(
        engine.format_decimal(&dai.total_borrows_usd, 0, &options),
        "0.00428306468294347"
    );
}

#[test]
fn stable_debt_compounds_on_user_rate() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let mut position = snapshot.position("0xdai");
    position.scaled_variable_debt = amount(0);
    position.principal_stable_debt = amount(1_000_000_000_000_000_000);
    position.stable_borrow_rate = ray(100_000_000_000_000_000_000_000_000);
    position.stable_borrow_last_update_timestamp = NOW - 31_536_000;

    let summary = engine.generate_user_reserve_summary(&position, &market_reference(), NOW);

    assert_eq!(summary.stable_borrows, amount(1_105_167_270_015_202_189));
    assert_eq!(summary.total_borrows, amount(1_105_167_270_015_202_189));
}

#[test]
fn aggregates_user_summary() {
    let engine = engine();
    let snapshot = snapshot(&engine);

    let formatted = engine.format_user_summary(
        &snapshot.positions,
        &market_reference(),
        snapshot.user_e_mode_category_id,
        snapshot.current_timestamp,
        &FormatOptions::default(),
    );

    assert_eq!(formatted.user_reserves.len(), 2);
    assert_eq!(formatted.total_liquidity_market_reference, "20");
    assert_eq!(formatted.total_collateral_market_reference, "20");
    assert_eq!(formatted.total_collateral_usd, "20");
    assert_eq!(formatted.total_borrows_market_reference, "0.00428306468294347");
    assert_eq!(formatted.total_borrows_usd, "0.00428306468294347");
    assert_eq!(formatted.net_worth_usd, "19.99571693531705653");
    assert_eq!(formatted.current_loan_to_value, "0.8");
    assert_eq!(formatted.current_liquidation_threshold, "0.825");
    assert_eq!(formatted.available_borrows_market_reference, "15.99571693531705653");
    assert_eq!(formatted.health_factor, "3852.381698952216159525");
    assert!(!formatted.is_in_isolation_mode);
    assert_eq!(formatted.isolated_reserve_asset, None);

    let dai = &formatted.user_reserves[0];
    assert_eq!(dai.underlying_asset, "0xdai");
    assert_eq!(dai.variable_borrows, "0.00428306468294347");
    assert_eq!(dai.underlying_balance, "0");
}

#[test]
fn health_factor_from_balances_vector() {
    let engine = engine();
    let collateral = dec(100_000_000_000_000_000, 0);
    let borrows = dec(50_000_000_000_000_000, 0);

    let health_factor = engine.calculate_health_factor_from_balances(&collateral, &borrows, 5_000);

    let ratio = health_factor.ratio().expect("borrows are not zero");
    assert_eq!(ratio.scale(), 18);
    assert_eq!(ratio.into_raw_units(), &amount(1_000_000_000_000_000_000));
    assert_eq!(
        engine.format_health_factor(&health_factor, &FormatOptions::default()),
        "1"
    );
}

#[test]
fn health_factor_big_units() {
    let engine = engine();

    let health_factor = engine.calculate_health_factor_from_balances_big_units(
        &dec(150, 0),
        &dec(100, 0),
        &dec(8, 1),
    );

    assert_eq!(
        engine.format_health_factor(&health_factor, &FormatOptions::default()),
        "1.2"
    );
}

#[test]
fn no_debt_reports_sentinel() {
    let engine = engine();

    let health_factor = engine.calculate_health_factor_from_balances(&dec(5, 0), &dec(0, 0), 8_000);

    assert!(matches!(health_factor, HealthFactor::NoDebt));
    assert_eq!(
        engine.format_health_factor(&health_factor, &FormatOptions::default()),
        "-1"
    );
}

#[test]
fn collateral_requires_user_opt_in() {
    let engine = engine();
    let mut snapshot = snapshot(&engine);
    for position in snapshot.positions.iter_mut() {
        position.usage_as_collateral_enabled_on_user = false;
    }

    let summaries =
        engine.generate_user_reserve_summaries(&snapshot.positions, &market_reference(), NOW);
    let totals = engine.calculate_user_reserve_totals(&summaries, 0);
    let aggregate = engine.generate_raw_user_summary(&summaries, &market_reference(), 0);
    let options = FormatOptions::default();

    assert_eq!(engine.format_decimal(&totals.total_liquidity_market_reference, 8, &options), "20");
    assert_eq!(engine.format_decimal(&totals.total_collateral_market_reference, 8, &options), "0");
    assert_eq!(engine.format_decimal(&aggregate.current_ltv, 0, &options), "0");
    assert_eq!(
        engine.format_decimal(&aggregate.available_borrows_market_reference, 8, &options),
        "0"
    );
    assert_eq!(engine.format_health_factor(&aggregate.health_factor, &options), "0");
}

#[test]
fn collateral_requires_reserve_flag() {
    let engine = engine();
    let mut snapshot = snapshot(&engine);
    for position in snapshot.positions.iter_mut() {
        position.reserve.usage_as_collateral_enabled = false;
    }

    let summaries =
        engine.generate_user_reserve_summaries(&snapshot.positions, &market_reference(), NOW);
    let totals = engine.calculate_user_reserve_totals(&summaries, 0);

    assert_eq!(
        engine.format_decimal(
            &totals.total_collateral_market_reference,
            8,
            &FormatOptions::default()
        ),
        "0"
    );
}

#[test]
fn e_mode_uses_category_parameters() {
    let engine = engine();
    let snapshot = snapshot(&engine);

    let formatted = engine.format_user_summary(
        &snapshot.positions,
        &market_reference(),
        1,
        NOW,
        &FormatOptions::default(),
    );

    assert_eq!(formatted.user_e_mode_category_id, 1);
    assert_eq!(formatted.current_loan_to_value, "0.9");
    assert_eq!(formatted.current_liquidation_threshold, "0.93");
    assert_eq!(formatted.available_borrows_market_reference, "17.99571693531705653");
    assert_eq!(formatted.health_factor, "4342.6848242734073071");
}

#[test]
fn e_mode_of_another_category_keeps_base_parameters() {
    let engine = engine();
    let snapshot = snapshot(&engine);

    let formatted = engine.format_user_summary(
        &snapshot.positions,
        &market_reference(),
        2,
        NOW,
        &FormatOptions::default(),
    );

    assert_eq!(formatted.current_loan_to_value, "0.8");
    assert_eq!(formatted.current_liquidation_threshold, "0.825");
}

#[test]
fn isolation_mode_caps_available_borrows() {
    let engine = engine();
    let mut snapshot = snapshot(&engine);
    for position in snapshot.positions.iter_mut() {
        if position.reserve.underlying_asset == multiversx_sc::types::ManagedBuffer::from("0xweth")
        {
            position.reserve.debt_ceiling = amount(1_000_000);
            position.reserve.isolation_mode_total_debt = amount(999_900);
        }
    }

    let formatted = engine.format_user_summary(
        &snapshot.positions,
        &market_reference(),
        0,
        NOW,
        &FormatOptions::default(),
    );

    assert!(formatted.is_in_isolation_mode);
    assert_eq!(formatted.isolated_reserve_asset.as_deref(), Some("0xweth"));
    assert_eq!(formatted.available_borrows_market_reference, "1");
    assert_eq!(formatted.available_borrows_usd, "1");
}

#[test]
fn exhausted_debt_ceiling_leaves_nothing_to_borrow() {
    let engine = engine();
    let mut weth = snapshot(&engine).reserve("0xweth");
    weth.debt_ceiling = amount(1_000_000);
    weth.isolation_mode_total_debt = amount(1_200_000);

    let headroom = engine.calculate_isolation_headroom(&weth, &market_reference());

    assert_eq!(
        engine.format_decimal(&headroom, 8, &FormatOptions::default()),
        "0"
    );
}

#[test]
fn available_borrows_floor_at_zero() {
    let engine = engine();

    let available =
        engine.calculate_available_borrows(&dec(100, 0), &dec(90, 0), &dec(8, 1));

    assert_eq!(
        engine.format_decimal(&available, 0, &FormatOptions::default()),
        "0"
    );
}

#[test]
fn user_summary_is_idempotent() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let options = FormatOptions::default();

    let first = engine.format_user_summary(&snapshot.positions, &market_reference(), 0, NOW, &options);
    let second =
        engine.format_user_summary(&snapshot.positions, &market_reference(), 0, NOW, &options);

    assert_eq!(first, second);
}

#[test]
fn mixed_collateral_averages_truncate_to_whole_bps() {
    let engine = engine();
    let mut snapshot = snapshot(&engine);
    for position in snapshot.positions.iter_mut() {
        position.usage_as_collateral_enabled_on_user = true;
    }
    let mut summaries =
        engine.generate_user_reserve_summaries(&snapshot.positions, &market_reference(), NOW);
    // 10 units of the reference currency supplied as DAI next to 20 in WETH.
    for summary in summaries.iter_mut() {
        if summary.position.reserve.underlying_asset
            == multiversx_sc::types::ManagedBuffer::from("0xdai")
        {
            summary.underlying_balance_market_reference =
                dec(1_000_000_000_000_000_000_000_000_000_000_000_000, 27);
        }
    }
    let options = FormatOptions::default();

    let aggregate = engine.generate_raw_user_summary(&summaries, &market_reference(), 0);

    // (10 * 7500 + 20 * 8000) / 30 = 7833.33 bps
    assert_eq!(engine.format_decimal(&aggregate.current_ltv, 0, &options), "0.7833");
    // (10 * 8000 + 20 * 8250) / 30 = 8166.67 bps
    assert_eq!(
        engine.format_decimal(&aggregate.current_liquidation_threshold, 0, &options),
        "0.8166"
    );
    assert_eq!(
        engine.format_decimal(&aggregate.available_borrows_market_reference, 8, &options),
        "23.49471693531705653"
    );
    assert_eq!(
        engine.format_health_factor(&aggregate.health_factor, &options),
        "5719.736173389781301578"
    );
}
