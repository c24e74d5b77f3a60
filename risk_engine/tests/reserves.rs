use risk_engine::{
    format::FormatModule, reserves::ReserveModule, FormatOptions, MarketReferenceCurrency,
};

pub mod setup;
use setup::*;

#[test]
fn total_liquidity_matches_on_chain_vector() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let dai = snapshot.reserve("0xdai");

    let totals = engine.calculate_reserve_debt(&dai, NOW);

    assert_eq!(totals.total_variable_debt, amount(5_129_955_915_675_441));
    assert_eq!(totals.total_stable_debt, amount(0));
    assert_eq!(totals.total_debt, amount(5_129_955_915_675_441));
    assert_eq!(totals.total_liquidity, amount(5_735_354_323_645_633));
}

#[test]
fn variable_debt_grows_with_time() {
    let engine = engine();
    let dai = snapshot(&engine).reserve("0xdai");

    let after_hour = engine.calculate_reserve_debt(&dai, NOW + 3_600);
    assert_eq!(after_hour.total_variable_debt, amount(5_129_988_847_905_903));
    assert_eq!(after_hour.total_liquidity, amount(5_735_387_255_876_095));

    let mut previous = engine.calculate_reserve_debt(&dai, NOW).total_variable_debt;
    for elapsed in [1u64, 60, 3_600, 86_400, 2_592_000] {
        let current = engine.calculate_reserve_debt(&dai, NOW + elapsed).total_variable_debt;
        assert!(current >= previous, "debt decreased after {} seconds", elapsed);
        previous = current;
    }
}

#[test]
fn reserve_debt_is_idempotent() {
    let engine = engine();
    let dai = snapshot(&engine).reserve("0xdai");

    let first = engine.calculate_reserve_debt(&dai, NOW + 86_400);
    let second = engine.calculate_reserve_debt(&dai, NOW + 86_400);

    assert_eq!(first.total_liquidity, second.total_liquidity);
    assert_eq!(first.total_variable_debt, second.total_variable_debt);
}

#[test]
#[should_panic]
fn rejects_timestamp_before_snapshot() {
    let engine = engine();
    let dai = snapshot(&engine).reserve("0xdai");

    engine.calculate_reserve_debt(&dai, NOW - 1);
}

#[test]
fn format_reserve_normalizes_every_field() {
    let engine = engine();
    let snapshot = snapshot(&engine);
    let dai = snapshot.reserve("0xdai");

    let formatted =
        engine.format_reserve(&dai, &market_reference(), NOW, &FormatOptions::default());

    assert_eq!(formatted.underlying_asset, "0xdai");
    assert_eq!(formatted.symbol, "DAI");
    assert_eq!(formatted.total_variable_debt, "0.005129955915675441");
    assert_eq!(formatted.total_stable_debt, "0");
    assert_eq!(formatted.total_liquidity, "0.005735354323645633");
    assert_eq!(formatted.available_liquidity, "0.000605398407970192");
    assert_eq!(formatted.borrow_usage_ratio, "0.894444462572388160768215072");
    assert_eq!(formatted.supply_usage_ratio, "0.894444462572388160768215072");
    assert_eq!(formatted.supply_apr, "0.03");
    assert_eq!(formatted.supply_apy, "0.030454533938812881107633482");
    assert_eq!(formatted.variable_borrow_apr, "0.0562354565750907755145949");
    assert_eq!(formatted.variable_borrow_apy, "0.057846731330809865738204543");
    assert_eq!(formatted.stable_borrow_apy, "0.105170917900423925599112509");
    assert_eq!(formatted.base_ltv_as_collateral, "0.75");
    assert_eq!(formatted.reserve_liquidation_threshold, "0.8");
    assert_eq!(formatted.reserve_liquidation_bonus, "0.05");
    assert_eq!(formatted.reserve_factor, "0.1");
    assert_eq!(formatted.supply_cap, "2000000000");
    assert_eq!(formatted.debt_ceiling, "0");
    assert_eq!(formatted.price_in_market_reference_currency, "1");
    assert_eq!(formatted.price_in_usd, "1");
    assert_eq!(formatted.total_liquidity_usd, "0.005735354323645633");
    assert_eq!(formatted.e_mode_category_id, 2);
    assert_eq!(formatted.e_mode_ltv, "0.97");
    assert_eq!(formatted.e_mode_liquidation_bonus, "0.01");
    assert_eq!(formatted.e_mode_label, "Stablecoins");
}

#[test]
fn usage_ratio_is_zero_without_liquidity() {
    let engine = engine();
    let mut weth = snapshot(&engine).reserve("0xweth");
    weth.available_liquidity = amount(0);

    let formatted =
        engine.format_reserve(&weth, &market_reference(), NOW, &FormatOptions::default());

    assert_eq!(formatted.total_liquidity, "0");
    assert_eq!(formatted.borrow_usage_ratio, "0");
    assert_eq!(formatted.price_in_usd, "2000");
}

#[test]
fn liquidation_bonus_below_par_floors_at_zero() {
    let engine = engine();
    let mut weth = snapshot(&engine).reserve("0xweth");
    weth.reserve_liquidation_bonus = 0;

    let formatted =
        engine.format_reserve(&weth, &market_reference(), NOW, &FormatOptions::default());

    assert_eq!(formatted.reserve_liquidation_bonus, "0");
}

#[test]
fn format_reserve_rounds_to_configured_digits() {
    let engine = engine();
    let dai = snapshot(&engine).reserve("0xdai");
    let options = FormatOptions {
        fraction_digits: Some(6),
    };

    let formatted = engine.format_reserve(&dai, &market_reference(), NOW, &options);

    assert_eq!(formatted.total_liquidity, "0.005735");
    assert_eq!(formatted.borrow_usage_ratio, "0.894444");
}

#[test]
fn market_reference_and_usd_values() {
    let engine = engine();
    let options = FormatOptions::default();
    let reference = MarketReferenceCurrency {
        decimals: 8,
        price_in_usd: amount(200_000_000),
        usd_decimals: 8,
    };

    let value = engine.get_market_reference_value(
        &amount(1_000_000_000_000_000_000),
        &amount(100_000_000),
        18,
    );
    assert_eq!(engine.format_decimal(&value, 8, &options), "1");

    let usd = engine.get_usd_value_normalized(&value, &reference);
    assert_eq!(engine.format_decimal(&usd, 0, &options), "2");

    let in_reference_units = engine.get_usd_value_in_reference_units(&value, &reference);
    assert_eq!(engine.format_decimal(&in_reference_units, 8, &options), "2");
}

#[test]
#[should_panic]
fn market_reference_value_rejects_oversized_decimals() {
    let engine = engine();

    engine.get_market_reference_value(&amount(1), &amount(1), 28);
}
