use serde::Serialize;
use tracing::debug;

use super::types::ScenarioState;

const SEED: u32 = 5381;

/// djb2 (xor variant) over the UTF-16 code units of `text`.
pub fn djb2(text: &str) -> u32 {
    text.encode_utf16()
        .fold(SEED, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// Fingerprint of any serializable value.
///
/// The value goes through `serde_json::Value` first, whose object maps keep
/// keys sorted, so field order never changes the result.
pub fn checksum<T: Serialize + ?Sized>(value: &T) -> Result<u32, serde_json::Error> {
    let canonical = serde_json::to_value(value)?;
    Ok(djb2(&canonical.to_string()))
}

/// Combined fingerprint of plan, overrides, adjustments, assets and display
/// currency. `None` while there is no plan to project.
pub fn scenario_checksum(state: &ScenarioState) -> Option<u32> {
    state.plan.as_ref()?;
    match checksum(state) {
        Ok(sum) => Some(sum),
        // string-keyed plain data; unreachable in practice
        Err(e) => {
            debug!("scenario not representable as JSON: {e}");
            Some(djb2(""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AdjustmentEdit, AssetBreakdown, OverrideEdit, Plan};
    use proptest::prelude::{
        Just, Strategy, prop_assert_eq, prop_assert_ne, prop_assume, prop_oneof, proptest,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample_state() -> ScenarioState {
        ScenarioState {
            plan: Some(Plan {
                monthly_expenses: 5_000.0,
                working_income_monthly: 9_000.0,
                ..Plan::default()
            }),
            ..ScenarioState::default()
        }
    }

    #[test]
    fn djb2_matches_hand_computed_values() {
        assert_eq!(djb2(""), 5381);
        // 5381 * 33 ^ 'a'(97)
        assert_eq!(djb2("a"), (5381u32 * 33) ^ 97);
        assert_eq!(djb2("ab"), ((5381u32 * 33 ^ 97).wrapping_mul(33)) ^ 98);
    }

    #[test]
    fn djb2_wraps_to_32_bits_on_long_input() {
        let text = "x".repeat(10_000);
        assert_eq!(djb2(&text), djb2(&text));
    }

    #[test]
    fn checksum_ignores_object_key_order() {
        let a = json!({"alpha": 1, "beta": [1, 2], "gamma": {"x": 1, "y": 2}});
        let b = json!({"gamma": {"y": 2, "x": 1}, "beta": [1, 2], "alpha": 1});
        assert_eq!(
            checksum(&a).expect("json value"),
            checksum(&b).expect("json value")
        );
    }

    #[test]
    fn checksum_reports_values_json_cannot_hold() {
        let mut tuple_keys = BTreeMap::new();
        tuple_keys.insert((1, 2), 3);
        assert!(checksum(&tuple_keys).is_err());
    }

    #[test]
    fn scenario_checksum_absent_without_plan() {
        assert_eq!(scenario_checksum(&ScenarioState::default()), None);
        assert!(scenario_checksum(&sample_state()).is_some());
    }

    #[test]
    fn each_input_layer_moves_the_checksum() {
        let base = sample_state();
        let base_sum = scenario_checksum(&base);

        let mut with_override = base.clone();
        with_override
            .overrides
            .apply(OverrideEdit::MonthlyExpenses(4_000.0));
        assert_ne!(scenario_checksum(&with_override), base_sum);

        let mut with_adjustment = base.clone();
        with_adjustment
            .adjustments
            .apply(AdjustmentEdit::ReturnRateOffset(1.0));
        assert_ne!(scenario_checksum(&with_adjustment), base_sum);

        let mut with_assets = base.clone();
        with_assets.assets = AssetBreakdown {
            liquid: 250_000.0,
            non_spendable: 0.0,
            is_ready: true,
        };
        assert_ne!(scenario_checksum(&with_assets), base_sum);

        let mut with_currency = base;
        with_currency.display_currency = Some("EUR".to_string());
        assert_ne!(scenario_checksum(&with_currency), base_sum);
    }

    fn adjustment_edit() -> impl Strategy<Value = AdjustmentEdit> {
        prop_oneof![
            (50u32..151).prop_map(|p| AdjustmentEdit::ExpensesPercent(f64::from(p))),
            (50u32..151).prop_map(|p| AdjustmentEdit::ContributionPercent(f64::from(p))),
            (-30i32..31).prop_map(|o| AdjustmentEdit::ReturnRateOffset(f64::from(o) / 10.0)),
            (-30i32..31).prop_map(|o| AdjustmentEdit::InflationOffset(f64::from(o) / 10.0)),
            (-10i32..11).prop_map(AdjustmentEdit::RetirementAgeOffset),
            proptest::option::of(0u32..101)
                .prop_map(|p| AdjustmentEdit::EquityPercent(p.map(f64::from))),
            (0u32..51).prop_map(|p| AdjustmentEdit::LiquidationThreshold(f64::from(p))),
        ]
    }

    fn scenario() -> impl Strategy<Value = ScenarioState> {
        (
            proptest::option::of(0u32..50_000),
            proptest::collection::vec(adjustment_edit(), 0..4),
            0u32..2_000_000,
            0u32..500_000,
            proptest::option::of(prop_oneof![Just("EUR"), Just("GBP"), Just("JPY")]),
        )
            .prop_map(|(expenses, edits, liquid, non_spendable, currency)| {
                let mut state = sample_state();
                if let Some(expenses) = expenses {
                    state
                        .overrides
                        .apply(OverrideEdit::MonthlyExpenses(f64::from(expenses)));
                }
                for edit in edits {
                    state.adjustments.apply(edit);
                }
                state.assets = AssetBreakdown {
                    liquid: f64::from(liquid),
                    non_spendable: f64::from(non_spendable),
                    is_ready: liquid > 0,
                };
                state.display_currency = currency.map(str::to_string);
                state
            })
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_checksum_is_deterministic(
            expenses in 0u32..50_000,
            expenses_percent in 50u32..151,
            liquid in 0u32..2_000_000,
        ) {
            let mut state = sample_state();
            state.overrides.apply(OverrideEdit::MonthlyExpenses(expenses as f64));
            state.adjustments.apply(AdjustmentEdit::ExpensesPercent(expenses_percent as f64));
            state.assets.liquid = liquid as f64;
            prop_assert_eq!(scenario_checksum(&state), scenario_checksum(&state.clone()));
        }

        #[test]
        fn prop_distinct_scenarios_give_distinct_checksums(
            left in scenario(),
            right in scenario(),
        ) {
            prop_assume!(left != right);
            prop_assert_ne!(scenario_checksum(&left), scenario_checksum(&right));
        }

        #[test]
        fn prop_any_effective_edit_moves_the_checksum(
            base in scenario(),
            edit in adjustment_edit(),
            liquid in 0u32..2_000_000,
            currency in proptest::option::of(prop_oneof![Just("CHF"), Just("EUR")]),
        ) {
            let mut adjusted = base.clone();
            adjusted.adjustments.apply(edit);
            if adjusted != base {
                prop_assert_ne!(scenario_checksum(&adjusted), scenario_checksum(&base));
            }

            let mut revalued = base.clone();
            revalued.assets.liquid = f64::from(liquid);
            if revalued != base {
                prop_assert_ne!(scenario_checksum(&revalued), scenario_checksum(&base));
            }

            let mut converted = base.clone();
            converted.display_currency = currency.map(str::to_string);
            if converted != base {
                prop_assert_ne!(scenario_checksum(&converted), scenario_checksum(&base));
            }
        }
    }
}
