//! 集成測試：增量重算與從頭重建的一致性

use print_quote::fields::*;
use print_quote::quote_graph::FieldState;
use print_quote::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

const EDITABLE: [&str; 10] = [
    JOB_COPIES,
    JOB_COLORS_BACK,
    DESIGN_WIDTH,
    DESIGN_HEIGHT,
    STOCK_WIDTH,
    STOCK_HEIGHT,
    PRESS_WIDTH,
    PRESS_HEIGHT,
    STOCK_UNIT_PRICE,
    PRESS_UNIT_PRICE,
];

fn edits() -> impl Strategy<Value = Vec<(usize, u32)>> {
    prop::collection::vec((0..EDITABLE.len(), 0u32..3000), 1..40)
}

proptest! {
    #[test]
    fn prop_incremental_matches_replay(edits in edits(), disable_plate in any::<bool>()) {
        let mut form = QuoteForm::new(QuoteConfig::default()).unwrap();
        for (i, (field, value)) in edits.iter().enumerate() {
            form.set_number(EDITABLE[*field], *value).unwrap();
            if disable_plate && i == edits.len() / 2 {
                form.set_stage_enabled(CostStage::Plate, false).unwrap();
            }
        }

        // 只寫入最終的來源值，建出一張新表單
        let snapshot = form.snapshot();
        let mut fresh = QuoteForm::new(
            QuoteConfig::default().with_enabled_stages(snapshot.enabled_stages.clone()),
        )
        .unwrap();
        for (id, value) in &snapshot.sources.values {
            match value {
                Some(v) => fresh.set_value(id, v.clone()).unwrap(),
                None => fresh.clear_value(id).unwrap(),
            };
        }

        for id in form.engine().field_ids() {
            prop_assert_eq!(form.get_value(&id), fresh.get_value(&id), "field {}", id);
            prop_assert_eq!(form.engine().state(&id), Some(FieldState::Clean));
        }
    }

    #[test]
    fn prop_grand_total_is_sum_of_enabled(
        copies in 1u32..20000,
        price in 0u32..50,
        enabled in prop::collection::vec(any::<bool>(), 4),
    ) {
        let mut form = QuoteForm::new(QuoteConfig::default()).unwrap();
        for (id, value) in [
            (STOCK_WIDTH, 70),
            (STOCK_HEIGHT, 100),
            (PRESS_WIDTH, 50),
            (PRESS_HEIGHT, 70),
            (DESIGN_WIDTH, 21),
            (DESIGN_HEIGHT, 30),
            (STOCK_UNIT_PRICE, price),
            (PLATE_UNIT_PRICE, price),
            (PRESS_UNIT_PRICE, price),
            (FINISHING_UNIT_PRICE, price),
            (JOB_COPIES, copies),
        ] {
            form.set_number(id, value).unwrap();
        }

        for (stage, on) in CostStage::ALL.iter().zip(&enabled) {
            form.set_stage_enabled(*stage, *on).unwrap();
        }

        let breakdown = form.breakdown();
        prop_assert_eq!(breakdown.grand_total, Some(breakdown.enabled_sum()));
        prop_assert_eq!(
            form.engine().dependencies_of(GRAND_TOTAL).unwrap().len(),
            enabled.iter().filter(|on| **on).count()
        );
    }
}

#[test]
fn test_cycle_rejected_and_wiring_kept() {
    let mut engine = RecalcEngine::new();
    engine.set_value("a", FieldValue::from(1)).unwrap();
    engine
        .register("b", &["a"], |inputs| {
            Ok(FieldValue::Number(inputs.number("a")? + Decimal::ONE))
        })
        .unwrap();
    engine
        .register("c", &["b"], |inputs| {
            Ok(FieldValue::Number(inputs.number("b")? * Decimal::TWO))
        })
        .unwrap();

    let err = engine
        .register("b", &["c"], |_| Ok(FieldValue::from(0)))
        .unwrap_err();
    assert!(matches!(err, QuoteError::CyclicDependency { .. }));

    assert_eq!(engine.dependencies_of("b").unwrap(), vec!["a".to_string()]);
    engine.set_value("a", FieldValue::from(4)).unwrap();
    assert_eq!(engine.get_value("c"), Some(&FieldValue::from(10)));
}

#[test]
fn test_self_dependency_rejected() {
    let mut engine = RecalcEngine::new();
    let err = engine
        .register("x", &["x"], |_| Ok(FieldValue::from(0)))
        .unwrap_err();
    assert!(matches!(err, QuoteError::CyclicDependency { .. }));
}
