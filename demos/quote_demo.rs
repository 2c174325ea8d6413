//! 傳單報價示例

use print_quote::fields::*;
use print_quote::quote_core::StaticCatalog;
use print_quote::{CostStage, QuoteConfig, QuoteForm, Rectangle};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== 傳單報價示例 ===\n");

    let catalog = StaticCatalog::new()
        .with_dimensions("sheet-70x100", Rectangle::from_dims(70, 100)?)
        .with_dimensions("gto-52", Rectangle::from_dims(36, 52)?)
        .with_dimensions("flyer-a5", Rectangle::from_dims(15, 21)?)
        .with_price("coated-135", Decimal::new(35, 1))
        .with_price("plate-ctp", Decimal::from(280))
        .with_price("run-gto", Decimal::from(450));

    let mut form = QuoteForm::new(QuoteConfig::default())?;
    form.subscribe(|n| tracing::debug!("變動欄位: {:?}", n.changed_field_ids));

    form.apply_catalog_dimensions(&catalog, "sheet-70x100", STOCK_WIDTH, STOCK_HEIGHT)?;
    form.apply_catalog_dimensions(&catalog, "gto-52", PRESS_WIDTH, PRESS_HEIGHT)?;
    form.apply_catalog_dimensions(&catalog, "flyer-a5", DESIGN_WIDTH, DESIGN_HEIGHT)?;
    form.apply_catalog_price(&catalog, "coated-135", STOCK_UNIT_PRICE)?;
    form.apply_catalog_price(&catalog, "plate-ctp", PLATE_UNIT_PRICE)?;
    form.apply_catalog_price(&catalog, "run-gto", PRESS_UNIT_PRICE)?;
    form.set_number(JOB_COPIES, 5000)?;

    println!("拼版: {}", form.display(LAYOUT_SUMMARY));
    println!("用紙: {} 張", form.display(STOCK_REQUIRED_SHEETS));
    print_breakdown(&form);

    println!("\n--- 停用後加工階段 ---");
    form.set_stage_enabled(CostStage::Finishing, false)?;
    print_breakdown(&form);

    Ok(())
}

fn print_breakdown(form: &QuoteForm) {
    let breakdown = form.breakdown();
    for line in &breakdown.stages {
        let total = line.total.map(|t| t.to_string()).unwrap_or_default();
        let mark = if line.enabled { "" } else { "（停用）" };
        println!("  {:<10} {:>10}{}", line.stage, total, mark);
    }
    let grand = breakdown
        .grand_total
        .map(|t| t.to_string())
        .unwrap_or_default();
    println!("  {:<10} {:>10}", "總計", grand);

    for warning in &breakdown.warnings {
        println!("  [{:?}] {}: {}", warning.severity, warning.field, warning.message);
    }
}
