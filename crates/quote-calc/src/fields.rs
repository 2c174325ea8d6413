//! 報價表單欄位ID

// 來源欄位
pub const JOB_COPIES: &str = "job.copies";
pub const JOB_COLORS_FRONT: &str = "job.colors_front";
pub const JOB_COLORS_BACK: &str = "job.colors_back";
pub const DESIGN_WIDTH: &str = "design.width";
pub const DESIGN_HEIGHT: &str = "design.height";
pub const STOCK_WIDTH: &str = "stock.width";
pub const STOCK_HEIGHT: &str = "stock.height";
pub const STOCK_CLASS: &str = "stock.class";
pub const STOCK_UNIT_PRICE: &str = "stock.unit_price";
pub const STOCK_TRANSPORT: &str = "stock.transport";
pub const PRESS_WIDTH: &str = "press.width";
pub const PRESS_HEIGHT: &str = "press.height";
pub const PRESS_CLASS: &str = "press.class";
pub const PRESS_UNIT_PRICE: &str = "press.unit_price";
pub const PRESS_SETUP: &str = "press.setup";
pub const PLATE_UNIT_PRICE: &str = "plate.unit_price";
pub const PLATE_SURCHARGE: &str = "plate.surcharge";
pub const FINISHING_UNIT_PRICE: &str = "finishing.unit_price";
pub const FINISHING_SURCHARGE: &str = "finishing.surcharge";

// 衍生欄位
pub const LAYOUT_USABLE_WIDTH: &str = "layout.usable_width";
pub const LAYOUT_USABLE_HEIGHT: &str = "layout.usable_height";
pub const LAYOUT_COUNT: &str = "layout.count";
pub const LAYOUT_ROTATED: &str = "layout.rotated";
pub const LAYOUT_SHEET_LABEL: &str = "layout.sheet_label";
pub const LAYOUT_SUMMARY: &str = "layout.summary";
pub const STOCK_SHEET_MULTIPLIER: &str = "stock.sheet_multiplier";
pub const STOCK_REQUIRED_SHEETS: &str = "stock.required_sheets";
pub const STOCK_TOTAL: &str = "stock.total";
pub const PLATE_COUNT: &str = "plate.count";
pub const PLATE_TOTAL: &str = "plate.total";
pub const PRESS_IMPRESSIONS: &str = "press.impressions";
pub const PRESS_RUN_UNITS: &str = "press.run_units";
pub const PRESS_QUANTITY: &str = "press.quantity";
pub const PRESS_TOTAL: &str = "press.total";
pub const FINISHING_TOTAL: &str = "finishing.total";
pub const GRAND_TOTAL: &str = "quote.grand_total";

/// 所有來源欄位
pub const SOURCE_FIELDS: [&str; 19] = [
    JOB_COPIES,
    JOB_COLORS_FRONT,
    JOB_COLORS_BACK,
    DESIGN_WIDTH,
    DESIGN_HEIGHT,
    STOCK_WIDTH,
    STOCK_HEIGHT,
    STOCK_CLASS,
    STOCK_UNIT_PRICE,
    STOCK_TRANSPORT,
    PRESS_WIDTH,
    PRESS_HEIGHT,
    PRESS_CLASS,
    PRESS_UNIT_PRICE,
    PRESS_SETUP,
    PLATE_UNIT_PRICE,
    PLATE_SURCHARGE,
    FINISHING_UNIT_PRICE,
    FINISHING_SURCHARGE,
];
