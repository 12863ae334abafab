//! The recalculation engine: period resolution, the day-by-day limit walk,
//! and top-up distribution.

pub mod period;
pub mod recalc;
pub mod topup;

pub use period::{resolve_period, PeriodBounds};
pub use recalc::{recalculate, recalculate_all, AdjustmentTable, LimitTable};
pub use topup::distribute_top_up;
