// Tax module - Brazilian fixed-income withholding (IR/IOF) and yield accrual

pub mod accrual;
pub mod brackets;

pub use accrual::{calculate_yield, elapsed_calendar_days, YieldCalculation};
pub use brackets::{iof_rate, ir_rate};
