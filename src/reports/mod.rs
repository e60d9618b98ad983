// Reports module - filters and aggregate summaries over tracked positions

pub mod filter;
pub mod summary;

pub use filter::PositionFilter;
pub use summary::{build_summary, SummaryReport};
