pub mod brackets;
pub mod monthly;
pub mod ranking;

pub use brackets::{
    BracketBoundaries, DEFAULT_BRACKET_BOUNDARIES, MonthBrackets, ViewBracket,
    monthly_view_brackets, parse_boundary_list, view_brackets,
};
pub use monthly::{MonthFill, MonthKey, MonthlySummary, monthly_summary};
pub use ranking::{DEFAULT_TOP_N, RankedEntry, rank_top};
