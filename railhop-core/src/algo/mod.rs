//! Planning algorithms over a single train's seat chart

pub mod seat_coverage;
