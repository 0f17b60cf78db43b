pub mod ai;
pub mod search;
