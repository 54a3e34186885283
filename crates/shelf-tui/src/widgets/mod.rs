//! Ratatui widgets for the shelf picker.

pub mod help;
pub mod query_bar;
pub mod result_list;
pub mod trigger;
