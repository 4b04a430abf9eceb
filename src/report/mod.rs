//! Role assignment report pipeline.
//!
//! Assignments flow through scope classification and member resolution into
//! `RoleEntry` records, which render as text blocks or CSV rows.

pub mod builder;
pub mod member;
pub mod render;
pub mod scope;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{build_report, RoleEntry, Subject};
pub use render::{render_rows, render_text, write_csv};
