//! Line-oriented normalisation of the reply's pipe table and terms list.

pub mod table;
pub mod terms;

pub use table::{extract_line_items, parse_amount, ColumnRole, LineItemTable};
pub use terms::{default_terms, extract_terms};
