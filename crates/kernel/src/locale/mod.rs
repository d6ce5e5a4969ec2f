//! Translation catalogs.

pub mod catalog;
pub mod plural;
pub mod po_parser;

pub use catalog::PoCatalog;
pub use plural::PluralRule;
pub use po_parser::{PoEntry, parse_po};
