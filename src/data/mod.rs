//! Data sources: the live IBGE series and the static category table.

pub mod categories;
pub mod ibge;

pub use categories::{CATEGORY_TABLE, category_names, find_category};
pub use ibge::{IbgeClient, parse_payload};
