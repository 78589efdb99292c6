//! Filtering, aggregation, and formatted terminal output.

pub mod filter;
pub mod format;
pub mod summary;
pub mod view;

pub use filter::*;
pub use format::*;
pub use summary::*;
pub use view::*;
