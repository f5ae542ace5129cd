//! Table data model: dynamic values, hierarchical rows, column definitions
//! and cell formats.

mod column;
mod format;
mod row;
mod value;

pub use column::*;
pub use format::*;
pub use row::*;
pub use value::*;
