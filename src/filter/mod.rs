pub mod query;
pub mod types;

pub use query::QueryValues;
pub use types::{PageRequest, SortDirection};
