pub mod types;
pub mod predicate;
pub mod pagination;
pub mod filter;
pub mod filter_order;
pub mod error;

pub use error::FilterError;
pub use filter::{BuiltQuery, FilteredQuery};
pub use pagination::{PageParams, Pagination};
pub use predicate::{non_empty, Predicate};
pub use types::*;
