pub mod error;
pub mod types;
pub mod value;

pub use error::{ListError, Result};
pub use types::{
    Filters, ListStatus, PageRequest, PageResponse, Record, SortCriterion, total_pages,
};
