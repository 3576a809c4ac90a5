pub mod search;
pub mod sort;

pub use search::filter_records;
pub use sort::{RecordComparator, SortKey, sort_by_keys, sort_records};
