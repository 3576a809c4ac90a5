use crate::core::Record;

/// What a list screen renders. Empty and failed are separate states.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    /// Nothing requested yet
    Idle,
    /// A fetch is pending. `placeholder` holds the previous page's rows when
    /// only the page index changed, and is empty otherwise.
    Loading { placeholder: Vec<Record> },
    /// The server reported no records for the current filters
    Empty,
    /// The last fetch failed; `message` is safe to show to users
    Failed { message: String },
    Rows {
        items: Vec<Record>,
        page_index: usize,
        page_buttons: Vec<usize>,
        total_count: u64,
    },
}

impl ListView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Rows to draw, whether final or placeholder.
    pub fn rows(&self) -> &[Record] {
        match self {
            Self::Loading { placeholder } => placeholder,
            Self::Rows { items, .. } => items,
            _ => &[],
        }
    }
}
