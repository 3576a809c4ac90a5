//! Per-screen list presets.
//!
//! Every list screen is the same controller over a different resource; a
//! preset names the endpoint, the page sizes the screen offers, the filters it
//! exposes and the orderings it allows.

use crate::core::SortCriterion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Endpoint path segment, e.g. `packages` for `GET /packages`
    pub name: &'static str,
    /// Page sizes the screen offers; anything else is ignored
    pub page_sizes: &'static [usize],
    pub default_page_size: usize,
    /// Filter parameters the screen sends
    pub filter_fields: &'static [&'static str],
    /// Text fields searched client-side
    pub search_fields: &'static [&'static str],
    pub sort_options: &'static [SortCriterion],
}

impl ResourceConfig {
    pub fn allows_page_size(&self, size: usize) -> bool {
        self.page_sizes.contains(&size)
    }

    pub fn allows_filter(&self, name: &str) -> bool {
        self.filter_fields.contains(&name)
    }

    pub fn allows_sort(&self, sort: SortCriterion) -> bool {
        self.sort_options.contains(&sort)
    }
}

pub const PACKAGES: ResourceConfig = ResourceConfig {
    name: "packages",
    page_sizes: &[6, 9, 12, 15],
    default_page_size: 9,
    filter_fields: &["tourType", "search"],
    search_fields: &["tripTitle", "tourType"],
    sort_options: &SortCriterion::ALL,
};

pub const USERS: ResourceConfig = ResourceConfig {
    name: "users",
    page_sizes: &[10, 20, 50],
    default_page_size: 10,
    filter_fields: &["role", "search"],
    search_fields: &["name", "email"],
    sort_options: &[],
};

pub const GUIDES: ResourceConfig = ResourceConfig {
    name: "guides",
    page_sizes: &[6, 9, 12],
    default_page_size: 6,
    filter_fields: &["search"],
    search_fields: &["name", "email"],
    sort_options: &[],
};

pub const BOOKINGS: ResourceConfig = ResourceConfig {
    name: "bookings",
    page_sizes: &[5, 10, 20],
    default_page_size: 10,
    filter_fields: &["email", "guideEmail", "status"],
    search_fields: &["packageName", "touristName"],
    sort_options: &[SortCriterion::PriceAsc, SortCriterion::PriceDesc],
};

pub const STORIES: ResourceConfig = ResourceConfig {
    name: "stories",
    page_sizes: &[6, 12],
    default_page_size: 6,
    filter_fields: &["email"],
    search_fields: &["title"],
    sort_options: &[],
};

pub const ALL: [ResourceConfig; 5] = [PACKAGES, USERS, GUIDES, BOOKINGS, STORIES];

/// Preset by endpoint name
pub fn lookup(name: &str) -> Option<ResourceConfig> {
    ALL.iter().copied().find(|r| r.name.eq_ignore_ascii_case(name.trim()))
}
