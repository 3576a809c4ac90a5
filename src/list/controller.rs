use super::view::ListView;
use crate::adapter::sort_records;
use crate::cache::QueryCache;
use crate::core::{
    Filters, ListError, ListStatus, PageRequest, PageResponse, Result, SortCriterion, total_pages,
};
use crate::resources::ResourceConfig;
use std::sync::Arc;
use tracing::debug;

/// Pagination, filter and sort state of one mounted list view.
///
/// Setters are pure state transitions; fetching goes through
/// [`ListController::begin_fetch`] / [`ListController::complete`] or the
/// [`ListController::load`] shortcut.
#[derive(Debug, Clone)]
pub struct ListController {
    resource: String,
    page_sizes: Vec<usize>,
    page_index: usize,
    page_size: usize,
    filters: Filters,
    sort: Option<SortCriterion>,
    /// Filter names the screen sends. `None` accepts any name
    filter_fields: Option<&'static [&'static str]>,
    /// Orderings the screen offers. `None` accepts any criterion
    sort_options: Option<&'static [SortCriterion]>,
    status: ListStatus,
    last_error: Option<ListError>,
    /// Rows on screen. May belong to `shown` rather than the current request
    data: Option<Arc<PageResponse>>,
    /// Request of the last page that loaded successfully
    shown: Option<PageRequest>,
    /// Last total reported for the current filters
    total_count: Option<u64>,
}

impl ListController {
    pub fn new(resource: &ResourceConfig) -> Self {
        let mut list = Self::build(resource.name, resource.page_sizes.to_vec(), resource.default_page_size);
        list.filter_fields = Some(resource.filter_fields);
        list.sort_options = Some(resource.sort_options);
        list
    }

    /// Controller with a caller-declared page size set.
    pub fn with_page_sizes(resource: &str, page_sizes: &[usize], default_size: usize) -> Result<Self> {
        if page_sizes.is_empty() || page_sizes.contains(&0) {
            return Err(ListError::InvalidRequest(
                "Page sizes must be a non-empty set of positive values".into(),
            ));
        }
        if !page_sizes.contains(&default_size) {
            return Err(ListError::InvalidRequest(format!(
                "Default page size {} is not one of {:?}",
                default_size, page_sizes
            )));
        }
        Ok(Self::build(resource, page_sizes.to_vec(), default_size))
    }

    fn build(resource: &str, page_sizes: Vec<usize>, page_size: usize) -> Self {
        Self {
            resource: resource.to_string(),
            page_sizes,
            page_index: 0,
            page_size,
            filters: Filters::new(),
            sort: None,
            filter_fields: None,
            sort_options: None,
            status: ListStatus::Idle,
            last_error: None,
            data: None,
            shown: None,
            total_count: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_sizes(&self) -> &[usize] {
        &self.page_sizes
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sort(&self) -> Option<SortCriterion> {
        self.sort
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&ListError> {
        self.last_error.as_ref()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Rows on screen, possibly from the previous page while the next one loads.
    pub fn data(&self) -> Option<&Arc<PageResponse>> {
        self.data.as_ref()
    }

    /// True when the rows on screen belong to a different page than the one requested.
    pub fn is_placeholder(&self) -> bool {
        self.data.is_some() && self.shown.as_ref() != Some(&self.current_request())
    }

    /// Number of pages, once a total is known.
    pub fn total_pages(&self) -> Option<usize> {
        self.total_count.map(|total| total_pages(total, self.page_size))
    }

    /// Indices `0..total_pages` for the page navigation controls.
    pub fn page_buttons(&self) -> Vec<usize> {
        (0..self.total_pages().unwrap_or(0)).collect()
    }

    pub fn current_request(&self) -> PageRequest {
        PageRequest {
            resource: self.resource.clone(),
            page_index: self.page_index,
            page_size: self.page_size,
            filters: self.filters.clone(),
            sort: self.sort,
        }
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// Move to page `index`, clamped to the known page range.
    pub fn set_page(&mut self, index: usize) {
        let before = self.current_request();
        self.page_index = match self.total_pages() {
            Some(0) => 0,
            Some(pages) => index.min(pages - 1),
            None => index,
        };
        self.params_changed(&before);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page_index.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page_index.saturating_sub(1));
    }

    /// Change the page size. Sizes outside the declared set are ignored.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !self.page_sizes.contains(&size) {
            debug!(resource = %self.resource, size, "ignoring page size outside allowed set");
            return false;
        }
        if size == self.page_size {
            return true;
        }
        let before = self.current_request();
        self.page_size = size;
        self.page_index = 0;
        self.params_changed(&before);
        true
    }

    /// Set one filter and go back to the first page. An empty value clears the filter.
    /// Names the screen does not declare are ignored and `false` is returned.
    pub fn set_filter(&mut self, name: &str, value: &str) -> bool {
        if self.filter_fields.is_some_and(|fields| !fields.contains(&name)) {
            debug!(resource = %self.resource, filter = name, "ignoring undeclared filter");
            return false;
        }
        let before = self.current_request();
        if value.trim().is_empty() {
            self.filters.remove(name);
        } else {
            self.filters.insert(name.to_string(), value.to_string());
        }
        self.page_index = 0;
        if self.filters != before.filters {
            self.total_count = None;
        }
        self.params_changed(&before);
        true
    }

    pub fn clear_filters(&mut self) {
        let before = self.current_request();
        self.filters.clear();
        self.page_index = 0;
        if self.filters != before.filters {
            self.total_count = None;
        }
        self.params_changed(&before);
    }

    /// Change the ordering and go back to the first page. Criteria the screen
    /// does not offer are ignored and `false` is returned.
    pub fn set_sort(&mut self, sort: Option<SortCriterion>) -> bool {
        if let (Some(criterion), Some(options)) = (sort, self.sort_options) {
            if !options.contains(&criterion) {
                debug!(resource = %self.resource, sort = %criterion, "ignoring unoffered sort");
                return false;
            }
        }
        let before = self.current_request();
        self.sort = sort;
        self.page_index = 0;
        self.params_changed(&before);
        true
    }

    /// Every parameter change leaves `Success`/`Error` through `Loading`.
    /// Rows survive a page-only change and are dropped otherwise.
    fn params_changed(&mut self, before: &PageRequest) {
        let after = self.current_request();
        if *before == after {
            return;
        }

        if !before.same_query(&after) {
            self.data = None;
        }
        if matches!(self.status, ListStatus::Success | ListStatus::Error) {
            self.status = ListStatus::Loading;
            self.last_error = None;
        }
        debug!(from = %before, to = %after, status = %self.status, "list parameters changed");
    }

    /// Enter `Loading` for the current request and return it.
    pub fn begin_fetch(&mut self) -> PageRequest {
        let request = self.current_request();
        self.status = ListStatus::Loading;
        self.last_error = None;
        if let Some(shown) = &self.shown {
            if !shown.same_query(&request) {
                self.data = None;
            }
        }
        request
    }

    /// Apply a fetch result. Results for any request other than the current
    /// one are discarded and `false` is returned.
    ///
    /// When the reported total leaves the requested page out of range, the
    /// page index is clamped and the list stays `Loading`: the caller fetches
    /// [`ListController::current_request`] next.
    pub fn complete(&mut self, request: &PageRequest, result: Result<Arc<PageResponse>>) -> bool {
        if *request != self.current_request() {
            debug!(stale = %request, "discarding result for a superseded request");
            return false;
        }

        match result {
            Ok(page) => {
                let last_page = total_pages(page.total_count, self.page_size).saturating_sub(1);
                if self.page_index > last_page {
                    debug!(
                        requested = self.page_index,
                        last_page,
                        total = page.total_count,
                        "page out of range, clamping"
                    );
                    self.total_count = Some(page.total_count);
                    self.page_index = last_page;
                    self.status = ListStatus::Loading;
                    return true;
                }
                self.total_count = Some(page.total_count);
                self.data = Some(page);
                self.shown = Some(request.clone());
                self.status = ListStatus::Success;
                self.last_error = None;
            }
            Err(err) => {
                self.data = None;
                self.status = ListStatus::Error;
                self.last_error = Some(err);
            }
        }
        true
    }

    /// Fetch the current page through `cache` and apply the result.
    pub async fn load(&mut self, cache: &QueryCache) -> ListStatus {
        self.run(cache, false).await
    }

    /// Manual retry after a failure. Bypasses the cache for the current page.
    pub async fn retry(&mut self, cache: &QueryCache) -> ListStatus {
        self.run(cache, true).await
    }

    // Repeats while `complete` clamps the page; each pass lowers the index.
    async fn run(&mut self, cache: &QueryCache, mut force: bool) -> ListStatus {
        loop {
            let request = self.begin_fetch();

            if self.data.is_none() {
                if let Some(shown) = &self.shown {
                    self.data = cache.placeholder(shown, &request);
                }
            }

            let result = if force {
                cache.refetch(request.clone()).await
            } else {
                cache.fetch(request.clone()).await
            };
            force = false;

            if !self.complete(&request, result) || self.status != ListStatus::Loading {
                return self.status;
            }
        }
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Snapshot for rendering. Rows are ordered client-side by the current sort.
    pub fn view(&self) -> ListView {
        match self.status {
            ListStatus::Idle => ListView::Idle,
            ListStatus::Loading => ListView::Loading {
                placeholder: self
                    .data
                    .as_ref()
                    .map(|page| sort_records(&page.items, self.sort))
                    .unwrap_or_default(),
            },
            ListStatus::Error => ListView::Failed {
                message: self
                    .last_error
                    .as_ref()
                    .map(ListError::user_message)
                    .unwrap_or_else(|| "Something went wrong while loading this list.".to_string()),
            },
            ListStatus::Success => match &self.data {
                Some(page) if page.total_count > 0 => ListView::Rows {
                    items: sort_records(&page.items, self.sort),
                    page_index: self.page_index,
                    page_buttons: self.page_buttons(),
                    total_count: page.total_count,
                },
                _ => ListView::Empty,
            },
        }
    }
}
