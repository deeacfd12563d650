//! Deterministic pagination and filtering over an in-memory ordered slice.
//!
//! Works the same over a fully fetched list or over a server-provided page
//! already in memory. Pages are 1-based.

use serde::Serialize;

/// Default number of rows per page on list screens.
pub const DEFAULT_PER_PAGE: usize = 15;

// ---------------------------------------------------------------------------
// Window descriptor
// ---------------------------------------------------------------------------

/// Position of a page within a collection.
///
/// `from`/`to` are 1-based inclusive row numbers, both `0` for an empty
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub from: usize,
    pub to: usize,
    pub current_page: usize,
    pub last_page: usize,
    pub total: usize,
}

impl PageInfo {
    /// Compute the window for `page` of `total` rows.
    ///
    /// `page` and `per_page` below 1 are treated as 1.
    pub fn new(total: usize, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let from = if total == 0 {
            0
        } else {
            (page - 1).saturating_mul(per_page).saturating_add(1)
        };
        let to = page.saturating_mul(per_page).min(total);

        Self {
            from,
            to,
            current_page: page,
            last_page,
            total,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn first_page(&self) -> usize {
        1
    }

    pub fn prev_page(&self) -> usize {
        self.current_page.saturating_sub(1).clamp(1, self.last_page)
    }

    pub fn next_page(&self) -> usize {
        self.current_page.saturating_add(1).clamp(1, self.last_page)
    }

    pub fn last_page(&self) -> usize {
        self.last_page
    }

    /// `"Showing 31-37 of 37"`.
    pub fn summary(&self) -> String {
        format!("Showing {}-{} of {}", self.from, self.to, self.total)
    }

    /// `"Page 3 of 3"`.
    pub fn position(&self) -> String {
        format!("Page {} of {}", self.current_page, self.last_page)
    }
}

/// One page of items plus its window descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub info: PageInfo,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Slice `items` into the requested page.
///
/// A page past the end yields no items; callers keep `page` within
/// `[1, last_page]` through the [`PageInfo`] navigation helpers.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let info = PageInfo::new(items.len(), page, per_page);
    let start = (info.current_page - 1)
        .saturating_mul(per_page.max(1))
        .min(items.len());
    let end = info.to.max(start);

    Page {
        items: items[start..end].to_vec(),
        info,
    }
}

/// Keep the items matching `predicate`, preserving order.
pub fn filter<'a, T>(items: &'a [T], predicate: impl Fn(&T) -> bool) -> Vec<&'a T> {
    items.iter().filter(|item| predicate(*item)).collect()
}

// ---------------------------------------------------------------------------
// Stateful list view
// ---------------------------------------------------------------------------

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A fetched collection with a filter and a current page.
///
/// Changing the filter or replacing the items always resets to page 1.
pub struct ListView<T> {
    items: Vec<T>,
    predicate: Option<Predicate<T>>,
    page: usize,
    per_page: usize,
}

impl<T> ListView<T> {
    pub fn new(items: Vec<T>, per_page: usize) -> Self {
        Self {
            items,
            predicate: None,
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Replace the underlying collection (e.g. after a refresh).
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.page = 1;
    }

    pub fn set_filter(&mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) {
        self.predicate = Some(Box::new(predicate));
        self.page = 1;
    }

    pub fn clear_filter(&mut self) {
        self.predicate = None;
        self.page = 1;
    }

    fn visible(&self) -> Vec<&T> {
        match &self.predicate {
            Some(predicate) => filter(&self.items, predicate),
            None => self.items.iter().collect(),
        }
    }

    /// The current page of visible items.
    pub fn window(&self) -> Page<&T> {
        paginate(&self.visible(), self.page, self.per_page)
    }

    pub fn info(&self) -> PageInfo {
        PageInfo::new(self.visible().len(), self.page, self.per_page)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn go_first(&mut self) {
        self.page = self.info().first_page();
    }

    pub fn go_prev(&mut self) {
        self.page = self.info().prev_page();
    }

    pub fn go_next(&mut self) {
        self.page = self.info().next_page();
    }

    pub fn go_last(&mut self) {
        self.page = self.info().last_page();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_window() {
        let page = paginate::<u32>(&[], 1, 15);
        assert!(page.items.is_empty());
        assert_eq!(
            page.info,
            PageInfo {
                from: 0,
                to: 0,
                current_page: 1,
                last_page: 1,
                total: 0
            }
        );
    }

    #[test]
    fn empty_collection_keeps_requested_page() {
        let page = paginate::<u32>(&[], 4, 15);
        assert_eq!(page.info.current_page, 4);
        assert_eq!(page.info.last_page, 1);
        assert_eq!((page.info.from, page.info.to), (0, 0));
    }

    #[test]
    fn third_page_of_thirty_seven() {
        let items: Vec<u32> = (1..=37).collect();
        let page = paginate(&items, 3, 15);
        assert_eq!(page.info.from, 31);
        assert_eq!(page.info.to, 37);
        assert_eq!(page.info.last_page, 3);
        assert_eq!(page.info.total, 37);
        assert_eq!(page.items, (31..=37).collect::<Vec<_>>());
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let items: Vec<u32> = (1..=30).collect();
        let page = paginate(&items, 2, 15);
        assert_eq!(page.info.last_page, 2);
        assert_eq!(page.items.len(), 15);
        assert!(!page.info.has_next());
    }

    #[test]
    fn page_past_end_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(&items, 9, 15);
        assert!(page.items.is_empty());
    }

    #[test]
    fn huge_page_number_saturates() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(&items, usize::MAX, 15);
        assert!(page.items.is_empty());
        assert_eq!(page.info.current_page, usize::MAX);
        assert_eq!(page.info.to, 5);
        assert_eq!(page.info.from, usize::MAX);
        assert_eq!(page.info.next_page(), 1);
        assert_eq!(page.info.prev_page(), 1);
    }

    #[test]
    fn page_zero_treated_as_first() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(&items, 0, 2);
        assert_eq!(page.info.current_page, 1);
        assert_eq!(page.items, vec![1, 2]);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let info = PageInfo::new(37, 1, 15);
        assert_eq!(info.prev_page(), 1);
        assert_eq!(info.next_page(), 2);
        let info = PageInfo::new(37, 3, 15);
        assert_eq!(info.next_page(), 3);
        assert_eq!(info.last_page(), 3);
        assert!(info.has_prev());
        let empty = PageInfo::new(0, 1, 15);
        assert_eq!(empty.next_page(), 1);
        assert_eq!(empty.prev_page(), 1);
    }

    #[test]
    fn summary_text() {
        let info = PageInfo::new(37, 3, 15);
        assert_eq!(info.summary(), "Showing 31-37 of 37");
        assert_eq!(info.position(), "Page 3 of 3");
    }

    #[test]
    fn filter_preserves_order() {
        let items = vec![5, 2, 8, 3, 10];
        let even = filter(&items, |n| n % 2 == 0);
        assert_eq!(even, vec![&2, &8, &10]);
    }

    #[test]
    fn list_view_filter_resets_page() {
        let mut view = ListView::new((1..=40).collect::<Vec<u32>>(), 15);
        view.go_last();
        assert_eq!(view.current_page(), 3);

        view.set_filter(|n| *n > 20);
        assert_eq!(view.current_page(), 1);
        let window = view.window();
        assert_eq!(window.info.total, 20);
        assert_eq!(*window.items[0], 21);
    }

    #[test]
    fn list_view_navigation() {
        let mut view = ListView::new((1..=37).collect::<Vec<u32>>(), 15);
        view.go_prev();
        assert_eq!(view.current_page(), 1);
        view.go_next();
        view.go_next();
        view.go_next();
        assert_eq!(view.current_page(), 3);
        assert_eq!(view.window().items.len(), 7);
        view.go_first();
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn refresh_resets_page() {
        let mut view = ListView::new((1..=37).collect::<Vec<u32>>(), 15);
        view.go_last();
        view.set_items(vec![1, 2, 3]);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.info().last_page, 1);
    }
}
