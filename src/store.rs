//! Single owner of the active review query and its latest result.
//!
//! Every action returns the request to issue (if any) tagged with a sequence
//! number. Only the completion carrying the newest sequence number may touch
//! the visible state; anything older is dropped on arrival.

use tracing::{debug, warn};

use crate::error::ClientError;
use crate::listing::ReviewPage;
use crate::query::{DateRange, FilterState, ReplyStatus, ReviewQuery, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// User intents that change what is being looked at.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    Search(String),
    StarRating(Option<u8>),
    ReplyStatus(Option<ReplyStatus>),
    HasComment(Option<bool>),
    DateRange(Option<DateRange>),
    Sort(SortOrder),
    PerPage(u32),
    GoToPage(u32),
    NextPage,
    PrevPage,
    ClearFilters,
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: ReviewQuery,
}

pub struct ReviewStore {
    account_id: Option<String>,
    default_per_page: u32,
    filters: FilterState,
    state: LoadState,
    current: Option<ReviewPage>,
    error: Option<ClientError>,
    issued: u64,
}

impl ReviewStore {
    pub fn new(account_id: Option<String>, per_page: u32) -> Self {
        Self {
            account_id,
            default_per_page: per_page.max(1),
            filters: FilterState::new(per_page),
            state: LoadState::Idle,
            current: None,
            error: None,
            issued: 0,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Last successfully loaded page. Stays visible while loading and after errors.
    pub fn page(&self) -> Option<&ReviewPage> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    /// Apply a user action. Returns `None` when the action is a no-op
    /// (paging past either end).
    pub fn dispatch(&mut self, action: FilterAction) -> Option<FetchRequest> {
        match action {
            FilterAction::Search(term) => self.filters.search_term = term,
            FilterAction::StarRating(rating) => {
                self.filters.star_rating = rating.filter(|r| (1..=5).contains(r))
            }
            FilterAction::ReplyStatus(status) => self.filters.reply_status = status,
            FilterAction::HasComment(has_comment) => self.filters.has_comment = has_comment,
            FilterAction::DateRange(range) => self.filters.date_range = range,
            FilterAction::Sort(sort) => self.filters.sort = sort,
            FilterAction::PerPage(per_page) => self.filters.per_page = per_page.max(1),
            FilterAction::ClearFilters => {
                self.filters = FilterState::new(self.default_per_page);
            }
            FilterAction::GoToPage(page) => return self.go_to_page(page),
            FilterAction::NextPage => {
                let has_next = self.current.as_ref().is_some_and(|p| p.pagination.has_next);
                if !has_next {
                    return None;
                }
                return self.go_to_page(self.filters.page + 1);
            }
            FilterAction::PrevPage => {
                if self.filters.page <= 1 {
                    return None;
                }
                return self.go_to_page(self.filters.page - 1);
            }
            FilterAction::Refresh => return Some(self.issue()),
        }

        // Everything that is not a page move starts over from the first page.
        self.filters.page = 1;
        Some(self.issue())
    }

    fn go_to_page(&mut self, page: u32) -> Option<FetchRequest> {
        let last = self
            .current
            .as_ref()
            .map(|p| p.pagination.total_pages.max(1))
            .unwrap_or(u32::MAX);
        self.filters.page = page.clamp(1, last);
        Some(self.issue())
    }

    fn issue(&mut self) -> FetchRequest {
        self.issued += 1;
        self.state = LoadState::Loading;
        let request = FetchRequest {
            seq: self.issued,
            query: self.filters.to_query(self.account_id.as_deref()),
        };
        debug!(seq = request.seq, page = request.query.page, "issuing review query");
        request
    }

    /// Record the outcome of request `seq`. Returns whether it was applied.
    pub fn complete(&mut self, seq: u64, result: Result<ReviewPage, ClientError>) -> bool {
        if seq != self.issued {
            debug!(seq, latest = self.issued, "discarding stale review response");
            return false;
        }

        match result {
            Ok(page) => {
                self.current = Some(page);
                self.error = None;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(seq, error = %e, "review query failed");
                // Paging continues from the page still on screen.
                if let Some(shown) = &self.current {
                    self.filters.page = shown.pagination.page.max(1);
                }
                self.error = Some(e);
                self.state = LoadState::Errored;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::tests::payload;
    use crate::listing::transform_list_response;

    fn page(ratings: &[i64], current: u32, pages: u32) -> ReviewPage {
        transform_list_response(&payload(ratings, current, pages)).unwrap()
    }

    fn loaded_store_at_page(target: u32) -> ReviewStore {
        let mut store = ReviewStore::new(Some("acc".into()), 10);
        let first = store.dispatch(FilterAction::Refresh).unwrap();
        store.complete(first.seq, Ok(page(&[5], 1, 10)));
        let jump = store.dispatch(FilterAction::GoToPage(target)).unwrap();
        store.complete(jump.seq, Ok(page(&[4], target, 10)));
        store
    }

    #[test]
    fn starts_idle() {
        let store = ReviewStore::new(None, 10);
        assert_eq!(store.state(), LoadState::Idle);
        assert!(store.page().is_none());
        assert_eq!(store.filters().page, 1);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut store = loaded_store_at_page(5);
        assert_eq!(store.filters().page, 5);

        let request = store.dispatch(FilterAction::StarRating(Some(3))).unwrap();
        assert_eq!(request.query.page, 1);
        assert_eq!(request.query.star_rating, Some(3));
        assert_eq!(store.state(), LoadState::Loading);
    }

    #[test]
    fn every_criterion_change_resets_page() {
        let actions = [
            FilterAction::Search("latte".into()),
            FilterAction::ReplyStatus(Some(ReplyStatus::Replied)),
            FilterAction::HasComment(Some(true)),
            FilterAction::DateRange(Some(DateRange::new(None, None))),
            FilterAction::Sort(SortOrder::Oldest),
            FilterAction::PerPage(50),
        ];
        for action in actions {
            let mut store = loaded_store_at_page(4);
            let request = store.dispatch(action).unwrap();
            assert_eq!(request.query.page, 1);
        }
    }

    #[test]
    fn page_change_keeps_other_filters() {
        let mut store = ReviewStore::new(None, 10);
        let r = store.dispatch(FilterAction::Search("tea".into())).unwrap();
        store.complete(r.seq, Ok(page(&[5, 5], 1, 3)));

        let request = store.dispatch(FilterAction::NextPage).unwrap();
        assert_eq!(request.query.page, 2);
        assert_eq!(request.query.search.as_deref(), Some("tea"));
    }

    #[test]
    fn paging_past_the_ends_is_a_no_op() {
        let mut store = ReviewStore::new(None, 10);
        assert!(store.dispatch(FilterAction::PrevPage).is_none());

        let r = store.dispatch(FilterAction::Refresh).unwrap();
        store.complete(r.seq, Ok(page(&[5], 1, 1)));
        assert!(store.dispatch(FilterAction::NextPage).is_none());
    }

    #[test]
    fn go_to_page_is_clamped_to_known_pages() {
        let mut store = ReviewStore::new(None, 10);
        let r = store.dispatch(FilterAction::Refresh).unwrap();
        store.complete(r.seq, Ok(page(&[5], 1, 4)));

        assert_eq!(store.dispatch(FilterAction::GoToPage(99)).unwrap().query.page, 4);
        assert_eq!(store.dispatch(FilterAction::GoToPage(0)).unwrap().query.page, 1);
    }

    #[test]
    fn out_of_range_star_rating_clears_filter() {
        let mut store = ReviewStore::new(None, 10);
        let request = store.dispatch(FilterAction::StarRating(Some(9))).unwrap();
        assert_eq!(request.query.star_rating, None);
    }

    #[test]
    fn clear_filters_restores_defaults() {
        let mut store = ReviewStore::new(None, 20);
        store.dispatch(FilterAction::Search("x".into()));
        store.dispatch(FilterAction::StarRating(Some(1)));
        store.dispatch(FilterAction::ReplyStatus(Some(ReplyStatus::NotReplied)));
        store.dispatch(FilterAction::PerPage(5));

        let request = store.dispatch(FilterAction::ClearFilters).unwrap();
        assert_eq!(store.filters(), &FilterState::new(20));
        assert_eq!(request.query, FilterState::new(20).to_query(None));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut store = ReviewStore::new(None, 10);
        let a = store.dispatch(FilterAction::Search("a".into())).unwrap();
        let b = store.dispatch(FilterAction::Search("b".into())).unwrap();

        let b_page = page(&[1], 1, 1);
        assert!(store.complete(b.seq, Ok(b_page.clone())));
        assert!(!store.complete(a.seq, Ok(page(&[5, 5, 5], 1, 1))));

        assert_eq!(store.page(), Some(&b_page));
        assert_eq!(store.state(), LoadState::Loaded);
    }

    #[test]
    fn stale_response_does_not_end_loading() {
        let mut store = ReviewStore::new(None, 10);
        let a = store.dispatch(FilterAction::Search("a".into())).unwrap();
        store.dispatch(FilterAction::Search("b".into())).unwrap();

        assert!(!store.complete(a.seq, Ok(page(&[5], 1, 1))));
        assert_eq!(store.state(), LoadState::Loading);
        assert!(store.page().is_none());
    }

    #[test]
    fn failure_keeps_previous_results_visible() {
        let mut store = ReviewStore::new(None, 10);
        let ok = store.dispatch(FilterAction::Refresh).unwrap();
        let first = page(&[4, 2], 1, 2);
        store.complete(ok.seq, Ok(first.clone()));

        let next = store.dispatch(FilterAction::NextPage).unwrap();
        assert!(store.complete(next.seq, Err(ClientError::Network("timeout".into()))));

        assert_eq!(store.state(), LoadState::Errored);
        assert_eq!(store.page(), Some(&first));
        assert!(store.error().is_some_and(|e| e.is_retryable()));

        let retry = store.dispatch(FilterAction::Refresh).unwrap();
        assert_eq!(retry.query.page, 1);
        store.complete(retry.seq, Ok(page(&[3], 1, 2)));
        assert!(store.error().is_none());
        assert_eq!(store.state(), LoadState::Loaded);
    }

    #[test]
    fn paging_after_a_failed_page_moves_from_the_displayed_page() {
        let mut store = loaded_store_at_page(3);
        let failed = store.dispatch(FilterAction::NextPage).unwrap();
        assert_eq!(failed.query.page, 4);
        store.complete(failed.seq, Err(ClientError::Network("timeout".into())));

        assert_eq!(store.page().map(|p| p.pagination.page), Some(3));
        assert_eq!(store.filters().page, 3);
        assert_eq!(store.dispatch(FilterAction::NextPage).unwrap().query.page, 4);
    }

    #[test]
    fn previous_after_a_failed_page_moves_from_the_displayed_page() {
        let mut store = loaded_store_at_page(3);
        let failed = store.dispatch(FilterAction::NextPage).unwrap();
        store.complete(failed.seq, Err(ClientError::Network("timeout".into())));

        assert_eq!(store.dispatch(FilterAction::PrevPage).unwrap().query.page, 2);
    }
}
