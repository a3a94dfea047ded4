//! UI state controller.
//!
//! [`SessionState`] is the only mutable state of a dashboard session.
//! User actions are translated into a target `(page, per_page, filters)`
//! and handed to [`Dashboard::load_page`], which is the single place the
//! state is written.

use crate::dashboard::orchestrator::{Dashboard, LoadOutcome};
use crate::dashboard::render::RenderSink;
use crate::dashboard::request::DEFAULT_PAGE;
use crate::dashboard::types::{FilterCriteria, Pagination};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Last attempted page (>= 1).
    pub page: u32,
    /// Last attempted page size (> 0).
    pub per_page: u32,
    /// Last attempted filters.
    pub filters: FilterCriteria,
    /// Pagination block from the last successful load.
    pub last_pagination: Option<Pagination>,
}

impl SessionState {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: per_page.max(1),
            filters: FilterCriteria::default(),
            last_pagination: None,
        }
    }

    /// Server-reported pagination, if it describes the current page.
    fn current_pagination(&self) -> Option<&Pagination> {
        self.last_pagination
            .as_ref()
            .filter(|pagination| pagination.page == self.page)
    }

    pub fn can_go_back(&self) -> bool {
        match self.current_pagination() {
            Some(pagination) => pagination.has_prev,
            None => self.page > 1,
        }
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_pagination()
            .map_or(true, |pagination| pagination.has_next)
    }

    /// Where `action` should take the dashboard, or `None` if the action
    /// does nothing in the current state.
    pub fn target_for(&self, action: UserAction) -> Option<LoadTarget> {
        match action {
            UserAction::ApplyFilters(filters) | UserAction::SubmitFilters(filters) => {
                Some(LoadTarget {
                    page: DEFAULT_PAGE,
                    per_page: self.per_page,
                    filters,
                })
            }
            UserAction::PreviousPage if self.page > 1 && self.can_go_back() => Some(LoadTarget {
                page: self.page - 1,
                per_page: self.per_page,
                filters: self.filters.clone(),
            }),
            UserAction::NextPage if self.page < u32::MAX && self.can_go_forward() => Some(LoadTarget {
                page: self.page.saturating_add(1),
                per_page: self.per_page,
                filters: self.filters.clone(),
            }),
            UserAction::ChangePageSize(per_page) if per_page > 0 => Some(LoadTarget {
                page: DEFAULT_PAGE,
                per_page,
                filters: self.filters.clone(),
            }),
            UserAction::Reload => Some(LoadTarget {
                page: self.page,
                per_page: self.per_page,
                filters: self.filters.clone(),
            }),
            _ => None,
        }
    }
}

/// User-triggered dashboard actions.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// The apply-filters button.
    ApplyFilters(FilterCriteria),
    /// Enter pressed inside a filter input.
    SubmitFilters(FilterCriteria),
    PreviousPage,
    NextPage,
    /// Page-size selector changed.
    ChangePageSize(u32),
    /// Re-issue the current attempted state.
    Reload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadTarget {
    pub page: u32,
    pub per_page: u32,
    pub filters: FilterCriteria,
}

impl<S: RenderSink> Dashboard<S> {
    /// Initial load: first page, configured page size, no filters.
    pub async fn start(&self) -> LoadOutcome {
        let per_page = self.session().await.per_page;
        self.load_page(DEFAULT_PAGE, per_page, FilterCriteria::default())
            .await
    }

    /// Handle a user action. `None` means the action was ignored (for
    /// example "previous" on the first page).
    pub async fn dispatch(&self, action: UserAction) -> Option<LoadOutcome> {
        let target = match self.session().await.target_for(action.clone()) {
            Some(target) => target,
            None => {
                tracing::debug!("Ignoring {:?} in current state", action);
                return None;
            }
        };

        Some(
            self.load_page(target.page, target.per_page, target.filters)
                .await,
        )
    }
}
