use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::debounce::Debouncer;
use crate::feed::{Catalog, Feed};
use crate::ordering::{self, Direction, SortField, SortSpec};
use crate::predicate::{self, Query, Toggle};
use crate::view::{self, Layout, ViewContext, ViewModel};
use crate::Action;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub debounce: Duration,
    pub layout: Layout,
    pub form_url: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { debounce: DEFAULT_DEBOUNCE, layout: Layout::Cards, form_url: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// What handling an action did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The view was recomputed and should be re-rendered.
    Recomputed,
    /// A search is waiting; call [`Controller::tick`] at `due`.
    Deferred { due: Duration },
    Unchanged,
}

/// Owns the query, the sort and the current view. Every state change goes
/// through [`Controller::handle`] in arrival order.
#[derive(Debug)]
pub struct Controller {
    catalog: Arc<Catalog>,
    load: LoadState,
    query: Query,
    sort: Option<SortSpec>,
    layout: Layout,
    form_url: Option<String>,
    search: Debouncer<String>,
    view: ViewModel,
}

impl Controller {
    /// A controller waiting for its feed.
    pub fn new(config: ControllerConfig) -> Self {
        let mut c = Self {
            catalog: Arc::new(Catalog::empty()),
            load: LoadState::Loading,
            query: Query::show_all(),
            sort: None,
            layout: config.layout,
            form_url: config.form_url,
            search: Debouncer::new(config.debounce),
            view: view::project(&[], 0, &ViewContext { loading: true, ..ViewContext::default() }),
        };
        c.recompute();
        c
    }

    pub fn with_catalog(catalog: Arc<Catalog>, config: ControllerConfig) -> Self {
        let mut c = Self::new(config);
        c.catalog = catalog;
        c.load = LoadState::Loaded;
        c.recompute();
        c
    }

    /// Install the result of the initial feed load.
    pub fn load(&mut self, result: Result<Feed, String>) {
        match result {
            Ok(feed) => {
                self.catalog = Arc::new(Catalog::from(feed));
                self.load = LoadState::Loaded;
            }
            Err(msg) => {
                self.catalog = Arc::new(Catalog::empty());
                self.load = LoadState::Failed(msg);
            }
        }
        self.recompute();
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.view.ids()
    }

    /// When the pending search, if any, becomes due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.search.deadline()
    }

    pub fn handle(&mut self, action: Action, now: Duration) -> Outcome {
        match action {
            Action::SearchInput(value) => {
                let due = self.search.push(value, now);
                Outcome::Deferred { due }
            }
            Action::Tick => self.tick(now),
            Action::Toggle { toggle, checked } => {
                let on = checked.unwrap_or(!self.query.is_active(toggle));
                self.apply_toggle(toggle, on);
                self.recompute();
                Outcome::Recomputed
            }
            Action::SelectSort(spec) => {
                self.sort = spec;
                self.recompute();
                Outcome::Recomputed
            }
            Action::SortHeader(field) => {
                self.sort = Some(next_header_sort(self.sort, field));
                self.recompute();
                Outcome::Recomputed
            }
            Action::SetLayout(layout) => {
                if layout == self.layout {
                    return Outcome::Unchanged;
                }
                self.layout = layout;
                self.recompute();
                Outcome::Recomputed
            }
            Action::Unknown => Outcome::Unchanged,
        }
    }

    /// Apply the pending search if it is due. Stale wake-ups are no-ops.
    pub fn tick(&mut self, now: Duration) -> Outcome {
        match self.search.poll(now) {
            Some(term) => {
                self.query.set_term(&term);
                self.recompute();
                Outcome::Recomputed
            }
            None => match self.search.deadline() {
                Some(due) => Outcome::Deferred { due },
                None => Outcome::Unchanged,
            },
        }
    }

    fn apply_toggle(&mut self, toggle: Toggle, on: bool) {
        self.query.set(toggle, on);
        if !on {
            return;
        }
        if toggle == Toggle::ShowAll {
            self.query.clear_groups();
        } else {
            self.query.set(Toggle::ShowAll, false);
        }
    }

    fn recompute(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let mut visible = predicate::filter(catalog.profiles(), &self.query);
        if let Some(spec) = self.sort {
            ordering::sort_profiles(&mut visible, spec);
        }

        let (failure, loading) = match &self.load {
            LoadState::Loading => (None, true),
            LoadState::Loaded => (None, false),
            LoadState::Failed(msg) => (Some(msg.as_str()), false),
        };
        let ctx = ViewContext {
            layout: self.layout,
            query: Some(&self.query),
            sort: self.sort,
            last_updated: catalog.last_updated(),
            form_url: self.form_url.as_deref(),
            failure,
            loading,
        };
        self.view = view::project(&visible, catalog.len(), &ctx);
        debug!(
            shown = self.view.counts.shown,
            total = self.view.counts.total,
            term = %self.query.term(),
            sort = ?self.sort.map(|s| s.to_string()),
            "view recomputed"
        );
    }
}

/// Same column flips the direction; a new column starts ascending.
fn next_header_sort(current: Option<SortSpec>, field: SortField) -> SortSpec {
    match current {
        Some(spec) if spec.field == field => SortSpec::new(field, spec.direction.toggled()),
        _ => SortSpec::new(field, Direction::Asc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pricing, Profile};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn catalog() -> Arc<Catalog> {
        let mut a = Profile::with_id("001");
        a.avatar_name = "Shinano".into();
        a.official = true;
        a.pricing = Pricing::Free;
        let mut b = Profile::with_id("002");
        b.avatar_name = "Karin".into();
        b.forward_support = true;
        b.pricing = Pricing::PaidStandalone;
        let mut c = Profile::with_id("010");
        c.avatar_name = "Shinra".into();
        c.forward_support = true;
        c.reverse_support = true;
        Arc::new(Catalog::new(vec![a, b, c], Some("2025-01-01".into())))
    }

    fn controller() -> Controller {
        Controller::with_catalog(catalog(), ControllerConfig::default())
    }

    #[test]
    fn test_initial_view_shows_everything_in_feed_order() {
        let c = controller();
        assert!(c.query().is_active(Toggle::ShowAll));
        assert_eq!(c.visible_ids(), ["001", "002", "010"]);
        assert_eq!(c.view().counts.label(), "3 / 3 items");
    }

    #[test]
    fn test_search_is_debounced_last_write_wins() {
        let mut c = controller();
        assert_eq!(c.handle(Action::SearchInput("s".into()), ms(0)), Outcome::Deferred { due: ms(300) });
        assert_eq!(c.handle(Action::SearchInput("shi".into()), ms(100)), Outcome::Deferred { due: ms(400) });
        // Stale wake-up from the first keystroke
        assert_eq!(c.tick(ms(300)), Outcome::Deferred { due: ms(400) });
        assert_eq!(c.visible_ids().len(), 3);
        assert_eq!(c.tick(ms(400)), Outcome::Recomputed);
        assert_eq!(c.visible_ids(), ["001", "010"]);
        assert_eq!(c.tick(ms(800)), Outcome::Unchanged);
    }

    #[test]
    fn test_specific_toggle_clears_show_all() {
        let mut c = controller();
        c.handle(Action::Toggle { toggle: Toggle::Official, checked: Some(true) }, ms(0));
        assert!(!c.query().is_active(Toggle::ShowAll));
        assert_eq!(c.visible_ids(), ["001"]);
    }

    #[test]
    fn test_show_all_clears_specific_toggles() {
        let mut c = controller();
        c.handle(Action::Toggle { toggle: Toggle::Paid, checked: Some(true) }, ms(0));
        assert_eq!(c.visible_ids(), ["002"]);
        c.handle(Action::Toggle { toggle: Toggle::ShowAll, checked: None }, ms(0));
        assert!(!c.query().is_active(Toggle::Paid));
        assert_eq!(c.visible_ids(), ["001", "002", "010"]);
    }

    #[test]
    fn test_unchecking_last_toggle_matches_everything() {
        let mut c = controller();
        c.handle(Action::Toggle { toggle: Toggle::Bidirectional, checked: Some(true) }, ms(0));
        assert_eq!(c.visible_ids(), ["010"]);
        c.handle(Action::Toggle { toggle: Toggle::Bidirectional, checked: Some(false) }, ms(0));
        assert_eq!(c.visible_ids(), ["001", "002", "010"]);
    }

    #[test]
    fn test_header_clicks_toggle_direction() {
        let mut c = controller();
        c.handle(Action::SortHeader(SortField::AvatarName), ms(0));
        assert_eq!(c.sort(), Some(SortSpec::asc(SortField::AvatarName)));
        assert_eq!(c.visible_ids(), ["002", "001", "010"]);
        c.handle(Action::SortHeader(SortField::AvatarName), ms(0));
        assert_eq!(c.sort(), Some(SortSpec::desc(SortField::AvatarName)));
        assert_eq!(c.visible_ids(), ["010", "001", "002"]);
        c.handle(Action::SortHeader(SortField::Id), ms(0));
        assert_eq!(c.sort(), Some(SortSpec::asc(SortField::Id)));
    }

    #[test]
    fn test_select_sort_and_feed_order() {
        let mut c = controller();
        c.handle(Action::SelectSort(Some(SortSpec::desc(SortField::Id))), ms(0));
        assert_eq!(c.visible_ids(), ["010", "002", "001"]);
        c.handle(Action::SelectSort(None), ms(0));
        assert_eq!(c.visible_ids(), ["001", "002", "010"]);
    }

    #[test]
    fn test_reapplying_query_and_sort_is_idempotent() {
        let mut c = controller();
        let forward = Action::Toggle { toggle: Toggle::Forward, checked: Some(true) };
        let sort = Action::SelectSort(Some(SortSpec::desc(SortField::AvatarName)));
        c.handle(forward.clone(), ms(0));
        c.handle(Action::SearchInput("n".into()), ms(0));
        c.tick(ms(300));
        c.handle(sort.clone(), ms(300));
        let first: Vec<String> = c.visible_ids().into_iter().map(String::from).collect();
        assert_eq!(first, ["010", "002"]);

        c.handle(forward, ms(400));
        c.handle(Action::SearchInput("n".into()), ms(400));
        c.tick(ms(700));
        c.handle(sort, ms(700));
        assert_eq!(c.visible_ids(), first);

        // Filtering and sorting the visible rows again keeps them as they are
        let visible: Vec<Profile> = c
            .catalog()
            .profiles()
            .iter()
            .filter(|p| first.contains(&p.id))
            .cloned()
            .collect();
        let mut again = predicate::filter(&visible, c.query());
        ordering::sort_profiles(&mut again, SortSpec::desc(SortField::AvatarName));
        let again: Vec<&str> = again.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(again, first);
    }

    #[test]
    fn test_unknown_action_leaves_state_unchanged() {
        let mut c = controller();
        let before = c.view().clone();
        assert_eq!(c.handle(Action::Unknown, ms(0)), Outcome::Unchanged);
        assert_eq!(c.view(), &before);
        assert_eq!(c.handle(Action::SetLayout(Layout::Cards), ms(0)), Outcome::Unchanged);
    }

    #[test]
    fn test_load_failure_shows_error_state() {
        let mut c = Controller::new(ControllerConfig::default());
        assert_eq!(c.view().status, view::Status::Loading);
        c.load(Err("connection refused".into()));
        assert_eq!(c.view().status, view::Status::Failed("connection refused".into()));
        assert!(c.catalog().is_empty());
    }

    #[test]
    fn test_load_feed() {
        let mut c = Controller::new(ControllerConfig::default());
        let feed = Feed::from_json(r#"{"profiles":[{"id":"b"},{"id":"a"}]}"#).unwrap();
        c.load(Ok(feed));
        assert_eq!(c.load_state(), &LoadState::Loaded);
        assert_eq!(c.visible_ids(), ["a", "b"]);
    }
}
