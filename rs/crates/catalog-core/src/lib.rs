//! catalog-core: Filtering, ordering and projection for the profile catalog.
//!
//! The crate is host-agnostic: the dev server and the WASM reducer both drive
//! the same [`Controller`] and render its view through [`render_view`].

pub mod audit;
pub mod debounce;
mod dom;
pub mod error;
pub mod feed;
pub mod model;
pub mod ordering;
mod parse;
pub mod predicate;
pub mod state;
pub mod view;

use std::time::Duration;

use catalog_dom::Snapshot;

pub use dom::{render_view, TABLE_COLUMNS};
pub use error::CatalogError;
pub use feed::{Catalog, Feed};
pub use model::{Pricing, Profile};
pub use ordering::{Direction, SortField, SortSpec};
pub use parse::{action_from_parts, parse_action};
pub use predicate::{Query, Toggle};
pub use state::{Controller, ControllerConfig, Outcome};
pub use view::{Layout, ViewModel};

/// Everything the UI can ask the controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A keystroke in the search box; applied after the debounce delay.
    SearchInput(String),
    /// `checked: None` flips the toggle.
    Toggle { toggle: Toggle, checked: Option<bool> },
    /// `None` restores feed order.
    SelectSort(Option<SortSpec>),
    SortHeader(SortField),
    SetLayout(Layout),
    Tick,
    Unknown,
}

/// Current view as a DOM snapshot.
pub fn snapshot(controller: &Controller) -> Snapshot {
    Snapshot { root: render_view(controller.view()) }
}

/// Parse action bytes, dispatch them and render.
/// Input format: `{"action":"name","payload":{...}}`
pub fn process(controller: &mut Controller, input: &[u8], now: Duration) -> (Outcome, Snapshot) {
    let action = parse::parse_action(input);
    let outcome = controller.handle(action, now);
    (outcome, snapshot(controller))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_process_round() {
        let feed = Feed::from_json(
            r#"{"lastUpdated":"2025-02-01","profiles":[
                {"id":"001","avatarName":"Shinano","official":true},
                {"id":"002","avatarName":"Karin"}
            ]}"#,
        )
        .unwrap();
        let mut c = Controller::with_catalog(Arc::new(Catalog::from(feed)), ControllerConfig::default());

        let (outcome, snap) = process(&mut c, br#"{"action":"toggle:official","payload":{"checked":true}}"#, Duration::ZERO);
        assert_eq!(outcome, Outcome::Recomputed);
        assert_eq!(snap.root.find_key("count").unwrap().text_content(), "1 / 2 items");
        assert!(snap.root.find_key("profile-001").is_some());
        assert!(snap.root.find_key("profile-002").is_none());

        let (outcome, _) = process(&mut c, b"{\"action\":\"nope\"}", Duration::ZERO);
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_snapshot_serializes_events() {
        let c = Controller::with_catalog(Arc::new(Catalog::empty()), ControllerConfig::default());
        let json = serde_json::to_string(&snapshot(&c)).unwrap();
        assert!(json.contains(r#""input":"search_input""#));
        assert!(json.starts_with(r#"{"root":"#));
    }
}
