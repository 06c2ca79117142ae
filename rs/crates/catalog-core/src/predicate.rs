//! Search term and filter toggles combined into one predicate over profiles.
//!
//! Toggles belong to independent filter groups. Inside a group the active
//! toggles are OR-ed, across groups the results are AND-ed, and a group with
//! nothing active places no constraint. `ShowAll` skips the groups entirely.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;
use crate::model::{Pricing, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterGroup {
    Official,
    Direction,
    Pricing,
}

impl FilterGroup {
    pub const ALL: [FilterGroup; 3] = [FilterGroup::Official, FilterGroup::Direction, FilterGroup::Pricing];

    pub fn toggles(self) -> &'static [Toggle] {
        match self {
            FilterGroup::Official => &[Toggle::Official, Toggle::Unofficial],
            FilterGroup::Direction => &[Toggle::Forward, Toggle::Reverse, Toggle::Bidirectional],
            FilterGroup::Pricing => &[Toggle::Free, Toggle::Paid, Toggle::Bundled],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterGroup::Official => "Source",
            FilterGroup::Direction => "Direction",
            FilterGroup::Pricing => "Pricing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Toggle {
    ShowAll,
    Official,
    Unofficial,
    Forward,
    Reverse,
    /// Both directions at once; narrows rather than widens.
    Bidirectional,
    Free,
    Paid,
    Bundled,
}

impl Toggle {
    pub const ALL: [Toggle; 9] = [
        Toggle::ShowAll,
        Toggle::Official,
        Toggle::Unofficial,
        Toggle::Forward,
        Toggle::Reverse,
        Toggle::Bidirectional,
        Toggle::Free,
        Toggle::Paid,
        Toggle::Bundled,
    ];

    /// The group this toggle belongs to; `None` for `ShowAll`.
    pub fn group(self) -> Option<FilterGroup> {
        match self {
            Toggle::ShowAll => None,
            Toggle::Official | Toggle::Unofficial => Some(FilterGroup::Official),
            Toggle::Forward | Toggle::Reverse | Toggle::Bidirectional => Some(FilterGroup::Direction),
            Toggle::Free | Toggle::Paid | Toggle::Bundled => Some(FilterGroup::Pricing),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Toggle::ShowAll => "showAll",
            Toggle::Official => "official",
            Toggle::Unofficial => "unofficial",
            Toggle::Forward => "forward",
            Toggle::Reverse => "reverse",
            Toggle::Bidirectional => "bidirectional",
            Toggle::Free => "free",
            Toggle::Paid => "paid",
            Toggle::Bundled => "bundled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Toggle::ShowAll => "Show all",
            Toggle::Official => "Official",
            Toggle::Unofficial => "Unofficial",
            Toggle::Forward => "Forward",
            Toggle::Reverse => "Reverse",
            Toggle::Bidirectional => "Both directions",
            Toggle::Free => "Free",
            Toggle::Paid => "Paid",
            Toggle::Bundled => "Bundled with avatar",
        }
    }

    /// Whether a profile satisfies this single toggle.
    fn accepts(self, p: &Profile) -> bool {
        match self {
            Toggle::ShowAll => true,
            Toggle::Official => p.official,
            Toggle::Unofficial => !p.official,
            Toggle::Forward => p.forward_support,
            Toggle::Reverse => p.reverse_support,
            Toggle::Bidirectional => p.is_bidirectional(),
            Toggle::Free => p.pricing == Pricing::Free,
            Toggle::Paid => p.pricing == Pricing::PaidStandalone,
            Toggle::Bundled => p.pricing == Pricing::BundledWithAvatar,
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Toggle {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Toggle::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| CatalogError::UnknownToggle(s.to_string()))
    }
}

/// Free-text term plus the set of active toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    term: String,
    active: BTreeSet<Toggle>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query with only `ShowAll` active.
    pub fn show_all() -> Self {
        Self::new().with(Toggle::ShowAll)
    }

    pub fn with(mut self, toggle: Toggle) -> Self {
        self.active.insert(toggle);
        self
    }

    pub fn with_term(mut self, term: &str) -> Self {
        self.set_term(term);
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.trim().to_string();
    }

    pub fn is_active(&self, toggle: Toggle) -> bool {
        self.active.contains(&toggle)
    }

    pub fn set(&mut self, toggle: Toggle, on: bool) {
        if on {
            self.active.insert(toggle);
        } else {
            self.active.remove(&toggle);
        }
    }

    /// Deactivate every group toggle, leaving `ShowAll` and the term alone.
    pub fn clear_groups(&mut self) {
        self.active.retain(|t| t.group().is_none());
    }

    /// Whether any group has at least one active toggle.
    pub fn has_group_constraints(&self) -> bool {
        self.active.iter().any(|t| t.group().is_some())
    }
}

/// Case-insensitive substring match over the searchable fields.
pub fn text_matches(p: &Profile, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    p.searchable_text().contains(&term.to_lowercase())
}

/// One group's verdict: OR over its active toggles, true if none is active.
pub fn group_matches(p: &Profile, group: FilterGroup, query: &Query) -> bool {
    let mut active = group.toggles().iter().filter(|t| query.is_active(**t)).peekable();
    if active.peek().is_none() {
        return true;
    }
    active.any(|t| t.accepts(p))
}

pub fn matches(p: &Profile, query: &Query) -> bool {
    if !text_matches(p, query.term()) {
        return false;
    }
    if query.is_active(Toggle::ShowAll) {
        return true;
    }
    // No constraint anywhere means everything passes, not nothing
    if !query.has_group_constraints() {
        return true;
    }
    FilterGroup::ALL.iter().all(|g| group_matches(p, *g, query))
}

/// Profiles that pass `query`, in their original order.
pub fn filter<'a>(profiles: &'a [Profile], query: &Query) -> Vec<&'a Profile> {
    profiles.iter().filter(|p| matches(p, query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, official: bool, fwd: bool, rev: bool, pricing: Pricing) -> Profile {
        Profile {
            official,
            forward_support: fwd,
            reverse_support: rev,
            pricing,
            ..Profile::with_id(id)
        }
    }

    fn sample() -> Vec<Profile> {
        vec![
            profile("1", true, true, false, Pricing::Free),
            profile("2", false, false, true, Pricing::PaidStandalone),
            profile("3", false, true, true, Pricing::BundledWithAvatar),
            profile("4", true, false, false, Pricing::Unset),
        ]
    }

    fn ids(profiles: &[Profile], q: &Query) -> Vec<String> {
        filter(profiles, q).into_iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_only_official_toggle() {
        let profiles = vec![
            profile("001", false, false, false, Pricing::Unset),
            profile("002", true, false, false, Pricing::Unset),
            profile("003", false, false, false, Pricing::Unset),
        ];
        assert_eq!(ids(&profiles, &Query::new().with(Toggle::Official)), ["002"]);
    }

    #[test]
    fn test_or_within_group() {
        let q = Query::new().with(Toggle::Official).with(Toggle::Unofficial);
        assert_eq!(ids(&sample(), &q), ["1", "2", "3", "4"]);
        let q = Query::new().with(Toggle::Forward).with(Toggle::Reverse);
        assert_eq!(ids(&sample(), &q), ["1", "2", "3"]);
    }

    #[test]
    fn test_and_across_groups() {
        let q = Query::new().with(Toggle::Unofficial).with(Toggle::Forward);
        assert_eq!(ids(&sample(), &q), ["3"]);
        let q = Query::new().with(Toggle::Official).with(Toggle::Free).with(Toggle::Paid);
        assert_eq!(ids(&sample(), &q), ["1"]);
    }

    #[test]
    fn test_bidirectional_is_a_refinement() {
        let q = Query::new().with(Toggle::Bidirectional);
        assert_eq!(ids(&sample(), &q), ["3"]);
    }

    #[test]
    fn test_show_all_bypasses_groups_but_not_text() {
        let mut profiles = sample();
        profiles[1].avatar_name = "Karin".into();
        let q = Query::show_all().with(Toggle::Official).with_term("KAR");
        assert_eq!(ids(&profiles, &q), ["2"]);
    }

    #[test]
    fn test_no_active_toggle_matches_everything() {
        assert_eq!(ids(&sample(), &Query::new()), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_show_all_and_empty_query_equal_text_match() {
        let mut profiles = sample();
        profiles[0].notes = "needs PhysBone".into();
        profiles[2].profile_author = "physics lab".into();
        for q in [Query::show_all().with_term("phys"), Query::new().with_term("phys")] {
            for p in &profiles {
                assert_eq!(matches(p, &q), text_matches(p, q.term()), "{}", p.id);
            }
        }
    }

    #[test]
    fn test_text_match_fields() {
        let mut p = Profile::with_id("0042");
        p.download_method = "Booth".into();
        assert!(text_matches(&p, "0042"));
        assert!(text_matches(&p, "booth"));
        assert!(text_matches(&p, "  "));
        assert!(!text_matches(&p, "gumroad"));
    }

    #[test]
    fn test_toggle_names_round_trip() {
        for t in Toggle::ALL {
            assert_eq!(t.name().parse::<Toggle>().unwrap(), t);
        }
        assert!("everything".parse::<Toggle>().is_err());
    }

    #[test]
    fn test_clear_groups_keeps_show_all() {
        let mut q = Query::show_all().with(Toggle::Paid).with(Toggle::Forward);
        q.clear_groups();
        assert!(q.is_active(Toggle::ShowAll));
        assert!(!q.has_group_constraints());
    }
}
