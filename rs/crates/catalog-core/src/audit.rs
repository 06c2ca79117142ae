//! Completeness checks used by the feed validator.

use crate::feed::{DroppedRecord, Feed};
use crate::model::{self, Pricing, Profile};

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn blank_opt(s: Option<&str>) -> bool {
    s.map(blank).unwrap_or(true)
}

/// Names of required fields that are missing or empty on `p`.
///
/// `downloadLocation` and `profileShopName` are only required for profiles
/// distributed through Booth.
pub fn missing_required(p: &Profile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    let mut check = |name: &'static str, is_blank: bool| {
        if is_blank {
            missing.push(name);
        }
    };

    check("avatarName", blank(&p.avatar_name));
    check("avatarNameUrl", blank_opt(p.avatar_name_url.as_deref()));
    check("profileVersion", blank(&p.profile_version));
    check("avatarAuthor", blank(&p.avatar_author));
    check("avatarAuthorUrl", blank_opt(p.avatar_author_url.as_deref()));
    check("avatarShopName", blank_opt(p.avatar_shop_name.as_deref()));
    check("profileAuthor", blank(&p.profile_author));
    check("profileAuthorUrl", blank_opt(p.profile_author_url.as_deref()));
    check("downloadMethod", blank(&p.download_method));
    check("imageUrl", blank_opt(p.image_url.as_deref()));
    check("pricing", p.pricing == Pricing::Unset);
    check("price", blank_opt(p.price.as_deref()));
    check("avatarPrice", blank_opt(p.avatar_price.as_deref()));

    if model::is_booth_url(p.download_location.as_deref()) {
        check("downloadLocation", blank_opt(p.download_location.as_deref()));
        check("profileShopName", blank_opt(p.profile_shop_name.as_deref()));
    }
    missing
}

#[derive(Debug, Clone, PartialEq)]
pub struct Incomplete {
    pub id: String,
    pub missing: Vec<&'static str>,
    /// Shop name recoverable from the download URL when `profileShopName` is missing.
    pub suggested_shop: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedReport {
    pub profiles: usize,
    pub dropped: Vec<DroppedRecord>,
    pub duplicate_ids: Vec<String>,
    pub incomplete: Vec<Incomplete>,
}

impl FeedReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.duplicate_ids.is_empty() && self.incomplete.is_empty()
    }
}

pub fn audit(feed: &Feed) -> FeedReport {
    let mut duplicate_ids = Vec::new();
    // Profiles arrive sorted by id, so duplicates are adjacent
    for pair in feed.profiles.windows(2) {
        if pair[0].id == pair[1].id && duplicate_ids.last() != Some(&pair[1].id) {
            duplicate_ids.push(pair[1].id.clone());
        }
    }

    let incomplete = feed
        .profiles
        .iter()
        .filter_map(|p| {
            let missing = missing_required(p);
            if missing.is_empty() {
                return None;
            }
            let suggested_shop = if missing.contains(&"profileShopName") {
                model::shop_name(p.download_location.as_deref())
            } else {
                None
            };
            Some(Incomplete { id: p.id.clone(), missing, suggested_shop })
        })
        .collect();

    FeedReport {
        profiles: feed.profiles.len(),
        dropped: feed.dropped.clone(),
        duplicate_ids,
        incomplete,
    }
}
