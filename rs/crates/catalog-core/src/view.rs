//! Filtered and ordered profiles → render descriptors.
//!
//! Everything here is a pure function of its inputs. The descriptors carry
//! display-ready text; escaping is left to whichever adapter renders them.

use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;
use crate::model::{self, Pricing, Profile};
use crate::ordering::SortSpec;
use crate::predicate::Query;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    Cards,
    Table,
}

impl Layout {
    pub fn name(self) -> &'static str {
        match self {
            Layout::Cards => "cards",
            Layout::Table => "table",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cards" | "card" => Ok(Layout::Cards),
            "table" | "lite" => Ok(Layout::Table),
            other => Err(CatalogError::UnknownLayout(other.to_string())),
        }
    }
}

/// Text that links out when a URL is present and stays plain otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: Option<String>,
}

impl Link {
    fn new(text: &str, href: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            href: href.map(str::trim).filter(|h| !h.is_empty()).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportBadge {
    pub supported: bool,
    /// e.g. "Forward: supported" / "Forward: not supported"
    pub label: String,
    /// Compact mark for table cells.
    pub mark: &'static str,
}

impl SupportBadge {
    fn new(direction: &str, supported: bool) -> Self {
        let state = if supported { "supported" } else { "not supported" };
        Self {
            supported,
            label: format!("{direction}: {state}"),
            mark: if supported { "○" } else { "×" },
        }
    }

    pub fn class(&self) -> &'static str {
        if self.supported { "supported" } else { "not-supported" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBadge {
    pub category: String,
    pub class: &'static str,
    /// Formatted amount suffix. Paid profiles without an amount get
    /// [`NOT_SET`]; other categories show nothing.
    pub amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Link { href: String },
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// Everything a card or a table row needs for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub id: String,
    pub avatar: Link,
    pub version: String,
    pub avatar_author: Link,
    pub profile_author: Link,
    pub official: Badge,
    pub forward: SupportBadge,
    pub reverse: SupportBadge,
    pub price: PriceBadge,
    /// Avatar price, shown only for bundled profiles.
    pub avatar_price: Option<String>,
    pub download_method: String,
    pub download: Download,
    pub image: Option<Image>,
    pub registered: String,
    pub updated: String,
    /// Full notes text, exposed on hover; `None` hides the indicator.
    pub notes: Option<String>,
}

/// Shown where an amount is expected but the feed has none.
pub const NOT_SET: &str = "not set";

fn format_amount(raw: &str) -> String {
    format!("¥{raw}")
}

pub fn project_profile(p: &Profile) -> ProfileView {
    let official = if p.official {
        Badge { label: "Official", class: "official" }
    } else {
        Badge { label: "Unofficial", class: "unofficial" }
    };

    let price = PriceBadge {
        category: p.pricing.label().to_string(),
        class: p.pricing.css_class(),
        amount: match (p.price_amount(), &p.pricing) {
            (Some(raw), _) => Some(format_amount(raw)),
            (None, Pricing::PaidStandalone) => Some(NOT_SET.to_string()),
            (None, _) => None,
        },
    };

    let avatar_price = match p.pricing {
        Pricing::BundledWithAvatar => Some(
            p.avatar_price_amount()
                .map(format_amount)
                .unwrap_or_else(|| NOT_SET.to_string()),
        ),
        _ => None,
    };

    let download = match p.download_location.as_deref().map(str::trim) {
        Some(href) if !href.is_empty() => Download::Link { href: href.to_string() },
        _ => Download::Disabled,
    };

    let image = p.image_url.as_ref().map(|src| Image {
        src: src.clone(),
        alt: p.avatar_name.clone(),
    });

    let notes = Some(p.notes.trim()).filter(|n| !n.is_empty()).map(str::to_string);

    ProfileView {
        id: p.id.clone(),
        avatar: Link::new(&p.avatar_name, p.avatar_name_url.as_deref()),
        version: p.profile_version.clone(),
        avatar_author: Link::new(&p.avatar_author, p.avatar_author_url.as_deref()),
        profile_author: Link::new(&p.profile_author, p.profile_author_url.as_deref()),
        official,
        forward: SupportBadge::new("Forward", p.forward_support),
        reverse: SupportBadge::new("Reverse", p.reverse_support),
        price,
        avatar_price,
        download_method: p.download_method.clone(),
        download,
        image,
        registered: model::format_date(&p.registered_date),
        updated: model::format_date(&p.updated_date),
        notes,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub shown: usize,
    pub total: usize,
}

impl Counts {
    pub fn label(&self) -> String {
        format!("{} / {} items", self.shown, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ready,
    /// Nothing matched the current query.
    Empty,
    /// The feed could not be loaded; the catalog is empty.
    Failed(String),
}

/// Inputs to a projection beyond the records themselves.
#[derive(Debug, Clone, Default)]
pub struct ViewContext<'a> {
    pub layout: Layout,
    pub query: Option<&'a Query>,
    pub sort: Option<SortSpec>,
    pub last_updated: Option<&'a str>,
    pub form_url: Option<&'a str>,
    pub failure: Option<&'a str>,
    pub loading: bool,
}

/// The complete, render-ready state of the catalog screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub layout: Layout,
    pub status: Status,
    pub rows: Vec<ProfileView>,
    pub counts: Counts,
    pub query: Query,
    pub sort: Option<SortSpec>,
    pub last_updated: Option<String>,
    pub form_url: Option<String>,
}

impl ViewModel {
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Project the visible records. `total` is the size of the full catalog.
pub fn project(visible: &[&Profile], total: usize, ctx: &ViewContext<'_>) -> ViewModel {
    let status = if let Some(msg) = ctx.failure {
        Status::Failed(msg.to_string())
    } else if ctx.loading {
        Status::Loading
    } else if visible.is_empty() {
        Status::Empty
    } else {
        Status::Ready
    };

    let rows = match status {
        Status::Ready => visible.iter().map(|p| project_profile(p)).collect(),
        _ => Vec::new(),
    };

    ViewModel {
        layout: ctx.layout,
        status,
        counts: Counts { shown: rows.len(), total },
        rows,
        query: ctx.query.cloned().unwrap_or_default(),
        sort: ctx.sort,
        last_updated: ctx.last_updated.map(str::to_string),
        form_url: ctx.form_url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string),
    }
}
