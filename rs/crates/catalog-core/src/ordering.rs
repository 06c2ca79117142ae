//! Field + direction → comparator, with per-field coercion.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;
use crate::model::{self, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

impl FromStr for Direction {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(CatalogError::UnknownDirection(other.to_string())),
        }
    }
}

/// How a field's raw value is coerced before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Identifier,
    MarketplaceId,
    Date,
    Flag,
    Amount,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    RegisteredDate,
    UpdatedDate,
    AvatarName,
    ProfileVersion,
    AvatarAuthor,
    ProfileAuthor,
    Official,
    DownloadMethod,
    DownloadLocation,
    ForwardSupport,
    ReverseSupport,
    Notes,
    Pricing,
    Price,
    AvatarPrice,
    /// Marketplace id parsed from `avatarNameUrl`.
    AvatarItemId,
    /// Marketplace id parsed from `downloadLocation`.
    ProfileItemId,
}

impl SortField {
    pub const ALL: [SortField; 18] = [
        SortField::Id,
        SortField::RegisteredDate,
        SortField::UpdatedDate,
        SortField::AvatarName,
        SortField::ProfileVersion,
        SortField::AvatarAuthor,
        SortField::ProfileAuthor,
        SortField::Official,
        SortField::DownloadMethod,
        SortField::DownloadLocation,
        SortField::ForwardSupport,
        SortField::ReverseSupport,
        SortField::Notes,
        SortField::Pricing,
        SortField::Price,
        SortField::AvatarPrice,
        SortField::AvatarItemId,
        SortField::ProfileItemId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::RegisteredDate => "registeredDate",
            SortField::UpdatedDate => "updatedDate",
            SortField::AvatarName => "avatarName",
            SortField::ProfileVersion => "profileVersion",
            SortField::AvatarAuthor => "avatarAuthor",
            SortField::ProfileAuthor => "profileAuthor",
            SortField::Official => "official",
            SortField::DownloadMethod => "downloadMethod",
            SortField::DownloadLocation => "downloadLocation",
            SortField::ForwardSupport => "forwardSupport",
            SortField::ReverseSupport => "reverseSupport",
            SortField::Notes => "notes",
            SortField::Pricing => "pricing",
            SortField::Price => "price",
            SortField::AvatarPrice => "avatarPrice",
            SortField::AvatarItemId => "avatarItemId",
            SortField::ProfileItemId => "profileItemId",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Id => "ID",
            SortField::RegisteredDate => "Registered",
            SortField::UpdatedDate => "Updated",
            SortField::AvatarName => "Avatar",
            SortField::ProfileVersion => "Version",
            SortField::AvatarAuthor => "Avatar author",
            SortField::ProfileAuthor => "Profile author",
            SortField::Official => "Official",
            SortField::DownloadMethod => "Download method",
            SortField::DownloadLocation => "Download",
            SortField::ForwardSupport => "Forward",
            SortField::ReverseSupport => "Reverse",
            SortField::Notes => "Notes",
            SortField::Pricing => "Pricing",
            SortField::Price => "Price",
            SortField::AvatarPrice => "Avatar price",
            SortField::AvatarItemId => "Avatar item ID",
            SortField::ProfileItemId => "Profile item ID",
        }
    }

    pub fn class(self) -> FieldClass {
        match self {
            SortField::Id => FieldClass::Identifier,
            SortField::AvatarItemId | SortField::ProfileItemId => FieldClass::MarketplaceId,
            SortField::RegisteredDate | SortField::UpdatedDate => FieldClass::Date,
            SortField::Official | SortField::ForwardSupport | SortField::ReverseSupport => FieldClass::Flag,
            SortField::Price | SortField::AvatarPrice => FieldClass::Amount,
            _ => FieldClass::Text,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| CatalogError::UnknownSortField(s.to_string()))
    }
}

/// A (field, direction) selection, written `<field>-<asc|desc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: Direction,
}

impl SortSpec {
    pub fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, Direction::Desc)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.field.name(), self.direction.name())
    }
}

impl FromStr for SortSpec {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('-') {
            Some((field, dir)) => Ok(SortSpec::new(field.parse()?, dir.parse()?)),
            None => Ok(SortSpec::asc(s.parse()?)),
        }
    }
}

fn text_key(p: &Profile, field: SortField) -> String {
    let raw: &str = match field {
        SortField::AvatarName => &p.avatar_name,
        SortField::ProfileVersion => &p.profile_version,
        SortField::AvatarAuthor => &p.avatar_author,
        SortField::ProfileAuthor => &p.profile_author,
        SortField::DownloadMethod => &p.download_method,
        SortField::DownloadLocation => p.download_location.as_deref().unwrap_or(""),
        SortField::Notes => &p.notes,
        SortField::Pricing => p.pricing.label(),
        _ => "",
    };
    raw.to_lowercase()
}

fn flag_key(p: &Profile, field: SortField) -> bool {
    match field {
        SortField::Official => p.official,
        SortField::ForwardSupport => p.forward_support,
        SortField::ReverseSupport => p.reverse_support,
        _ => false,
    }
}

fn amount_key(p: &Profile, field: SortField) -> f64 {
    let raw = match field {
        SortField::Price => p.price_amount(),
        SortField::AvatarPrice => p.avatar_price_amount(),
        _ => None,
    };
    raw.and_then(model::parse_amount).unwrap_or(0.0)
}

fn date_source(p: &Profile, field: SortField) -> &str {
    match field {
        SortField::UpdatedDate => &p.updated_date,
        _ => &p.registered_date,
    }
}

fn market_key(p: &Profile, field: SortField) -> Option<u64> {
    match field {
        SortField::ProfileItemId => p.profile_item_id(),
        _ => p.avatar_item_id(),
    }
}

/// Compare two profiles on `field`.
///
/// Missing marketplace ids sort after every present id in both directions;
/// the direction only orders the profiles that have one.
pub fn compare(a: &Profile, b: &Profile, field: SortField, direction: Direction) -> Ordering {
    match field.class() {
        FieldClass::MarketplaceId => {
            match (market_key(a, field), market_key(b, field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(ka), Some(kb)) => direction.apply(ka.cmp(&kb)),
            }
        }
        FieldClass::Identifier => {
            direction.apply(model::leading_integer(&a.id).cmp(&model::leading_integer(&b.id)))
        }
        FieldClass::Date => direction.apply(
            model::date_key(date_source(a, field)).cmp(&model::date_key(date_source(b, field))),
        ),
        FieldClass::Flag => direction.apply(flag_key(a, field).cmp(&flag_key(b, field))),
        FieldClass::Amount => direction.apply(amount_key(a, field).total_cmp(&amount_key(b, field))),
        FieldClass::Text => direction.apply(text_key(a, field).cmp(&text_key(b, field))),
    }
}

/// Stable sort by `spec`; equal elements keep their relative order.
pub fn sort_profiles(profiles: &mut [&Profile], spec: SortSpec) {
    profiles.sort_by(|a, b| compare(a, b, spec.field, spec.direction));
}
