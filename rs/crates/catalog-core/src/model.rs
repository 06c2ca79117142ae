//! Profile records and the values derived from them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::sync::OnceLock;

/// One catalog entry.
///
/// Only `id` is required. Every other field degrades to its default when it
/// is missing or has the wrong JSON type, so one sloppy field never rejects
/// the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub official: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub forward_support: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub reverse_support: bool,

    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub avatar_price: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub avatar_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub avatar_author: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub profile_author: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub profile_version: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub download_method: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,

    #[serde(default, alias = "avatarshopname", deserialize_with = "lenient::opt_text")]
    pub avatar_shop_name: Option<String>,
    #[serde(default, alias = "profileshopname", deserialize_with = "lenient::opt_text")]
    pub profile_shop_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub avatar_name_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub avatar_author_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub profile_author_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub download_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub registered_date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub updated_date: String,
}

impl Profile {
    /// Minimal profile with only an id; convenient for building fixtures.
    pub fn with_id(id: &str) -> Self {
        Self { id: id.to_string(), ..Self::default() }
    }

    pub fn is_bidirectional(&self) -> bool {
        self.forward_support && self.reverse_support
    }

    /// Marketplace item id of the avatar page.
    pub fn avatar_item_id(&self) -> Option<u64> {
        marketplace_item_id(self.avatar_name_url.as_deref())
    }

    /// Marketplace item id of the profile's download page.
    pub fn profile_item_id(&self) -> Option<u64> {
        marketplace_item_id(self.download_location.as_deref())
    }

    /// Price to show next to the pricing badge, if one is actually set.
    pub fn price_amount(&self) -> Option<&str> {
        displayable_amount(self.price.as_deref())
    }

    pub fn avatar_price_amount(&self) -> Option<&str> {
        displayable_amount(self.avatar_price.as_deref())
    }

    /// Text the search box matches against, lowercased.
    pub fn searchable_text(&self) -> String {
        let mut parts = vec![
            self.id.as_str(),
            self.avatar_name.as_str(),
            self.avatar_author.as_str(),
            self.profile_author.as_str(),
            self.download_method.as_str(),
        ];
        if !self.notes.is_empty() {
            parts.push(self.notes.as_str());
        }
        parts.join(" ").to_lowercase()
    }
}

/// How a profile is sold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Pricing {
    Free,
    PaidStandalone,
    BundledWithAvatar,
    #[default]
    Unset,
    /// Unrecognized value, kept verbatim for display.
    Other(String),
}

impl Pricing {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" => Pricing::Unset,
            "無料" | "free" => Pricing::Free,
            "単体有料" | "paid-standalone" | "paid" => Pricing::PaidStandalone,
            "アバター同梱" | "bundled-with-avatar" | "bundled" => Pricing::BundledWithAvatar,
            other => Pricing::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Pricing::Free => "Free",
            Pricing::PaidStandalone => "Paid",
            Pricing::BundledWithAvatar => "Bundled with avatar",
            Pricing::Unset => "Not set",
            Pricing::Other(raw) => raw,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Pricing::Free => "price-free",
            Pricing::PaidStandalone => "price-paid",
            Pricing::BundledWithAvatar => "price-bundled",
            Pricing::Unset | Pricing::Other(_) => "price-unknown",
        }
    }
}

impl<'de> Deserialize<'de> for Pricing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::text(deserializer)?;
        Ok(Pricing::parse(&raw))
    }
}

// ── Derived values ──────────────────────────────────────────────────

fn item_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/items/(\d+)").expect("item id pattern is valid"))
}

fn shop_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https://([^/]+)\.booth\.pm/").expect("shop pattern is valid"))
}

/// Extract the numeric id from a marketplace item URL (`.../items/<digits>`).
pub fn marketplace_item_id(url: Option<&str>) -> Option<u64> {
    let caps = item_id_pattern().captures(url?)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Shop subdomain of a `https://<shop>.booth.pm/...` URL.
pub fn shop_name(url: Option<&str>) -> Option<String> {
    let caps = shop_pattern().captures(url?)?;
    Some(caps.get(1)?.as_str().to_string())
}

/// Whether a URL points at the Booth marketplace.
pub fn is_booth_url(url: Option<&str>) -> bool {
    url.map(|u| u.contains("booth.pm")).unwrap_or(false)
}

/// `None` for amounts that mean "not set": absent, empty, zero, or `-`.
pub fn displayable_amount(raw: Option<&str>) -> Option<&str> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "-" {
        return None;
    }
    match parse_amount(raw) {
        Some(v) if v == 0.0 => None,
        _ => Some(raw),
    }
}

/// Numeric value of an amount like `"1500"`, `"1,500"` or `"¥1500"`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '円' | ' '))
        .collect();
    cleaned.parse().ok()
}

/// Leading integer of an identifier, mirroring a lenient integer parse:
/// `"001"` is 1, `"12a"` is 12, anything without leading digits is 0.
pub fn leading_integer(raw: &str) -> i64 {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = digits[..end].trim_start_matches('0');
    match digits.parse::<i64>() {
        Ok(n) => sign * n,
        Err(_) if digits.is_empty() => 0,
        // Too long for i64: saturate so it still sorts after shorter runs
        Err(_) if sign < 0 => i64::MIN,
        Err(_) => i64::MAX,
    }
}

// ── Dates ───────────────────────────────────────────────────────────

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Parse a feed date string. Date-only values land at midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

/// Calendar day of a feed date string.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_datetime(raw).map(|dt| dt.date())
}

/// Sort key for a date field; unparsable dates sit at the epoch.
pub fn date_key(raw: &str) -> NaiveDateTime {
    parse_datetime(raw).unwrap_or_default()
}

/// `YYYY/MM/DD`, or an empty string when the date cannot be read.
pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}

// ── Lenient field decoding ──────────────────────────────────────────

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
            _ => false,
        })
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = text(deserializer)?;
        let trimmed = s.trim();
        Ok(if trimmed.is_empty() { None } else { Some(trimmed.to_string()) })
    }
}
