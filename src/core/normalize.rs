//! Maps one raw export element into the canonical record shape. Every field
//! except the identifier is best-effort: missing or malformed sources become
//! defaults, never errors.

use crate::config::ParserConfig;
use crate::domain::model::{CreatorRecord, RecordId};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const HANDLE_FIELD: &str = "handleName";
const BIO_FIELD: &str = "bio";
const REGION_FIELD: &str = "storeRegion";
const BANNED_FIELD: &str = "isBannedInTT";
const PRICE_OBJECT: &str = "price";
const RATE_FIELD: &str = "startingRate100k";
const CURRENCY_FIELD: &str = "currency";
const ENGAGEMENT_FIELD: &str = "engagementRate";
const FOLLOWER_FIELD: &str = "followerCount";
const MEDIAN_VIEWS_FIELD: &str = "medianViews";
const RECENT_ITEMS_FIELD: &str = "recentItems";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Returns `None` when the element has no usable identifier; the caller
/// drops it silently.
pub fn normalize(raw: &Value, config: &ParserConfig) -> Option<CreatorRecord> {
    let identifier = RecordId::from_value(raw.get(&config.id_field)?)?;

    let info = raw.get(&config.info_key);
    let performance = raw
        .get(&config.stats_key)
        .and_then(|stats| stats.get(&config.performance_key));
    let price = raw
        .get(&config.pricing_key)
        .and_then(|es| es.get(PRICE_OBJECT));

    let handle = info.and_then(|i| i.get(HANDLE_FIELD)).and_then(Value::as_str);
    let bio = info.and_then(|i| i.get(BIO_FIELD));

    let price_label = price
        .and_then(|p| p.get(RATE_FIELD))
        .and_then(Value::as_f64)
        .map(|rate| format!("{:.1} USD", rate / 100_000.0));

    let engagement = performance
        .and_then(|p| p.get(ENGAGEMENT_FIELD))
        .and_then(Value::as_f64)
        .map(|rate| format!("{:.1}%", rate * 100.0));

    let follower_count = performance
        .and_then(|p| p.get(FOLLOWER_FIELD))
        .map(coerce_count)
        .unwrap_or(0);

    let profile_url = handle
        .map(|h| format!("{}{}", config.profile_url_prefix, h))
        .unwrap_or_default();

    Some(CreatorRecord {
        identifier,
        display_name: handle
            .map(str::to_string)
            .unwrap_or_else(|| config.unknown_name.clone()),
        email: email_from_bio(bio),
        price: price_label,
        engagement,
        follower_count,
        profile_url,
        bio: bio.and_then(Value::as_str).map(str::to_string),
        country: info
            .and_then(|i| i.get(REGION_FIELD))
            .and_then(Value::as_str)
            .map(str::to_string),
        banned: info.and_then(|i| i.get(BANNED_FIELD)).and_then(Value::as_bool),
        median_views: performance
            .and_then(|p| p.get(MEDIAN_VIEWS_FIELD))
            .and_then(Value::as_i64),
        currency: price
            .and_then(|p| p.get(CURRENCY_FIELD))
            .and_then(Value::as_str)
            .map(str::to_string),
        recent_items_count: raw
            .get(RECENT_ITEMS_FIELD)
            .and_then(Value::as_array)
            .map(|items| items.len() as u64)
            .unwrap_or(0),
    })
}

/// First email-looking token in a free-text bio. Non-string bios yield
/// nothing.
pub fn email_from_bio(bio: Option<&Value>) -> Option<String> {
    let text = bio?.as_str()?;
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Lenient integer coercion in the spirit of `parseInt`: numbers truncate,
/// strings parse a leading signed digit run, anything else counts as zero.
pub fn coerce_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let trimmed = s.trim();
            let (sign, digits) = match trimmed.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
            };
            let run: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
            run.parse::<i64>().map(|v| sign * v).unwrap_or(0)
        }
        _ => 0,
    }
}
