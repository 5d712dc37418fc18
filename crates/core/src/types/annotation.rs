//! Customer tags and note.
//!
//! Shopify stores customer tags as one comma-joined string. Tags are
//! treated as an unordered set: merging never drops a tag that is already
//! on the customer.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Marker tag that identifies web subscription signups in Shopify.
pub const SUBSCRIPTION_TAG: &str = "Suscripción MixPerfume";

/// Argentina is UTC-03:00 all year.
const ARGENTINA_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Build the tag list for a signup: the marker tag plus plan and category.
#[must_use]
pub fn compose_tags(marker: &str, plan: Option<&str>, category: Option<&str>) -> Vec<String> {
    let mut tags = vec![marker.to_string()];
    if let Some(plan) = plan {
        tags.push(format!("Plan: {plan}"));
    }
    if let Some(category) = category {
        tags.push(format!("Category: {category}"));
    }
    tags
}

/// Build the customer note for a signup.
///
/// Missing values are rendered as `-`. The timestamp is shown in Argentine
/// local time using the `es-AR` short format (`18/10/2026, 14:05:09`).
#[must_use]
pub fn compose_note(
    plan: Option<&str>,
    category: Option<&str>,
    price: Option<&str>,
    submitted_at: DateTime<Utc>,
) -> String {
    let local = submitted_at.with_timezone(&argentina_offset());
    format!(
        "Web subscription | Plan: {} | Category: {} | Price: {} | {}",
        plan.unwrap_or("-"),
        category.unwrap_or("-"),
        price.unwrap_or("-"),
        local.format("%-d/%-m/%Y, %H:%M:%S"),
    )
}

fn argentina_offset() -> FixedOffset {
    FixedOffset::west_opt(ARGENTINA_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Split a comma-joined tag string into trimmed, non-empty tags.
pub fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Join tags the way Shopify renders them.
#[must_use]
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Merge incoming tags into the tags already on a customer.
///
/// Both sides are split on commas and trimmed; duplicates collapse
/// (case-sensitive). Existing tags keep their position and new tags are
/// appended in the order first seen.
///
/// ```
/// use mixperfume_core::merge_tags;
///
/// assert_eq!(merge_tags("A, B", "A, C"), "A, B, C");
/// ```
#[must_use]
pub fn merge_tags(existing: &str, incoming: &str) -> String {
    let mut seen = HashSet::new();
    let merged: Vec<&str> = split_tags(existing)
        .chain(split_tags(incoming))
        .filter(|tag| seen.insert(*tag))
        .collect();
    merged.join(", ")
}
