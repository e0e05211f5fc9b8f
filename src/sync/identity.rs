//! Locally generated placeholder identities.

use chrono::{DateTime, Utc};

const PLACEHOLDER_PREFIX: &str = "local-";

/// Placeholder id built from the creation timestamp and a random suffix.
pub fn placeholder_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}{}-{}",
        PLACEHOLDER_PREFIX,
        now.timestamp_millis(),
        &suffix[..9]
    )
}

/// Whether `id` was generated locally rather than assigned by the server.
pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}
