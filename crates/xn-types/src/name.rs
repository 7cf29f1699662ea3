//! Domain name rules, checked client-side before a registration is paid for.

use crate::SchemaError;

pub const MINUTE_IN_SECONDS: u64 = 60;
pub const HOUR_IN_SECONDS: u64 = 60 * MINUTE_IN_SECONDS;
pub const DAY_IN_SECONDS: u64 = 24 * HOUR_IN_SECONDS;
pub const MONTH_IN_SECONDS: u64 = 30 * DAY_IN_SECONDS;
pub const YEAR_IN_SECONDS: u64 = 365 * DAY_IN_SECONDS;
/// Expired names stay with their owner for this long.
pub const GRACE_PERIOD: u64 = 21 * DAY_IN_SECONDS;

pub const MIN_LENGTH: usize = 3;
pub const MAX_LENGTH: usize = 256;

pub const DEFAULT_TOP_LEVEL_DOMAINS: &[&str] = &["mvx"];

fn is_name_char(ch: u8) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == b'.'
}

/// Validate a full name such as `marko1.mvx` against the registry's rules.
pub fn validate_name(name: &str, allowed_tlds: &[&str]) -> Result<(), SchemaError> {
    let bytes = name.as_bytes();
    if bytes.len() <= MIN_LENGTH {
        return Err(SchemaError::InvalidName("name too short"));
    }
    if bytes.len() > MAX_LENGTH {
        return Err(SchemaError::InvalidName("name too long"));
    }
    if !bytes.iter().copied().all(is_name_char) {
        return Err(SchemaError::InvalidName("character not allowed"));
    }
    let Some((_, tld)) = name.rsplit_once('.') else {
        return Err(SchemaError::InvalidName("missing top-level domain"));
    };
    if !allowed_tlds.contains(&tld) {
        return Err(SchemaError::InvalidName("invalid top-level domain"));
    }
    Ok(())
}

/// `www.marko1.mvx` → `["www", "marko1", "mvx"]`.
pub fn split_labels(name: &str) -> Vec<&str> {
    name.split('.').collect()
}

/// The registrable parent of a subdomain (`www.marko1.mvx` → `marko1.mvx`).
pub fn parent_domain(name: &str) -> Option<&str> {
    let labels = split_labels(name);
    if labels.len() < 3 {
        return None;
    }
    name.split_once('.').map(|(_, parent)| parent)
}

/// The last two labels, which own the NFT for every name beneath them
/// (`a.www.marko1.mvx` → `marko1.mvx`).
pub fn primary_domain(name: &str) -> Option<&str> {
    let labels = split_labels(name);
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return None;
    }
    let len = labels[labels.len() - 2].len() + 1 + labels[labels.len() - 1].len();
    Some(&name[name.len() - len..])
}
