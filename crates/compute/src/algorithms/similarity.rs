//! Similarity measures for device fingerprint fields.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/// Jaccard overlap of the character sets of two strings.
///
/// This is a set measure, not an edit distance: "abc" and "cba" are
/// identical under it. Identical strings score 1, a missing side scores 0.
pub fn char_set_jaccard(a: Option<&str>, b: Option<&str>) -> f64 {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };
    if a == b {
        return 1.0;
    }

    let set_a: BTreeSet<char> = a.chars().collect();
    let set_b: BTreeSet<char> = b.chars().collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    set_a.intersection(&set_b).count() as f64 / union as f64
}

/// 1.0 for identical addresses, 0.8 for IPv4 addresses in the same /24, else 0.
pub fn ip_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a.trim(), b.trim()),
        _ => return 0.0,
    };
    if a == b {
        return 1.0;
    }
    match (a.parse::<Ipv4Addr>(), b.parse::<Ipv4Addr>()) {
        (Ok(x), Ok(y)) if x.octets()[..3] == y.octets()[..3] => 0.8,
        _ => 0.0,
    }
}

/// 1.0 when both sides are present and equal.
pub fn exact_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    }
}
