use chrono::{DateTime, Utc};
use vigil_core::{Algorithm, DeviceFingerprint, HistoricalDevice, PatternData, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

use crate::algorithms::similarity::{char_set_jaccard, exact_match, ip_similarity};

const USER_AGENT_WEIGHT: f64 = 0.3;
const IP_WEIGHT: f64 = 0.2;
const PLATFORM_WEIGHT: f64 = 0.2;
const RECENCY_WEIGHT: f64 = 0.3;

/// Per-day decay rate of the recency term.
const RECENCY_DECAY_PER_DAY: f64 = 0.1;

fn recency(last_seen: Option<DateTime<Utc>>, reference: Option<DateTime<Utc>>) -> f64 {
    match (last_seen, reference) {
        (Some(seen), Some(now)) => {
            let days = ((now - seen).num_seconds() as f64 / 86_400.0).max(0.0);
            (-RECENCY_DECAY_PER_DAY * days).exp()
        }
        _ => 0.0,
    }
}

/// Weighted similarity of the current fingerprint to one historical device.
///
/// `reference` is the instant recency is measured from; without it, or
/// without a `last_seen`, the recency term contributes nothing.
pub fn device_similarity(
    current: &DeviceFingerprint,
    historical: &HistoricalDevice,
    reference: Option<DateTime<Utc>>,
) -> f64 {
    let seen = &historical.fingerprint;
    let ua = char_set_jaccard(current.user_agent.as_deref(), seen.user_agent.as_deref());
    let ip = ip_similarity(current.ip_address.as_deref(), seen.ip_address.as_deref());
    let platform = exact_match(current.platform.as_deref(), seen.platform.as_deref());

    USER_AGENT_WEIGHT * ua
        + IP_WEIGHT * ip
        + PLATFORM_WEIGHT * platform
        + RECENCY_WEIGHT * recency(historical.last_seen, reference)
}

/// 1 minus the best similarity against history; 1.0 for an empty history.
pub fn device_novelty(
    current: &DeviceFingerprint,
    history: &[HistoricalDevice],
    reference: Option<DateTime<Utc>>,
) -> f64 {
    let best = history
        .iter()
        .map(|h| device_similarity(current, h, reference))
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
    match best {
        Some(similarity) => (1.0 - similarity).clamp(0.0, 1.0),
        None => 1.0,
    }
}

pub fn novelty_multiplier(novelty: f64) -> f64 {
    if novelty > 0.8 {
        1.5
    } else if novelty > 0.5 {
        1.2
    } else {
        0.0
    }
}

/// Signal 6: device fingerprint novelty.
pub fn score_device(data: &PatternData, config: &CompiledScoringConfig) -> Option<ScoreComponent> {
    let device = data.device_anomaly.as_ref()?;
    let current = device.device_fingerprint.as_ref()?;
    let reference = data.reference_instant();

    let novelty = device_novelty(current, &device.historical_devices, reference);
    let score = config.weights.device * novelty_multiplier(novelty);

    Some(
        ScoreComponent::new(Algorithm::Device, score, novelty)
            .with_factor("novelty", novelty)
            .with_factor("known_devices", device.historical_devices.len()),
    )
}
