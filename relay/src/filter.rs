//! Severity filter
//!
//! Decides whether an event is severe enough to post.
//!
//! Earthquakes are gated on magnitude: the scale is comparable across
//! events. Every other category is gated on its qualitative alert tier.
//! A flood's `magnitude` is ignored, as is an earthquake's alert level.

use disaster_relay_core::{AlertLevel, Event};

/// Default minimum earthquake magnitude
pub const DEFAULT_MIN_MAGNITUDE: f64 = 5.0;

/// Default minimum alert level for non-earthquake events
pub const DEFAULT_MIN_ALERT_LEVEL: AlertLevel = AlertLevel::Orange;

/// Delivery thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPolicy {
    /// Applies to earthquakes only
    pub min_magnitude: f64,
    /// Applies to every category except earthquakes
    pub min_alert_level: AlertLevel,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            min_alert_level: DEFAULT_MIN_ALERT_LEVEL,
        }
    }
}

impl FilterPolicy {
    /// Create a policy with the given thresholds
    pub fn new(min_magnitude: f64, min_alert_level: AlertLevel) -> Self {
        Self {
            min_magnitude,
            min_alert_level,
        }
    }

    /// Whether `event` qualifies for delivery
    pub fn should_deliver(&self, event: &Event) -> bool {
        if event.is_earthquake() {
            event.magnitude >= self.min_magnitude
        } else {
            event.alert_level >= self.min_alert_level
        }
    }

    /// The earthquake half of the rule on its own
    ///
    /// Non-earthquake events always pass. Used for snapshot items, which
    /// the directory has already filtered by alert level.
    pub fn passes_magnitude_gate(&self, event: &Event) -> bool {
        !event.is_earthquake() || event.magnitude >= self.min_magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disaster_relay_core::Category;

    fn quake(magnitude: f64, level: AlertLevel) -> Event {
        Event::new("q", Category::Earthquake)
            .with_magnitude(magnitude)
            .with_alert_level(level)
    }

    fn other(category: Category, level: AlertLevel, magnitude: f64) -> Event {
        Event::new("o", category)
            .with_alert_level(level)
            .with_magnitude(magnitude)
    }

    #[test]
    fn earthquake_gated_on_magnitude() {
        let policy = FilterPolicy::default();

        assert!(!policy.should_deliver(&quake(4.5, AlertLevel::Unknown)));
        assert!(policy.should_deliver(&quake(5.0, AlertLevel::Unknown))); // inclusive
        assert!(policy.should_deliver(&quake(6.0, AlertLevel::Unknown)));
    }

    #[test]
    fn earthquake_ignores_alert_level() {
        let policy = FilterPolicy::default();

        assert!(!policy.should_deliver(&quake(4.9, AlertLevel::Red)));
        assert!(policy.should_deliver(&quake(7.1, AlertLevel::Green)));
    }

    #[test]
    fn other_categories_gated_on_alert_level() {
        let policy = FilterPolicy::new(5.0, AlertLevel::Orange);

        for category in Category::ALL {
            if category == Category::Earthquake {
                continue;
            }
            for level in AlertLevel::ALL {
                let expected = level >= AlertLevel::Orange;
                assert_eq!(
                    policy.should_deliver(&other(category, level, 0.0)),
                    expected,
                    "{category} at {level}"
                );
            }
        }
    }

    #[test]
    fn other_categories_ignore_magnitude() {
        let policy = FilterPolicy::default();

        assert!(!policy.should_deliver(&other(Category::Flood, AlertLevel::Green, 9.9)));
        assert!(policy.should_deliver(&other(Category::Flood, AlertLevel::Red, 0.0)));
    }

    #[test]
    fn unknown_threshold_admits_everything_but_quakes() {
        let policy = FilterPolicy::new(100.0, AlertLevel::Unknown);

        assert!(policy.should_deliver(&other(Category::Drought, AlertLevel::Unknown, 0.0)));
        assert!(!policy.should_deliver(&quake(9.5, AlertLevel::Red)));
    }

    #[test]
    fn magnitude_gate_only_blocks_small_quakes() {
        let policy = FilterPolicy::default();

        assert!(!policy.passes_magnitude_gate(&quake(4.5, AlertLevel::Orange)));
        assert!(policy.passes_magnitude_gate(&quake(5.5, AlertLevel::Unknown)));
        assert!(policy.passes_magnitude_gate(&other(Category::Flood, AlertLevel::Green, 0.0)));
    }
}
