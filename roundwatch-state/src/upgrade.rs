//! Chain upgrades and where the chain currently stands relative to one.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Name given to an upgrade synthesized from a configured halt height
pub const HALT_UPGRADE_NAME: &str = "halt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    pub name: String,
    pub height: i64,
}

impl Upgrade {
    pub fn halt(height: i64) -> Self {
        Self {
            name: HALT_UPGRADE_NAME.to_string(),
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeProgress {
    /// The chain is at the first block after the upgrade height
    InProgress,
    Applied {
        blocks_since: i64,
        approx_time: Option<DateTime<Utc>>,
    },
    Scheduled {
        blocks_left: i64,
        eta: Option<DateTime<Utc>>,
    },
}

impl Upgrade {
    /// Position of `current_height` relative to this upgrade.
    ///
    /// Times are projected from `block_time` and left empty without one.
    pub fn progress(&self, current_height: i64, block_time: Option<Duration>, now: DateTime<Utc>) -> UpgradeProgress {
        let estimate = |required: i64| {
            block_time
                .filter(|bt| !bt.is_zero())
                .and_then(|bt| time_till_block(current_height, required, bt, now))
        };

        // widened so a plan at i64::MAX has a first block after it
        let first_after = i128::from(self.height) + 1;
        let current = i128::from(current_height);

        if first_after == current {
            return UpgradeProgress::InProgress;
        }

        if first_after < current {
            return UpgradeProgress::Applied {
                blocks_since: current_height.saturating_sub(self.height),
                approx_time: estimate(self.height),
            };
        }

        UpgradeProgress::Scheduled {
            blocks_left: self.height.saturating_sub(current_height),
            eta: estimate(self.height),
        }
    }
}

/// Estimated wall-clock time at which `required_height` is (or was) reached.
///
/// Works in both directions: a height in the past yields a time before `now`.
pub fn time_till_block(
    current_height: i64,
    required_height: i64,
    block_time: Duration,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let blocks = i128::from(required_height) - i128::from(current_height);
    let millis = i64::try_from(blocks * block_time.as_millis() as i128).ok()?;
    now.checked_add_signed(chrono::Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn upgrade() -> Upgrade {
        Upgrade {
            name: "v2".to_string(),
            height: 1000,
        }
    }

    #[test]
    fn test_scheduled_with_eta() {
        let progress = upgrade().progress(900, Some(Duration::from_secs(6)), now());
        assert_eq!(
            progress,
            UpgradeProgress::Scheduled {
                blocks_left: 100,
                eta: Some(now() + chrono::Duration::seconds(600)),
            }
        );
    }

    #[test]
    fn test_scheduled_without_block_time() {
        let progress = upgrade().progress(900, None, now());
        assert_eq!(progress, UpgradeProgress::Scheduled { blocks_left: 100, eta: None });
    }

    #[test]
    fn test_in_progress() {
        assert_eq!(upgrade().progress(1001, None, now()), UpgradeProgress::InProgress);
    }

    #[test]
    fn test_applied_in_the_past() {
        let progress = upgrade().progress(1010, Some(Duration::from_secs(2)), now());
        assert_eq!(
            progress,
            UpgradeProgress::Applied {
                blocks_since: 10,
                approx_time: Some(now() - chrono::Duration::seconds(20)),
            }
        );
    }

    #[test]
    fn test_at_upgrade_height_is_still_scheduled() {
        let progress = upgrade().progress(1000, None, now());
        assert_eq!(progress, UpgradeProgress::Scheduled { blocks_left: 0, eta: None });
    }

    #[test]
    fn test_upgrade_at_max_height_is_scheduled() {
        let upgrade = Upgrade {
            name: "far".to_string(),
            height: i64::MAX,
        };
        let progress = upgrade.progress(i64::MAX, Some(Duration::from_secs(6)), now());
        assert_eq!(progress, UpgradeProgress::Scheduled { blocks_left: 0, eta: Some(now()) });

        let progress = upgrade.progress(100, Some(Duration::from_secs(6)), now());
        assert!(matches!(
            progress,
            UpgradeProgress::Scheduled {
                blocks_left,
                eta: None
            } if blocks_left == i64::MAX - 100
        ));
    }

    #[test]
    fn test_halt_upgrade() {
        assert_eq!(Upgrade::halt(42).name, "halt");
    }
}
