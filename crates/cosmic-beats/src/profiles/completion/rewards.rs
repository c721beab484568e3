use serde::{Deserialize, Serialize};

/// Reward issued for reaching a completion tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTier {
    pub beatcoins_awarded: u32,
    pub badge_earned: bool,
}

impl RewardTier {
    pub fn is_empty(&self) -> bool {
        self.beatcoins_awarded == 0 && !self.badge_earned
    }
}

/// Completion breakpoints that pay out when crossed upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionThreshold {
    Half,
    ThreeQuarters,
    Complete,
}

impl CompletionThreshold {
    /// Ascending order.
    pub const ALL: [CompletionThreshold; 3] = [
        CompletionThreshold::Half,
        CompletionThreshold::ThreeQuarters,
        CompletionThreshold::Complete,
    ];

    pub fn percentage(&self) -> u8 {
        match self {
            CompletionThreshold::Half => 50,
            CompletionThreshold::ThreeQuarters => 75,
            CompletionThreshold::Complete => 100,
        }
    }

    pub fn reward(&self) -> RewardTier {
        match self {
            CompletionThreshold::Half => RewardTier {
                beatcoins_awarded: 50,
                badge_earned: false,
            },
            CompletionThreshold::ThreeQuarters => RewardTier {
                beatcoins_awarded: 100,
                badge_earned: false,
            },
            CompletionThreshold::Complete => RewardTier {
                beatcoins_awarded: 150,
                badge_earned: true,
            },
        }
    }

    /// Highest threshold reached at `percentage`, if any.
    pub fn reached_at(percentage: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .rev()
            .find(|threshold| percentage >= threshold.percentage())
    }

    /// Highest threshold `t` with `previous < t <= current`.
    pub fn crossed(previous: u8, current: u8) -> Option<Self> {
        if current <= previous {
            return None;
        }
        Self::ALL.into_iter().rev().find(|threshold| {
            let boundary = threshold.percentage();
            previous < boundary && boundary <= current
        })
    }
}

/// Reward for a completion percentage. Depends only on the percentage itself.
pub fn completion_reward(percentage: u8) -> RewardTier {
    CompletionThreshold::reached_at(percentage)
        .map(|threshold| threshold.reward())
        .unwrap_or_default()
}
