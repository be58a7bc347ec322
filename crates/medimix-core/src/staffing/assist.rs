//! Call-for-help assist sessions.
//!
//! Calling for help pulls every ready consultant onto the board. The number
//! of helpers picks a [`HelpTier`], which fixes how long the session lasts,
//! whether the helpers rearrange tiles on a timer, and what each helper pays
//! in stamina when it ends.
//!
//! A session is a pair of real-time countdowns (total duration and rearrange
//! interval) advanced by [`AssistSession::advance`]. Dropping the session
//! cancels both; nothing outlives it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConsultantId;

/// Assist bucket by helper count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelpTier {
    /// One helper: highlights only
    Solo,
    /// Two helpers: highlights and periodic rearrangement
    Pair,
    /// Three or more helpers: faster rearrangement, cheaper per head
    Team,
}

impl HelpTier {
    /// Tier for `helpers` consultants, `None` for zero.
    #[must_use]
    pub const fn for_helpers(helpers: usize) -> Option<Self> {
        match helpers {
            0 => None,
            1 => Some(Self::Solo),
            2 => Some(Self::Pair),
            _ => Some(Self::Team),
        }
    }

    /// Whether helpers rearrange tiles in this tier.
    #[must_use]
    pub const fn rearranges(self) -> bool {
        !matches!(self, Self::Solo)
    }
}

/// Parameters of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSettings {
    /// Session length in milliseconds
    pub duration_ms: u64,
    /// Rearrangement period in milliseconds, if the tier rearranges
    pub rearrange_interval_ms: Option<u64>,
    /// Stamina each helper pays when the session ends
    pub stamina_cost: u8,
}

/// Tier table and cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// One helper
    pub solo: TierSettings,
    /// Two helpers
    pub pair: TierSettings,
    /// Three or more helpers
    pub team: TierSettings,
    /// Ticks a helper must wait before helping again
    pub cooldown_ticks: u32,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            solo: TierSettings {
                duration_ms: 10_000,
                rearrange_interval_ms: None,
                stamina_cost: 15,
            },
            pair: TierSettings {
                duration_ms: 20_000,
                rearrange_interval_ms: Some(2_500),
                stamina_cost: 10,
            },
            team: TierSettings {
                duration_ms: 10_000,
                rearrange_interval_ms: Some(2_000),
                stamina_cost: 5,
            },
            cooldown_ticks: 20,
        }
    }
}

impl AssistConfig {
    /// Settings of `tier`.
    #[must_use]
    pub fn settings(&self, tier: HelpTier) -> &TierSettings {
        match tier {
            HelpTier::Solo => &self.solo,
            HelpTier::Pair => &self.pair,
            HelpTier::Team => &self.team,
        }
    }
}

/// Progress reported by one [`AssistSession::advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssistProgress {
    /// Rearrangement intervals that elapsed
    pub rearrangements_due: u32,
    /// The session ran out
    pub expired: bool,
}

/// A running call-for-help.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssistSession {
    helpers: Vec<ConsultantId>,
    tier: HelpTier,
    stamina_cost: u8,
    remaining: Duration,
    interval: Option<Duration>,
    until_rearrange: Duration,
    highlighted: Vec<usize>,
    rearrangements: u32,
}

impl AssistSession {
    /// Start a session for `helpers` with the given tier settings.
    #[must_use]
    pub fn new(helpers: Vec<ConsultantId>, tier: HelpTier, settings: &TierSettings) -> Self {
        let interval = settings
            .rearrange_interval_ms
            .filter(|_| tier.rearranges())
            .map(Duration::from_millis);
        Self {
            helpers,
            tier,
            stamina_cost: settings.stamina_cost,
            remaining: Duration::from_millis(settings.duration_ms),
            interval,
            until_rearrange: interval.unwrap_or_default(),
            highlighted: Vec::new(),
            rearrangements: 0,
        }
    }

    /// Consultants in this session.
    #[must_use]
    pub fn helpers(&self) -> &[ConsultantId] {
        &self.helpers
    }

    /// Tier.
    #[must_use]
    pub fn tier(&self) -> HelpTier {
        self.tier
    }

    /// Stamina each helper pays at the end.
    #[must_use]
    pub fn stamina_cost(&self) -> u8 {
        self.stamina_cost
    }

    /// Time left.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Cells currently highlighted as playable.
    #[must_use]
    pub fn highlighted(&self) -> &[usize] {
        &self.highlighted
    }

    /// Replace the highlighted cells.
    pub fn set_highlighted(&mut self, cells: Vec<usize>) {
        self.highlighted = cells;
    }

    /// Rearrangements performed so far.
    #[must_use]
    pub fn rearrangements(&self) -> u32 {
        self.rearrangements
    }

    /// Count one performed rearrangement.
    pub fn record_rearrangement(&mut self) {
        self.rearrangements += 1;
    }

    /// Run both countdowns forward by `elapsed`.
    ///
    /// Time past the end of the session is ignored, so no rearrangement can
    /// fall due after expiry.
    pub fn advance(&mut self, elapsed: Duration) -> AssistProgress {
        let mut step = elapsed.min(self.remaining);
        self.remaining -= step;

        let mut due = 0;
        if let Some(interval) = self.interval.filter(|i| !i.is_zero()) {
            while step >= self.until_rearrange {
                step -= self.until_rearrange;
                self.until_rearrange = interval;
                due += 1;
            }
            self.until_rearrange -= step;
        }

        AssistProgress {
            rearrangements_due: due,
            expired: self.remaining.is_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helpers(n: u32) -> Vec<ConsultantId> {
        (1..=n).map(ConsultantId::new).collect()
    }

    #[test]
    fn test_tier_by_helper_count() {
        assert_eq!(HelpTier::for_helpers(0), None);
        assert_eq!(HelpTier::for_helpers(1), Some(HelpTier::Solo));
        assert_eq!(HelpTier::for_helpers(2), Some(HelpTier::Pair));
        assert_eq!(HelpTier::for_helpers(3), Some(HelpTier::Team));
        assert_eq!(HelpTier::for_helpers(7), Some(HelpTier::Team));
    }

    #[test]
    fn test_solo_never_rearranges() {
        let config = AssistConfig::default();
        let mut session = AssistSession::new(helpers(1), HelpTier::Solo, config.settings(HelpTier::Solo));
        let progress = session.advance(Duration::from_secs(9));
        assert_eq!(progress.rearrangements_due, 0);
        assert!(!progress.expired);
        assert!(session.advance(Duration::from_secs(1)).expired);
    }

    #[test]
    fn test_pair_rearranges_every_interval() {
        let config = AssistConfig::default();
        let mut session = AssistSession::new(helpers(2), HelpTier::Pair, config.settings(HelpTier::Pair));
        assert_eq!(session.advance(Duration::from_millis(2_499)).rearrangements_due, 0);
        assert_eq!(session.advance(Duration::from_millis(1)).rearrangements_due, 1);
        assert_eq!(session.advance(Duration::from_millis(5_000)).rearrangements_due, 2);
        let last = session.advance(Duration::from_secs(60));
        // 12.5 s left at 2.5 s intervals
        assert_eq!(last.rearrangements_due, 5);
        assert!(last.expired);
        assert_eq!(session.advance(Duration::from_secs(60)).rearrangements_due, 0);
    }

    #[test]
    fn test_team_tier_settings() {
        let config = AssistConfig::default();
        let team = config.settings(HelpTier::Team);
        assert_eq!(team.duration_ms, 10_000);
        assert_eq!(team.rearrange_interval_ms, Some(2_000));
        assert_eq!(team.stamina_cost, 5);
        let mut session = AssistSession::new(helpers(3), HelpTier::Team, team);
        assert_eq!(session.advance(Duration::from_secs(10)).rearrangements_due, 5);
    }
}
