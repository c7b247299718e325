//! Round Statistics
//!
//! Opaque per-round blob from the simulator. The world state never looks
//! inside beyond the two read accessors the render layer needs; the whole
//! blob is replaced each round and shared by `Arc` once installed.

use serde::{Serialize, Deserialize};

use crate::world::types::Team;

/// Statistics published at the end of a round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    /// Banked resources per competitor, team A first
    #[serde(default)]
    pub team_resources: [f64; 2],

    /// Research progress per competitor, one fraction per upgrade
    #[serde(default)]
    pub research_progress: [Vec<f64>; 2],
}

impl RoundStats {
    /// Resources held by `team`. Neutral holds none.
    pub fn team_resources(&self, team: Team) -> f64 {
        team.index().map_or(0.0, |i| self.team_resources[i])
    }

    /// Progress of research item `index` for `team`, `None` if not reported.
    pub fn research_progress(&self, team: Team, index: usize) -> Option<f64> {
        let i = team.index()?;
        self.research_progress[i].get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let stats = RoundStats {
            team_resources: [12.5, 3.0],
            research_progress: [vec![0.25, 1.0], vec![]],
        };
        assert_eq!(stats.team_resources(Team::A), 12.5);
        assert_eq!(stats.team_resources(Team::Neutral), 0.0);
        assert_eq!(stats.research_progress(Team::A, 1), Some(1.0));
        assert_eq!(stats.research_progress(Team::B, 0), None);
        assert_eq!(stats.research_progress(Team::Neutral, 0), None);
    }

    #[test]
    fn test_partial_json() {
        let stats: RoundStats = serde_json::from_str(r#"{"team_resources": [1.0, 2.0]}"#).unwrap();
        assert_eq!(stats.team_resources(Team::B), 2.0);
        assert!(stats.research_progress[0].is_empty());
    }
}
