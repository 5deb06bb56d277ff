use super::quote::TeamSide;
use serde::{Deserialize, Serialize};

/// A team as known to the external model source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Power rating in points (higher = stronger)
    #[serde(default)]
    pub power_rating: Option<f64>,
}

/// One sporting contest: two teams, one of them at home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub home: Team,
    pub away: Team,
}

impl Contest {
    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    /// Expected home margin from power ratings plus home-field edge.
    ///
    /// `None` unless both teams carry a finite rating.
    pub fn power_edge(&self, home_field_advantage: f64) -> Option<f64> {
        let home = self.home.power_rating.filter(|r| r.is_finite())?;
        let away = self.away.power_rating.filter(|r| r.is_finite())?;
        Some(home + home_field_advantage - away)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str, rating: Option<f64>) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_uppercase(),
            power_rating: rating,
        }
    }

    #[test]
    fn test_power_edge_adds_home_field() {
        let contest = Contest {
            id: "g1".into(),
            home: team("bos", Some(5.0)),
            away: team("nyk", Some(6.0)),
        };
        assert_eq!(contest.power_edge(2.5), Some(1.5));
        assert_eq!(contest.team(TeamSide::Away).id, "nyk");
    }

    #[test]
    fn test_power_edge_requires_both_ratings() {
        let contest = Contest {
            id: "g1".into(),
            home: team("bos", Some(5.0)),
            away: team("nyk", None),
        };
        assert_eq!(contest.power_edge(2.5), None);
    }
}
