use std::fmt;

use serde::{Deserialize, Serialize};

use crate::colors::{TeamColor, team_color};
use crate::config::DEFAULT_TEAMS;
use crate::error::GridClaimError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    pub name: String,
    pub color: TeamColor,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, color: TeamColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }
}

/// Ordered team list plus the team edits are currently made for.
/// Teams are only ever appended, so indices stay stable.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoster {
    teams: Vec<Team>,
    current: usize,
    next_seq: u64,
}

impl Default for TeamRoster {
    fn default() -> Self {
        let teams = DEFAULT_TEAMS
            .iter()
            .map(|&(id, name, color)| Team::new(TeamId::new(id), name, color))
            .collect();
        Self {
            teams,
            current: 0,
            next_seq: 1,
        }
    }
}

impl TeamRoster {
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Team {
        &self.teams[self.current]
    }

    pub fn get(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|team| &team.id == id)
    }

    pub fn color_of(&self, id: &TeamId) -> Option<TeamColor> {
        self.get(id).map(|team| team.color)
    }

    /// Make the team at `index` current. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.teams.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    pub fn select_id(&mut self, id: &TeamId) -> Result<(), GridClaimError> {
        let index = self
            .teams
            .iter()
            .position(|team| &team.id == id)
            .ok_or_else(|| GridClaimError::UnknownTeam(id.to_string()))?;
        self.current = index;
        Ok(())
    }

    /// Append a team with a color derived from its name and make it current.
    pub fn add(&mut self, name: &str) -> Result<&Team, GridClaimError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GridClaimError::EmptyTeamName);
        }
        let color = team_color(name);
        self.add_with_color(name, color)
    }

    pub fn add_with_color(
        &mut self,
        name: &str,
        color: TeamColor,
    ) -> Result<&Team, GridClaimError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GridClaimError::EmptyTeamName);
        }
        let id = self.allocate_id();
        self.teams.push(Team::new(id, name, color));
        self.current = self.teams.len() - 1;
        Ok(&self.teams[self.current])
    }

    pub fn rename_current(&mut self, name: &str) -> Result<(), GridClaimError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GridClaimError::EmptyTeamName);
        }
        self.teams[self.current].name = name.to_string();
        Ok(())
    }

    pub fn set_current_color(&mut self, color: TeamColor) -> bool {
        let team = &mut self.teams[self.current];
        if team.color == color {
            return false;
        }
        team.color = color;
        true
    }

    fn allocate_id(&mut self) -> TeamId {
        loop {
            let candidate = TeamId::new(format!("team-{}", self.next_seq));
            self.next_seq += 1;
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }
}
