//! The set of players in a session.

use std::collections::HashMap;

use scrawl_protocol::{Avatar, Player, PlayerId};

/// Identity → player mapping, owned by the session coordinator.
#[derive(Debug, Default)]
pub struct Roster {
    players: HashMap<PlayerId, Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a player with score 0. Returns `false` (and changes nothing)
    /// if the identity is already present.
    pub fn add(&mut self, id: PlayerId, name: String, avatar: Avatar) -> bool {
        if self.players.contains_key(&id) {
            return false;
        }
        self.players.insert(
            id,
            Player {
                id,
                name,
                avatar,
                score: 0,
            },
        );
        true
    }

    /// Remove a player. `None` if the identity was not present.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Display name of a player, if present.
    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        self.players.get(&id).map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All identities, sorted.
    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Owned copy of every player, sorted by id. This is what goes out in
    /// `player_list_update` and `correct_guess`.
    pub fn snapshot(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_unstable_by_key(|p| p.id);
        players
    }

    /// Add points to a player's score (saturating). Returns the new score,
    /// or `None` if the player is not present.
    pub fn award(&mut self, id: PlayerId, points: u32) -> Option<u32> {
        let player = self.players.get_mut(&id)?;
        player.score = player.score.saturating_add(points);
        Some(player.score)
    }
}
