// src/roster.rs
//
// Clan member roster, loaded from a plain text file with one member per
// line: `name:discord_id:alias1,alias2`. Result registration accepts either
// aliases or a role mention; both resolve to roster names here.

use crate::signup::{GroupDirectory, SignupError};
use log::warn;
use serenity::model::id::{RoleId, UserId};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A 6v6 war takes exactly six players per team.
pub const WAR_TEAM_SIZE: usize = 6;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("unknown member: {0}")]
    UnknownMember(String),
    #[error("that role does not exist")]
    UnknownRole,
    #[error("need exactly {WAR_TEAM_SIZE} players, got {0}")]
    WrongTeamSize(usize),
    #[error(transparent)]
    Directory(#[from] SignupError),
}

#[derive(Debug, Default)]
pub struct Roster {
    alias_to_name: HashMap<String, String>,
    id_to_name: HashMap<UserId, String>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Roster> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn parse(contents: &str) -> Roster {
        let mut roster = Roster::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(3, ':');
            let (Some(name), Some(id), Some(aliases)) =
                (parts.next(), parts.next(), parts.next())
            else {
                warn!("skipping malformed roster line: {line}");
                continue;
            };
            let Ok(id) = id.trim().parse::<u64>() else {
                warn!("skipping roster line with bad id: {line}");
                continue;
            };
            roster.id_to_name.insert(UserId::new(id), name.to_string());
            for alias in aliases.split(',') {
                let alias = alias.trim();
                if !alias.is_empty() {
                    roster
                        .alias_to_name
                        .insert(alias.to_string(), name.to_string());
                }
            }
        }
        roster
    }

    pub fn name_for(&self, user: UserId) -> Option<&str> {
        self.id_to_name.get(&user).map(String::as_str)
    }

    /// Resolves a single filter token: a user mention or an alias.
    pub fn resolve_single(&self, token: &str) -> Option<&str> {
        if let Some(inner) = token
            .strip_prefix("<@")
            .and_then(|s| s.strip_suffix('>'))
        {
            let id = inner.trim_start_matches('!').parse::<u64>().ok()?;
            return self.name_for(UserId::new(id));
        }
        self.alias_to_name.get(token).map(String::as_str)
    }

    /// Resolves a result-entry member argument to exactly six roster names.
    /// Accepts a role mention (`<@&…>`, expanded through the directory) or
    /// whitespace-separated aliases.
    pub async fn resolve_players(
        &self,
        arg: &str,
        directory: &impl GroupDirectory,
    ) -> Result<Vec<String>, RosterError> {
        let mut players = Vec::new();

        if let Some(inner) = arg
            .trim()
            .strip_prefix("<@&")
            .and_then(|s| s.strip_suffix('>'))
        {
            let role_id = inner.parse::<u64>().map_err(|_| RosterError::UnknownRole)?;
            let members = directory
                .members_of(RoleId::new(role_id))
                .await?
                .ok_or(RosterError::UnknownRole)?;
            for user in members {
                if let Some(name) = self.name_for(user) {
                    players.push(name.to_string());
                }
            }
        } else {
            for token in arg.split_whitespace() {
                let name = self
                    .alias_to_name
                    .get(token)
                    .ok_or_else(|| RosterError::UnknownMember(token.to_string()))?;
                players.push(name.clone());
            }
        }

        if players.len() != WAR_TEAM_SIZE {
            return Err(RosterError::WrongTeamSize(players.len()));
        }
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::testutil::MockDirectory;

    const ROSTER: &str = "\
# clan roster
aki:101:aki,akky
beni:102:beni
chidori:103:chidori,chii
dai:104:dai
emi:105:emi
fuu:106:fuu

not a member line
";

    #[test]
    fn parses_members_and_skips_junk() {
        let roster = Roster::parse(ROSTER);
        assert_eq!(roster.name_for(UserId::new(101)), Some("aki"));
        assert_eq!(roster.resolve_single("akky"), Some("aki"));
        assert_eq!(roster.resolve_single("<@103>"), Some("chidori"));
        assert_eq!(roster.resolve_single("<@!103>"), Some("chidori"));
        assert_eq!(roster.resolve_single("nobody"), None);
    }

    #[tokio::test]
    async fn resolves_six_aliases() {
        let roster = Roster::parse(ROSTER);
        let directory = MockDirectory::new();

        let players = roster
            .resolve_players("akky beni chii dai emi fuu", &directory)
            .await
            .unwrap();

        assert_eq!(players, vec!["aki", "beni", "chidori", "dai", "emi", "fuu"]);
    }

    #[tokio::test]
    async fn rejects_unknown_alias_and_wrong_team_size() {
        let roster = Roster::parse(ROSTER);
        let directory = MockDirectory::new();

        let err = roster
            .resolve_players("aki ghost beni dai emi fuu", &directory)
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::UnknownMember(ref t) if t == "ghost"));

        let err = roster
            .resolve_players("aki beni", &directory)
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::WrongTeamSize(2)));
    }

    #[tokio::test]
    async fn expands_a_role_mention_through_the_directory() {
        let roster = Roster::parse(ROSTER);
        let directory = MockDirectory::with_groups(vec![("21h", 121)]);
        for id in 101..=106 {
            directory.insert_member(RoleId::new(121), UserId::new(id));
        }
        // someone off the roster holds the role too
        directory.insert_member(RoleId::new(121), UserId::new(999));

        let players = roster
            .resolve_players("<@&121>", &directory)
            .await
            .unwrap();
        assert_eq!(players.len(), 6);
        assert!(players.contains(&"chidori".to_string()));
    }
}
