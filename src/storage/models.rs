// src/storage/models.rs

use chrono::NaiveDateTime;
use std::fmt;

/// A 6v6 war against a single enemy team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoTeamResult {
    pub result_id: i64,
    pub player: String,
    pub my_score: i64,
    pub enemy: String,
    pub enemy_score: i64,
    pub date: String,
}

/// A four-team war: our score plus three enemy teams and the finishing rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FourTeamResult {
    pub result_id: i64,
    pub player: String,
    pub my_score: i64,
    pub opponents: [(String, i64); 3],
    pub rank: i64,
    pub date: String,
}

/// Every result-table layout is its own variant; nothing downstream
/// inspects raw rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRecord {
    TwoTeam(TwoTeamResult),
    FourTeam(FourTeamResult),
}

impl MatchRecord {
    /// One fixed-width line for the code-block result list.
    pub fn list_line(&self) -> String {
        match self {
            MatchRecord::TwoTeam(r) => format!(
                "{:>4}  {:>3} - {:<3}  {:<8} {:<4}  {}",
                r.result_id,
                r.my_score,
                r.enemy_score,
                r.enemy,
                r.outcome().to_string(),
                r.date
            ),
            MatchRecord::FourTeam(r) => format!(
                "{:>4}  {:>3} pts  #{}  {:<8} {:<8} {:<8}  {}",
                r.result_id,
                r.my_score,
                r.rank,
                r.opponents[0].0,
                r.opponents[1].0,
                r.opponents[2].0,
                r.date
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Lose,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Win => "Win",
            Outcome::Draw => "Draw",
            Outcome::Lose => "Lose",
        })
    }
}

pub fn judge(my_score: i64, enemy_score: i64) -> Outcome {
    match my_score.cmp(&enemy_score) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Less => Outcome::Lose,
        std::cmp::Ordering::Equal => Outcome::Draw,
    }
}

impl TwoTeamResult {
    pub fn outcome(&self) -> Outcome {
        judge(self.my_score, self.enemy_score)
    }
}

/// Results are entered as `yyyymmddhh` and stored as `yyyy/mm/dd hh`.
pub fn format_entry_date(raw: &str) -> Result<String, chrono::ParseError> {
    // chrono refuses a datetime without minutes, so pad them on
    let parsed = NaiveDateTime::parse_from_str(&format!("{raw}00"), "%Y%m%d%H%M")?;
    Ok(parsed.format("%Y/%m/%d %H").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_compares_scores() {
        assert_eq!(judge(500, 420), Outcome::Win);
        assert_eq!(judge(420, 500), Outcome::Lose);
        assert_eq!(judge(460, 460), Outcome::Draw);
    }

    #[test]
    fn entry_dates_are_reformatted() {
        assert_eq!(format_entry_date("2025082821").unwrap(), "2025/08/28 21");
        assert!(format_entry_date("2025-08-28").is_err());
        assert!(format_entry_date("21").is_err());
    }
}
