use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    pub id: i64,
    pub name: String,
    pub election_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ElectionStatus,
    pub created_by: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl ElectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionStatus::Draft => "draft",
            ElectionStatus::Active => "active",
            ElectionStatus::Completed => "completed",
            ElectionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, UnknownVariant> {
        match value {
            "draft" => Ok(ElectionStatus::Draft),
            "active" => Ok(ElectionStatus::Active),
            "completed" => Ok(ElectionStatus::Completed),
            "cancelled" => Ok(ElectionStatus::Cancelled),
            _ => Err(UnknownVariant { kind: "election status", value: value.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub election_id: i64,
    pub title: String,
    pub max_candidates: i64,
}

/// A candidate row joined with its vote count, as read by the tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateVotes {
    pub candidate_id: i64,
    pub position_id: i64,
    pub student_name: String,
    pub created_at: DateTime<Utc>,
    pub vote_count: u64,
}

/// Eligible-voter counts for one program, as read by the turnout report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramCounts {
    pub program_id: i64,
    pub program_name: String,
    pub total_students: u64,
    pub voted_students: u64,
}

// ---- Report outputs ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub candidate_id: i64,
    pub student_name: String,
    pub vote_count: u64,
    pub vote_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTally {
    pub position_id: i64,
    pub title: String,
    /// Seats the position fills.
    pub max_candidates: i64,
    pub candidates: Vec<CandidateTally>,
    pub abstain_count: u64,
    pub abstain_percentage: f64,
    pub total_expressed: u64,
    /// Every candidate holding the top vote count. More than one entry means a tie.
    pub leaders: Vec<i64>,
}

impl PositionTally {
    pub fn is_tied(&self) -> bool {
        self.leaders.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionTally {
    pub election_id: i64,
    pub election_name: String,
    pub positions: Vec<PositionTally>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramTurnout {
    pub program_id: i64,
    pub program_name: String,
    pub total_students: u64,
    pub voted_students: u64,
    pub turnout_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTurnout {
    pub eligible_voters: u64,
    pub voted: u64,
    pub turnout_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoutReport {
    pub election_id: i64,
    pub programs: Vec<ProgramTurnout>,
    pub overall: OverallTurnout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineBucket {
    pub date: NaiveDate,
    pub hour: u32,
    pub count: u64,
}

/// Raw counts feeding the summary. Scoped to one election or system-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total_voters: u64,
    pub total_votes: u64,
    pub total_positions: u64,
    pub total_candidates: u64,
    pub eligible_voters: u64,
    pub abstains: u64,
    pub completed_sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub election_id: Option<i64>,
    pub total_voters: u64,
    pub total_votes: u64,
    pub total_positions: u64,
    pub total_candidates: u64,
    pub eligible_voters: u64,
    pub abstains: u64,
    pub completed_sessions: u64,
    pub avg_votes_per_session: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionPage {
    pub elections: Vec<Election>,
    pub page: i64,
    pub per_page: i64,
    pub total: u64,
}
