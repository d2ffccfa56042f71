//! Row builders for tests. Vote casting is not part of this crate, so tests
//! insert the rows the ballot pages would have written.

use super::Database;
use crate::models::{ElectionStatus, SessionStatus};

pub struct Seed<'a> {
    db: &'a Database,
}

impl<'a> Seed<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn program(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO programs (name) VALUES (?)")
            .bind(name.to_string())
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn student(&self, program_id: i64, first_name: &str, is_active: bool, is_verified: bool) -> i64 {
        sqlx::query(
            "INSERT INTO students (program_id, first_name, last_name, is_active, is_verified) VALUES (?, ?, 'Student', ?, ?)",
        )
        .bind(program_id)
        .bind(first_name.to_string())
        .bind(is_active)
        .bind(is_verified)
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn election(&self, name: &str, status: ElectionStatus, starts_at: &str) -> i64 {
        sqlx::query(
            "INSERT INTO elections (name, election_type, starts_at, ends_at, status, created_by)
             VALUES (?, 'council', ?, ?, ?, 1)",
        )
        .bind(name.to_string())
        .bind(starts_at.to_string())
        .bind(starts_at.to_string())
        .bind(status.as_str())
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn position(&self, election_id: i64, title: &str) -> i64 {
        sqlx::query("INSERT INTO positions (election_id, title, max_candidates) VALUES (?, ?, 3)")
            .bind(election_id)
            .bind(title.to_string())
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn candidate(&self, position_id: i64, student_id: i64, created_at: &str) -> i64 {
        sqlx::query("INSERT INTO candidates (position_id, student_id, created_at) VALUES (?, ?, ?)")
            .bind(position_id)
            .bind(student_id)
            .bind(created_at.to_string())
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn session(&self, student_id: i64, election_id: i64, status: SessionStatus, started_at: &str) -> i64 {
        let completed_at = match status {
            SessionStatus::Completed => Some(started_at.to_string()),
            SessionStatus::InProgress => None,
        };
        sqlx::query(
            "INSERT INTO voting_sessions (student_id, election_id, status, started_at, completed_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(student_id)
        .bind(election_id)
        .bind(status.as_str())
        .bind(started_at.to_string())
        .bind(completed_at)
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn completed_session(&self, student_id: i64, election_id: i64, started_at: &str) -> i64 {
        self.session(student_id, election_id, SessionStatus::Completed, started_at).await
    }

    pub async fn vote(&self, session_id: i64, candidate_id: i64) -> i64 {
        sqlx::query("INSERT INTO votes (session_id, candidate_id) VALUES (?, ?)")
            .bind(session_id)
            .bind(candidate_id)
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn abstain(&self, session_id: i64, position_id: i64) -> i64 {
        sqlx::query("INSERT INTO abstain_votes (session_id, position_id) VALUES (?, ?)")
            .bind(session_id)
            .bind(position_id)
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }
}
