use sqlx::{migrate::MigrateDatabase, sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow}, Sqlite, Row};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use crate::config::Config;
use crate::error::{decode_error, Result};
use crate::models::{CandidateVotes, Election, ElectionStatus, Position, ProgramCounts, SessionStatus, SummaryCounts};

#[cfg(test)]
pub mod fixtures;

/// Everything the tally reads for one election, taken from a single snapshot.
pub struct TallyRows {
    pub election: Election,
    pub positions: Vec<Position>,
    pub candidates: Vec<CandidateVotes>,
    pub abstains: HashMap<i64, u64>,
}

pub struct TurnoutRows {
    pub election: Election,
    pub programs: Vec<ProgramCounts>,
    pub eligible_voters: u64,
    pub voted: u64,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(&config.database_url).await.unwrap_or(false) {
            info!("Creating database at {}", config.database_url);
            Sqlite::create_database(&config.database_url).await?;
        }

        // Connect to the database
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// A private in-memory database. The pool holds a single connection that
    /// never expires, since each SQLite memory connection is its own database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS programs (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY,
                program_id INTEGER,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                is_verified BOOLEAN NOT NULL DEFAULT FALSE,
                FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE SET NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS elections (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                election_type TEXT NOT NULL,
                starts_at TEXT NOT NULL,
                ends_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                created_by INTEGER NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS positions (
                id INTEGER PRIMARY KEY,
                election_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                max_candidates INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY (election_id) REFERENCES elections(id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id INTEGER PRIMARY KEY,
                position_id INTEGER NOT NULL,
                student_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (position_id, student_id),
                FOREIGN KEY (position_id) REFERENCES positions(id) ON DELETE CASCADE,
                FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS voting_sessions (
                id INTEGER PRIMARY KEY,
                student_id INTEGER NOT NULL,
                election_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'in_progress',
                started_at TEXT NOT NULL,
                completed_at TEXT,
                FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE,
                FOREIGN KEY (election_id) REFERENCES elections(id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id INTEGER PRIMARY KEY,
                session_id INTEGER NOT NULL,
                candidate_id INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES voting_sessions(id) ON DELETE CASCADE,
                FOREIGN KEY (candidate_id) REFERENCES candidates(id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS abstain_votes (
                id INTEGER PRIMARY KEY,
                session_id INTEGER NOT NULL,
                position_id INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES voting_sessions(id) ON DELETE CASCADE,
                FOREIGN KEY (position_id) REFERENCES positions(id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                details TEXT NOT NULL,
                request_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema initialised");
        Ok(())
    }

    /// Reads the tally inputs inside one transaction. `None` if the election does not exist.
    pub async fn tally_rows(&self, election_id: i64) -> Result<Option<TallyRows>> {
        let mut tx = self.pool.begin().await?;

        let Some(election) = fetch_election(&mut tx, election_id).await? else {
            return Ok(None);
        };

        // Positions in registration order
        let positions = sqlx::query(
            r#"
            SELECT id, election_id, title, max_candidates
            FROM positions
            WHERE election_id = ?
            ORDER BY id
            "#,
        )
        .bind(election_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| Position {
            id: row.get("id"),
            election_id: row.get("election_id"),
            title: row.get("title"),
            max_candidates: row.get("max_candidates"),
        })
        .collect();

        // Candidates with their votes from completed sessions; zero-vote candidates stay listed
        let candidates = sqlx::query(
            r#"
            SELECT c.id AS candidate_id,
                   c.position_id,
                   s.first_name || ' ' || s.last_name AS student_name,
                   c.created_at,
                   COUNT(v.id) AS vote_count
            FROM candidates c
            JOIN positions p ON p.id = c.position_id
            JOIN students s ON s.id = c.student_id
            LEFT JOIN (
                SELECT v.id, v.candidate_id
                FROM votes v
                JOIN voting_sessions vs ON vs.id = v.session_id
                WHERE vs.status = ?
            ) v ON v.candidate_id = c.id
            WHERE p.election_id = ?
            GROUP BY c.id, c.position_id, s.first_name, s.last_name, c.created_at
            "#,
        )
        .bind(SessionStatus::Completed.as_str())
        .bind(election_id)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| {
            Ok(CandidateVotes {
                candidate_id: row.get("candidate_id"),
                position_id: row.get("position_id"),
                student_name: row.get("student_name"),
                created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
                vote_count: count(row, "vote_count"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

        // Explicit abstains per position, completed sessions only
        let abstains = sqlx::query(
            r#"
            SELECT a.position_id, COUNT(*) AS abstain_count
            FROM abstain_votes a
            JOIN positions p ON p.id = a.position_id
            JOIN voting_sessions vs ON vs.id = a.session_id
            WHERE p.election_id = ? AND vs.status = ?
            GROUP BY a.position_id
            "#,
        )
        .bind(election_id)
        .bind(SessionStatus::Completed.as_str())
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| (row.get::<i64, _>("position_id"), count(row, "abstain_count")))
        .collect();

        tx.commit().await?;

        Ok(Some(TallyRows { election, positions, candidates, abstains }))
    }

    pub async fn turnout_rows(&self, election_id: i64) -> Result<Option<TurnoutRows>> {
        let mut tx = self.pool.begin().await?;

        let Some(election) = fetch_election(&mut tx, election_id).await? else {
            return Ok(None);
        };

        let programs = sqlx::query(
            r#"
            SELECT pr.id AS program_id,
                   pr.name AS program_name,
                   COUNT(DISTINCT s.id) AS total_students,
                   COUNT(DISTINCT vs.student_id) AS voted_students
            FROM programs pr
            LEFT JOIN students s
                ON s.program_id = pr.id AND s.is_active = TRUE AND s.is_verified = TRUE
            LEFT JOIN voting_sessions vs
                ON vs.student_id = s.id AND vs.election_id = ? AND vs.status = ?
            GROUP BY pr.id, pr.name
            ORDER BY pr.id
            "#,
        )
        .bind(election_id)
        .bind(SessionStatus::Completed.as_str())
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| ProgramCounts {
            program_id: row.get("program_id"),
            program_name: row.get("program_name"),
            total_students: count(row, "total_students"),
            voted_students: count(row, "voted_students"),
        })
        .collect();

        // Whole eligible population, regardless of program
        let overall = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students
                 WHERE is_active = TRUE AND is_verified = TRUE) AS eligible_voters,
                (SELECT COUNT(DISTINCT s.id)
                 FROM students s
                 JOIN voting_sessions vs ON vs.student_id = s.id
                 WHERE s.is_active = TRUE AND s.is_verified = TRUE
                   AND vs.election_id = ? AND vs.status = ?) AS voted
            "#,
        )
        .bind(election_id)
        .bind(SessionStatus::Completed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(TurnoutRows {
            election,
            programs,
            eligible_voters: count(&overall, "eligible_voters"),
            voted: count(&overall, "voted"),
        }))
    }

    /// Start times of completed sessions, or `None` if the election does not exist.
    pub async fn completed_session_starts(&self, election_id: i64) -> Result<Option<Vec<DateTime<Utc>>>> {
        let mut tx = self.pool.begin().await?;

        if fetch_election(&mut tx, election_id).await?.is_none() {
            return Ok(None);
        }

        let starts = sqlx::query(
            r#"
            SELECT started_at
            FROM voting_sessions
            WHERE election_id = ? AND status = ?
            ORDER BY started_at
            "#,
        )
        .bind(election_id)
        .bind(SessionStatus::Completed.as_str())
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| parse_timestamp(&row.get::<String, _>("started_at")))
        .collect::<Result<Vec<_>>>()?;

        tx.commit().await?;
        Ok(Some(starts))
    }

    /// Counting aggregates for the summary. `election_id = None` counts system-wide.
    /// Votes and abstains only count when their session was completed. Eligible
    /// voters are always counted over the whole student body.
    /// Returns `None` if a given election does not exist.
    pub async fn summary_counts(&self, election_id: Option<i64>) -> Result<Option<SummaryCounts>> {
        let mut tx = self.pool.begin().await?;

        // Check the scope inside the same snapshot as the counts
        if let Some(id) = election_id {
            if fetch_election(&mut tx, id).await?.is_none() {
                return Ok(None);
            }
        }

        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT student_id) FROM voting_sessions
                 WHERE status = ?1 AND (?2 IS NULL OR election_id = ?2)) AS total_voters,
                (SELECT COUNT(*) FROM votes v
                 JOIN voting_sessions vs ON vs.id = v.session_id
                 JOIN candidates c ON c.id = v.candidate_id
                 JOIN positions p ON p.id = c.position_id
                 WHERE vs.status = ?1 AND (?2 IS NULL OR p.election_id = ?2)) AS total_votes,
                (SELECT COUNT(*) FROM positions
                 WHERE ?2 IS NULL OR election_id = ?2) AS total_positions,
                (SELECT COUNT(*) FROM candidates c
                 JOIN positions p ON p.id = c.position_id
                 WHERE ?2 IS NULL OR p.election_id = ?2) AS total_candidates,
                (SELECT COUNT(*) FROM students
                 WHERE is_active = TRUE AND is_verified = TRUE) AS eligible_voters,
                (SELECT COUNT(*) FROM abstain_votes a
                 JOIN voting_sessions vs ON vs.id = a.session_id
                 JOIN positions p ON p.id = a.position_id
                 WHERE vs.status = ?1 AND (?2 IS NULL OR p.election_id = ?2)) AS abstains,
                (SELECT COUNT(*) FROM voting_sessions
                 WHERE status = ?1 AND (?2 IS NULL OR election_id = ?2)) AS completed_sessions
            "#,
        )
        .bind(SessionStatus::Completed.as_str())
        .bind(election_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(SummaryCounts {
            total_voters: count(&row, "total_voters"),
            total_votes: count(&row, "total_votes"),
            total_positions: count(&row, "total_positions"),
            total_candidates: count(&row, "total_candidates"),
            eligible_voters: count(&row, "eligible_voters"),
            abstains: count(&row, "abstains"),
            completed_sessions: count(&row, "completed_sessions"),
        }))
    }

    // Newest first. `offset`/`limit` are already validated by the caller.
    pub async fn list_elections(
        &self,
        status: Option<ElectionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Election>, u64)> {
        let status = status.map(|s| s.as_str());
        let mut tx = self.pool.begin().await?;

        let elections = sqlx::query(
            r#"
            SELECT id, name, election_type, starts_at, ends_at, status, created_by
            FROM elections
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY starts_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(election_from_row)
        .collect::<Result<Vec<_>>>()?;

        let total = sqlx::query("SELECT COUNT(*) AS total FROM elections WHERE ?1 IS NULL OR status = ?1")
            .bind(status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((elections, count(&total, "total")))
    }

    pub async fn insert_audit_log(
        &self,
        actor: &str,
        action: &str,
        details: &str,
        request_id: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (actor, action, details, request_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(actor)
        .bind(action)
        .bind(details)
        .bind(request_id)
        .bind(at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

async fn fetch_election(conn: &mut SqliteConnection, election_id: i64) -> Result<Option<Election>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, election_type, starts_at, ends_at, status, created_by
        FROM elections
        WHERE id = ?
        "#,
    )
    .bind(election_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(election_from_row).transpose()
}

fn election_from_row(row: &SqliteRow) -> Result<Election> {
    let status = ElectionStatus::parse(&row.get::<String, _>("status")).map_err(decode_error)?;

    Ok(Election {
        id: row.get("id"),
        name: row.get("name"),
        election_type: row.get("election_type"),
        starts_at: parse_timestamp(&row.get::<String, _>("starts_at"))?,
        ends_at: parse_timestamp(&row.get::<String, _>("ends_at"))?,
        status,
        created_by: row.get("created_by"),
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(decode_error)
}

// SQLite hands COUNT(*) back as a signed integer.
fn count(row: &SqliteRow, column: &str) -> u64 {
    u64::try_from(row.get::<i64, _>(column)).unwrap_or(0)
}
