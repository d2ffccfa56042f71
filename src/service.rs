use std::sync::Arc;
use log::{debug, info, warn};
use serde_json::{json, Value};
use crate::audit::{AuditLog, RequestContext};
use crate::db::Database;
use crate::error::{ReportError, Result};
use crate::models::{ElectionPage, ElectionStatus, ElectionTally, Summary, TimelineBucket, TurnoutReport};
use crate::reports::{summary, tally, timeline, turnout};

pub const MAX_PER_PAGE: i64 = 100;

/// Entry point for report consumers. Every call is read-only; a missing
/// election is always `NotFound`, never an empty report.
pub struct ReportService {
    database: Arc<Database>,
    audit: Arc<dyn AuditLog>,
}

impl ReportService {
    pub fn new(database: Arc<Database>) -> Self {
        let audit: Arc<dyn AuditLog> = database.clone();
        Self { database, audit }
    }

    #[cfg(test)]
    pub fn with_audit(database: Arc<Database>, audit: Arc<dyn AuditLog>) -> Self {
        Self { database, audit }
    }

    pub async fn tally(&self, ctx: &RequestContext, election_id: i64) -> Result<ElectionTally> {
        // Read everything from one snapshot
        let rows = self
            .database
            .tally_rows(election_id)
            .await?
            .ok_or_else(|| ReportError::election_not_found(election_id))?;

        let result = tally::calculate_tally(&rows.election, &rows.positions, rows.candidates, &rows.abstains);
        for position in result.positions.iter().filter(|p| p.is_tied()) {
            info!("Position '{}' is tied between candidates {:?}", position.title, position.leaders);
        }
        info!(
            "Tallied election {} ({} positions) for {}",
            election_id,
            result.positions.len(),
            ctx.actor
        );

        // Only successful reports reach the audit log
        self.record_audit(ctx, "report.tally", json!({ "election_id": election_id })).await;
        Ok(result)
    }

    pub async fn turnout(&self, ctx: &RequestContext, election_id: i64) -> Result<TurnoutReport> {
        let rows = self
            .database
            .turnout_rows(election_id)
            .await?
            .ok_or_else(|| ReportError::election_not_found(election_id))?;

        debug!("Computing turnout for election '{}'", rows.election.name);
        let report = turnout::calculate_turnout(election_id, rows.programs, rows.eligible_voters, rows.voted);

        self.record_audit(ctx, "report.turnout", json!({ "election_id": election_id })).await;
        Ok(report)
    }

    pub async fn timeline(&self, ctx: &RequestContext, election_id: i64) -> Result<Vec<TimelineBucket>> {
        let starts = self
            .database
            .completed_session_starts(election_id)
            .await?
            .ok_or_else(|| ReportError::election_not_found(election_id))?;

        let buckets = timeline::bucket_sessions(&starts);
        debug!("{} sessions in {} hourly buckets", starts.len(), buckets.len());

        self.record_audit(ctx, "report.timeline", json!({ "election_id": election_id })).await;
        Ok(buckets)
    }

    pub async fn summary(&self, ctx: &RequestContext, election_id: Option<i64>) -> Result<Summary> {
        // Scope check and counts share one snapshot
        let counts = self.database.summary_counts(election_id).await?.ok_or_else(|| {
            ReportError::election_not_found(election_id.unwrap_or_default())
        })?;
        let result = summary::calculate_summary(election_id, counts);

        self.record_audit(ctx, "report.summary", json!({ "election_id": election_id })).await;
        Ok(result)
    }

    /// `page` is 1-based; `per_page` must be within 1..=100.
    pub async fn list_elections(
        &self,
        ctx: &RequestContext,
        page: i64,
        per_page: i64,
        status: Option<ElectionStatus>,
    ) -> Result<ElectionPage> {
        if page < 1 {
            return Err(ReportError::InvalidArgument(format!("page must be at least 1, got {}", page)));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(ReportError::InvalidArgument(format!(
                "per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE, per_page
            )));
        }
        // Pages are 1-based
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| ReportError::InvalidArgument(format!("page {} is out of range", page)))?;

        let (elections, total) = self.database.list_elections(status, per_page, offset).await?;

        self.record_audit(
            ctx,
            "elections.list",
            json!({ "page": page, "per_page": per_page, "status": status.map(|s| s.as_str()) }),
        )
        .await;

        Ok(ElectionPage {
            elections,
            page,
            per_page,
            total,
        })
    }

    async fn record_audit(&self, ctx: &RequestContext, action: &str, details: Value) {
        if let Err(e) = self.audit.record(ctx, action, details).await {
            warn!("Failed to write audit entry '{}' for request {}: {}", action, ctx.request_id, e);
        }
    }
}
