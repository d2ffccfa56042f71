use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use crate::db::Database;
use crate::error::Result;

/// Who is asking, carried explicitly through a request instead of living in
/// ambient session state. The report computations never see it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: String,
    pub request_id: Uuid,
}

impl RequestContext {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            request_id: Uuid::new_v4(),
        }
    }
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, ctx: &RequestContext, action: &str, details: Value) -> Result<()>;
}

#[async_trait]
impl AuditLog for Database {
    async fn record(&self, ctx: &RequestContext, action: &str, details: Value) -> Result<()> {
        self.insert_audit_log(
            &ctx.actor,
            action,
            &details.to_string(),
            &ctx.request_id.to_string(),
            Utc::now(),
        )
        .await
    }
}
