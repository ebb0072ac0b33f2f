use crate::constants::dates::RECENT_WINDOW_DAYS;
use crate::errors::{OuraApiError, ToolError};
use crate::services::endpoints::Endpoint;
use crate::services::logger::Logger;
use crate::services::oura_client::OuraClient;
use crate::services::tool_executor::{CallContext, ToolHandler};
use crate::utils::dates::{days_ago, format_date, today};
use crate::utils::output::format_response;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Today,
    Yesterday,
    PersonalInfo,
    RecentSleep,
    RecentActivity,
}

pub const SUMMARY_RESOURCES: &[(&str, SummaryKind)] = &[
    ("oura://summary/today", SummaryKind::Today),
    ("oura://summary/yesterday", SummaryKind::Yesterday),
    ("oura://personal/info", SummaryKind::PersonalInfo),
    ("oura://recent/sleep", SummaryKind::RecentSleep),
    ("oura://recent/activity", SummaryKind::RecentActivity),
];

fn first_or_null(items: Vec<Value>) -> Value {
    items.into_iter().next().unwrap_or(Value::Null)
}

/// Zero-argument resource that stitches several upstream calls into one
/// JSON object.
#[derive(Clone)]
pub struct SummaryResource {
    logger: Logger,
    client: OuraClient,
    kind: SummaryKind,
}

impl SummaryResource {
    pub fn new(logger: Logger, client: OuraClient, kind: SummaryKind) -> Self {
        Self {
            logger,
            client,
            kind,
        }
    }

    async fn day_summary(client: &OuraClient, date: &str) -> Result<Value, OuraApiError> {
        let day = Some(date);
        let readiness = client.collection(Endpoint::DailyReadiness, day, day).await?;
        let sleep = client.collection(Endpoint::DailySleep, day, day).await?;
        let activity = client.collection(Endpoint::DailyActivity, day, day).await?;
        Ok(serde_json::json!({
            "date": date,
            "readiness": first_or_null(readiness),
            "sleep": first_or_null(sleep),
            "activity": first_or_null(activity),
        }))
    }

    async fn build(&self, client: &OuraClient) -> Result<Value, OuraApiError> {
        let now = today();
        match self.kind {
            SummaryKind::Today => Self::day_summary(client, &format_date(now)).await,
            SummaryKind::Yesterday => Self::day_summary(client, &days_ago(now, 1)).await,
            SummaryKind::PersonalInfo => {
                let personal = client.personal_info().await?;
                let rings = client
                    .collection(Endpoint::RingConfiguration, None, None)
                    .await?;
                Ok(serde_json::json!({
                    "personal_info": personal,
                    "ring_configuration": first_or_null(rings),
                }))
            }
            SummaryKind::RecentSleep | SummaryKind::RecentActivity => {
                let endpoint = if self.kind == SummaryKind::RecentSleep {
                    Endpoint::DailySleep
                } else {
                    Endpoint::DailyActivity
                };
                let start = days_ago(now, RECENT_WINDOW_DAYS);
                let end = format_date(now);
                client
                    .collection(endpoint, Some(&start), Some(&end))
                    .await
                    .map(Value::Array)
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for SummaryResource {
    async fn handle(&self, _args: Value, ctx: &CallContext) -> Result<String, ToolError> {
        let client = self.client.with_token_source(ctx.token_source.clone());
        match self.build(&client).await {
            Ok(summary) => Ok(format_response(&summary)),
            Err(err) => {
                self.logger.warn(
                    "summary failed",
                    Some(&serde_json::json!({ "status": err.status, "trace_id": ctx.trace_id })),
                );
                Ok(format_response(&err.to_payload()))
            }
        }
    }
}

pub fn summary_handlers(
    logger: &Logger,
    client: &OuraClient,
) -> HashMap<String, Arc<dyn ToolHandler>> {
    let logger = logger.child("resources");
    SUMMARY_RESOURCES
        .iter()
        .map(|(uri, kind)| {
            let resource: Arc<dyn ToolHandler> =
                Arc::new(SummaryResource::new(logger.clone(), client.clone(), *kind));
            (uri.to_string(), resource)
        })
        .collect()
}
