use crate::constants::dates::DEFAULT_START;
use crate::errors::ToolError;
use crate::services::endpoints::{Endpoint, RangeKind};
use crate::services::logger::Logger;
use crate::services::oura_client::OuraClient;
use crate::services::tool_executor::{CallContext, ToolHandler};
use crate::services::validation::Validation;
use crate::utils::dates::{normalize_date, today};
use crate::utils::output::format_response;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool name to upstream endpoint, in catalog order.
pub const COLLECTION_TOOLS: &[(&str, Endpoint)] = &[
    ("get_daily_sleep", Endpoint::DailySleep),
    ("get_daily_activity", Endpoint::DailyActivity),
    ("get_daily_readiness", Endpoint::DailyReadiness),
    ("get_daily_stress", Endpoint::DailyStress),
    ("get_sleep_periods", Endpoint::Sleep),
    ("get_sleep_time", Endpoint::SleepTime),
    ("get_workouts", Endpoint::Workout),
    ("get_sessions", Endpoint::Session),
    ("get_heartrate", Endpoint::HeartRate),
    ("get_daily_spo2", Endpoint::DailySpo2),
    ("get_vo2_max", Endpoint::Vo2Max),
    ("get_daily_resilience", Endpoint::DailyResilience),
    ("get_cardiovascular_age", Endpoint::DailyCardiovascularAge),
    ("get_personal_info", Endpoint::PersonalInfo),
    ("get_ring_configuration", Endpoint::RingConfiguration),
    ("get_enhanced_tags", Endpoint::EnhancedTag),
    ("get_rest_mode_periods", Endpoint::RestModePeriod),
];

/// One read-only tool bound to one upstream endpoint.
#[derive(Clone)]
pub struct CollectionTool {
    logger: Logger,
    validation: Validation,
    client: OuraClient,
    endpoint: Endpoint,
}

impl CollectionTool {
    pub fn new(logger: Logger, validation: Validation, client: OuraClient, endpoint: Endpoint) -> Self {
        Self {
            logger,
            validation,
            client,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Resolves the range arguments into the values sent upstream.
    fn resolve_range(&self, args: &Value) -> Result<(Option<String>, Option<String>), ToolError> {
        let args = self.validation.ensure_args_object(args)?;
        match self.endpoint.range() {
            RangeKind::Unbounded => Ok((None, None)),
            RangeKind::Date => {
                let start = self
                    .validation
                    .ensure_optional_string(args.get("start_date"), "start_date")?
                    .unwrap_or_else(|| DEFAULT_START.to_string());
                let end = self
                    .validation
                    .ensure_optional_string(args.get("end_date"), "end_date")?;
                let day = today();
                Ok((
                    Some(normalize_date(Some(&start), day)),
                    end.map(|end| normalize_date(Some(&end), day)),
                ))
            }
            RangeKind::DateTime => {
                let start = self.validation.ensure_string(
                    args.get("start_datetime").unwrap_or(&Value::Null),
                    "start_datetime",
                    false,
                )?;
                let end = self
                    .validation
                    .ensure_optional_string(args.get("end_datetime"), "end_datetime")?;
                Ok((Some(start), end))
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for CollectionTool {
    async fn handle(&self, args: Value, ctx: &CallContext) -> Result<String, ToolError> {
        let (start, end) = self.resolve_range(&args)?;
        let client = self.client.with_token_source(ctx.token_source.clone());
        match client
            .fetch(self.endpoint, start.as_deref(), end.as_deref())
            .await
        {
            Ok(data) => Ok(format_response(&data)),
            Err(err) => {
                self.logger.warn(
                    "upstream call failed",
                    Some(&serde_json::json!({
                        "path": self.endpoint.path(),
                        "status": err.status,
                        "trace_id": ctx.trace_id,
                    })),
                );
                Ok(format_response(&err.to_payload()))
            }
        }
    }
}

pub fn collection_handlers(
    logger: &Logger,
    validation: &Validation,
    client: &OuraClient,
) -> HashMap<String, Arc<dyn ToolHandler>> {
    let logger = logger.child("tools");
    COLLECTION_TOOLS
        .iter()
        .map(|(name, endpoint)| {
            let tool: Arc<dyn ToolHandler> = Arc::new(CollectionTool::new(
                logger.child(name),
                validation.clone(),
                client.clone(),
                *endpoint,
            ));
            (name.to_string(), tool)
        })
        .collect()
}
