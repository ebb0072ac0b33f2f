mod common;
use common::{build_app, config_for};

use oura_mcp::errors::ToolErrorKind;
use oura_mcp::services::tool_executor::CallContext;
use oura_mcp::utils::dates::{days_ago, format_date, today};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(items: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": items, "next_token": null }))
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("tool output is JSON")
}

fn app_with_token(server: &MockServer, dir: &tempfile::TempDir) -> oura_mcp::app::App {
    build_app(config_for(&server.uri(), dir.path()).with_env_tokens(Some("pat"), None))
}

#[tokio::test]
async fn daily_tool_defaults_to_last_week_and_pretty_prints() {
    let server = MockServer::start().await;
    let start = days_ago(today(), 7);
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/daily_sleep"))
        .and(query_param("start_date", start.as_str()))
        .and(query_param_is_missing("end_date"))
        .respond_with(page(json!([{ "day": start, "score": 82 }])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .execute("get_daily_sleep", json!({}), &CallContext::stored())
        .await
        .expect("tool output");

    assert!(text.starts_with("[\n  {"));
    assert_eq!(parse(&text), json!([{ "day": start, "score": 82 }]));
}

#[tokio::test]
async fn relative_and_absolute_dates_are_resolved_before_sending() {
    let server = MockServer::start().await;
    let yesterday = days_ago(today(), 1);
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/workout"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("end_date", yesterday.as_str()))
        .respond_with(page(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .execute(
            "get_workouts",
            json!({ "start_date": "2024-01-01", "end_date": " Yesterday " }),
            &CallContext::stored(),
        )
        .await
        .expect("tool output");
    assert_eq!(parse(&text), json!([]));
}

#[tokio::test]
async fn upstream_error_becomes_payload_not_fault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/daily_readiness"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "title": "Bad Request", "detail": "start_date is invalid" })),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .execute(
            "get_daily_readiness",
            json!({ "start_date": "not-a-date" }),
            &CallContext::stored(),
        )
        .await
        .expect("errors are payloads");
    assert_eq!(
        parse(&text),
        json!({ "error": "[400] Bad Request: start_date is invalid", "status_code": 400 })
    );
}

#[tokio::test]
async fn missing_token_is_reported_in_payload() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = build_app(config_for(&server.uri(), dir.path()));

    let text = app
        .tool_executor
        .execute("get_personal_info", Value::Null, &CallContext::stored())
        .await
        .expect("payload");
    let payload = parse(&text);
    assert_eq!(payload["status_code"], 401);
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("No access token available"));
}

#[tokio::test]
async fn heartrate_passes_datetimes_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/heartrate"))
        .and(query_param("start_datetime", "2024-01-01T00:00:00-08:00"))
        .and(query_param_is_missing("end_datetime"))
        .respond_with(page(json!([{ "bpm": 58, "source": "awake" }])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .execute(
            "get_heartrate",
            json!({ "start_datetime": "2024-01-01T00:00:00-08:00" }),
            &CallContext::stored(),
        )
        .await
        .expect("tool output");
    assert_eq!(parse(&text)[0]["bpm"], 58);

    let err = app
        .tool_executor
        .execute("get_heartrate", json!({}), &CallContext::stored())
        .await
        .expect_err("start_datetime is required");
    assert_eq!(err.kind, ToolErrorKind::InvalidParams);
}

#[tokio::test]
async fn personal_info_returns_single_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/personal_info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1", "age": 31 })),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .execute("get_personal_info", json!({}), &CallContext::stored())
        .await
        .expect("tool output");
    assert_eq!(parse(&text), json!({ "id": "user-1", "age": 31 }));
}

#[tokio::test]
async fn unknown_tool_suggests_a_close_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let err = app
        .tool_executor
        .execute("get_daily_slep", json!({}), &CallContext::stored())
        .await
        .expect_err("unknown tool");
    assert_eq!(err.kind, ToolErrorKind::NotFound);
    assert!(err.hint.unwrap_or_default().contains("get_daily_sleep"));
}

#[tokio::test]
async fn today_summary_combines_three_collections() {
    let server = MockServer::start().await;
    let day = format_date(today());
    for (endpoint, items) in [
        ("daily_readiness", json!([{ "score": 77 }])),
        ("daily_sleep", json!([{ "score": 81 }, { "score": 1 }])),
        ("daily_activity", json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/v2/usercollection/{}", endpoint)))
            .and(query_param("start_date", day.as_str()))
            .and(query_param("end_date", day.as_str()))
            .respond_with(page(items))
            .expect(1)
            .mount(&server)
            .await;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .read_resource("oura://summary/today", &CallContext::stored())
        .await
        .expect("summary");
    assert_eq!(
        parse(&text),
        json!({
            "date": day,
            "readiness": { "score": 77 },
            "sleep": { "score": 81 },
            "activity": null,
        })
    );
}

#[tokio::test]
async fn personal_resource_includes_first_ring() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/personal_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/ring_configuration"))
        .respond_with(page(json!([{ "color": "black" }, { "color": "gold" }])))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .read_resource("oura://personal/info", &CallContext::stored())
        .await
        .expect("resource");
    assert_eq!(
        parse(&text),
        json!({ "personal_info": { "id": "user-1" }, "ring_configuration": { "color": "black" } })
    );
}

#[tokio::test]
async fn recent_activity_covers_seven_days() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/daily_activity"))
        .and(query_param("start_date", days_ago(today(), 7).as_str()))
        .and(query_param("end_date", format_date(today()).as_str()))
        .respond_with(page(json!([{ "steps": 9000 }])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .read_resource("oura://recent/activity", &CallContext::stored())
        .await
        .expect("resource");
    assert_eq!(parse(&text), json!([{ "steps": 9000 }]));
}

#[tokio::test]
async fn summary_failure_is_rendered_as_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .read_resource("oura://summary/yesterday", &CallContext::stored())
        .await
        .expect("payload");
    assert_eq!(parse(&text), json!({ "error": "[500] HTTP 500", "status_code": 500 }));
}

#[tokio::test]
async fn heartrate_keeps_surrounding_whitespace_in_datetimes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/heartrate"))
        .and(query_param("start_datetime", " 2024-01-01T00:00:00Z "))
        .and(query_param("end_datetime", "2024-01-02T00:00:00Z\t"))
        .respond_with(page(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app_with_token(&server, &dir);

    let text = app
        .tool_executor
        .execute(
            "get_heartrate",
            json!({
                "start_datetime": " 2024-01-01T00:00:00Z ",
                "end_datetime": "2024-01-02T00:00:00Z\t",
            }),
            &CallContext::stored(),
        )
        .await
        .expect("tool output");
    assert_eq!(parse(&text), json!([]));
}
