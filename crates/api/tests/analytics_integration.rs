//! Integration tests for owner analytics, CSV export, the dashboard and the
//! operational endpoints.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{
    body_json, create_published_survey, feedback_survey_body, owner_request, public_request,
    submit, TestApp, TestOwner,
};
use serde_json::{json, Value};

async fn seed_feedback(app: &TestApp, owner: &TestOwner) -> String {
    let (id, _) = create_published_survey(app, owner, feedback_survey_body()).await;

    let answers = [
        json!({ "q1": 5, "q2": "Pro", "q3": "yes" }),
        json!({ "q1": 5, "q2": "Pro", "q3": "yes" }),
        json!({ "q1": 4, "q2": "Free", "q3": "no" }),
        json!({ "q1": 3 }),
    ];
    for answer in answers {
        let (status, body) = submit(app, &id, answer).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    id
}

fn question<'a>(report: &'a Value, id: &str) -> &'a Value {
    report["questions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["question_id"] == id)
        .unwrap_or_else(|| panic!("no analytics for {}", id))
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn test_analytics_report() {
    let app = TestApp::new();
    let owner = TestOwner::new();
    let id = seed_feedback(&app, &owner).await;

    let (status, report) = app
        .send(owner_request(
            Method::GET,
            &format!("/api/v1/surveys/{}/analytics", id),
            &owner,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(report["summary"]["total_responses"], 4);
    assert_eq!(report["summary"]["last_7_days"], 4);
    assert_eq!(report["summary"]["last_30_days"], 4);
    assert_eq!(report["timeline"].as_array().unwrap().len(), 30);
    assert_eq!(report["timeline"][29]["responses"], 4);

    let rating = question(&report, "q1");
    assert_eq!(rating["type"], "rating");
    assert_eq!(rating["answered"], 4);
    assert_eq!(rating["average"], 4.3);
    assert_eq!(rating["distribution"].as_array().unwrap().len(), 5);
    assert_eq!(rating["distribution"][4], json!({ "rating": 5, "count": 2, "percentage": 50 }));
    assert_eq!(rating["distribution"][0]["count"], 0);

    let plan = question(&report, "q2");
    assert_eq!(plan["type"], "multiple-choice");
    assert_eq!(plan["answered"], 3);
    let pro = plan["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["option"] == "Pro")
        .unwrap();
    assert_eq!(pro["count"], 2);
    assert_eq!(pro["percentage"], 67);

    let recommend = question(&report, "q3");
    assert_eq!(recommend["type"], "yes-no");
    assert_eq!(recommend["yes"], json!({ "count": 2, "percentage": 67 }));
    assert_eq!(recommend["no"], json!({ "count": 1, "percentage": 33 }));
}

#[tokio::test]
async fn test_analytics_without_responses() {
    let app = TestApp::new();
    let owner = TestOwner::new();
    let (id, _) = create_published_survey(&app, &owner, feedback_survey_body()).await;

    let (status, report) = app
        .send(owner_request(
            Method::GET,
            &format!("/api/v1/surveys/{}/analytics", id),
            &owner,
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["total_responses"], 0);
    assert!(report["summary"].get("first_response_at").is_none());
    assert_eq!(report["questions"], json!([]));
}

#[tokio::test]
async fn test_analytics_hidden_from_other_owners() {
    let app = TestApp::new();
    let owner = TestOwner::new();
    let id = seed_feedback(&app, &owner).await;

    for path in ["analytics", "responses", "responses/export"] {
        let (status, _) = app
            .send(owner_request(
                Method::GET,
                &format!("/api/v1/surveys/{}/{}", id, path),
                &TestOwner::new(),
                None,
            ))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
    }
}

// ============================================================================
// CSV export
// ============================================================================

#[tokio::test]
async fn test_export_csv() {
    let app = TestApp::new();
    let owner = TestOwner::new();
    let id = seed_feedback(&app, &owner).await;

    let response = app
        .send_raw(owner_request(
            Method::GET,
            &format!("/api/v1/surveys/{}/responses/export", id),
            &owner,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Customer_feedback_responses.csv\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        r#""Response ID","Submitted At","Email","How satisfied are you?","Which plan are you on?","Would you recommend us?""#
    );
    assert!(lines[1..].iter().all(|line| line.contains(r#""Anonymous""#)));
    assert!(lines.iter().any(|line| line.ends_with(r#""3","","""#)));
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_rollup() {
    let app = TestApp::new();
    let owner = TestOwner::new();
    seed_feedback(&app, &owner).await;

    // A draft with no responses
    app.send(owner_request(
        Method::POST,
        "/api/v1/surveys",
        &owner,
        Some(json!({ "title": "Draft" })),
    ))
    .await;

    let (status, dashboard) = app
        .send(owner_request(Method::GET, "/api/v1/dashboard", &owner, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_surveys"], 2);
    assert_eq!(dashboard["published_surveys"], 1);
    assert_eq!(dashboard["draft_surveys"], 1);
    assert_eq!(dashboard["total_responses"], 4);
    assert_eq!(dashboard["responses_last_7_days"], 4);
    assert_eq!(dashboard["average_responses_per_survey"], 2);
    assert_eq!(dashboard["surveys"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_dashboard_for_new_owner() {
    let app = TestApp::new();
    let (status, dashboard) = app
        .send(owner_request(Method::GET, "/api/v1/dashboard", &TestOwner::new(), None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_surveys"], 0);
    assert_eq!(dashboard["average_responses_per_survey"], 0);
}

// ============================================================================
// Health and failure handling
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let (status, body) = app
        .send(public_request(Method::GET, "/api/health", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["connected"], true);

    let (status, _) = app
        .send(public_request(Method::GET, "/api/health/ready", None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(public_request(Method::GET, "/api/health/live", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_store_outage() {
    let app = TestApp::failing();

    let (status, body) = app
        .send(public_request(Method::GET, "/api/health", None))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");

    let response = app
        .send_raw(public_request(Method::GET, "/api/health/ready", None))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = submit(&app, &uuid::Uuid::new_v4().to_string(), json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(!body["message"].as_str().unwrap().contains("simulated"));
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();

    let response = app
        .send_raw(
            axum::http::Request::builder()
                .uri("/api/health/live")
                .header("X-Request-ID", "req-42")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["referrer-policy"], "no-referrer");
    let _ = body_json(response).await;
}
