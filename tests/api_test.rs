//! End-to-end tests for the booking HTTP API
//!
//! Each test builds the full router over a throwaway SQLite file and drives it
//! with form-encoded requests.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use booking_ledger::api;
use booking_ledger::storage::BookingDb;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

/// Router over a fresh database; keep the `TempDir` alive for the test
async fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.sqlite");
    let db = BookingDb::new(path.to_str().unwrap(), 1).await.unwrap();
    (api::router(Arc::new(db)), dir)
}

async fn send(app: &Router, method: Method, uri: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = if form.is_empty() {
        Body::empty()
    } else {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        let encoded: Vec<String> = form
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
            .collect();
        Body::from(encoded.join("&"))
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, &[]).await
}

async fn post(app: &Router, uri: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
    send(app, Method::POST, uri, form).await
}

async fn delete(app: &Router, uri: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, form).await
}

/// Seed one person and one activity, both with id 1
async fn seed(app: &Router) {
    let (status, _) = post(app, "/api/person/", &[("name", "Carl")]).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(app, "/api/activity/", &[("name", "Birthday")]).await;
    assert_eq!(status, StatusCode::OK);
}

fn event_form<'a>(date: &'a str, amount: &'a str) -> [(&'static str, &'a str); 4] {
    [
        ("person_id", "1"),
        ("activity_id", "1"),
        ("date", date),
        ("amount", amount),
    ]
}

#[tokio::test]
async fn test_empty_tables_return_empty_arrays() {
    let (app, _dir) = test_app().await;
    for uri in ["/api/person/", "/api/activity/", "/api/event/"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([]), "{}", uri);
    }
}

#[tokio::test]
async fn test_post_person() {
    let (app, _dir) = test_app().await;
    let (status, body) = post(&app, "/api/person/", &[("name", "Mrs. Smith")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"person_id": 1, "name": "Mrs. Smith"}));

    let (status, body) = get(&app, "/api/person/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"person_id": 1, "name": "Mrs. Smith"}]));
}

#[tokio::test]
async fn test_missing_name_is_unprocessable() {
    let (app, _dir) = test_app().await;

    let (status, body) = post(&app, "/api/person/", &[("nickname", "Carl")]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"error": "person name required"}));

    let (status, body) = post(&app, "/api/activity/", &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"error": "activity name required"}));
}

#[tokio::test]
async fn test_inserted_people_round_trip() {
    let (app, _dir) = test_app().await;
    let names = ["Carl", "Mrs. Smith", "Ada"];
    let mut created = Vec::new();
    for name in names {
        let (status, body) = post(&app, "/api/person/", &[("name", name)]).await;
        assert_eq!(status, StatusCode::OK);
        created.push(body);
    }

    let (_, all) = get(&app, "/api/person/").await;
    assert_eq!(all.as_array().unwrap().len(), names.len());

    for person in created {
        let uri = format!("/api/person/{}", person["person_id"]);
        let (status, fetched) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, person);
    }
}

#[tokio::test]
async fn test_get_unknown_ids() {
    let (app, _dir) = test_app().await;
    let (status, body) = get(&app, "/api/person/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "person not found"}));

    let (status, body) = get(&app, "/api/activity/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "activity not found"}));

    let (status, body) = get(&app, "/api/event/5/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "event not found"}));
}

#[tokio::test]
async fn test_booking_scenario() {
    let (app, _dir) = test_app().await;

    let (status, person) = post(&app, "/api/person/", &[("name", "Carl")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["person_id"], 1);

    let (status, activity) = post(&app, "/api/activity/", &[("name", "Birthday")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activity["activity_id"], 1);

    let (status, event) = post(&app, "/api/event/", &event_form("2004-08-14", "400.00")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        event,
        json!({
            "event_id": 1,
            "person_id": 1,
            "activity_id": 1,
            "date": "2004-08-14",
            "amount": 400.0,
        })
    );

    post(&app, "/api/person/", &[("name", "Mrs. Smith")]).await;
    post(&app, "/api/activity/", &[("name", "Wedding")]).await;
    let (status, body) = post(
        &app,
        "/api/event/",
        &[
            ("person_id", "2"),
            ("activity_id", "2"),
            ("date", "2004-08-14"),
            ("amount", "1600.00"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("2004-08-14"));

    let (_, events) = get(&app, "/api/event/").await;
    assert_eq!(events.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_distinct_dates_both_succeed() {
    let (app, _dir) = test_app().await;
    seed(&app).await;

    let (status, _) = post(&app, "/api/event/", &event_form("2004-08-14", "400")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = post(&app, "/api/event/", &event_form("2004-08-15", "400")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["event_id"], 2);
}

#[tokio::test]
async fn test_event_missing_fields() {
    let (app, _dir) = test_app().await;
    seed(&app).await;

    let cases: [(&[(&str, &str)], &str); 4] = [
        (&[], "person_id required"),
        (&[("person_id", "1")], "activity_id required"),
        (&[("person_id", "1"), ("activity_id", "1")], "date required"),
        (
            &[("person_id", "1"), ("activity_id", "1"), ("date", "2004-08-14")],
            "amount required",
        ),
    ];
    for (form, message) in cases {
        let (status, body) = post(&app, "/api/event/", form).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "error": message }));
    }
}

#[tokio::test]
async fn test_event_with_unknown_person() {
    let (app, _dir) = test_app().await;
    seed(&app).await;

    let (status, body) = post(
        &app,
        "/api/event/",
        &[
            ("person_id", "9"),
            ("activity_id", "1"),
            ("date", "2004-08-14"),
            ("amount", "400"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"error": "person 9 does not exist"}));
}

#[tokio::test]
async fn test_delete_event() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    let (_, created) = post(&app, "/api/event/", &event_form("1999-01-24", "1600.00")).await;

    let (status, deleted) = delete(&app, "/api/event/", &[("event_id", "1")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, created);

    let (status, _) = get(&app, "/api/event/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_event() {
    let (app, _dir) = test_app().await;
    let (status, body) = delete(&app, "/api/event/", &[("event_id", "42")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "event not found"}));
}

#[tokio::test]
async fn test_delete_without_id_field() {
    let (app, _dir) = test_app().await;
    for (uri, message) in [
        ("/api/person/", "person_id required"),
        ("/api/activity/", "activity_id required"),
        ("/api/event/", "event_id required"),
    ] {
        let (status, body) = delete(&app, uri, &[]).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "error": message }));
    }
}

#[tokio::test]
async fn test_delete_by_path() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    post(&app, "/api/event/", &event_form("2004-08-14", "400")).await;

    let (status, deleted) = delete(&app, "/api/event/1/", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["date"], "2004-08-14");

    let (status, _) = delete(&app, "/api/event/1/", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_referenced_person_conflicts() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    post(&app, "/api/event/", &event_form("2004-08-14", "400")).await;

    let (status, _) = delete(&app, "/api/person/", &[("person_id", "1")]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = delete(&app, "/api/activity/", &[("activity_id", "1")]).await;
    assert_eq!(status, StatusCode::CONFLICT);

    delete(&app, "/api/event/", &[("event_id", "1")]).await;
    let (status, person) = delete(&app, "/api/person/", &[("person_id", "1")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person, json!({"person_id": 1, "name": "Carl"}));
}

#[tokio::test]
async fn test_update_event() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    post(&app, "/api/event/", &event_form("2019-05-24", "400.00")).await;

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/event/1/",
        &event_form("2009-05-24", "450.50"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["event_id"], 1);
    assert_eq!(updated["date"], "2009-05-24");
    assert_eq!(updated["amount"], 450.5);

    let (_, fetched) = get(&app, "/api/event/1").await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_event_errors() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    post(&app, "/api/event/", &event_form("2004-08-14", "400")).await;
    post(&app, "/api/event/", &event_form("2004-08-15", "400")).await;

    let (status, _) = send(&app, Method::PUT, "/api/event/7", &event_form("2001-01-01", "1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, "/api/event/2", &event_form("2004-08-14", "1")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::PUT, "/api/event/2", &[("person_id", "1")]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"error": "activity_id required"}));
}

#[tokio::test]
async fn test_event_filters() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    post(&app, "/api/person/", &[("name", "Mrs. Smith")]).await;
    post(&app, "/api/event/", &event_form("2004-08-14", "400")).await;
    post(
        &app,
        "/api/event/",
        &[
            ("person_id", "2"),
            ("activity_id", "1"),
            ("date", "2004-08-15"),
            ("amount", "100"),
        ],
    )
    .await;

    let (_, by_person) = get(&app, "/api/event/?person_id=2").await;
    assert_eq!(by_person.as_array().unwrap().len(), 1);
    assert_eq!(by_person[0]["date"], "2004-08-15");

    let (_, by_activity) = get(&app, "/api/event/?activity_id=1").await;
    assert_eq!(by_activity.as_array().unwrap().len(), 2);

    let (_, by_date) = get(&app, "/api/event/?date=2004-08-14").await;
    assert_eq!(by_date.as_array().unwrap().len(), 1);

    let (_, none) = get(&app, "/api/event/?date=1990-01-01").await;
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_html_pages() {
    let (app, _dir) = test_app().await;
    seed(&app).await;
    post(&app, "/api/event/", &event_form("2004-08-14", "400")).await;

    let request = Request::builder().uri("/event").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<td>Carl</td>"));
    assert!(html.contains("<td>Birthday</td>"));
    assert!(html.contains("<td>400.00</td>"));

    for uri in ["/", "/person", "/activity"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_health_check() {
    let (app, _dir) = test_app().await;
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_non_integer_path_id_is_json_not_found() {
    let (app, _dir) = test_app().await;
    seed(&app).await;

    for uri in ["/api/person/abc", "/api/activity/abc/", "/api/event/abc"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }

    let (status, body) = send(&app, Method::PUT, "/api/event/abc", &event_form("2004-08-14", "1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, body) = delete(&app, "/api/person/abc", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_bad_event_filter_is_json_unprocessable() {
    let (app, _dir) = test_app().await;
    let (status, body) = get(&app, "/api/event/?person_id=x").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_names_and_dates_are_stored_as_submitted() {
    let (app, _dir) = test_app().await;

    let (status, person) = post(&app, "/api/person/", &[("name", "  Carl ")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person, json!({"person_id": 1, "name": "  Carl "}));
    let (_, fetched) = get(&app, "/api/person/1").await;
    assert_eq!(fetched, person);

    post(&app, "/api/activity/", &[("name", "Birthday")]).await;
    let (status, event) = post(&app, "/api/event/", &event_form(" 2004-08-14", "400")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["date"], " 2004-08-14");
}
