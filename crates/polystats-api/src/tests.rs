//! End-to-end tests: the full router over an in-memory store and a fake
//! schedule directory.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use polystats_core::schedule::{Day, Group, Lesson, Schedule, ScheduleDirectory};
use polystats_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, app};

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("directory unavailable")]
struct Unavailable;

/// A directory that knows one group and returns the same week for any date,
/// or fails every call when `down`.
#[derive(Clone)]
struct FakeDirectory {
  group:    Option<Group>,
  subjects: Vec<&'static str>,
  down:     bool,
}

impl FakeDirectory {
  fn with_group(subjects: &[&'static str]) -> Self {
    Self {
      group:    Some(Group { id: 40500, name: "5130904/30105".into() }),
      subjects: subjects.to_vec(),
      down:     false,
    }
  }

  fn empty() -> Self { Self { group: None, subjects: vec![], down: false } }

  fn down() -> Self { Self { group: None, subjects: vec![], down: true } }
}

impl ScheduleDirectory for FakeDirectory {
  type Error = Unavailable;

  async fn search_groups(&self, _query: &str) -> Result<Vec<Group>, Unavailable> {
    if self.down {
      return Err(Unavailable);
    }
    Ok(self.group.iter().cloned().collect())
  }

  async fn schedule(&self, _group_id: i64, _date: NaiveDate) -> Result<Schedule, Unavailable> {
    if self.down {
      return Err(Unavailable);
    }
    Ok(Schedule {
      days: vec![Day {
        lessons: self
          .subjects
          .iter()
          .map(|s| Lesson { subject: Some((*s).to_owned()) })
          .collect(),
      }],
    })
  }
}

async fn make_app(directory: FakeDirectory) -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  app(AppState::new(store, directory), "/api/v1")
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, value)
}

async fn register(app: &Router, email: &str) -> (StatusCode, Value) {
  send(
    app,
    "POST",
    "/api/v1/auth/register",
    None,
    Some(json!({ "email": email, "password": "password123", "group_name": "5130904/30105" })),
  )
  .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri("/api/v1/auth/login")
    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
    .body(Body::from(format!("username={email}&password={password}")))
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Register and log in; returns the bearer token.
async fn token_for(app: &Router, email: &str) -> String {
  let (status, _) = register(app, email).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, body) = login(app, email, "password123").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["token_type"], "bearer");
  body["access_token"].as_str().unwrap().to_owned()
}

async fn new_subject(app: &Router, token: &str, name: &str) -> i64 {
  let (status, body) =
    send(app, "POST", "/api/v1/subjects/add", Some(token), Some(json!({ "name": name }))).await;
  assert_eq!(status, StatusCode::CREATED);
  body["id"].as_i64().unwrap()
}

async fn new_activity(app: &Router, token: &str, subject_id: i64, max: u32) -> i64 {
  let (status, body) = send(
    app,
    "POST",
    &format!("/api/v1/subjects/{subject_id}/activity-add"),
    Some(token),
    Some(json!({ "name": "Labs", "max_progress": max })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["id"].as_i64().unwrap()
}

// ─── Banner & auth ───────────────────────────────────────────────────────────

#[tokio::test]
async fn banner_needs_no_auth() {
  let app = make_app(FakeDirectory::empty()).await;
  let (status, body) = send(&app, "GET", "/", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["version"], "v1");
}

#[tokio::test]
async fn missing_or_unknown_token_is_401() {
  let app = make_app(FakeDirectory::empty()).await;

  let req = Request::builder()
    .uri("/api/v1/subjects/list")
    .body(Body::empty())
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

  let (status, _) = send(&app, "GET", "/api/v1/subjects/list", Some("deadbeef"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_400() {
  let app = make_app(FakeDirectory::empty()).await;
  assert_eq!(register(&app, "a@example.com").await.0, StatusCode::CREATED);
  assert_eq!(register(&app, "a@example.com").await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_validates_fields() {
  let app = make_app(FakeDirectory::empty()).await;
  let (status, _) = send(
    &app,
    "POST",
    "/api/v1/auth/register",
    None,
    Some(json!({ "email": "a@example.com", "password": "pw", "group_name": "  " })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn wrong_password_is_400() {
  let app = make_app(FakeDirectory::empty()).await;
  register(&app, "a@example.com").await;
  assert_eq!(login(&app, "a@example.com", "nope").await.0, StatusCode::BAD_REQUEST);
  assert_eq!(login(&app, "b@example.com", "password123").await.0, StatusCode::BAD_REQUEST);
}

// ─── Onboarding ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_seeds_subjects_from_directory() {
  let app = make_app(FakeDirectory::with_group(&["Physics", "Calculus", "Physics "])).await;

  let (status, user) = register(&app, "a@example.com").await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(user["group_id"], "40500");
  assert_eq!(user["group_name"], "5130904/30105");
  assert!(user.get("password_hash").is_none());

  let (_, body) = login(&app, "a@example.com", "password123").await;
  let token = body["access_token"].as_str().unwrap();

  let (_, me) = send(&app, "GET", "/api/v1/users/me", Some(token), None).await;
  assert_eq!(me["group_id"], "40500");

  let (status, list) = send(&app, "GET", "/api/v1/subjects/list", Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<_> = list
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["Calculus", "Physics"]);
}

#[tokio::test]
async fn unresolvable_group_still_registers_with_no_subjects() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;

  let (_, me) = send(&app, "GET", "/api/v1/users/me", Some(token.as_str()), None).await;
  assert!(me["group_id"].is_null());

  let (status, list) = send(&app, "GET", "/api/v1/subjects/list", Some(token.as_str()), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list, json!([]));
}

#[tokio::test]
async fn directory_outage_does_not_fail_registration() {
  let app = make_app(FakeDirectory::down()).await;
  let token = token_for(&app, "a@example.com").await;

  let (_, list) = send(&app, "GET", "/api/v1/subjects/list", Some(token.as_str()), None).await;
  assert_eq!(list, json!([]));
}

// ─── Group lookup ────────────────────────────────────────────────────────────

#[tokio::test]
async fn group_search_found() {
  let app = make_app(FakeDirectory::with_group(&[])).await;
  let token = token_for(&app, "a@example.com").await;

  let (status, body) = send(
    &app,
    "GET",
    "/api/v1/groups/search?q=5130904%2F30105",
    Some(token.as_str()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["id"], 40500);
}

#[tokio::test]
async fn group_search_not_found() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let (status, _) =
    send(&app, "GET", "/api/v1/groups/search?q=nope", Some(token.as_str()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn group_search_upstream_down_is_503() {
  let app = make_app(FakeDirectory::down()).await;
  let token = token_for(&app, "a@example.com").await;
  let (status, _) =
    send(&app, "GET", "/api/v1/groups/search?q=x", Some(token.as_str()), None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ─── Subjects & progress ─────────────────────────────────────────────────────

#[tokio::test]
async fn progress_tracking_scenario() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let t = Some(token.as_str());

  let (status, subject) =
    send(&app, "POST", "/api/v1/subjects/add", t, Some(json!({ "name": "Physics" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(subject["name"], "Physics");
  assert_eq!(subject["activities"], json!([]));
  let subject_id = subject["id"].as_i64().unwrap();

  let (status, activity) = send(
    &app,
    "POST",
    &format!("/api/v1/subjects/{subject_id}/activity-add"),
    t,
    Some(json!({ "name": "Labs", "max_progress": 3, "current_progress": 2 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(activity["current_progress"], 0);
  let id = activity["id"].as_i64().unwrap();
  let plus = format!("/api/v1/subjects/activities/{id}/plus");
  let minus = format!("/api/v1/subjects/activities/{id}/minus");

  for expected in [1, 2, 3] {
    let (status, body) = send(&app, "PATCH", &plus, t, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_progress"], expected);
  }

  let (status, body) = send(&app, "PATCH", &plus, t, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["current_progress"], 3);

  let (status, body) = send(&app, "PATCH", &minus, t, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["current_progress"], 2);

  let (_, list) = send(&app, "GET", "/api/v1/subjects/list", t, None).await;
  assert_eq!(list[0]["activities"][0]["current_progress"], 2);
}

#[tokio::test]
async fn decrement_at_zero_is_a_successful_noop() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let subject_id = new_subject(&app, &token, "Physics").await;
  let id = new_activity(&app, &token, subject_id, 2).await;

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/api/v1/subjects/activities/{id}/minus"),
    Some(token.as_str()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["current_progress"], 0);
}

#[tokio::test]
async fn delete_subject_removes_its_activities() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let t = Some(token.as_str());
  let subject_id = new_subject(&app, &token, "Physics").await;
  let a1 = new_activity(&app, &token, subject_id, 3).await;
  let a2 = new_activity(&app, &token, subject_id, 4).await;

  let (status, body) = send(&app, "DELETE", &format!("/api/v1/subjects/{subject_id}"), t, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert!(body.is_null());

  let (status, _) = send(&app, "GET", &format!("/api/v1/subjects/{subject_id}"), t, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  for id in [a1, a2] {
    let (status, _) = send(&app, "GET", &format!("/api/v1/subjects/activities/{id}"), t, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) =
      send(&app, "PATCH", &format!("/api/v1/subjects/activities/{id}/plus"), t, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  let (status, _) = send(&app, "DELETE", &format!("/api/v1/subjects/{subject_id}"), t, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_activity_then_404() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let t = Some(token.as_str());
  let subject_id = new_subject(&app, &token, "Physics").await;
  let id = new_activity(&app, &token, subject_id, 3).await;

  let uri = format!("/api/v1/subjects/activities/{id}");
  assert_eq!(send(&app, "DELETE", &uri, t, None).await.0, StatusCode::NO_CONTENT);
  assert_eq!(send(&app, "DELETE", &uri, t, None).await.0, StatusCode::NOT_FOUND);

  let (_, subject) = send(&app, "GET", &format!("/api/v1/subjects/{subject_id}"), t, None).await;
  assert_eq!(subject["activities"], json!([]));
}

#[tokio::test]
async fn invalid_input_is_422() {
  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let t = Some(token.as_str());

  let (status, _) =
    send(&app, "POST", "/api/v1/subjects/add", t, Some(json!({ "name": "   " }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, _) = send(&app, "POST", "/api/v1/subjects/add", t, Some(json!({}))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let subject_id = new_subject(&app, &token, "Physics").await;
  let uri = format!("/api/v1/subjects/{subject_id}/activity-add");
  for body in [
    json!({ "name": "Labs", "max_progress": 0 }),
    json!({ "name": "Labs", "max_progress": -1 }),
    json!({ "name": "", "max_progress": 3 }),
  ] {
    let (status, _) = send(&app, "POST", &uri, t, Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }
}

#[tokio::test]
async fn other_users_data_is_not_found() {
  let app = make_app(FakeDirectory::empty()).await;
  let alice = token_for(&app, "alice@example.com").await;
  let bob = token_for(&app, "bob@example.com").await;
  let b = Some(bob.as_str());

  let subject_id = new_subject(&app, &alice, "Physics").await;
  let id = new_activity(&app, &alice, subject_id, 3).await;

  let (_, list) = send(&app, "GET", "/api/v1/subjects/list", b, None).await;
  assert_eq!(list, json!([]));

  let attempts = [
    ("GET", format!("/api/v1/subjects/{subject_id}"), None),
    (
      "POST",
      format!("/api/v1/subjects/{subject_id}/activity-add"),
      Some(json!({ "name": "x", "max_progress": 1 })),
    ),
    ("GET", format!("/api/v1/subjects/activities/{id}"), None),
    ("PATCH", format!("/api/v1/subjects/activities/{id}/plus"), None),
    ("PATCH", format!("/api/v1/subjects/activities/{id}/minus"), None),
    ("DELETE", format!("/api/v1/subjects/activities/{id}"), None),
    ("DELETE", format!("/api/v1/subjects/{subject_id}"), None),
  ];
  for (method, uri, body) in attempts {
    let (status, _) = send(&app, method, &uri, b, body).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
  }

  let (status, activity) =
    send(&app, "GET", &format!("/api/v1/subjects/activities/{id}"), Some(alice.as_str()), None)
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(activity["current_progress"], 0);
}

#[tokio::test]
async fn concurrent_increments_are_all_counted() {
  const CALLERS: u32 = 10;

  let app = make_app(FakeDirectory::empty()).await;
  let token = token_for(&app, "a@example.com").await;
  let subject_id = new_subject(&app, &token, "Physics").await;
  let id = new_activity(&app, &token, subject_id, CALLERS).await;

  let handles: Vec<_> = (0..CALLERS)
    .map(|_| {
      let app = app.clone();
      let token = token.clone();
      tokio::spawn(async move {
        send(
          &app,
          "PATCH",
          &format!("/api/v1/subjects/activities/{id}/plus"),
          Some(token.as_str()),
          None,
        )
        .await
        .0
      })
    })
    .collect();
  for h in handles {
    assert_eq!(h.await.unwrap(), StatusCode::OK);
  }

  let (_, activity) = send(
    &app,
    "GET",
    &format!("/api/v1/subjects/activities/{id}"),
    Some(token.as_str()),
    None,
  )
  .await;
  assert_eq!(activity["current_progress"], CALLERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_registrations_with_one_email() {
  const CALLERS: usize = 4;

  for _ in 0..5 {
    let app = make_app(FakeDirectory::empty()).await;
    let handles: Vec<_> = (0..CALLERS)
      .map(|_| {
        let app = app.clone();
        tokio::spawn(async move { register(&app, "dup@example.com").await.0 })
      })
      .collect();

    let mut statuses = Vec::with_capacity(CALLERS);
    for h in handles {
      statuses.push(h.await.unwrap());
    }
    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let rejected = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
    assert_eq!((created, rejected), (1, CALLERS - 1), "{statuses:?}");
  }
}

// ─── Mounting ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn prefix_slashes_are_optional() {
  for prefix in ["api/v1", "/api/v1/", "/api/v1"] {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = app(AppState::new(store, FakeDirectory::empty()), prefix);

    let (status, _) = send(&app, "GET", "/api/v1/subjects/list", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "prefix {prefix:?}");
    let (status, _) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK, "prefix {prefix:?}");
  }
}

#[tokio::test]
async fn empty_prefix_mounts_at_root() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let app = app(AppState::new(store, FakeDirectory::empty()), "/");

  let (status, _) = send(&app, "GET", "/subjects/list", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, body) = send(&app, "GET", "/", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["version"], "v1");
}
