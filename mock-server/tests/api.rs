use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Appointment, Department, Employee, Template, DEMO_EMAIL, DEMO_PASSWORD};
use serde_json::json;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Cookie header value and CSRF token of a logged-in session.
struct AuthedSession {
    cookie: String,
    csrf: String,
}

/// Log in with the demo account and collect the session cookies. Requests
/// share state through the router's `Arc`, so clones of `app` see the same
/// store.
async fn login(app: &axum::Router) -> AuthedSession {
    let body = json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rest-auth/login/")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut sessionid = None;
    let mut csrf = None;
    for value in response.headers().get_all(http::header::SET_COOKIE) {
        let raw = value.to_str().unwrap();
        let (name, value) = raw.split(';').next().unwrap().split_once('=').unwrap();
        match name {
            "sessionid" => sessionid = Some(value.to_string()),
            "csrftoken" => csrf = Some(value.to_string()),
            _ => {}
        }
    }
    let sessionid = sessionid.expect("login must set sessionid");
    let csrf = csrf.expect("login must set csrftoken");
    AuthedSession {
        cookie: format!("csrftoken={csrf}; sessionid={sessionid}"),
        csrf,
    }
}

fn get(uri: &str, session: &AuthedSession) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::COOKIE, &session.cookie)
        .body(String::new())
        .unwrap()
}

fn send_json(method: &str, uri: &str, body: &str, session: &AuthedSession) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::COOKIE, &session.cookie)
        .header("x-csrftoken", &session.csrf)
        .body(body.to_string())
        .unwrap()
}

fn delete(uri: &str, session: &AuthedSession) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(http::header::COOKIE, &session.cookie)
        .header("x-csrftoken", &session.csrf)
        .body(String::new())
        .unwrap()
}

async fn create_department(app: &axum::Router, session: &AuthedSession, name: &str) -> Department {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/departments/",
            &json!({ "name": name }).to_string(),
            session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn create_employee(
    app: &axum::Router,
    session: &AuthedSession,
    department: i64,
    last_name: &str,
) -> Employee {
    let body = json!({
        "first_name": "Anna",
        "last_name": last_name,
        "gender": "weiblich",
        "date_of_birth": "24.12.1985",
        "date_of_entry": "01.04.2019",
        "employee_id": format!("P-{last_name}"),
        "department": department,
    })
    .to_string();
    let response = app
        .clone()
        .oneshot(send_json("POST", "/employees/", &body, session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// --- auth ---

#[tokio::test]
async fn login_with_wrong_credentials_returns_401() {
    let app = app();
    let body = json!({ "email": DEMO_EMAIL, "password": "nope" }).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rest-auth/login/")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn resource_routes_require_a_session() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/employees/").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn state_changes_require_the_csrf_token() {
    let app = app();
    let session = login(&app).await;

    // cookie alone is not enough for a POST
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/departments/")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::COOKIE, &session.cookie)
                .body(json!({ "name": "Verwaltung" }).to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // reads work with the cookie alone
    let response = app.clone().oneshot(get("/departments/", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = app();
    let session = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api-auth/logout/")
                .header(http::header::COOKIE, &session.cookie)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/employees/", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// --- employees ---

#[tokio::test]
async fn create_employee_initializes_next_reminder() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;

    let employee = create_employee(&app, &session, department.id, "Mueller").await;
    assert_eq!(
        employee.next_reminder.map(|d| d.format("%d.%m.%Y").to_string()),
        Some("01.04.2019".to_string())
    );
}

#[tokio::test]
async fn create_employee_with_unknown_department_returns_400() {
    let app = app();
    let session = login(&app).await;
    let body = json!({
        "first_name": "Anna",
        "last_name": "Mueller",
        "gender": "weiblich",
        "date_of_birth": "24.12.1985",
        "date_of_entry": "01.04.2019",
        "employee_id": "P-0042",
        "department": 999,
    })
    .to_string();
    let response = app
        .clone()
        .oneshot(send_json("POST", "/employees/", &body, &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn employee_filter_lookup_semantics() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    create_employee(&app, &session, department.id, "Mueller").await;
    create_employee(&app, &session, department.id, "Schmidt").await;

    let response = app
        .clone()
        .oneshot(get("/employees/?lastname=Muel", &session))
        .await
        .unwrap();
    let hits: Vec<Employee> = body_json(response).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].last_name, "Mueller");

    let response = app
        .clone()
        .oneshot(get("/employees/?e_id=P-Schmidt", &session))
        .await
        .unwrap();
    let hits: Vec<Employee> = body_json(response).await;
    assert_eq!(hits.len(), 1);

    let response = app
        .clone()
        .oneshot(get("/employees/?active=false", &session))
        .await
        .unwrap();
    let hits: Vec<Employee> = body_json(response).await;
    assert!(hits.is_empty());

    // inclusive reminder bounds on next_reminder
    let response = app
        .clone()
        .oneshot(get(
            "/employees/?reminder_after=01.04.2019&reminder_before=01.04.2019",
            &session,
        ))
        .await
        .unwrap();
    let hits: Vec<Employee> = body_json(response).await;
    assert_eq!(hits.len(), 2);

    let response = app
        .clone()
        .oneshot(get("/employees/?active=maybe", &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_applies_only_given_fields() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    let employee = create_employee(&app, &session, department.id, "Mueller").await;

    let response = app
        .clone()
        .oneshot(send_json(
            "PATCH",
            &format!("/employees/{}/", employee.id),
            &json!({ "active": false, "date_of_exit": "30.06.2021" }).to_string(),
            &session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Employee = body_json(response).await;
    assert!(!updated.active);
    assert!(updated.date_of_exit.is_some());
    assert_eq!(updated.last_name, "Mueller"); // unchanged
}

#[tokio::test]
async fn deleting_an_employee_cascades_appointments() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    let employee = create_employee(&app, &session, department.id, "Mueller").await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/appointments/",
            &json!({ "date": "01.04.2021", "employee": employee.id }).to_string(),
            &session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(delete(&format!("/employees/{}/", employee.id), &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get("/appointments/", &session)).await.unwrap();
    let remaining: Vec<Appointment> = body_json(response).await;
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn unknown_employee_returns_404() {
    let app = app();
    let session = login(&app).await;
    let response = app
        .clone()
        .oneshot(get("/employees/999/", &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- departments ---

#[tokio::test]
async fn deleting_a_referenced_department_fails() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    create_employee(&app, &session, department.id, "Mueller").await;

    let response = app
        .clone()
        .oneshot(delete(&format!("/departments/{}/", department.id), &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn department_reminder_interval_defaults_to_24() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    assert_eq!(department.reminder_interval, 24);
}

// --- appointments ---

#[tokio::test]
async fn appointment_for_unknown_employee_returns_400() {
    let app = app();
    let session = login(&app).await;
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/appointments/",
            &json!({ "date": "01.04.2021", "employee": 999 }).to_string(),
            &session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn appointment_date_filters_are_inclusive() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    let employee = create_employee(&app, &session, department.id, "Mueller").await;

    for date in ["01.03.2021", "15.03.2021", "01.05.2021"] {
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/appointments/",
                &json!({ "date": date, "employee": employee.id }).to_string(),
                &session,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get(
            "/appointments/?min_date=01.03.2021&max_date=15.03.2021",
            &session,
        ))
        .await
        .unwrap();
    let hits: Vec<Appointment> = body_json(response).await;
    assert_eq!(hits.len(), 2);
}

// --- templates and letters ---

#[tokio::test]
async fn filled_template_renders_employee_fields() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    let employee = create_employee(&app, &session, department.id, "Mueller").await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/templates/",
            &json!({
                "name": "Einladung",
                "template_body": "Dear {{ employee.first_name }} {{ employee.last_name }}"
            })
            .to_string(),
            &session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let template: Template = body_json(response).await;

    let response = app
        .clone()
        .oneshot(get(
            &format!("/templates/{}/{}/", template.id, employee.id),
            &session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let filled: serde_json::Value = body_json(response).await;
    assert_eq!(filled["name"], "Einladung");
    assert_eq!(filled["template_body"], "Dear Anna Mueller");

    let response = app
        .clone()
        .oneshot(get(&format!("/templates/999/{}/", employee.id), &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cover_letter_roundtrip() {
    let app = app();
    let session = login(&app).await;
    let department = create_department(&app, &session, "Verwaltung").await;
    let employee = create_employee(&app, &session, department.id, "Mueller").await;

    // replace the stored template; literal \n escapes are stripped
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update-template/")
                .header(http::header::CONTENT_TYPE, "text/html")
                .header(http::header::COOKIE, &session.cookie)
                .header("x-csrftoken", &session.csrf)
                .body("<p>{{ employee.last_name }}</p>\\n".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/get-template/", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let raw = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert_eq!(raw, "<p>{{ employee.last_name }}</p>");

    let response = app
        .clone()
        .oneshot(get(&format!("/gen-html/{}/", employee.id), &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert_eq!(html, "<p>Mueller</p>");

    let response = app
        .clone()
        .oneshot(get(&format!("/gen-pdf/{}/", employee.id), &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF-1.4"));

    let response = app
        .clone()
        .oneshot(get("/gen-html/999/", &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
