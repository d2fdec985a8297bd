//! In-memory reimplementation of the staff backend, used by integration
//! tests and runnable standalone.
//!
//! Covers the four CRUD resources with their list filters, session-cookie
//! authentication with CSRF checking, template filling, and the letter
//! rendering endpoints. All state lives behind one `Arc<RwLock<Store>>`;
//! nothing is persisted.
//!
//! DTOs here are deliberately independent from the client crate; the
//! integration tests catch schema drift between the two.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Id = i64;

/// Credentials of the single seeded account.
pub const DEMO_EMAIL: &str = "admin@example.com";
pub const DEMO_PASSWORD: &str = "changeme";

/// Cover-letter template seeded into a fresh store.
pub const DEFAULT_COVER_LETTER: &str = "<html><body>\
<p>{{ today }}</p>\
<p>Sehr geehrte/r {{ employee.first_name }} {{ employee.last_name }},</p>\
<p>wir erinnern Sie an Ihren anstehenden Termin.</p>\
</body></html>";

mod date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d.%m.%Y";

    pub fn parse(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
            .ok()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}

mod date_opt {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::date;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => date::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => date::parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Employee {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(with = "date")]
    pub date_of_birth: NaiveDate,
    #[serde(with = "date")]
    pub date_of_entry: NaiveDate,
    #[serde(default, with = "date_opt")]
    pub date_of_exit: Option<NaiveDate>,
    pub employee_id: String,
    pub department: Id,
    pub wants_reminder: bool,
    #[serde(default, with = "date_opt")]
    pub next_reminder: Option<NaiveDate>,
    pub reminder_interval: i64,
    pub notes: String,
    pub active: bool,
}

#[derive(Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(with = "date")]
    pub date_of_birth: NaiveDate,
    #[serde(with = "date")]
    pub date_of_entry: NaiveDate,
    #[serde(default, with = "date_opt")]
    pub date_of_exit: Option<NaiveDate>,
    pub employee_id: String,
    pub department: Id,
    #[serde(default = "default_true")]
    pub wants_reminder: bool,
    #[serde(default = "default_interval")]
    pub reminder_interval: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Deserialize)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    #[serde(default, with = "date_opt")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, with = "date_opt")]
    pub date_of_entry: Option<NaiveDate>,
    #[serde(default, with = "date_opt")]
    pub date_of_exit: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub department: Option<Id>,
    pub wants_reminder: Option<bool>,
    #[serde(default, with = "date_opt")]
    pub next_reminder: Option<NaiveDate>,
    pub reminder_interval: Option<i64>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Department {
    pub id: Id,
    pub name: String,
    pub reminder_interval: i64,
}

#[derive(Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default = "default_interval")]
    pub reminder_interval: i64,
}

#[derive(Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub reminder_interval: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Id,
    #[serde(with = "date")]
    pub date: NaiveDate,
    pub employee: Id,
    pub note: String,
    pub confirmed: bool,
}

#[derive(Deserialize)]
pub struct NewAppointment {
    #[serde(with = "date")]
    pub date: NaiveDate,
    pub employee: Id,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Deserialize)]
pub struct UpdateAppointment {
    #[serde(default, with = "date_opt")]
    pub date: Option<NaiveDate>,
    pub employee: Option<Id>,
    pub note: Option<String>,
    pub confirmed: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub template_body: String,
}

#[derive(Deserialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub template_body: String,
}

#[derive(Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template_body: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> i64 {
    24
}

#[derive(Debug)]
struct Table<T> {
    rows: HashMap<Id, T>,
    next_id: Id,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> Id {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug)]
pub struct Store {
    employees: Table<Employee>,
    departments: Table<Department>,
    appointments: Table<Appointment>,
    templates: Table<Template>,
    /// session token -> CSRF token
    sessions: HashMap<String, String>,
    cover_letter: String,
}

impl Store {
    fn new() -> Self {
        Self {
            employees: Table::new(),
            departments: Table::new(),
            appointments: Table::new(),
            templates: Table::new(),
            sessions: HashMap::new(),
            cover_letter: DEFAULT_COVER_LETTER.to_string(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new()));
    let protected = Router::new()
        .route("/employees/", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}/",
            get(get_employee).patch(update_employee).delete(delete_employee),
        )
        .route("/departments/", get(list_departments).post(create_department))
        .route(
            "/departments/{id}/",
            get(get_department)
                .patch(update_department)
                .delete(delete_department),
        )
        .route(
            "/appointments/",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/appointments/{id}/",
            get(get_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
        .route("/templates/", get(list_templates).post(create_template))
        .route(
            "/templates/{id}/",
            get(get_template).patch(update_template).delete(delete_template),
        )
        .route("/templates/{id}/{ek}/", get(filled_template))
        .route("/gen-html/{id}/", get(letter_html))
        .route("/gen-pdf/{id}/", get(letter_pdf))
        .route("/get-template/", get(raw_cover_letter))
        .route("/update-template/", post(replace_cover_letter))
        .route_layer(middleware::from_fn_with_state(db.clone(), require_session));

    Router::new()
        .route("/rest-auth/login/", post(login))
        .route("/api-auth/logout/", post(logout))
        .merge(protected)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// --- auth ---

async fn login(
    State(db): State<Db>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    if request.email != DEMO_EMAIL || request.password != DEMO_PASSWORD {
        tracing::info!(email = %request.email, "login rejected");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status": "Unauthorized",
                "message": "Username/password combination invalid."
            })),
        ));
    }

    let session_token = Uuid::new_v4().simple().to_string();
    let csrf_token = Uuid::new_v4().simple().to_string();
    db.write()
        .await
        .sessions
        .insert(session_token.clone(), csrf_token.clone());
    tracing::info!(email = %request.email, "login succeeded");

    let jar = jar
        .add(
            Cookie::build(("sessionid", session_token))
                .path("/")
                .http_only(true)
                .build(),
        )
        .add(Cookie::build(("csrftoken", csrf_token)).path("/").build());
    Ok((jar, Json(json!({ "email": request.email }))))
}

async fn logout(State(db): State<Db>, jar: CookieJar) -> StatusCode {
    if let Some(cookie) = jar.get("sessionid") {
        db.write().await.sessions.remove(cookie.value());
        tracing::info!("logout");
    }
    StatusCode::OK
}

/// Session guard for every resource and letter route. State-changing
/// requests must additionally echo the session's CSRF token in the
/// `x-csrftoken` header.
async fn require_session(
    State(db): State<Db>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = jar
        .get("sessionid")
        .map(|cookie| cookie.value().to_string())
        .ok_or(StatusCode::FORBIDDEN)?;
    let csrf = db
        .read()
        .await
        .sessions
        .get(&token)
        .cloned()
        .ok_or(StatusCode::FORBIDDEN)?;

    let method = request.method();
    let state_changing =
        method == Method::POST || method == Method::PATCH || method == Method::DELETE;
    if state_changing {
        let header = request
            .headers()
            .get("x-csrftoken")
            .and_then(|value| value.to_str().ok());
        if header != Some(csrf.as_str()) {
            return Err(StatusCode::FORBIDDEN);
        }
    }
    Ok(next.run(request).await)
}

// --- employees ---

fn parse_filter_bool(value: &str) -> Result<bool, StatusCode> {
    match value {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

fn parse_filter_date(value: &str) -> Result<NaiveDate, StatusCode> {
    date::parse(value).ok_or(StatusCode::BAD_REQUEST)
}

/// Employee list filters: substring matches on names, prefix match on the
/// personnel number, exact matches otherwise, and inclusive bounds on
/// `next_reminder`. Unknown parameters are ignored.
fn employee_matches(
    employee: &Employee,
    params: &HashMap<String, String>,
) -> Result<bool, StatusCode> {
    for (name, value) in params {
        let hit = match name.as_str() {
            "firstname" => employee.first_name.contains(value),
            "lastname" => employee.last_name.contains(value),
            "e_id" => employee.employee_id.starts_with(value),
            "gender" => employee.gender == *value,
            "active" => employee.active == parse_filter_bool(value)?,
            "wants_reminder" => employee.wants_reminder == parse_filter_bool(value)?,
            "date_of_birth" => employee.date_of_birth == parse_filter_date(value)?,
            "date_of_entry" => employee.date_of_entry == parse_filter_date(value)?,
            "reminder_before" => {
                let bound = parse_filter_date(value)?;
                employee.next_reminder.is_some_and(|date| date <= bound)
            }
            "reminder_after" => {
                let bound = parse_filter_date(value)?;
                employee.next_reminder.is_some_and(|date| date >= bound)
            }
            _ => true,
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn list_employees(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Employee>>, StatusCode> {
    let store = db.read().await;
    let mut employees = Vec::new();
    for employee in store.employees.rows.values() {
        if employee_matches(employee, &params)? {
            employees.push(employee.clone());
        }
    }
    employees.sort_by(|a, b| a.last_name.cmp(&b.last_name).then(a.id.cmp(&b.id)));
    Ok(Json(employees))
}

async fn create_employee(
    State(db): State<Db>,
    Json(input): Json<NewEmployee>,
) -> Result<(StatusCode, Json<Employee>), (StatusCode, Json<serde_json::Value>)> {
    let mut store = db.write().await;
    if !store.departments.rows.contains_key(&input.department) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "department": ["unknown department"] })),
        ));
    }
    let id = store.employees.allocate();
    let employee = Employee {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        gender: input.gender,
        date_of_birth: input.date_of_birth,
        date_of_entry: input.date_of_entry,
        date_of_exit: input.date_of_exit,
        employee_id: input.employee_id,
        department: input.department,
        wants_reminder: input.wants_reminder,
        // the first reminder is due on the day of entry
        next_reminder: Some(input.date_of_entry),
        reminder_interval: input.reminder_interval,
        notes: input.notes,
        active: input.active,
    };
    store.employees.rows.insert(id, employee.clone());
    tracing::debug!(id, "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn get_employee(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Employee>, StatusCode> {
    let store = db.read().await;
    store
        .employees
        .rows
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_employee(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateEmployee>,
) -> Result<Json<Employee>, StatusCode> {
    let mut store = db.write().await;
    if let Some(department) = input.department {
        if !store.departments.rows.contains_key(&department) {
            return Err(StatusCode::BAD_REQUEST);
        }
    }
    let employee = store.employees.rows.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(first_name) = input.first_name {
        employee.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        employee.last_name = last_name;
    }
    if let Some(gender) = input.gender {
        employee.gender = gender;
    }
    if let Some(date_of_birth) = input.date_of_birth {
        employee.date_of_birth = date_of_birth;
    }
    if let Some(date_of_entry) = input.date_of_entry {
        employee.date_of_entry = date_of_entry;
    }
    if let Some(date_of_exit) = input.date_of_exit {
        employee.date_of_exit = Some(date_of_exit);
    }
    if let Some(employee_id) = input.employee_id {
        employee.employee_id = employee_id;
    }
    if let Some(department) = input.department {
        employee.department = department;
    }
    if let Some(wants_reminder) = input.wants_reminder {
        employee.wants_reminder = wants_reminder;
    }
    if let Some(next_reminder) = input.next_reminder {
        employee.next_reminder = Some(next_reminder);
    }
    if let Some(reminder_interval) = input.reminder_interval {
        employee.reminder_interval = reminder_interval;
    }
    if let Some(notes) = input.notes {
        employee.notes = notes;
    }
    if let Some(active) = input.active {
        employee.active = active;
    }
    Ok(Json(employee.clone()))
}

async fn delete_employee(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .employees
        .rows
        .remove(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    // appointments cascade with their employee
    store
        .appointments
        .rows
        .retain(|_, appointment| appointment.employee != id);
    Ok(StatusCode::NO_CONTENT)
}

// --- departments ---

async fn list_departments(State(db): State<Db>) -> Json<Vec<Department>> {
    let store = db.read().await;
    let mut departments: Vec<Department> = store.departments.rows.values().cloned().collect();
    departments.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Json(departments)
}

async fn create_department(
    State(db): State<Db>,
    Json(input): Json<NewDepartment>,
) -> (StatusCode, Json<Department>) {
    let mut store = db.write().await;
    let id = store.departments.allocate();
    let department = Department {
        id,
        name: input.name,
        reminder_interval: input.reminder_interval,
    };
    store.departments.rows.insert(id, department.clone());
    (StatusCode::CREATED, Json(department))
}

async fn get_department(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Department>, StatusCode> {
    let store = db.read().await;
    store
        .departments
        .rows
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_department(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateDepartment>,
) -> Result<Json<Department>, StatusCode> {
    let mut store = db.write().await;
    let department = store
        .departments
        .rows
        .get_mut(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        department.name = name;
    }
    if let Some(reminder_interval) = input.reminder_interval {
        department.reminder_interval = reminder_interval;
    }
    Ok(Json(department.clone()))
}

async fn delete_department(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    if !store.departments.rows.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    // referenced departments are protected; the violation surfaces as a 500
    if store
        .employees
        .rows
        .values()
        .any(|employee| employee.department == id)
    {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    store.departments.rows.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// --- appointments ---

fn appointment_matches(
    appointment: &Appointment,
    params: &HashMap<String, String>,
) -> Result<bool, StatusCode> {
    for (name, value) in params {
        let hit = match name.as_str() {
            "employee" => {
                let id: Id = value.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
                appointment.employee == id
            }
            "min_date" => appointment.date >= parse_filter_date(value)?,
            "max_date" => appointment.date <= parse_filter_date(value)?,
            _ => true,
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn list_appointments(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Appointment>>, StatusCode> {
    let store = db.read().await;
    let mut appointments = Vec::new();
    for appointment in store.appointments.rows.values() {
        if appointment_matches(appointment, &params)? {
            appointments.push(appointment.clone());
        }
    }
    appointments.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    Ok(Json(appointments))
}

async fn create_appointment(
    State(db): State<Db>,
    Json(input): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), (StatusCode, Json<serde_json::Value>)> {
    let mut store = db.write().await;
    if !store.employees.rows.contains_key(&input.employee) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "employee": ["unknown employee"] })),
        ));
    }
    let id = store.appointments.allocate();
    let appointment = Appointment {
        id,
        date: input.date,
        employee: input.employee,
        note: input.note,
        confirmed: input.confirmed,
    };
    store.appointments.rows.insert(id, appointment.clone());
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn get_appointment(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Appointment>, StatusCode> {
    let store = db.read().await;
    store
        .appointments
        .rows
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_appointment(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateAppointment>,
) -> Result<Json<Appointment>, StatusCode> {
    let mut store = db.write().await;
    if let Some(employee) = input.employee {
        if !store.employees.rows.contains_key(&employee) {
            return Err(StatusCode::BAD_REQUEST);
        }
    }
    let appointment = store
        .appointments
        .rows
        .get_mut(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(date) = input.date {
        appointment.date = date;
    }
    if let Some(employee) = input.employee {
        appointment.employee = employee;
    }
    if let Some(note) = input.note {
        appointment.note = note;
    }
    if let Some(confirmed) = input.confirmed {
        appointment.confirmed = confirmed;
    }
    Ok(Json(appointment.clone()))
}

async fn delete_appointment(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .appointments
        .rows
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- templates ---

async fn list_templates(State(db): State<Db>) -> Json<Vec<Template>> {
    let store = db.read().await;
    let mut templates: Vec<Template> = store.templates.rows.values().cloned().collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Json(templates)
}

async fn create_template(
    State(db): State<Db>,
    Json(input): Json<NewTemplate>,
) -> (StatusCode, Json<Template>) {
    let mut store = db.write().await;
    let id = store.templates.allocate();
    let template = Template {
        id,
        name: input.name,
        description: input.description,
        template_body: input.template_body,
    };
    store.templates.rows.insert(id, template.clone());
    (StatusCode::CREATED, Json(template))
}

async fn get_template(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<Json<Template>, StatusCode> {
    let store = db.read().await;
    store
        .templates
        .rows
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_template(
    State(db): State<Db>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateTemplate>,
) -> Result<Json<Template>, StatusCode> {
    let mut store = db.write().await;
    let template = store
        .templates
        .rows
        .get_mut(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        template.name = name;
    }
    if let Some(description) = input.description {
        template.description = description;
    }
    if let Some(template_body) = input.template_body {
        template.template_body = template_body;
    }
    Ok(Json(template.clone()))
}

async fn delete_template(
    State(db): State<Db>,
    Path(id): Path<Id>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .templates
        .rows
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

/// `GET /templates/{template}/{employee}/` — the template rendered for one
/// employee. Returns only the rendered body and the template name.
async fn filled_template(
    State(db): State<Db>,
    Path((template_id, employee_id)): Path<(Id, Id)>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let store = db.read().await;
    let template = store
        .templates
        .rows
        .get(&template_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let employee = store
        .employees
        .rows
        .get(&employee_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let body = fill_placeholders(&template.template_body, employee);
    Ok(Json(json!({
        "template_body": body,
        "name": template.name
    })))
}

/// Substitute `{{ employee.* }}` and `{{ today }}` placeholders.
pub fn fill_placeholders(template: &str, employee: &Employee) -> String {
    let today = chrono::Local::now().date_naive();
    let substitutions = [
        ("{{ employee.first_name }}", employee.first_name.clone()),
        ("{{ employee.last_name }}", employee.last_name.clone()),
        ("{{ employee.gender }}", employee.gender.clone()),
        ("{{ employee.employee_id }}", employee.employee_id.clone()),
        ("{{ employee.department }}", employee.department.to_string()),
        ("{{ employee.notes }}", employee.notes.clone()),
        (
            "{{ employee.date_of_birth }}",
            employee.date_of_birth.format(date::FORMAT).to_string(),
        ),
        (
            "{{ employee.date_of_entry }}",
            employee.date_of_entry.format(date::FORMAT).to_string(),
        ),
        ("{{ today }}", today.format(date::FORMAT).to_string()),
    ];
    let mut rendered = template.to_string();
    for (placeholder, value) in substitutions {
        rendered = rendered.replace(placeholder, &value);
    }
    rendered
}

// --- letters ---

async fn letter_html(State(db): State<Db>, Path(id): Path<Id>) -> Result<Html<String>, StatusCode> {
    let store = db.read().await;
    let employee = store.employees.rows.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(fill_placeholders(&store.cover_letter, employee)))
}

async fn letter_pdf(State(db): State<Db>, Path(id): Path<Id>) -> Result<Response, StatusCode> {
    let store = db.read().await;
    let employee = store.employees.rows.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let text = format!("{} {}", employee.first_name, employee.last_name);
    Ok((
        [(header::CONTENT_TYPE, "application/pdf")],
        minimal_pdf(&text),
    )
        .into_response())
}

/// A minimal single-page PDF with one line of text. Good enough for a test
/// double; offsets in the xref table are computed, not guessed.
pub fn minimal_pdf(text: &str) -> Vec<u8> {
    let escaped = text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
    let stream = format!("BT /F1 12 Tf 72 720 Td ({escaped}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{object}\nendobj\n", index + 1));
    }
    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.into_bytes()
}

async fn raw_cover_letter(State(db): State<Db>) -> Html<String> {
    Html(db.read().await.cover_letter.clone())
}

/// Blind overwrite of the cover-letter template. Literal `\n` escape
/// sequences are stripped before the write.
async fn replace_cover_letter(State(db): State<Db>, body: String) -> StatusCode {
    db.write().await.cover_letter = body.replace("\\n", "");
    StatusCode::OK
}
