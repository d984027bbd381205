use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Tasks are emitted with `entity_id`, the newer of the two identifier names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub entity_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    #[serde(skip)]
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Person {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct CreateTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub is_completed: Option<u8>,
}

#[derive(Deserialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPassword {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPassword {
    pub password: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
}

struct Account {
    person: Person,
    password: String,
}

#[derive(Default)]
pub struct Db {
    /// Newest first.
    tasks: Vec<Task>,
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    /// (token, uid) -> email
    resets: HashMap<(String, String), String>,
}

#[derive(Clone, Default)]
pub struct AppState {
    db: Arc<RwLock<Db>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(token, uidb64)` pair a reset email would have carried.
    pub async fn reset_link(&self, email: &str) -> Option<(String, String)> {
        let db = self.db.read().await;
        db.resets
            .iter()
            .find(|(_, owner)| owner.as_str() == email)
            .map(|(key, _)| key.clone())
    }

    /// Drops every issued access token, as if they had all expired.
    pub async fn expire_tokens(&self) {
        self.db.write().await.tokens.clear();
    }
}

type Reply = (StatusCode, Json<Value>);

const EXPIRY_SECONDS: u64 = 3600;

pub fn app() -> Router {
    app_with_state(AppState::new())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/forgot_password", post(forgot_password))
        .route("/auth/reset_password/{token}/{uid}", post(reset_password))
        .route("/person/me", get(me).put(update_me))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/completed", get(completed_tasks))
        .route("/tasks/pending", get(pending_tasks))
        .route(
            "/tasks/{id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::new()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app_with_state(state)).await
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn issue_token(db: &mut Db, email: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    db.tokens.insert(token.clone(), email.to_string());
    token
}

fn session_reply(person: &Person, token: &str) -> Reply {
    ok(json!({
        "success": true,
        "person": person,
        "access_token": token,
        "expiry": EXPIRY_SECONDS,
    }))
}

/// Resolves the bearer token to an account email.
fn authorize(db: &Db, headers: &HeaderMap) -> Result<String, Reply> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| db.tokens.get(token))
        .cloned()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Authentication required"))
}

async fn signup(State(state): State<AppState>, Json(input): Json<Signup>) -> Reply {
    let mut db = state.db.write().await;
    if db.accounts.contains_key(&input.email) {
        return fail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let person = Person {
        email: input.email.clone(),
        first_name: input.first_name,
        last_name: input.last_name,
    };
    db.accounts.insert(
        input.email,
        Account {
            person,
            password: input.password,
        },
    );
    (StatusCode::CREATED, Json(json!({ "success": true })))
}

async fn login(State(state): State<AppState>, Json(input): Json<Login>) -> Reply {
    let mut db = state.db.write().await;
    let person = match db.accounts.get(&input.email) {
        Some(account) if account.password == input.password => account.person.clone(),
        _ => return fail(StatusCode::BAD_REQUEST, "Invalid email or password"),
    };
    let token = issue_token(&mut db, &input.email);
    session_reply(&person, &token)
}

async fn forgot_password(State(state): State<AppState>, Json(input): Json<ForgotPassword>) -> Reply {
    let mut db = state.db.write().await;
    if db.accounts.contains_key(&input.email) {
        let token = Uuid::new_v4().simple().to_string();
        let uid = Uuid::new_v4().simple().to_string();
        db.resets.insert((token, uid), input.email);
    }
    // Same answer for unknown addresses.
    ok(json!({ "success": true }))
}

async fn reset_password(
    State(state): State<AppState>,
    Path((token, uid)): Path<(String, String)>,
    Json(input): Json<ResetPassword>,
) -> Reply {
    let mut db = state.db.write().await;
    let Some(email) = db.resets.remove(&(token, uid)) else {
        return fail(StatusCode::BAD_REQUEST, "Reset link is invalid or has expired");
    };
    let Some(account) = db.accounts.get_mut(&email) else {
        return fail(StatusCode::BAD_REQUEST, "Reset link is invalid or has expired");
    };
    account.password = input.password;
    let person = account.person.clone();
    let access = issue_token(&mut db, &email);
    session_reply(&person, &access)
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    let db = state.db.read().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    match db.accounts.get(&email) {
        Some(account) => ok(json!({ "success": true, "person": account.person })),
        None => fail(StatusCode::NOT_FOUND, "Person not found"),
    }
}

async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ProfileUpdate>,
) -> Reply {
    let mut db = state.db.write().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    match db.accounts.get_mut(&email) {
        Some(account) => {
            account.person.first_name = input.first_name;
            account.person.last_name = input.last_name;
            ok(json!({ "success": true, "user": account.person }))
        }
        None => fail(StatusCode::NOT_FOUND, "Person not found"),
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Reply {
    let db = state.db.read().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(10).max(1);
    let wanted = params.is_completed.map(|flag| flag != 0);

    let matching: Vec<&Task> = db
        .tasks
        .iter()
        .filter(|task| task.owner == email)
        .filter(|task| wanted.map_or(true, |done| task.is_completed == done))
        .collect();
    let total = matching.len() as u64;
    let total_pages = total.div_ceil(u64::from(per_page));
    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let tasks: Vec<&Task> = matching
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    ok(json!({
        "success": true,
        "tasks": tasks,
        "pagination": {
            "page": page,
            "per_page": per_page,
            "total": total,
            "total_pages": total_pages,
        },
    }))
}

async fn filtered(state: &AppState, headers: &HeaderMap, completed: bool) -> Reply {
    let db = state.db.read().await;
    let email = match authorize(&db, headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    let data: Vec<&Task> = db
        .tasks
        .iter()
        .filter(|task| task.owner == email && task.is_completed == completed)
        .collect();
    ok(json!({ "success": true, "data": data }))
}

async fn completed_tasks(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    filtered(&state, &headers, true).await
}

async fn pending_tasks(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    filtered(&state, &headers, false).await
}

async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateTask>,
) -> Reply {
    let mut db = state.db.write().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    if input.title.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Title is required");
    }
    let task = Task {
        entity_id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        is_completed: false,
        owner: email,
    };
    db.tasks.insert(0, task.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "task": task })),
    )
}

async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Reply {
    let db = state.db.read().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    match db.tasks.iter().find(|t| t.entity_id == id && t.owner == email) {
        Some(task) => ok(json!({ "success": true, "task": task })),
        None => fail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTask>,
) -> Reply {
    let mut db = state.db.write().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    let Some(task) = db
        .tasks
        .iter_mut()
        .find(|t| t.entity_id == id && t.owner == email)
    else {
        return fail(StatusCode::NOT_FOUND, "Task not found");
    };
    if let Some(title) = input.title {
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = description;
    }
    if let Some(is_completed) = input.is_completed {
        task.is_completed = is_completed;
    }
    ok(json!({ "success": true, "task": task }))
}

async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Reply {
    let mut db = state.db.write().await;
    let email = match authorize(&db, &headers) {
        Ok(email) => email,
        Err(reply) => return reply,
    };
    let before = db.tasks.len();
    db.tasks.retain(|t| !(t.entity_id == id && t.owner == email));
    if db.tasks.len() == before {
        return fail(StatusCode::NOT_FOUND, "Task not found");
    }
    ok(json!({ "success": true }))
}
