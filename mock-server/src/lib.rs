use std::{collections::HashMap, convert::Infallible, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const DEMO_EMAIL: &str = "coach@coachboard.dev";
pub const DEMO_PASSWORD: &str = "correct-horse";
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x7);

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: u64,
    pub currency: String,
    pub duration_days: u32,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u64,
    pub currency: String,
    pub duration_days: u32,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<u64>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

/// Error body in the backend's `{ timestamp, code, status, errors }` shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub code: u16,
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    errors: Vec<String>,
}

impl Failure {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![error.into()],
        }
    }

    /// Failure carrying only the status text, no `errors` list.
    fn bare(status: StatusCode) -> Self {
        Self {
            status,
            errors: Vec::new(),
        }
    }

    fn unauthorized(error: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            timestamp: chrono::Utc::now().to_rfc3339(),
            code: self.status.as_u16(),
            status: self.status.canonical_reason().unwrap_or("Error").to_string(),
            errors: self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Default)]
pub struct Store {
    users: HashMap<Uuid, User>,
    passwords: HashMap<String, (Uuid, String)>,
    tokens: HashMap<String, Uuid>,
    plans: HashMap<Uuid, Plan>,
}

impl Store {
    fn seeded() -> Self {
        let mut store = Store::default();
        store.users.insert(
            DEMO_USER_ID,
            User {
                id: DEMO_USER_ID,
                email: DEMO_EMAIL.to_string(),
                first_name: "Dana".to_string(),
                last_name: "Coach".to_string(),
                role: "TRAINER".to_string(),
                avatar_url: None,
                active: true,
            },
        );
        store
            .passwords
            .insert(DEMO_EMAIL.to_string(), (DEMO_USER_ID, DEMO_PASSWORD.to_string()));
        store
    }

    /// Bearer token must be known and the user-id header must match it.
    fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, Failure> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| Failure::unauthorized("Missing bearer token"))?;
        let user_id = *self
            .tokens
            .get(token)
            .ok_or_else(|| Failure::unauthorized("Invalid token"))?;
        let claimed = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
        if claimed != Some(user_id.to_string().as_str()) {
            return Err(Failure::unauthorized("User id does not match token"));
        }
        Ok(user_id)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/{id}", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/users/{id}/avatar", put(upload_avatar))
        .route("/chat/stream", post(chat_stream))
        .route("/chat/empty", post(chat_empty))
        .route("/chat/silent", post(chat_silent))
        .route("/chat/fail", post(chat_fail))
        .route("/debug/echo", get(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Result<Json<serde_json::Value>, Failure> {
    let mut store = db.write().await;
    let user_id = match store.passwords.get(&input.email) {
        Some((id, password)) if *password == input.password => *id,
        _ => return Err(Failure::unauthorized("Invalid email or password")),
    };
    let user = store
        .users
        .get(&user_id)
        .cloned()
        .ok_or_else(|| Failure::bare(StatusCode::INTERNAL_SERVER_ERROR))?;
    let token = format!("token-{}", Uuid::new_v4());
    store.tokens.insert(token.clone(), user_id);
    tracing::info!(%user_id, "login");
    Ok(Json(serde_json::json!({ "token": token, "user": user })))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    let store = db.read().await;
    let user_id = store.authorize(&headers)?;
    store
        .users
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "User not found"))
}

async fn list_plans(
    State(db): State<Db>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Plan>>, Failure> {
    let store = db.read().await;
    store.authorize(&headers)?;
    let statuses: Vec<String> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .filter(|(k, _)| k == "status")
        .map(|(_, v)| v.into_owned())
        .collect();
    let mut plans: Vec<Plan> = store
        .plans
        .values()
        .filter(|p| statuses.is_empty() || statuses.contains(&p.status))
        .cloned()
        .collect();
    plans.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(plans))
}

async fn create_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePlan>,
) -> Result<(StatusCode, Json<Plan>), Failure> {
    let mut store = db.write().await;
    store.authorize(&headers)?;

    let mut errors = Vec::new();
    if input.name.trim().is_empty() {
        errors.push("name must not be blank".to_string());
    }
    if input.duration_days == 0 {
        errors.push("durationDays must be positive".to_string());
    }
    if !errors.is_empty() {
        return Err(Failure {
            status: StatusCode::BAD_REQUEST,
            errors,
        });
    }
    if store.plans.values().any(|p| p.name == input.name) {
        return Err(Failure::bare(StatusCode::CONFLICT));
    }

    let plan = Plan {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
        price_cents: input.price_cents,
        currency: input.currency,
        duration_days: input.duration_days,
        status: input.status.unwrap_or_else(|| "DRAFT".to_string()),
    };
    store.plans.insert(plan.id, plan.clone());
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn get_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Plan>, Failure> {
    let store = db.read().await;
    store.authorize(&headers)?;
    store
        .plans
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Plan not found"))
}

async fn update_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePlan>,
) -> Result<Json<Plan>, Failure> {
    let mut store = db.write().await;
    store.authorize(&headers)?;
    let plan = store
        .plans
        .get_mut(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Plan not found"))?;
    if let Some(name) = input.name {
        plan.name = name;
    }
    if let Some(description) = input.description {
        plan.description = description;
    }
    if let Some(price_cents) = input.price_cents {
        plan.price_cents = price_cents;
    }
    if let Some(status) = input.status {
        plan.status = status;
    }
    Ok(Json(plan.clone()))
}

async fn delete_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store.authorize(&headers)?;
    store
        .plans
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Plan not found"))
}

async fn upload_avatar(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<User>, Failure> {
    let mut store = db.write().await;
    let caller = store.authorize(&headers)?;
    if caller != id {
        return Err(Failure::new(StatusCode::FORBIDDEN, "Cannot change another user's avatar"));
    }
    let extension = match headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        _ => return Err(Failure::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Avatar must be PNG or JPEG")),
    };
    if body.is_empty() {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Avatar is empty"));
    }
    let user = store
        .users
        .get_mut(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "User not found"))?;
    user.avatar_url = Some(format!("/avatars/{id}.{extension}?bytes={}", body.len()));
    Ok(Json(user.clone()))
}

/// Reply split into tokens, sent as separate chunks.
pub fn chat_reply(message: &str) -> Vec<String> {
    let reply = format!("Coach says: {message} - keep going 💪");
    reply.split_inclusive(' ').map(str::to_string).collect()
}

async fn chat_stream(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ChatMessage>,
) -> Result<Response, Failure> {
    db.read().await.authorize(&headers)?;
    let chunks = chat_reply(&input.message).into_iter().map(Ok::<_, Infallible>);
    let body = Body::from_stream(futures_util::stream::iter(chunks));
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

async fn chat_empty() -> StatusCode {
    StatusCode::OK
}

/// Chunked OK response that closes without sending a byte.
async fn chat_silent() -> Response {
    let body = Body::from_stream(futures_util::stream::empty::<Result<Bytes, Infallible>>());
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn chat_fail() -> Failure {
    Failure::new(StatusCode::TOO_MANY_REQUESTS, "Chat quota exceeded")
}

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery) -> Json<serde_json::Value> {
    let raw = query.unwrap_or_default();
    let params: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(serde_json::json!({
        "query": raw,
        "params": params,
        "authorization": header_value("authorization"),
        "userId": header_value(USER_ID_HEADER),
        "contentType": header_value("content-type"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_omits_empty_errors() {
        let body = ErrorBody {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            code: 409,
            status: "Conflict".to_string(),
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "Conflict");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn chat_reply_reassembles() {
        let chunks = chat_reply("run 5k");
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), "Coach says: run 5k - keep going 💪");
    }

    #[test]
    fn authorize_requires_matching_user_id() {
        let mut store = Store::seeded();
        store.tokens.insert("t".to_string(), DEMO_USER_ID);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer t".parse().unwrap());
        assert!(store.authorize(&headers).is_err());

        headers.insert(USER_ID_HEADER, DEMO_USER_ID.to_string().parse().unwrap());
        assert_eq!(store.authorize(&headers).unwrap(), DEMO_USER_ID);

        headers.insert(USER_ID_HEADER, Uuid::nil().to_string().parse().unwrap());
        assert!(store.authorize(&headers).is_err());
    }

    #[test]
    fn create_plan_defaults_description() {
        let input: CreatePlan = serde_json::from_str(
            r#"{"name":"Gold","priceCents":4999,"currency":"EUR","durationDays":30}"#,
        )
        .unwrap();
        assert_eq!(input.description, "");
        assert!(input.status.is_none());
    }
}
