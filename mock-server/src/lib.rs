use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, RawQuery, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

/// Body returned for every non-2xx reply.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiFailure {
    pub code: u16,
    pub message: String,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, Vec<String>>,
}

pub struct Store {
    next_id: u32,
    users: HashMap<u32, User>,
}

pub type Db = Arc<RwLock<Store>>;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_id: 1,
        users: HashMap::new(),
    }));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/echo", get(echo).post(echo).put(echo).patch(echo).delete(echo))
        .route("/malformed", get(malformed))
        .with_state(db)
        .layer(middleware::from_fn(tag_request_id))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn tag_request_id(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<ApiFailure>) {
    (
        status,
        Json(ApiFailure {
            code: status.as_u16(),
            message: message.to_string(),
        }),
    )
}

#[derive(Deserialize)]
struct ListParams {
    name: Option<String>,
}

async fn list_users(
    State(db): State<Db>,
    axum::extract::Query(params): axum::extract::Query<ListParams>,
) -> Json<Vec<User>> {
    let store = db.read().await;
    let mut users: Vec<User> = store
        .users
        .values()
        .filter(|u| params.name.as_ref().map_or(true, |name| &u.name == name))
        .cloned()
        .collect();
    users.sort_by_key(|u| u.id);
    Json(users)
}

async fn create_user(State(db): State<Db>, Json(input): Json<CreateUser>) -> Response {
    if input.name.is_empty() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty").into_response();
    }
    let mut store = db.write().await;
    let user = User {
        id: store.next_id,
        name: input.name,
    };
    store.next_id += 1;
    store.users.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn get_user(State(db): State<Db>, Path(id): Path<u32>) -> Response {
    let store = db.read().await;
    match store.users.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => failure(StatusCode::NOT_FOUND, "user not found").into_response(),
    }
}

async fn echo(RawQuery(query): RawQuery, request: Request) -> Json<Echo> {
    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in request.headers() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    Json(Echo {
        method: request.method().to_string(),
        query,
        headers,
    })
}

async fn malformed() -> &'static str {
    "this is not json"
}
