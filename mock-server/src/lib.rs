//! In-memory mock of the kudos API for integration tests.
//!
//! Handlers that real clients hit with either wire format (create favor,
//! send message, update profile) sniff the content-type and accept both
//! JSON and multipart/form-data bodies. Multipart decoding mirrors the
//! client encoder's flattening: `tags` arrives as one JSON-stringified
//! field, attachments arrive under indexed `attachments[i]` names, and
//! absent optional fields are simply missing.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Favor {
    pub id: Uuid,
    pub title: String,
    pub kind: String,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Option<String>,
    pub cover: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Handshake {
    pub id: Uuid,
    pub favor_id: Uuid,
    pub proposer_id: Uuid,
    pub message: String,
    pub accepted: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub handshake_id: Uuid,
    pub body: String,
    pub attachments: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub kudos: i64,
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateFavor {
    pub title: String,
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub location: Option<String>,
    /// JSON clients never send bytes; multipart decoding fills this with
    /// the uploaded file name.
    #[serde(skip)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFavor {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProposeHandshake {
    pub proposer_id: Uuid,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendMessage {
    pub body: String,
    #[serde(skip)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    #[serde(skip)]
    pub avatar: Option<String>,
}

#[derive(Default)]
pub struct Store {
    pub favors: HashMap<Uuid, Favor>,
    pub handshakes: HashMap<Uuid, Handshake>,
    pub messages: HashMap<Uuid, Message>,
    pub profiles: HashMap<Uuid, Profile>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/favors", get(list_favors).post(create_favor))
        .route(
            "/favors/{id}",
            get(get_favor).put(update_favor).delete(delete_favor),
        )
        .route("/favors/{id}/handshakes", post(propose_handshake))
        .route("/handshakes/{id}/accept", post(accept_handshake))
        .route("/handshakes/{id}/messages", post(send_message))
        .route("/profiles/{id}", get(get_profile).put(update_profile))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn valid_kind(kind: &str) -> bool {
    kind == "request" || kind == "gift"
}

// --- favors ---

async fn list_favors(State(db): State<Db>) -> Json<Vec<Favor>> {
    let store = db.read().await;
    Json(store.favors.values().cloned().collect())
}

async fn create_favor(
    State(db): State<Db>,
    req: Request,
) -> Result<(StatusCode, Json<Favor>), StatusCode> {
    let input = if is_multipart(&req) {
        create_favor_from_multipart(req).await?
    } else {
        let Json(input) = Json::<CreateFavor>::from_request(req, &())
            .await
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
        input
    };
    if input.title.is_empty() || !valid_kind(&input.kind) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let favor = Favor {
        id: Uuid::new_v4(),
        title: input.title,
        kind: input.kind,
        description: input.description,
        tags: input.tags,
        location: input.location,
        cover: input.cover,
    };
    db.write().await.favors.insert(favor.id, favor.clone());
    Ok((StatusCode::CREATED, Json(favor)))
}

async fn create_favor_from_multipart(req: Request) -> Result<CreateFavor, StatusCode> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut input = CreateFavor::default();
    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => input.title = text(field).await?,
            "kind" => input.kind = text(field).await?,
            "description" => input.description = text(field).await?,
            // The client compacts scalar arrays to one JSON-encoded field.
            "tags" => {
                input.tags = serde_json::from_str(&text(field).await?)
                    .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?
            }
            "location" => input.location = Some(text(field).await?),
            "cover" => input.cover = file_name(field).await?,
            _ => return Err(StatusCode::UNPROCESSABLE_ENTITY),
        }
    }
    Ok(input)
}

async fn get_favor(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Favor>, StatusCode> {
    let store = db.read().await;
    store.favors.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_favor(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFavor>,
) -> Result<Json<Favor>, StatusCode> {
    let mut store = db.write().await;
    let favor = store.favors.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        favor.title = title;
    }
    if let Some(description) = input.description {
        favor.description = description;
    }
    if let Some(tags) = input.tags {
        favor.tags = tags;
    }
    if let Some(location) = input.location {
        favor.location = Some(location);
    }
    Ok(Json(favor.clone()))
}

async fn delete_favor(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .favors
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- handshakes ---

async fn propose_handshake(
    State(db): State<Db>,
    Path(favor_id): Path<Uuid>,
    Json(input): Json<ProposeHandshake>,
) -> Result<(StatusCode, Json<Handshake>), StatusCode> {
    let mut store = db.write().await;
    if !store.favors.contains_key(&favor_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let handshake = Handshake {
        id: Uuid::new_v4(),
        favor_id,
        proposer_id: input.proposer_id,
        message: input.message,
        accepted: false,
    };
    store.handshakes.insert(handshake.id, handshake.clone());
    Ok((StatusCode::CREATED, Json(handshake)))
}

async fn accept_handshake(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Handshake>, StatusCode> {
    let mut store = db.write().await;
    let handshake = store.handshakes.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let first_accept = !handshake.accepted;
    handshake.accepted = true;
    let handshake = handshake.clone();
    // Accepting credits one kudo to the proposer.
    if first_accept {
        store
            .profiles
            .entry(handshake.proposer_id)
            .or_insert_with(|| default_profile(handshake.proposer_id))
            .kudos += 1;
    }
    Ok(Json(handshake))
}

// --- messages ---

async fn send_message(
    State(db): State<Db>,
    Path(handshake_id): Path<Uuid>,
    req: Request,
) -> Result<(StatusCode, Json<Message>), StatusCode> {
    let input = if is_multipart(&req) {
        send_message_from_multipart(req).await?
    } else {
        let Json(input) = Json::<SendMessage>::from_request(req, &())
            .await
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
        input
    };

    let mut store = db.write().await;
    if !store.handshakes.contains_key(&handshake_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let message = Message {
        id: Uuid::new_v4(),
        handshake_id,
        body: input.body,
        attachments: input.attachments,
    };
    store.messages.insert(message.id, message.clone());
    Ok((StatusCode::CREATED, Json(message)))
}

async fn send_message_from_multipart(req: Request) -> Result<SendMessage, StatusCode> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut input = SendMessage::default();
    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "body" {
            input.body = text(field).await?;
        } else if name.starts_with("attachments[") {
            // Attachments arrive expanded as attachments[0], attachments[1], …
            if let Some(file_name) = file_name(field).await? {
                input.attachments.push(file_name);
            }
        } else {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
    Ok(input)
}

// --- profiles ---

async fn get_profile(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, StatusCode> {
    let store = db.read().await;
    store.profiles.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_profile(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    req: Request,
) -> Result<Json<Profile>, StatusCode> {
    let input = if is_multipart(&req) {
        update_profile_from_multipart(req).await?
    } else {
        let Json(input) = Json::<UpdateProfile>::from_request(req, &())
            .await
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
        input
    };

    let mut store = db.write().await;
    let profile = store
        .profiles
        .entry(id)
        .or_insert_with(|| default_profile(id));
    if let Some(display_name) = input.display_name {
        profile.display_name = display_name;
    }
    if let Some(bio) = input.bio {
        profile.bio = Some(bio);
    }
    if let Some(avatar) = input.avatar {
        profile.avatar = Some(avatar);
    }
    Ok(Json(profile.clone()))
}

async fn update_profile_from_multipart(req: Request) -> Result<UpdateProfile, StatusCode> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut input = UpdateProfile::default();
    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "display_name" => input.display_name = Some(text(field).await?),
            "bio" => input.bio = Some(text(field).await?),
            "avatar" => input.avatar = file_name(field).await?,
            _ => return Err(StatusCode::UNPROCESSABLE_ENTITY),
        }
    }
    Ok(input)
}

fn default_profile(id: Uuid) -> Profile {
    Profile {
        id,
        display_name: "New user".to_string(),
        bio: None,
        kudos: 0,
        avatar: None,
    }
}

async fn next_field(
    multipart: &mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'_>>, StatusCode> {
    multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, StatusCode> {
    field.text().await.map_err(|_| StatusCode::BAD_REQUEST)
}

/// Drain a binary part and report its file name; the mock keeps names, not
/// bytes.
async fn file_name(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<String>, StatusCode> {
    let name = field.file_name().map(str::to_string);
    field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(name)
}
