//! Domain DTOs for the kudos API.
//!
//! # Design
//! Response types mirror the server's schema but are defined independently;
//! integration tests catch schema drift. Request types convert themselves
//! into [`Payload`] values so every mutating call routes through the
//! request-body encoder — types carrying an [`Attachment`] may resolve to
//! multipart under auto mode, the rest always encode as JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{Attachment, Payload};

/// Whether a favor asks for help or offers something.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FavorKind {
    Request,
    Gift,
}

impl FavorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FavorKind::Request => "request",
            FavorKind::Gift => "gift",
        }
    }
}

/// A favor posted on the platform, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Favor {
    pub id: Uuid,
    pub title: String,
    pub kind: FavorKind,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Option<String>,
    /// File name of the uploaded cover image, if any.
    pub cover: Option<String>,
}

/// Request payload for posting a new favor.
#[derive(Debug, Clone)]
pub struct CreateFavor {
    pub title: String,
    pub kind: FavorKind,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Option<String>,
    pub cover: Option<Attachment>,
}

impl CreateFavor {
    /// An absent location is sent as an explicit `null` (dropped on the
    /// multipart path); an absent cover is not sent at all.
    pub fn into_payload(self) -> Payload {
        let mut entries = vec![
            ("title".to_string(), Payload::from(self.title)),
            ("kind".to_string(), Payload::from(self.kind.as_str())),
            ("description".to_string(), Payload::from(self.description)),
            ("tags".to_string(), Payload::from(self.tags)),
            ("location".to_string(), Payload::from(self.location)),
        ];
        if let Some(cover) = self.cover {
            entries.push(("cover".to_string(), Payload::from(cover)));
        }
        Payload::Map(entries)
    }
}

/// Partial update for an existing favor. Only the fields present are
/// applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default)]
pub struct UpdateFavor {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub location: Option<String>,
}

impl UpdateFavor {
    pub fn to_payload(&self) -> Payload {
        let mut entries = Vec::new();
        if let Some(title) = &self.title {
            entries.push(("title".to_string(), Payload::from(title.clone())));
        }
        if let Some(description) = &self.description {
            entries.push(("description".to_string(), Payload::from(description.clone())));
        }
        if let Some(tags) = &self.tags {
            entries.push(("tags".to_string(), Payload::from(tags.clone())));
        }
        if let Some(location) = &self.location {
            entries.push(("location".to_string(), Payload::from(location.clone())));
        }
        Payload::Map(entries)
    }
}

/// An agreement to fulfill a favor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Handshake {
    pub id: Uuid,
    pub favor_id: Uuid,
    pub proposer_id: Uuid,
    pub message: String,
    pub accepted: bool,
}

/// Request payload for proposing a handshake on a favor.
#[derive(Debug, Clone)]
pub struct ProposeHandshake {
    pub proposer_id: Uuid,
    pub message: String,
}

impl ProposeHandshake {
    pub fn to_payload(&self) -> Payload {
        Payload::Map(vec![
            (
                "proposer_id".to_string(),
                Payload::from(self.proposer_id.to_string()),
            ),
            ("message".to_string(), Payload::from(self.message.clone())),
        ])
    }
}

/// A message exchanged within a handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub handshake_id: Uuid,
    pub body: String,
    /// File names of any uploaded attachments.
    pub attachments: Vec<String>,
}

/// Request payload for sending a message, with optional attachments.
#[derive(Debug, Clone)]
pub struct SendMessage {
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl SendMessage {
    pub fn into_payload(self) -> Payload {
        Payload::Map(vec![
            ("body".to_string(), Payload::from(self.body)),
            ("attachments".to_string(), Payload::from(self.attachments)),
        ])
    }
}

/// A user profile with its kudos score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub kudos: i64,
    /// File name of the uploaded avatar, if any.
    pub avatar: Option<String>,
}

/// Partial profile update. An avatar attachment forces multipart under
/// auto mode; without one the update goes out as JSON.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<Attachment>,
}

impl UpdateProfile {
    pub fn into_payload(self) -> Payload {
        let mut entries = Vec::new();
        if let Some(display_name) = self.display_name {
            entries.push(("display_name".to_string(), Payload::from(display_name)));
        }
        if let Some(bio) = self.bio {
            entries.push(("bio".to_string(), Payload::from(bio)));
        }
        if let Some(avatar) = self.avatar {
            entries.push(("avatar".to_string(), Payload::from(avatar)));
        }
        Payload::Map(entries)
    }
}
