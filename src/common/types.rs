use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A direct message as returned by the marketplace backend.
///
/// `id` and `timestamp` are assigned by the server; the client never builds
/// one of these itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub content: String,
    pub timestamp: NaiveDateTime,
}

impl Message {
    /// Whether the message was written by `active_username`. Used for alignment only.
    pub fn is_from(&self, active_username: &str) -> bool {
        self.from_username == active_username
    }
}

/// The signed-in user, as far as this client cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// The pair of users a history load or send was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conversation {
    pub user: String,
    pub partner: String,
}

impl Conversation {
    pub fn new(user: impl Into<String>, partner: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            partner: partner.into(),
        }
    }
}

/// A marketplace listing as served by `GET /posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub asking_price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// The backend capitalizes this field.
    #[serde(rename = "Owner", alias = "owner", default)]
    pub owner: Option<PostOwner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOwner {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
}

impl Post {
    pub fn owner_username(&self) -> Option<&str> {
        self.owner.as_ref().map(|owner| owner.username.as_str())
    }
}
