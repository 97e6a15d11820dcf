use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_typing: bool,
    pub citations: Vec<String>,
}

impl Message {
    pub fn user(content: String) -> Self {
        Message {
            id: Uuid::new_v4(),
            role: Role::User,
            content,
            timestamp: Utc::now(),
            is_typing: false,
            citations: Vec::new(),
        }
    }

    /// Transient assistant entry shown while the remote call is pending.
    pub fn typing_placeholder() -> Self {
        Message {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
            is_typing: true,
            citations: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploading,
    Processing,
    Ready,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub declared_type: String,
    pub status: FileStatus,
    pub progress: u8,
    pub content: Option<String>, // Base64
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn is_ready(&self) -> bool {
        self.status == FileStatus::Ready && self.content.is_some()
    }
}
