//! Subset of the Telegram Bot API object model the bot reads and writes.

use serde::{Deserialize, Serialize};

/// Envelope around every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Absent for edits, callback queries and the other update kinds we ignore
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
    #[serde(default)]
    pub sticker: Option<FileRef>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub document: Option<FileRef>,
    #[serde(default)]
    pub audio: Option<FileRef>,
    #[serde(default)]
    pub video: Option<FileRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub file_size: Option<i64>,
}

/// Stickers, documents, audio and video are forwarded by file id only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// What a relayed message carries, in forwarding precedence
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<'a> {
    Photo(&'a [PhotoSize]),
    Sticker(&'a FileRef),
    Location(Location),
    Document(&'a FileRef),
    Audio(&'a FileRef),
    Video(&'a FileRef),
    Text(&'a str),
}

impl Message {
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn payload(&self) -> Payload<'_> {
        if !self.photo.is_empty() {
            Payload::Photo(&self.photo)
        } else if let Some(sticker) = &self.sticker {
            Payload::Sticker(sticker)
        } else if let Some(location) = self.location {
            Payload::Location(location)
        } else if let Some(document) = &self.document {
            Payload::Document(document)
        } else if let Some(audio) = &self.audio {
            Payload::Audio(audio)
        } else if let Some(video) = &self.video {
            Payload::Video(video)
        } else {
            Payload::Text(self.text())
        }
    }

    /// Plain text message from `chat_id`
    pub fn text_from(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            message_id: 0,
            chat: Chat { id: chat_id },
            text: Some(text.into()),
            photo: Vec::new(),
            sticker: None,
            location: None,
            document: None,
            audio: None,
            video: None,
        }
    }
}

/// Highest resolution variant. File size only breaks ties, since the API may omit it.
pub fn largest_photo(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes
        .iter()
        .max_by_key(|p| (p.width * p.height, p.file_size.unwrap_or(0)))
}

/// Content the bot sends to a chat
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Text(String),
    Photo { file_id: String },
    Sticker { file_id: String },
    Location { latitude: f64, longitude: f64 },
    Document { file_id: String },
    Audio { file_id: String },
    Video { file_id: String },
}

impl Outgoing {
    pub fn text(text: impl Into<String>) -> Self {
        Outgoing::Text(text.into())
    }

    /// Bot API method name
    pub fn method(&self) -> &'static str {
        match self {
            Outgoing::Text(_) => "sendMessage",
            Outgoing::Photo { .. } => "sendPhoto",
            Outgoing::Sticker { .. } => "sendSticker",
            Outgoing::Location { .. } => "sendLocation",
            Outgoing::Document { .. } => "sendDocument",
            Outgoing::Audio { .. } => "sendAudio",
            Outgoing::Video { .. } => "sendVideo",
        }
    }

    /// JSON body for [`Outgoing::method`]
    pub fn body(&self, chat_id: i64) -> serde_json::Value {
        use serde_json::json;

        match self {
            Outgoing::Text(text) => json!({ "chat_id": chat_id, "text": text }),
            Outgoing::Photo { file_id } => json!({ "chat_id": chat_id, "photo": file_id }),
            Outgoing::Sticker { file_id } => json!({ "chat_id": chat_id, "sticker": file_id }),
            Outgoing::Location {
                latitude,
                longitude,
            } => json!({ "chat_id": chat_id, "latitude": latitude, "longitude": longitude }),
            Outgoing::Document { file_id } => json!({ "chat_id": chat_id, "document": file_id }),
            Outgoing::Audio { file_id } => json!({ "chat_id": chat_id, "audio": file_id }),
            Outgoing::Video { file_id } => json!({ "chat_id": chat_id, "video": file_id }),
        }
    }
}
