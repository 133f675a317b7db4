use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::commands::{CommandContext, CommandHandler};
use crate::models::User;
use crate::notices;
use crate::transport::{largest_photo, Message, Outgoing, Payload};

/// Forwards anything a matched user sends to their partner.
///
/// Claims every message from a matched user, so it must stay last in the chain.
pub struct Relay;

impl Relay {
    /// Announcement and content for the partner, `None` if the payload
    /// cannot be forwarded.
    fn forward(payload: Payload<'_>) -> Option<(Option<&'static str>, Outgoing)> {
        let forward = match payload {
            Payload::Photo(sizes) => {
                let photo = largest_photo(sizes)?;
                (
                    Some(notices::INCOMING_PHOTO),
                    Outgoing::Photo {
                        file_id: photo.file_id.clone(),
                    },
                )
            }
            Payload::Sticker(file) => (
                Some(notices::INCOMING_STICKER),
                Outgoing::Sticker {
                    file_id: file.file_id.clone(),
                },
            ),
            Payload::Location(location) => (
                Some(notices::INCOMING_LOCATION),
                Outgoing::Location {
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            ),
            Payload::Document(file) => (
                Some(notices::INCOMING_DOCUMENT),
                Outgoing::Document {
                    file_id: file.file_id.clone(),
                },
            ),
            Payload::Audio(file) => (
                Some(notices::INCOMING_AUDIO),
                Outgoing::Audio {
                    file_id: file.file_id.clone(),
                },
            ),
            Payload::Video(file) => (
                Some(notices::INCOMING_VIDEO),
                Outgoing::Video {
                    file_id: file.file_id.clone(),
                },
            ),
            // Voice notes, contacts and other kinds we do not forward arrive without text
            Payload::Text("") => return None,
            Payload::Text(text) => (None, Outgoing::Text(notices::relayed_text(text))),
        };

        Some(forward)
    }
}

#[async_trait]
impl CommandHandler for Relay {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn try_handle(&self, ctx: &CommandContext, user: &User, message: &Message) -> bool {
        let Some(partner_chat_id) = user.state().partner() else {
            return false;
        };

        let partner = match ctx.users.find_by_chat_id(partner_chat_id).await {
            Ok(Some(partner)) => partner,
            Ok(None) => {
                error!("Could not retrieve partner {}: no such user", partner_chat_id);
                return false;
            }
            Err(e) => {
                error!("Could not retrieve partner {}: {}", partner_chat_id, e);
                return false;
            }
        };

        let payload = message.payload();

        if matches!(payload, Payload::Photo(_)) && !partner.allow_pictures {
            ctx.messenger
                .notify(partner.chat_id, notices::PHOTO_BLOCKED_FOR_PARTNER)
                .await;
            ctx.messenger
                .notify(user.chat_id, notices::PHOTO_BLOCKED_FOR_SENDER)
                .await;
            return true;
        }

        let Some((announcement, content)) = Self::forward(payload) else {
            debug!("Nothing to relay in message {} from chat {}", message.message_id, user.chat_id);
            return true;
        };

        if let Some(announcement) = announcement {
            ctx.messenger.notify(partner.chat_id, announcement).await;
        }

        if let Err(e) = ctx.messenger.send(partner.chat_id, &content).await {
            warn!("Forward error: {}", e);
        }

        true
    }
}
