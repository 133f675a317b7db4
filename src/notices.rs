//! Texts the bot sends to users.

use chrono::{DateTime, Utc};

pub const WELCOME: &str = "Welcome! Nice to meet you! I will try to match you with interesting people!

To get started enter:

/start

If you're bored of a conversation, type:

/bye

If you want another chat partner, type /start again after typing /bye!

Have fun,

StrangerBot!";

pub const HELP: &str = "Help:

Use /start to start looking for a conversational partner, once you're matched you can use /end to end the conversation.

Use /report to report a user, use it as follows:
/report <reason>

Use /nopics to stop receiving photos, and /nopics again to receive them again.";

pub const SEARCHING: &str = "Looking for a stranger to match you with... Hold on!";
pub const ENDING: &str = "We're ending the conversation...";
pub const MATCHED: &str = "You have been matched, have fun!";
pub const PARTNER_LEFT: &str = "Your conversation partner left the chat";
pub const CONVERSATION_OVER: &str = "Your conversation is over, I hope you enjoyed it :)";
pub const START_AGAIN: &str = "Type /start to get matched with a new partner";

pub const REPORT_USAGE: &str = "Usage /report: /report <reason>";
pub const REPORTED: &str = "User has been reported!";

pub const PICTURES_DISABLED: &str = "Strangers won't be able to send you photos anymore!";
pub const PICTURES_ENABLED: &str = "Strangers can now send you photos!";
pub const PHOTO_BLOCKED_FOR_PARTNER: &str =
    "Stranger tried to send you a photo, but you disabled this, you can enable photos by using the /nopics command";
pub const PHOTO_BLOCKED_FOR_SENDER: &str =
    "Stranger disabled photos, and will not receive your photos";

pub const INCOMING_PHOTO: &str = "Stranger sends you a photo!";
pub const INCOMING_STICKER: &str = "Stranger sends you a sticker!";
pub const INCOMING_LOCATION: &str = "Stranger sends you a location!";
pub const INCOMING_DOCUMENT: &str = "Stranger sends you a document!";
pub const INCOMING_AUDIO: &str = "Stranger sends you an audio file!";
pub const INCOMING_VIDEO: &str = "Stranger sends you a video file!";

/// Label put in front of relayed text
pub const STRANGER_PREFIX: &str = "Stranger: ";

pub fn banned_until(until: DateTime<Utc>) -> String {
    format!("You are banned until {}", until.format("%d %B %Y"))
}

pub fn relayed_text(text: &str) -> String {
    format!("{}{}", STRANGER_PREFIX, text)
}
