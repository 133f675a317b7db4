//! Messages passed between workers over the bounded queues.

/// "This chat may be searching, try to pair it"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchJob {
    pub chat_id: i64,
}

/// "End whatever conversation or search this chat is in"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndConversationJob {
    pub chat_id: i64,
}
