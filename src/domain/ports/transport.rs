use std::fmt::Debug;

use crate::domain::models::{CallerId, ChannelId};

/// Transport envelope of the incoming message.
///
/// The core never inspects the payload shape; it only asks the envelope for
/// the identifiers it can derive.
pub trait Transport: Send + Sync + Debug {
    fn caller_id(&self) -> Option<CallerId>;

    fn channel_id(&self) -> Option<ChannelId>;

    fn username(&self) -> Option<String> {
        None
    }
}

/// Plain envelope for chat transports and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatEnvelope {
    pub caller_id: Option<CallerId>,
    pub channel_id: Option<ChannelId>,
    pub username: Option<String>,
    /// Transport-specific reply target, carried untouched.
    pub reply_target: Option<serde_json::Value>,
}

impl ChatEnvelope {
    pub fn new(caller_id: CallerId, channel_id: ChannelId) -> Self {
        Self {
            caller_id: Some(caller_id),
            channel_id: Some(channel_id),
            username: None,
            reply_target: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_reply_target(mut self, target: serde_json::Value) -> Self {
        self.reply_target = Some(target);
        self
    }
}

impl Transport for ChatEnvelope {
    fn caller_id(&self) -> Option<CallerId> {
        self.caller_id
    }

    fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
    }

    fn username(&self) -> Option<String> {
        self.username.clone()
    }
}
