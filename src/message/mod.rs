//! Push message model.
//!
//! A [`PushMessage`] wraps a [`Message`]: a target selector (device tokens, a topic, or a
//! topic condition) plus optional platform sub-configs. Nothing here knows about JSON;
//! [`wire`] maps the model to the provider's body and [`validate()`] checks it first.

mod android;
mod validate;
mod webpush;
pub mod wire;

pub use android::{
    AndroidConfig, AndroidNotification, BadgeNotification, ClickAction, ClickActionType, Color,
    DeliveryUrgency, FastAppState, Importance, LightSettings, NotificationBarStyle, Visibility,
};
pub use validate::{validate, ValidationError};
pub use webpush::{
    HmsWebPushOption, TextDirection, WebPushAction, WebPushConfig, WebPushHeaders,
    WebPushNotification, WebUrgency,
};

/// Request envelope sent to the push endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushMessage {
    /// When true the provider only checks the message; nothing reaches devices.
    pub validate_only: bool,
    pub message: Message,
}

impl PushMessage {
    pub fn new(message: Message) -> Self {
        Self {
            validate_only: false,
            message,
        }
    }

    /// A notification message with a title, a body and no target yet.
    pub fn notification(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Message {
            notification: Some(Notification {
                title: Some(title.into()),
                body: Some(body.into()),
                image: None,
            }),
            ..Default::default()
        })
    }

    /// A ready-to-send Android notification to `tokens`, using the default Android
    /// config and notification settings.
    pub fn android_notification(tokens: Vec<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        let mut msg = Self::notification(title, body);
        let mut android = AndroidConfig::with_defaults();
        android.notification = Some(AndroidNotification::with_defaults());
        msg.message.token = tokens;
        msg.message.android = Some(android);
        msg
    }

    pub fn dry_run(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.message)
    }

    /// Serialize to the provider's JSON body.
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        wire::encode(self)
    }
}

/// Message payload and routing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    /// Custom payload, plain text or a JSON string. Without any notification block the
    /// message is delivered as a data message.
    pub data: Option<String>,
    pub notification: Option<Notification>,
    pub android: Option<AndroidConfig>,
    /// iOS control block, passed through untouched.
    pub apns: Option<serde_json::Value>,
    pub webpush: Option<WebPushConfig>,
    /// Device push tokens.
    pub token: Vec<String>,
    pub topic: Option<String>,
    /// Topic expression, e.g. `'TopicA' in topics && ('TopicB' in topics || 'TopicC' in topics)`.
    pub condition: Option<String>,
}

impl Message {
    pub fn to_tokens(mut self, tokens: Vec<String>) -> Self {
        self.token = tokens;
        self
    }

    pub fn to_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn to_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// The selected target, if exactly one is set.
    pub fn target(&self) -> Option<Target<'_>> {
        let mut selected = None;
        let mut count = 0;
        if !self.token.is_empty() {
            count += 1;
            selected = Some(Target::Tokens(&self.token));
        }
        if let Some(topic) = non_empty(&self.topic) {
            count += 1;
            selected = Some(Target::Topic(topic));
        }
        if let Some(condition) = non_empty(&self.condition) {
            count += 1;
            selected = Some(Target::Condition(condition));
        }
        if count == 1 {
            selected
        } else {
            None
        }
    }
}

/// Who a message is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Tokens(&'a [String]),
    Topic(&'a str),
    Condition(&'a str),
}

/// Cross-platform notification content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub title: Option<String>,
    pub body: Option<String>,
    /// HTTPS URL of the large icon.
    pub image: Option<String>,
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
