//! Web app push control (`message.webpush`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebPushConfig {
    pub headers: Option<WebPushHeaders>,
    pub notification: Option<WebPushNotification>,
    pub hms_options: Option<HmsWebPushOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebPushHeaders {
    /// Cache time on the push service.
    pub ttl: Option<Duration>,
    /// Message id used to replace an undelivered message.
    pub topic: Option<String>,
    pub urgency: Option<WebUrgency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HmsWebPushOption {
    /// Default URL opened when no action is taken.
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebPushNotification {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
    pub lang: Option<String>,
    pub tag: Option<String>,
    pub badge: Option<String>,
    pub dir: Option<TextDirection>,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    pub renotify: bool,
    pub require_interaction: bool,
    pub silent: bool,
    /// Unix seconds.
    pub timestamp: Option<i64>,
    pub actions: Vec<WebPushAction>,
}

impl WebPushNotification {
    /// Silent, auto text direction, stamped with the current time.
    pub fn with_defaults() -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .ok();
        Self {
            dir: Some(TextDirection::Auto),
            silent: true,
            timestamp,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebPushAction {
    /// Action name. Must not be empty.
    pub action: String,
    pub icon: Option<String>,
    pub title: Option<String>,
}

impl WebPushAction {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebUrgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl WebUrgency {
    pub fn as_wire(&self) -> &'static str {
        match self {
            WebUrgency::VeryLow => "very-low",
            WebUrgency::Low => "low",
            WebUrgency::Normal => "normal",
            WebUrgency::High => "high",
        }
    }
}

impl FromStr for WebUrgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very-low" => Ok(WebUrgency::VeryLow),
            "low" => Ok(WebUrgency::Low),
            "normal" => Ok(WebUrgency::Normal),
            "high" => Ok(WebUrgency::High),
            _ => Err(format!("invalid urgency type: {:?}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextDirection {
    Auto,
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_wire(&self) -> &'static str {
        match self {
            TextDirection::Auto => "auto",
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for TextDirection {
    type Err = String;

    /// Only `auto`, `ltr` and `rtl`; an empty direction is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(TextDirection::Auto),
            "ltr" => Ok(TextDirection::Ltr),
            "rtl" => Ok(TextDirection::Rtl),
            _ => Err(format!("invalid text direction type: {:?}", s)),
        }
    }
}
