//! Android message control (`message.android`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default offline cache time applied by [`AndroidConfig::with_defaults`].
pub const DEFAULT_ANDROID_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AndroidConfig {
    /// Offline cache mode: `0` keeps only the latest message, `-1` keeps all,
    /// `1..=100` keeps the latest message per group.
    pub collapse_key: Option<i32>,
    /// Delivery priority of a data message.
    pub urgency: Option<DeliveryUrgency>,
    /// High-priority data message scenario (e.g. `PLAY_VOICE`).
    pub category: Option<String>,
    /// How long the provider caches the message for an offline device.
    pub ttl: Option<Duration>,
    /// Tag returned in delivery receipts.
    pub bi_tag: Option<String>,
    /// Quick app state for data messages.
    pub fast_app_target: Option<FastAppState>,
    /// Overrides `message.data` when set.
    pub data: Option<String>,
    pub notification: Option<AndroidNotification>,
}

impl AndroidConfig {
    /// Normal delivery urgency and a one day TTL.
    pub fn with_defaults() -> Self {
        Self {
            urgency: Some(DeliveryUrgency::Normal),
            ttl: Some(DEFAULT_ANDROID_TTL),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AndroidNotification {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Small icon under `/res/raw`, e.g. `/raw/ic_launcher`.
    pub icon: Option<String>,
    /// `#RRGGBB`.
    pub color: Option<String>,
    /// Ringtone under `/res/raw`. Required unless `default_sound` is set.
    pub sound: Option<String>,
    pub default_sound: bool,
    pub tag: Option<String>,
    pub click_action: Option<ClickAction>,
    pub body_loc_key: Option<String>,
    pub body_loc_args: Vec<String>,
    pub title_loc_key: Option<String>,
    pub title_loc_args: Vec<String>,
    pub multi_lang_key: Option<serde_json::Value>,
    pub channel_id: Option<String>,
    pub notify_summary: Option<String>,
    pub image: Option<String>,
    pub style: Option<NotificationBarStyle>,
    /// Required with [`NotificationBarStyle::BigText`].
    pub big_title: Option<String>,
    /// Required with [`NotificationBarStyle::BigText`].
    pub big_body: Option<String>,
    /// Display duration in milliseconds.
    pub auto_clear: Option<u32>,
    pub notify_id: Option<i32>,
    pub group: Option<String>,
    pub badge: Option<BadgeNotification>,
    pub ticker: Option<String>,
    pub auto_cancel: bool,
    /// RFC 3339 timestamp used to sort notifications.
    pub when: Option<String>,
    pub importance: Option<Importance>,
    pub use_default_vibrate: bool,
    pub use_default_light: bool,
    /// Up to ten entries of at most sixty seconds each.
    pub vibrate_config: Vec<Duration>,
    pub visibility: Option<Visibility>,
    pub light_settings: Option<LightSettings>,
    pub foreground_show: bool,
}

impl AndroidNotification {
    /// Default sound, vibration and light, private visibility, and a click action
    /// that opens the app through a custom action.
    pub fn with_defaults() -> Self {
        Self {
            default_sound: true,
            importance: Some(Importance::Normal),
            click_action: Some(ClickAction::action("Action")),
            use_default_vibrate: true,
            use_default_light: true,
            visibility: Some(Visibility::Private),
            foreground_show: true,
            auto_cancel: true,
            ..Default::default()
        }
    }
}

/// What happens when the user taps the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickAction {
    pub action_type: ClickActionType,
    /// App page to open (type 1).
    pub intent: Option<String>,
    /// Activity action to open (type 1).
    pub action: Option<String>,
    /// HTTPS URL to open (type 2).
    pub url: Option<String>,
    /// Rich media package URL (type 4).
    pub rich_resource: Option<String>,
}

impl ClickAction {
    fn of_type(action_type: ClickActionType) -> Self {
        Self {
            action_type,
            intent: None,
            action: None,
            url: None,
            rich_resource: None,
        }
    }

    pub fn intent(intent: impl Into<String>) -> Self {
        Self {
            intent: Some(intent.into()),
            ..Self::of_type(ClickActionType::IntentOrAction)
        }
    }

    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::of_type(ClickActionType::IntentOrAction)
        }
    }

    pub fn open_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::of_type(ClickActionType::Url)
        }
    }

    pub fn open_app() -> Self {
        Self::of_type(ClickActionType::App)
    }

    pub fn rich_resource(resource: impl Into<String>) -> Self {
        Self {
            rich_resource: Some(resource.into()),
            ..Self::of_type(ClickActionType::RichResource)
        }
    }
}

/// Click action type. Codes outside 1..=4 are kept as [`ClickActionType::Unknown`]
/// and rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickActionType {
    IntentOrAction,
    Url,
    App,
    RichResource,
    Unknown(i32),
}

impl ClickActionType {
    pub fn code(&self) -> i32 {
        match self {
            ClickActionType::IntentOrAction => 1,
            ClickActionType::Url => 2,
            ClickActionType::App => 3,
            ClickActionType::RichResource => 4,
            ClickActionType::Unknown(code) => *code,
        }
    }
}

impl From<i32> for ClickActionType {
    fn from(code: i32) -> Self {
        match code {
            1 => ClickActionType::IntentOrAction,
            2 => ClickActionType::Url,
            3 => ClickActionType::App,
            4 => ClickActionType::RichResource,
            other => ClickActionType::Unknown(other),
        }
    }
}

/// Notification bar style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationBarStyle {
    Default,
    BigText,
    Inbox,
}

impl NotificationBarStyle {
    pub fn code(&self) -> i32 {
        match self {
            NotificationBarStyle::Default => 0,
            NotificationBarStyle::BigText => 1,
            NotificationBarStyle::Inbox => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(NotificationBarStyle::Default),
            1 => Some(NotificationBarStyle::BigText),
            3 => Some(NotificationBarStyle::Inbox),
            _ => None,
        }
    }
}

/// Quick app state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FastAppState {
    Develop,
    Product,
}

impl FastAppState {
    pub fn code(&self) -> i32 {
        match self {
            FastAppState::Develop => 1,
            FastAppState::Product => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeNotification {
    /// Increment, 1..=99.
    pub add_num: Option<u32>,
    /// Absolute value, 0..=99. Wins over `add_num`.
    pub set_num: Option<u32>,
    /// Entry activity, e.g. `com.example.MainActivity`.
    pub class: Option<String>,
}

/// Breathing light.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSettings {
    pub color: Option<Color>,
    pub light_on_duration: Option<Duration>,
    pub light_off_duration: Option<Duration>,
}

/// RGBA colour, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub alpha: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            red: 0.0,
            green: 0.0,
            blue: 0.0,
        }
    }
}

/// Delivery priority of a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryUrgency {
    High,
    Normal,
}

impl DeliveryUrgency {
    pub fn as_wire(&self) -> &'static str {
        match self {
            DeliveryUrgency::High => "HIGH",
            DeliveryUrgency::Normal => "NORMAL",
        }
    }
}

impl FromStr for DeliveryUrgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(DeliveryUrgency::High),
            "NORMAL" => Ok(DeliveryUrgency::Normal),
            _ => Err(format!("invalid delivery priority type: {:?}", s)),
        }
    }
}

/// Notification importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Importance {
    High,
    Normal,
    Low,
}

impl Importance {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Importance::High => "HIGH",
            Importance::Normal => "NORMAL",
            Importance::Low => "LOW",
        }
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Importance::High),
            "NORMAL" => Ok(Importance::Normal),
            "LOW" => Ok(Importance::Low),
            _ => Err(format!("invalid notification priority type: {:?}", s)),
        }
    }
}

/// Lock-screen visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Unspecified,
    Private,
    Public,
    Secret,
}

impl Visibility {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Visibility::Unspecified => "VISIBILITY_UNSPECIFIED",
            Visibility::Private => "PRIVATE",
            Visibility::Public => "PUBLIC",
            Visibility::Secret => "SECRET",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Visibility {
    type Err = String;

    /// An empty string is rejected rather than defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VISIBILITY_UNSPECIFIED" => Ok(Visibility::Unspecified),
            "PRIVATE" => Ok(Visibility::Private),
            "PUBLIC" => Ok(Visibility::Public),
            "SECRET" => Ok(Visibility::Secret),
            _ => Err(format!("invalid visibility type: {:?}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_action_codes() {
        for code in 1..=4 {
            assert_eq!(ClickActionType::from(code).code(), code);
        }
        assert_eq!(ClickActionType::from(7), ClickActionType::Unknown(7));
        assert_eq!(ClickActionType::Unknown(0).code(), 0);
    }

    #[test]
    fn test_bar_style_codes() {
        assert_eq!(NotificationBarStyle::BigText.code(), 1);
        assert_eq!(NotificationBarStyle::Inbox.code(), 3);
        assert_eq!(NotificationBarStyle::from_code(2), None);
        assert_eq!(
            NotificationBarStyle::from_code(0),
            Some(NotificationBarStyle::Default)
        );
    }

    #[test]
    fn test_visibility_parsing_is_strict() {
        assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
        assert!("".parse::<Visibility>().is_err());
        assert!("public".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_defaults() {
        let cfg = AndroidConfig::with_defaults();
        assert_eq!(cfg.ttl, Some(Duration::from_secs(86_400)));
        assert!(cfg.notification.is_none());
        assert_eq!(Color::default().alpha, 1.0);
    }
}
