//! JSON body of a send request.
//!
//! The domain model carries typed enums and `Duration`s; these borrowed structs map them to
//! the provider's field names and value formats. Unset optionals, empty lists and `false`
//! flags are left out of the body.

use super::{
    non_empty, AndroidConfig, AndroidNotification, BadgeNotification, ClickAction, Color, LightSettings,
    Message, Notification, PushMessage, WebPushAction, WebPushConfig, WebPushHeaders, WebPushNotification,
};
use serde::Serialize;
use std::time::Duration;

/// Longest duration the provider accepts (15 days).
pub const MAX_DURATION: Duration = Duration::from_secs(1_296_000);

/// Serialize a push message to the request body.
pub fn encode(msg: &PushMessage) -> crate::Result<Vec<u8>> {
    let body = WireRequest::from(msg);
    Ok(serde_json::to_vec(&body)?)
}

/// Format a duration as `"<seconds>S"`, capped at [`MAX_DURATION`].
///
/// Fractions keep up to nine digits with trailing zeros removed, so 3.5 s is `"3.5S"`.
pub fn encode_duration(duration: Duration) -> String {
    let duration = duration.min(MAX_DURATION);
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        return format!("{}S", secs);
    }
    let fraction = format!("{:09}", nanos);
    format!("{}.{}S", secs, fraction.trim_end_matches('0'))
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_empty_slice<T>(value: &&[T]) -> bool {
    value.is_empty()
}

#[derive(Serialize)]
struct WireRequest<'a> {
    validate_only: bool,
    message: WireMessage<'a>,
}

impl<'a> From<&'a PushMessage> for WireRequest<'a> {
    fn from(msg: &'a PushMessage) -> Self {
        Self {
            validate_only: msg.validate_only,
            message: WireMessage::from(&msg.message),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<WireNotification<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<WireAndroidConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apns: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webpush: Option<WireWebPushConfig<'a>>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    token: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<&'a str>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(m: &'a Message) -> Self {
        Self {
            data: non_empty(&m.data),
            notification: m.notification.as_ref().map(WireNotification::from),
            android: m.android.as_ref().map(WireAndroidConfig::from),
            apns: m.apns.as_ref(),
            webpush: m.webpush.as_ref().map(WireWebPushConfig::from),
            token: &m.token,
            topic: non_empty(&m.topic),
            condition: non_empty(&m.condition),
        }
    }
}

#[derive(Serialize)]
struct WireNotification<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> From<&'a Notification> for WireNotification<'a> {
    fn from(n: &'a Notification) -> Self {
        Self {
            title: non_empty(&n.title),
            body: non_empty(&n.body),
            image: non_empty(&n.image),
        }
    }
}

#[derive(Serialize)]
struct WireAndroidConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    collapse_key: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgency: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bi_tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fast_app_target: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<WireAndroidNotification<'a>>,
}

impl<'a> From<&'a AndroidConfig> for WireAndroidConfig<'a> {
    fn from(c: &'a AndroidConfig) -> Self {
        Self {
            collapse_key: c.collapse_key,
            urgency: c.urgency.map(|u| u.as_wire()),
            category: non_empty(&c.category),
            ttl: c.ttl.map(encode_duration),
            bi_tag: non_empty(&c.bi_tag),
            fast_app_target: c.fast_app_target.map(|s| s.code()),
            data: non_empty(&c.data),
            notification: c.notification.as_ref().map(WireAndroidNotification::from),
        }
    }
}

#[derive(Serialize)]
struct WireAndroidNotification<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    default_sound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    click_action: Option<WireClickAction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_loc_key: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    body_loc_args: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    title_loc_key: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    title_loc_args: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    multi_lang_key: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify_summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    big_title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    big_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_clear: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<WireBadge<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ticker: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    auto_cancel: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    importance: Option<&'static str>,
    #[serde(skip_serializing_if = "is_false")]
    use_default_vibrate: bool,
    #[serde(skip_serializing_if = "is_false")]
    use_default_light: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vibrate_config: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    light_settings: Option<WireLightSettings>,
    #[serde(skip_serializing_if = "is_false")]
    foreground_show: bool,
}

impl<'a> From<&'a AndroidNotification> for WireAndroidNotification<'a> {
    fn from(n: &'a AndroidNotification) -> Self {
        Self {
            title: non_empty(&n.title),
            body: non_empty(&n.body),
            icon: non_empty(&n.icon),
            color: non_empty(&n.color),
            sound: non_empty(&n.sound),
            default_sound: n.default_sound,
            tag: non_empty(&n.tag),
            click_action: n.click_action.as_ref().map(WireClickAction::from),
            body_loc_key: non_empty(&n.body_loc_key),
            body_loc_args: &n.body_loc_args,
            title_loc_key: non_empty(&n.title_loc_key),
            title_loc_args: &n.title_loc_args,
            multi_lang_key: n.multi_lang_key.as_ref(),
            channel_id: non_empty(&n.channel_id),
            notify_summary: non_empty(&n.notify_summary),
            image: non_empty(&n.image),
            style: n.style.map(|s| s.code()),
            big_title: non_empty(&n.big_title),
            big_body: non_empty(&n.big_body),
            auto_clear: n.auto_clear,
            notify_id: n.notify_id,
            group: non_empty(&n.group),
            badge: n.badge.as_ref().map(WireBadge::from),
            ticker: non_empty(&n.ticker),
            auto_cancel: n.auto_cancel,
            when: non_empty(&n.when),
            importance: n.importance.map(|i| i.as_wire()),
            use_default_vibrate: n.use_default_vibrate,
            use_default_light: n.use_default_light,
            vibrate_config: n.vibrate_config.iter().copied().map(encode_duration).collect(),
            visibility: n.visibility.map(|v| v.as_wire()),
            light_settings: n.light_settings.as_ref().map(WireLightSettings::from),
            foreground_show: n.foreground_show,
        }
    }
}

#[derive(Serialize)]
struct WireClickAction<'a> {
    #[serde(rename = "type")]
    action_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    intent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rich_resource: Option<&'a str>,
}

impl<'a> From<&'a ClickAction> for WireClickAction<'a> {
    fn from(c: &'a ClickAction) -> Self {
        Self {
            action_type: c.action_type.code(),
            intent: non_empty(&c.intent),
            action: non_empty(&c.action),
            url: non_empty(&c.url),
            rich_resource: non_empty(&c.rich_resource),
        }
    }
}

#[derive(Serialize)]
struct WireBadge<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    add_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    set_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<&'a str>,
}

impl<'a> From<&'a BadgeNotification> for WireBadge<'a> {
    fn from(b: &'a BadgeNotification) -> Self {
        Self {
            add_num: b.add_num,
            set_num: b.set_num,
            class: non_empty(&b.class),
        }
    }
}

#[derive(Serialize)]
struct WireLightSettings {
    color: Option<WireColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    light_on_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    light_off_duration: Option<String>,
}

impl From<&LightSettings> for WireLightSettings {
    fn from(l: &LightSettings) -> Self {
        Self {
            color: l.color.as_ref().map(WireColor::from),
            light_on_duration: l.light_on_duration.map(encode_duration),
            light_off_duration: l.light_off_duration.map(encode_duration),
        }
    }
}

#[derive(Serialize)]
struct WireColor {
    alpha: f32,
    red: f32,
    green: f32,
    blue: f32,
}

impl From<&Color> for WireColor {
    fn from(c: &Color) -> Self {
        Self {
            alpha: c.alpha,
            red: c.red,
            green: c.green,
            blue: c.blue,
        }
    }
}

#[derive(Serialize)]
struct WireWebPushConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<WireWebPushHeaders<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<WireWebPushNotification<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hms_options: Option<WireHmsOptions<'a>>,
}

impl<'a> From<&'a WebPushConfig> for WireWebPushConfig<'a> {
    fn from(c: &'a WebPushConfig) -> Self {
        Self {
            headers: c.headers.as_ref().map(WireWebPushHeaders::from),
            notification: c.notification.as_ref().map(WireWebPushNotification::from),
            hms_options: c.hms_options.as_ref().map(|o| WireHmsOptions {
                link: non_empty(&o.link),
            }),
        }
    }
}

#[derive(Serialize)]
struct WireWebPushHeaders<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
    #[serde(rename = "topics", skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urgency: Option<&'static str>,
}

impl<'a> From<&'a WebPushHeaders> for WireWebPushHeaders<'a> {
    fn from(h: &'a WebPushHeaders) -> Self {
        Self {
            ttl: h.ttl.map(encode_duration),
            topic: non_empty(&h.topic),
            urgency: h.urgency.map(|u| u.as_wire()),
        }
    }
}

#[derive(Serialize)]
struct WireHmsOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
}

#[derive(Serialize)]
struct WireWebPushNotification<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dir: Option<&'static str>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    vibrate: &'a [u32],
    #[serde(skip_serializing_if = "is_false")]
    renotify: bool,
    #[serde(skip_serializing_if = "is_false")]
    require_interaction: bool,
    #[serde(skip_serializing_if = "is_false")]
    silent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actions: Vec<WireWebPushAction<'a>>,
}

impl<'a> From<&'a WebPushNotification> for WireWebPushNotification<'a> {
    fn from(n: &'a WebPushNotification) -> Self {
        Self {
            title: non_empty(&n.title),
            body: non_empty(&n.body),
            icon: non_empty(&n.icon),
            image: non_empty(&n.image),
            lang: non_empty(&n.lang),
            tag: non_empty(&n.tag),
            badge: non_empty(&n.badge),
            dir: n.dir.map(|d| d.as_wire()),
            vibrate: &n.vibrate,
            renotify: n.renotify,
            require_interaction: n.require_interaction,
            silent: n.silent,
            timestamp: n.timestamp,
            actions: n.actions.iter().map(WireWebPushAction::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct WireWebPushAction<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

impl<'a> From<&'a WebPushAction> for WireWebPushAction<'a> {
    fn from(a: &'a WebPushAction) -> Self {
        Self {
            action: &a.action,
            icon: non_empty(&a.icon),
            title: non_empty(&a.title),
        }
    }
}
