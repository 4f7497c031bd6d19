//! Message validation rules.
//!
//! Rules run in a fixed order and the first failure wins: target selection, then the
//! Android block, then the web push block.

use super::android::{AndroidConfig, AndroidNotification, ClickAction, ClickActionType, LightSettings, NotificationBarStyle};
use super::webpush::WebPushConfig;
use super::{non_empty, Message};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

const MAX_VIBRATE_ENTRIES: usize = 10;
const MAX_VIBRATE_DURATION: Duration = Duration::from_secs(60);
const COLLAPSE_KEY_RANGE: std::ops::RangeInclusive<i32> = -1..=100;

static COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("COLOR_PATTERN should compile"));

/// Why a message was rejected before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("exactly one of token, topic or condition must be specified")]
    InvalidTargetSelection,
    #[error("collapse_key must be in interval [-1 - 100]")]
    CollapseKeyOutOfRange,
    #[error("sound must not be empty when default_sound is false")]
    SoundEmpty,
    #[error("color must be in the form #RRGGBB")]
    ColorFormat,
    #[error("big_title must not be empty when style is 1")]
    BigTitleEmpty,
    #[error("big_body must not be empty when style is 1")]
    BigBodyEmpty,
    #[error("vibrate_timings can't be more than 10 elements")]
    VibrateTimingOverflow,
    #[error("vibrate_timings are more 60 seconds")]
    VibrateTimingDuration,
    #[error("light_settings.color can't be nil")]
    LightColorMissing,
    #[error("light_settings.light_on_duration and light_off_duration are required")]
    LightDurationMissing,
    #[error("click_action object must not be null")]
    ClickActionMissing,
    #[error("at least one of intent and action is not empty when type is 1")]
    IntentAndActionEmpty,
    #[error("url must not be empty when type is 2")]
    UrlEmpty,
    #[error("rich_resource must not be empty when type is 4")]
    RichResourceEmpty,
    #[error("click_action type must be in the interval [1 - 4], got {0}")]
    ClickActionType(i32),
    #[error("web common action can't be empty")]
    WebActionEmpty,
}

/// Check `message` against the provider's rules.
pub fn validate(message: &Message) -> Result<(), ValidationError> {
    if message.target().is_none() {
        return Err(ValidationError::InvalidTargetSelection);
    }
    if let Some(android) = &message.android {
        validate_android(android)?;
    }
    if let Some(webpush) = &message.webpush {
        validate_webpush(webpush)?;
    }
    Ok(())
}

fn validate_android(config: &AndroidConfig) -> Result<(), ValidationError> {
    if let Some(key) = config.collapse_key {
        if !COLLAPSE_KEY_RANGE.contains(&key) {
            return Err(ValidationError::CollapseKeyOutOfRange);
        }
    }
    match &config.notification {
        Some(notification) => validate_android_notification(notification),
        None => Ok(()),
    }
}

fn validate_android_notification(n: &AndroidNotification) -> Result<(), ValidationError> {
    if !n.default_sound && non_empty(&n.sound).is_none() {
        return Err(ValidationError::SoundEmpty);
    }

    if n.style == Some(NotificationBarStyle::BigText) {
        if non_empty(&n.big_title).is_none() {
            return Err(ValidationError::BigTitleEmpty);
        }
        if non_empty(&n.big_body).is_none() {
            return Err(ValidationError::BigBodyEmpty);
        }
    }

    validate_vibrate_config(&n.vibrate_config)?;

    if let Some(light) = &n.light_settings {
        validate_light_settings(light)?;
    }

    if let Some(color) = non_empty(&n.color) {
        if !COLOR_PATTERN.is_match(color) {
            return Err(ValidationError::ColorFormat);
        }
    }

    match &n.click_action {
        Some(action) => validate_click_action(action),
        None => Err(ValidationError::ClickActionMissing),
    }
}

fn validate_vibrate_config(timings: &[Duration]) -> Result<(), ValidationError> {
    if timings.len() > MAX_VIBRATE_ENTRIES {
        return Err(ValidationError::VibrateTimingOverflow);
    }
    if timings.iter().any(|d| *d > MAX_VIBRATE_DURATION) {
        return Err(ValidationError::VibrateTimingDuration);
    }
    Ok(())
}

fn validate_light_settings(light: &LightSettings) -> Result<(), ValidationError> {
    if light.color.is_none() {
        return Err(ValidationError::LightColorMissing);
    }
    if light.light_on_duration.is_none() || light.light_off_duration.is_none() {
        return Err(ValidationError::LightDurationMissing);
    }
    Ok(())
}

fn validate_click_action(action: &ClickAction) -> Result<(), ValidationError> {
    match action.action_type {
        ClickActionType::IntentOrAction => {
            if non_empty(&action.intent).is_none() && non_empty(&action.action).is_none() {
                return Err(ValidationError::IntentAndActionEmpty);
            }
        }
        ClickActionType::Url => {
            if non_empty(&action.url).is_none() {
                return Err(ValidationError::UrlEmpty);
            }
        }
        ClickActionType::App => {}
        ClickActionType::RichResource => {
            if non_empty(&action.rich_resource).is_none() {
                return Err(ValidationError::RichResourceEmpty);
            }
        }
        ClickActionType::Unknown(code) => return Err(ValidationError::ClickActionType(code)),
    }
    Ok(())
}

fn validate_webpush(config: &WebPushConfig) -> Result<(), ValidationError> {
    if let Some(notification) = &config.notification {
        if notification.actions.iter().any(|a| a.action.is_empty()) {
            return Err(ValidationError::WebActionEmpty);
        }
    }
    Ok(())
}
