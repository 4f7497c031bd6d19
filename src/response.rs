//! Push endpoint result codes and the response envelope.
//!
//! Every send answers with `{code, msg, requestId}`. The provider reports delivery
//! problems through `code`, so a non-success code is returned as data rather than
//! surfaced as an [`Error`](crate::Error).
//!
//! | Prefix   | Category                           |
//! |----------|------------------------------------|
//! | 800xxxxx | success                            |
//! | 801xxxxx | message content or parameter error |
//! | 802xxxxx | OAuth token error                  |
//! | 803xxxxx | permission or quota error          |
//! | 810xxxxx | provider internal error            |
//!
//! ## Example
//!
//! ```rust
//! use hms_push::response::{PushResponse, ResultCode};
//!
//! let resp: PushResponse =
//!     serde_json::from_str(r#"{"code":"80200003","msg":"token expired","requestId":"1"}"#).unwrap();
//! assert_eq!(resp.result_code(), Some(ResultCode::TokenTimeout));
//! assert!(resp.is_token_failure());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body returned by the push endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default, rename = "requestId")]
    pub request_id: String,
}

impl PushResponse {
    pub fn result_code(&self) -> Option<ResultCode> {
        ResultCode::from_code(&self.code)
    }

    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success.code()
    }

    /// Some tokens were accepted; `msg` lists the illegal ones.
    pub fn is_partial_success(&self) -> bool {
        self.code == ResultCode::PartialSuccess.code()
    }

    /// The access token was rejected or has expired. A fresh token may succeed.
    pub fn is_token_failure(&self) -> bool {
        self.result_code().map_or(false, |c| c.is_token_failure())
    }
}

/// Result codes documented for the send endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// 80000000
    Success,
    /// 80100000: tokens listed as illegal were not sent.
    PartialSuccess,
    /// 80100001
    ParameterError,
    /// 80100002: a synchronous message needs exactly one token.
    SingleTokenSync,
    /// 80100003
    IncorrectMessage,
    /// 80100004: expiration time is earlier than now.
    ExpireTime,
    /// 80100013
    CollapseKey,
    /// 80100016: the message contains sensitive content.
    MessageInsecure,
    /// 80200001: OAuth authentication error.
    TokenFailed,
    /// 80200003: OAuth token expired.
    TokenTimeout,
    /// 80300002: the app may not send push messages.
    NoPushPermission,
    /// 80300007
    AllTokensInvalid,
    /// 80300008
    BodyTooBig,
    /// 80300010
    TooManyTokens,
    /// 80300011: high-priority notifications are not authorized.
    HighPriorityNotAuthorized,
    /// 81000001
    InternalError,
}

impl ResultCode {
    /// The code string carried in [`PushResponse::code`].
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success => "80000000",
            Self::PartialSuccess => "80100000",
            Self::ParameterError => "80100001",
            Self::SingleTokenSync => "80100002",
            Self::IncorrectMessage => "80100003",
            Self::ExpireTime => "80100004",
            Self::CollapseKey => "80100013",
            Self::MessageInsecure => "80100016",
            Self::TokenFailed => "80200001",
            Self::TokenTimeout => "80200003",
            Self::NoPushPermission => "80300002",
            Self::AllTokensInvalid => "80300007",
            Self::BodyTooBig => "80300008",
            Self::TooManyTokens => "80300010",
            Self::HighPriorityNotAuthorized => "80300011",
            Self::InternalError => "81000001",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let rc = match code {
            "80000000" => Self::Success,
            "80100000" => Self::PartialSuccess,
            "80100001" => Self::ParameterError,
            "80100002" => Self::SingleTokenSync,
            "80100003" => Self::IncorrectMessage,
            "80100004" => Self::ExpireTime,
            "80100013" => Self::CollapseKey,
            "80100016" => Self::MessageInsecure,
            "80200001" => Self::TokenFailed,
            "80200003" => Self::TokenTimeout,
            "80300002" => Self::NoPushPermission,
            "80300007" => Self::AllTokensInvalid,
            "80300008" => Self::BodyTooBig,
            "80300010" => Self::TooManyTokens,
            "80300011" => Self::HighPriorityNotAuthorized,
            "81000001" => Self::InternalError,
            _ => return None,
        };
        Some(rc)
    }

    #[inline]
    pub fn is_token_failure(&self) -> bool {
        matches!(self, Self::TokenFailed | Self::TokenTimeout)
    }

    /// Short description of the code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialSuccess => "some tokens were sent successfully",
            Self::ParameterError => "invalid parameter",
            Self::SingleTokenSync => "a synchronous message must have exactly one token",
            Self::IncorrectMessage => "incorrect message structure",
            Self::ExpireTime => "message expiration time is earlier than the current time",
            Self::CollapseKey => "invalid collapse_key",
            Self::MessageInsecure => "message contains sensitive information",
            Self::TokenFailed => "OAuth authentication error",
            Self::TokenTimeout => "OAuth token expired",
            Self::NoPushPermission => "app has no permission to send push messages",
            Self::AllTokensInvalid => "all tokens are invalid",
            Self::BodyTooBig => "message body is too large",
            Self::TooManyTokens => "too many tokens in the message body",
            Self::HighPriorityNotAuthorized => "not authorized to send high-priority notifications",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
