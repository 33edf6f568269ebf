use std::str::FromStr;

use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// Severity of a one-shot notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        }
    }
}

impl FromStr for NoticeLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(NoticeLevel::Success),
            "info" => Ok(NoticeLevel::Info),
            "error" => Ok(NoticeLevel::Error),
            _ => Err(()),
        }
    }
}

/// Message shown once on the page after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// A rendered page: its data plus the pending notices.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub data: T,
    pub messages: Vec<Notice>,
}

impl<T: Serialize> Page<T> {
    pub fn with_notices(data: T, messages: Vec<Notice>) -> Self {
        Self { data, messages }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}
