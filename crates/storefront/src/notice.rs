//! User-visible confirmations and failures.

use std::fmt;

use serde::Serialize;

use crate::checkout::{CheckoutError, CheckoutReceipt};
use crate::error::{AppError, ErrorPayload};

/// Message shown after a successful checkout.
pub const CHECKOUT_SUCCESS: &str = "Booking completed successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// One toast-style notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }
}

impl From<&ErrorPayload> for Notice {
    fn from(payload: &ErrorPayload) -> Self {
        Self::error(payload.message.clone())
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Self::from(&err.payload())
    }
}

impl From<&CheckoutError> for Notice {
    fn from(err: &CheckoutError) -> Self {
        Self::from(&err.payload())
    }
}

impl From<&CheckoutReceipt> for Notice {
    fn from(_: &CheckoutReceipt) -> Self {
        Self::success(CHECKOUT_SUCCESS)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Error => "✗",
            NoticeLevel::Info => "•",
        };
        write!(f, "{marker} {}", self.message)
    }
}
