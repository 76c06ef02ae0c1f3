use std::fmt;

use crate::status_code::{code_name, status_code_t};

/// Failure reported by an engine: a numeric code plus an optional message,
/// usually the underlying library's error text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Status {
    code: status_code_t,
    message: Option<String>,
}

impl Status {
    pub fn new(code: status_code_t) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: status_code_t, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(msg.into()),
        }
    }

    pub fn code(&self) -> status_code_t {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Renders as `Name(code)` or `Name(code) message`.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", code_name(self.code), self.code)?;
        if let Some(msg) = &self.message {
            write!(f, " {}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}
