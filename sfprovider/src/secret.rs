//! Bearer key handling that keeps the secret out of debug output.

use std::fmt::{Debug, Formatter};

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    value: String,
}

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}
