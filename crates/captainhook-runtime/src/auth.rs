use subtle::ConstantTimeEq;

use crate::error::HookError;
use crate::runbook::RunBook;

/// Token gates applied after the network allow-list.
///
/// Both gates are optional: the process-wide static token is checked first
/// when configured, then the RunBook's own `auth` token when non-empty.
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    static_token: Option<String>,
}

impl Authorizer {
    pub fn new(static_token: Option<String>) -> Self {
        Self {
            static_token: static_token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_static(&self) -> bool {
        self.static_token.is_some()
    }

    pub fn authorize(&self, runbook: &RunBook, presented: Option<&str>) -> Result<(), HookError> {
        if let Some(expected) = &self.static_token {
            if !token_matches(expected, presented) {
                return Err(HookError::Unauthorized);
            }
        }
        if !runbook.auth_token.is_empty() && !token_matches(&runbook.auth_token, presented) {
            return Err(HookError::Unauthorized);
        }
        Ok(())
    }
}

fn token_matches(expected: &str, presented: Option<&str>) -> bool {
    match presented {
        Some(token) => token.as_bytes().ct_eq(expected.as_bytes()).into(),
        None => false,
    }
}
