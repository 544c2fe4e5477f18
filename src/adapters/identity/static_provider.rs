//! Identity provider with a fixed answer.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::IdentityProvider;

/// Reports a fixed user, or nobody.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    user_id: Option<UserId>,
}

impl StaticIdentityProvider {
    pub fn logged_in(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user_id(&self) -> Result<UserId, DomainError> {
        self.user_id
            .clone()
            .ok_or_else(|| DomainError::new(ErrorCode::Unauthorized, "No user is logged in"))
    }
}
