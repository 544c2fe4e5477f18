//! IdentityProvider port - Who is the local user.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port answering "who am I" for the current login.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the logged-in user.
    ///
    /// Fails with `ErrorCode::Unauthorized` when nobody is logged in.
    async fn current_user_id(&self) -> Result<UserId, DomainError>;
}
