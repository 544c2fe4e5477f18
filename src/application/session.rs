//! Chat session: the explicitly scoped owner of routing state.
//!
//! Constructed at login, torn down at logout. Everything that used to be
//! ambient (who am I, which room is open, which rooms are listened to) lives
//! here and is passed to the components that need it.
//!
//! # Example
//!
//! ```ignore
//! let (session, mut current_room) = ChatSession::start(deps, &config).await?;
//! session.resync(my_rooms).await?;
//! session.enter_room(room_id).await?;
//! while let Some(message) = current_room.recv().await {
//!     // render in the open conversation
//! }
//! session.end().await?;
//! ```

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::foundation::{DomainError, RoomId, UserId};
use crate::domain::subscription::{AttachError, DetachError, ResyncError};
use crate::ports::{IdentityProvider, NotificationSurface, RoomBackend};

use super::delivery::{DeliveryPipeline, SessionContext};
use super::i18n::Translator;
use super::registry::SubscriptionRegistry;
use super::router::{CurrentRoomStream, NotificationRouter};

/// Text code used to localize the toast close button.
pub const CLOSE_BUTTON_TEXT_CODE: &str = "CLOSE";

/// Collaborators a session is wired to.
#[derive(Clone)]
pub struct SessionDependencies {
    pub backend: Arc<dyn RoomBackend>,
    pub identity: Arc<dyn IdentityProvider>,
    pub surface: Arc<dyn NotificationSurface>,
    pub translator: Option<Arc<Translator>>,
}

/// One logged-in user's room subscriptions and routing state.
pub struct ChatSession {
    context: Arc<SessionContext>,
    registry: SubscriptionRegistry,
}

impl ChatSession {
    /// Starts a session for the currently logged-in user.
    ///
    /// Returns the session and the stream of messages for the open room.
    ///
    /// # Errors
    ///
    /// Fails if the identity provider has no logged-in user.
    pub async fn start(
        deps: SessionDependencies,
        config: &AppConfig,
    ) -> Result<(Self, CurrentRoomStream), DomainError> {
        let local_user_id = deps.identity.current_user_id().await?;

        let mut style = config.notification.toast_style();
        if let Some(translator) = &deps.translator {
            if let Some(text) = translator.lookup(CLOSE_BUTTON_TEXT_CODE).await {
                style.close_button_text = text;
            }
        }

        let (router, stream) = NotificationRouter::new(deps.surface, style);
        let context = Arc::new(SessionContext::new(local_user_id));
        let pipeline = DeliveryPipeline::new(context.clone(), Arc::new(router));
        let registry = SubscriptionRegistry::new(deps.backend, pipeline, &config.registry);

        tracing::info!(user_id = %context.local_user_id(), "Chat session started");

        Ok((Self { context, registry }, stream))
    }

    pub fn local_user_id(&self) -> &UserId {
        self.context.local_user_id()
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub async fn active_room(&self) -> Option<RoomId> {
        self.context.active_room().await
    }

    /// Listens to `room_id` (no-op if already listened to).
    pub async fn attach(&self, room_id: &RoomId) -> Result<(), AttachError> {
        self.registry.attach(room_id).await
    }

    /// Stops listening to `room_id`.
    pub async fn detach(&self, room_id: &RoomId) -> Result<(), DetachError> {
        self.registry.detach(room_id).await
    }

    /// Replaces the listened rooms with the user's current memberships.
    pub async fn resync<I>(&self, rooms: I) -> Result<(), ResyncError>
    where
        I: IntoIterator<Item = RoomId>,
    {
        self.registry.resync(rooms).await
    }

    /// Opens `room_id` in the UI.
    ///
    /// The room becomes active before it is attached, and it stays active
    /// when attaching fails. A room entered directly (not from the
    /// membership list) is attached here.
    pub async fn enter_room(&self, room_id: RoomId) -> Result<(), AttachError> {
        self.context.set_active_room(Some(room_id.clone())).await;
        tracing::debug!(room_id = %room_id, "Entered room");
        self.registry.attach(&room_id).await
    }

    /// Closes the open room; its messages become notifications again.
    pub async fn leave_room(&self) {
        if let Some(room_id) = self.context.active_room().await {
            tracing::debug!(room_id = %room_id, "Left room");
        }
        self.context.set_active_room(None).await;
    }

    /// Ends the session, releasing every subscription.
    pub async fn end(self) -> Result<(), ResyncError> {
        let result = self.registry.detach_all().await;
        tracing::info!(user_id = %self.context.local_user_id(), "Chat session ended");
        result
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if self.registry.try_is_empty() == Some(false) {
            tracing::warn!(
                user_id = %self.context.local_user_id(),
                "Chat session dropped with live subscriptions; call end() to release them"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryKeyValueStore, InMemoryRoomBackend, RecordingNotificationSurface,
        StaticIdentityProvider,
    };
    use crate::domain::foundation::ErrorCode;
    use crate::ports::TextSource;
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn deps(identity: StaticIdentityProvider) -> (SessionDependencies, Arc<RecordingNotificationSurface>) {
        let surface = Arc::new(RecordingNotificationSurface::new());
        let deps = SessionDependencies {
            backend: Arc::new(InMemoryRoomBackend::new()),
            identity: Arc::new(identity),
            surface: surface.clone(),
            translator: None,
        };
        (deps, surface)
    }

    #[tokio::test]
    async fn start_requires_logged_in_user() {
        let (deps, _) = deps(StaticIdentityProvider::anonymous());

        let err = ChatSession::start(deps, &AppConfig::default())
            .await
            .err()
            .unwrap();

        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn enter_room_sets_active_and_attaches() {
        let (deps, _) = deps(StaticIdentityProvider::logged_in(UserId::new("u1").unwrap()));
        let (session, _stream) = ChatSession::start(deps, &AppConfig::default()).await.unwrap();

        session.enter_room(RoomId::from(101)).await.unwrap();

        assert_eq!(session.active_room().await, Some(RoomId::from(101)));
        assert!(session.registry().contains(&RoomId::from(101)).await);

        session.leave_room().await;
        assert_eq!(session.active_room().await, None);
        assert!(session.registry().contains(&RoomId::from(101)).await);

        session.end().await.unwrap();
    }

    #[tokio::test]
    async fn end_releases_all_rooms() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let (mut deps, _) = deps(StaticIdentityProvider::logged_in(UserId::new("u1").unwrap()));
        deps.backend = backend.clone();
        let (session, _stream) = ChatSession::start(deps, &AppConfig::default()).await.unwrap();
        session
            .resync([RoomId::from(1), RoomId::from(2)])
            .await
            .unwrap();

        session.end().await.unwrap();

        assert_eq!(backend.active_subscription_count(&RoomId::from(1)), 0);
        assert_eq!(backend.active_subscription_count(&RoomId::from(2)), 0);
    }

    struct KoreanTexts;

    #[async_trait]
    impl TextSource for KoreanTexts {
        async fn load(&self, _language: &str) -> Result<HashMap<String, String>, DomainError> {
            Ok(HashMap::from([("close".to_string(), "닫기".to_string())]))
        }
    }

    #[tokio::test]
    async fn close_button_text_is_localized() {
        let translator = Arc::new(Translator::new(
            Arc::new(KoreanTexts),
            Arc::new(InMemoryKeyValueStore::new()),
            &crate::config::I18nConfig::default(),
        ));
        translator.load_language("en").await.unwrap();

        let backend = Arc::new(InMemoryRoomBackend::new());
        let (mut deps, surface) = deps(StaticIdentityProvider::logged_in(UserId::new("u1").unwrap()));
        deps.backend = backend.clone();
        deps.translator = Some(translator);
        let (session, _stream) = ChatSession::start(deps, &AppConfig::default()).await.unwrap();

        session.attach(&RoomId::from(5)).await.unwrap();
        backend
            .publish(crate::domain::routing::MessageEvent::new(
                RoomId::from(5),
                UserId::new("u9").unwrap(),
                serde_json::json!({"message": "hi"}),
                crate::domain::foundation::Timestamp::from_unix_secs(2),
            ))
            .await;

        assert_eq!(surface.presented()[0].close_button_text, "닫기");
        session.end().await.unwrap();
    }
}
