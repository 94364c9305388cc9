//! User profile page: profile data, favorites/history previews, image upload

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult, Notice},
    models::{
        favorite::{FavoriteItem, HistoryItem},
        upload::{ImageFile, ImageSlot},
        user::{Profile, ProfileUpdate},
    },
    services::events::EventBus,
    views::report_failure,
};

/// Items kept in each tab preview
pub const PREVIEW_LEN: usize = 6;

/// Upload size limit, exclusive
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Favorites,
    History,
    Settings,
}

/// Check that a file is an image below the size limit
pub fn validate_image(file: &ImageFile) -> AppResult<()> {
    if !file.content_type.starts_with("image/") {
        return Err(AppError::Validation("only image files can be uploaded".to_string()));
    }
    if file.data.len() >= MAX_IMAGE_BYTES {
        return Err(AppError::Validation("image must be smaller than 5 MB".to_string()));
    }
    Ok(())
}

pub struct ProfileView {
    gateway: Gateway,
    events: EventBus,
    pub profile: Profile,
    pub tab: ProfileTab,
    pub favorites: Vec<FavoriteItem>,
    pub history: Vec<HistoryItem>,
    pub updating: bool,
    pub uploading: bool,
}

impl ProfileView {
    pub fn new(gateway: Gateway, events: EventBus) -> Self {
        Self {
            gateway,
            events,
            profile: Profile::default(),
            tab: ProfileTab::default(),
            favorites: Vec::new(),
            history: Vec::new(),
            updating: false,
            uploading: false,
        }
    }

    /// Refresh the profile from the server, merged into the session copy
    pub async fn fetch(&mut self) -> AppResult<Profile> {
        let result = match api::users::current(&self.gateway).await {
            Ok(user) => self.gateway.session().merge_profile(&user).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(profile) => {
                self.profile = profile.clone();
                Ok(profile)
            }
            Err(e) => {
                report_failure(&self.events, "Failed to load profile", &e);
                Err(e)
            }
        }
    }

    pub async fn update(&mut self, update: &ProfileUpdate) -> AppResult<Profile> {
        self.updating = true;
        let result = self.apply_update(update).await;
        self.updating = false;

        match result {
            Ok(profile) => {
                self.profile = profile.clone();
                self.events.notify(Notice::Success("Profile updated".to_string()));
                Ok(profile)
            }
            Err(e) => {
                report_failure(&self.events, "Profile update failed", &e);
                Err(e)
            }
        }
    }

    /// Upload an image and return its public URL
    pub async fn upload_image(&mut self, file: ImageFile, slot: ImageSlot) -> AppResult<String> {
        validate_image(&file).inspect_err(|e| {
            self.events.notify(Notice::Error(e.user_message()));
        })?;

        self.uploading = true;
        let result = self.upload(file).await;
        self.uploading = false;

        match result {
            Ok(url) => {
                self.events
                    .notify(Notice::Success(format!("{} uploaded", slot.label())));
                Ok(url)
            }
            Err(e) => {
                report_failure(&self.events, &format!("{} upload failed", slot.label()), &e);
                Err(e)
            }
        }
    }

    /// Upload an image and point the profile at it
    pub async fn change_image(&mut self, file: ImageFile, slot: ImageSlot) -> AppResult<Profile> {
        let url = self.upload_image(file, slot).await?;
        let update = match slot {
            ImageSlot::Avatar => ProfileUpdate {
                avatar_url: Some(url),
                ..Default::default()
            },
            ImageSlot::Background => ProfileUpdate {
                background_url: Some(url),
                ..Default::default()
            },
        };
        self.update(&update).await
    }

    /// First few favorites; a failure leaves the preview empty
    pub async fn load_favorites(&mut self) {
        self.favorites = match api::users::favorites(&self.gateway).await {
            Ok(items) => items.into_iter().take(PREVIEW_LEN).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load favorites preview");
                Vec::new()
            }
        };
    }

    pub async fn load_history(&mut self) {
        self.history = match api::users::history(&self.gateway).await {
            Ok(items) => items.into_iter().take(PREVIEW_LEN).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load history preview");
                Vec::new()
            }
        };
    }

    async fn apply_update(&self, update: &ProfileUpdate) -> AppResult<Profile> {
        let response = api::users::update_profile(&self.gateway, update).await?;
        let user = response
            .user
            .ok_or_else(|| AppError::ResponseShape("profile update answer has no user".to_string()))?;
        self.gateway.session().merge_profile(&user).await
    }

    async fn upload(&self, file: ImageFile) -> AppResult<String> {
        let ticket = api::uploads::presigned_url(&self.gateway, &file.name, &file.content_type).await?;
        if ticket.presigned_url.is_empty() {
            return Err(AppError::ResponseShape("empty presigned URL".to_string()));
        }
        self.gateway
            .upload(&ticket.presigned_url, &file.content_type, file.data)
            .await?;
        Ok(ticket.access_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{Body, Method, ScriptedTransport};
    use crate::services::{
        events::{drain, Event},
        session::{Session, PROFILE_KEY},
        storage::{MemoryStorage, Storage},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    async fn setup() -> (Arc<ScriptedTransport>, Arc<dyn Storage>, ProfileView) {
        let transport = Arc::new(ScriptedTransport::new());
        let events = EventBus::default();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = Session::restore(storage.clone(), events.clone());
        let profile = Profile {
            user_id: "u1".into(),
            email: "reader@example.com".into(),
            ..Default::default()
        };
        session.establish("tok".into(), profile).await.unwrap();
        let gateway = Gateway::new(transport.clone(), "http://api.test", session, events.clone());
        (transport, storage, ProfileView::new(gateway, events))
    }

    fn png(size: usize) -> ImageFile {
        ImageFile {
            name: "me.png".into(),
            content_type: "image/png".into(),
            data: vec![0; size],
        }
    }

    #[tokio::test]
    async fn test_fetch_merges_into_session() {
        let (transport, storage, mut view) = setup().await;
        transport.reply(
            Method::Get,
            "/user/current",
            200,
            json!({"display_name": "Reader", "created_at": 1_700_000_000, "is_verified": true}),
        );

        let profile = view.fetch().await.unwrap();

        assert_eq!(profile.email, "reader@example.com");
        assert_eq!(profile.display_name, "Reader");
        assert_eq!(storage.get_json::<Profile>(PROFILE_KEY), Some(profile));
    }

    #[tokio::test]
    async fn test_update_without_user_is_shape_error() {
        let (transport, _, mut view) = setup().await;
        transport.reply(Method::Put, "/user/profile", 200, json!({"message": "ok"}));

        let update = ProfileUpdate {
            summary: Some("Sci-fi fan".into()),
            ..Default::default()
        };
        assert!(matches!(view.update(&update).await, Err(AppError::ResponseShape(_))));
    }

    #[tokio::test]
    async fn test_previews_keep_six_and_accept_both_shapes() {
        let (transport, _, mut view) = setup().await;
        let items: Vec<_> = (0..9).map(|i| json!({"book_id": format!("b{}", i)})).collect();
        transport.reply(Method::Get, "/favorites", 200, json!(items));
        transport.reply(Method::Get, "/history", 200, json!({"items": items}));

        view.load_favorites().await;
        view.load_history().await;

        assert_eq!(view.favorites.len(), PREVIEW_LEN);
        assert_eq!(view.history.len(), PREVIEW_LEN);
    }

    #[tokio::test]
    async fn test_failed_preview_is_empty() {
        let (transport, _, mut view) = setup().await;
        transport.reply(Method::Get, "/history", 500, json!({"error": "boom"}));

        view.load_history().await;
        assert!(view.history.is_empty());
    }

    #[test]
    fn test_image_validation() {
        assert_ok!(validate_image(&png(1024)));
        assert_err!(validate_image(&png(MAX_IMAGE_BYTES)));

        let pdf = ImageFile {
            content_type: "application/pdf".into(),
            ..png(10)
        };
        assert_err!(validate_image(&pdf));
    }

    #[tokio::test]
    async fn test_change_avatar_uploads_without_bearer() {
        let (transport, _, mut view) = setup().await;
        transport.reply(
            Method::Get,
            "/presigned-url?file_name=me.png&file_type=image%2Fpng",
            200,
            json!({"presigned_url": "https://bucket.test/put/me.png", "access_url": "https://cdn.test/me.png"}),
        );
        transport.reply(Method::Put, "/put/me.png", 200, json!({}));
        transport.reply(
            Method::Put,
            "/user/profile",
            200,
            json!({"user": {"avatar_url": "https://cdn.test/me.png"}}),
        );

        let profile = view.change_image(png(2048), ImageSlot::Avatar).await.unwrap();

        assert_eq!(profile.avatar_url, "https://cdn.test/me.png");
        let upload = &transport.requests_to(Method::Put, "/put/me.png")[0];
        assert_eq!(upload.bearer, None);
        assert!(matches!(&upload.body, Some(Body::Bytes { content_type, .. }) if content_type == "image/png"));
        let update = &transport.requests_to(Method::Put, "/user/profile")[0];
        assert_eq!(update.body_json(), Some(json!({"avatar_url": "https://cdn.test/me.png"})));
    }

    #[tokio::test]
    async fn test_storage_failure_is_shown_once() {
        let (transport, _, mut view) = setup().await;
        transport.reply(
            Method::Get,
            "/presigned-url?file_name=me.png&file_type=image%2Fpng",
            200,
            json!({"presigned_url": "https://bucket.test/put/me.png", "access_url": "https://cdn.test/me.png"}),
        );
        transport.reply_raw(Method::Put, "/put/me.png", 503, "unavailable");
        let mut rx = view.events.subscribe();

        let err = view.upload_image(png(2048), ImageSlot::Avatar).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(!view.uploading);
        assert_eq!(drain(&mut rx), vec![Event::Notice(Notice::ServerUnavailable)]);
    }
}
