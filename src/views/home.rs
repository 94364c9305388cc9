//! Landing page: library announcements

use crate::{
    api::{self, Gateway},
    error::AppResult,
    models::Announcement,
    services::events::{EventBus, Route},
    views::report_failure,
};

pub struct HomeView {
    gateway: Gateway,
    events: EventBus,
    pub announcements: Vec<Announcement>,
    pub loading: bool,
}

impl HomeView {
    pub fn new(gateway: Gateway, events: EventBus) -> Self {
        Self {
            gateway,
            events,
            announcements: Vec::new(),
            loading: false,
        }
    }

    /// Newest announcements first
    pub async fn load(&mut self) -> AppResult<()> {
        self.loading = true;
        let result = api::announcements::list(&self.gateway).await;
        self.loading = false;

        match result {
            Ok(mut announcements) => {
                announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                self.announcements = announcements;
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Failed to load announcements", &e);
                Err(e)
            }
        }
    }

    pub fn browse_books(&self) {
        self.events.navigate(Route::Books);
    }
}
