//! Event bus for cross-component notifications
//!
//! Publishers: the session (user changes), the books store (additions), the
//! gateway and view models (notices, navigation). Subscribers are whatever
//! the front end attaches: header widgets, toast renderers, the router.

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::Notice;

/// Navigation targets requested by the client layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    Books,
    BookDetail(String),
    BookEdit(String),
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The logged-in user changed (login, logout or session expiry)
    UserChanged,

    /// A book was created
    BookAdded { book_id: String },

    /// Message for the user
    Notice(Notice),

    /// The client asks the front end to navigate
    Navigate(Route),
}

/// Event bus for broadcasting events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event
    pub fn emit(&self, event: Event) {
        tracing::debug!(?event, "emitting event");
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    pub fn notify(&self, notice: Notice) {
        self.emit(Event::Notice(notice));
    }

    pub fn navigate(&self, route: Route) {
        self.emit(Event::Navigate(route));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Subscribe as a `Stream`; lagged receivers yield an error item
    pub fn stream(&self) -> BroadcastStream<Event> {
        BroadcastStream::new(self.sender.subscribe())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Drain everything currently queued on a receiver
pub fn drain(receiver: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
