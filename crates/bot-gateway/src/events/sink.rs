//! Event sink and named-handler registry
//!
//! The dispatcher delivers semantic events synchronously through an
//! `EventSink`. The registry implements the "fire named event with payload"
//! contract for external consumers.

use super::SemanticEvent;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Event names rejected at registration: these were replaced by the
/// fine-grained presence and member events and are never delivered.
pub const DEPRECATED_EVENTS: &[&str] = &["PRESENCE_UPDATE", "USER_LEAVE"];

/// Consumer of semantic events
///
/// `emit` is called synchronously from the dispatch thread, one call per
/// event. It must return promptly: no further inbound frame is processed
/// until it does.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SemanticEvent);
}

type Handler = Box<dyn Fn(&SemanticEvent) + Send + Sync>;

/// Named-event registry
///
/// External code binds callbacks by event name; each emitted event runs every
/// handler registered under its name.
#[derive(Default)]
pub struct EventRegistry {
    handlers: RwLock<HashMap<String, Vec<Handler>>>,
}

impl EventRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to an event name
    ///
    /// Names are case-insensitive. Returns false (and registers nothing) for
    /// the deprecated aliases.
    pub fn on(&self, event: &str, handler: impl Fn(&SemanticEvent) + Send + Sync + 'static) -> bool {
        let event = event.to_uppercase();
        if DEPRECATED_EVENTS.contains(&event.as_str()) {
            tracing::warn!(
                event = %event,
                "event is no longer supported and will not be registered"
            );
            return false;
        }
        self.handlers
            .write()
            .entry(event)
            .or_default()
            .push(Box::new(handler));
        true
    }

    /// Number of handlers bound to an event name
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .get(&event.to_uppercase())
            .map_or(0, Vec::len)
    }
}

impl EventSink for EventRegistry {
    fn emit(&self, event: SemanticEvent) {
        let handlers = self.handlers.read();
        let Some(bound) = handlers.get(event.name()) else {
            return;
        };
        for handler in bound {
            handler(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_registry_fires_by_name() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        assert!(registry.on("connected", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        registry.emit(SemanticEvent::Connected);
        registry.emit(SemanticEvent::Connected);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unregistered_event_is_ignored() {
        let registry = EventRegistry::new();
        // No handlers bound: must not panic
        registry.emit(SemanticEvent::Connected);
    }

    #[test]
    fn test_deprecated_aliases_rejected() {
        let registry = EventRegistry::new();
        assert!(!registry.on("PRESENCE_UPDATE", |_| {}));
        assert!(!registry.on("user_leave", |_| {}));
        assert_eq!(registry.handler_count("PRESENCE_UPDATE"), 0);
        assert_eq!(registry.handler_count("USER_LEAVE"), 0);

        // The fine-grained replacements are accepted
        assert!(registry.on("PRESENCE_UPDATE_STATUS", |_| {}));
        assert!(registry.on("USER_REMOVE", |_| {}));
    }

    #[test]
    fn test_unknown_events_fire_under_their_tag() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        registry.on("VOICE_STATE_UPDATE", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        registry.emit(SemanticEvent::Unknown {
            tag: "VOICE_STATE_UPDATE".to_string(),
            data: None,
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
