//! Events delivered to bound handlers.

use std::rc::Rc;

use crate::document::ElementRef;

/// Callback bound to an element for one event name.
pub type EventHandler = Rc<dyn Fn(&DomEvent)>;

/// An event delivered to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub event_type: String,
    /// Element the event was dispatched to.
    pub target: ElementRef,
    /// Element whose handler is currently running.
    pub current_target: ElementRef,
    pub timestamp: f64,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>, target: ElementRef) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            current_target: target,
            timestamp: 0.0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
