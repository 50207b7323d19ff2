use anyhow::Result;

use crate::engine::sink::EventSink;

/// An in-memory event sink that keeps every emitted event.
#[derive(Debug)]
pub struct CollectingEventSink<E> {
    events: Vec<E>,
}

impl<E> Default for CollectingEventSink<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> CollectingEventSink<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow all collected events.
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// Consume the sink and return the collected events.
    pub fn into_events(self) -> Vec<E> {
        self.events
    }
}

impl<E: Send> EventSink<E> for CollectingEventSink<E> {
    fn emit(&mut self, event: E) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}
