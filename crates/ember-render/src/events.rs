// Copyright 2025 ember contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed engine-event registry.
//!
//! Subscribers register a callback per event kind and receive events
//! synchronously when the engine publishes them. Removal is O(1) amortized:
//! subscriber slots are stable indices and unsubscribing tombstones the
//! slot. The absence of any subscriber for a kind is an expected state, not
//! an error.

use std::collections::HashMap;

/// Discriminant of an [`EngineEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The window / viewport changed size.
    WindowResized,
    /// A frame finished compositing and was handed to the presenter.
    FrameCompleted,
    /// The HDRI precompute pipeline finished capturing.
    HdriCaptured,
}

/// An event published by the render engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The window / viewport changed size.
    WindowResized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// A frame finished compositing.
    FrameCompleted {
        /// Total frames rendered so far.
        frames: u64,
        /// Duration of the completed frame in milliseconds.
        frame_time_ms: f32,
    },
    /// Environment maps became available.
    HdriCaptured,
}

impl EngineEvent {
    /// The subscription key this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::WindowResized { .. } => EventKind::WindowResized,
            EngineEvent::FrameCompleted { .. } => EventKind::FrameCompleted,
            EngineEvent::HdriCaptured => EventKind::HdriCaptured,
        }
    }
}

/// Identifies one subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId {
    kind: EventKind,
    index: usize,
}

type Callback = Box<dyn FnMut(&EngineEvent)>;

/// Registry mapping event kinds to ordered subscriber callbacks.
#[derive(Default)]
pub struct EventRegistry {
    subscribers: HashMap<EventKind, Vec<Option<Callback>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to events of `kind`. Callbacks for one kind
    /// run in subscription order.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&EngineEvent) + 'static,
    ) -> SubscriberId {
        let slots = self.subscribers.entry(kind).or_default();
        slots.push(Some(Box::new(callback)));
        SubscriberId {
            kind,
            index: slots.len() - 1,
        }
    }

    /// Removes a subscription. Returns `false` (with a warning) when the
    /// id was already removed or never existed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        match self
            .subscribers
            .get_mut(&id.kind)
            .and_then(|slots| slots.get_mut(id.index))
        {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => {
                log::warn!("EventRegistry: unsubscribe of unknown subscriber {id:?}");
                false
            }
        }
    }

    /// Delivers `event` to every live subscriber of its kind. No
    /// subscribers is a no-op.
    pub fn publish(&mut self, event: &EngineEvent) {
        if let Some(slots) = self.subscribers.get_mut(&event.kind()) {
            for slot in slots.iter_mut() {
                if let Some(callback) = slot {
                    callback(event);
                }
            }
        }
    }

    /// Number of live subscribers for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .get(&kind)
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts = f.debug_struct("EventRegistry");
        for (kind, slots) in &self.subscribers {
            counts.field(
                match kind {
                    EventKind::WindowResized => "window_resized",
                    EventKind::FrameCompleted => "frame_completed",
                    EventKind::HdriCaptured => "hdri_captured",
                },
                &slots.iter().filter(|s| s.is_some()).count(),
            );
        }
        counts.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_reaches_subscribers_in_order() {
        let mut registry = EventRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        registry.subscribe(EventKind::WindowResized, move |_| a.borrow_mut().push("a"));
        let b = seen.clone();
        registry.subscribe(EventKind::WindowResized, move |_| b.borrow_mut().push("b"));

        registry.publish(&EngineEvent::WindowResized {
            width: 800,
            height: 600,
        });
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let mut registry = EventRegistry::new();
        registry.publish(&EngineEvent::HdriCaptured);
        assert_eq!(registry.subscriber_count(EventKind::HdriCaptured), 0);
    }

    #[test]
    fn unsubscribe_tombstones_without_shifting_other_ids() {
        let mut registry = EventRegistry::new();
        let seen = Rc::new(RefCell::new(0u32));

        let a = seen.clone();
        let first = registry.subscribe(EventKind::FrameCompleted, move |_| *a.borrow_mut() += 1);
        let b = seen.clone();
        let second = registry.subscribe(EventKind::FrameCompleted, move |_| *b.borrow_mut() += 10);

        assert!(registry.unsubscribe(first));
        registry.publish(&EngineEvent::FrameCompleted {
            frames: 1,
            frame_time_ms: 16.0,
        });
        assert_eq!(*seen.borrow(), 10);

        // Removing again is an expected no-op with a warning.
        assert!(!registry.unsubscribe(first));
        assert!(registry.unsubscribe(second));
        assert_eq!(registry.subscriber_count(EventKind::FrameCompleted), 0);
    }
}
