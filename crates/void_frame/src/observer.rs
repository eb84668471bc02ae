//! Change notification for frames
//!
//! Observers are attached to a single frame and are called synchronously,
//! in registration order, before the mutating call returns. They receive a
//! read-only [`FrameRef`], so an observer cannot re-enter the graph.

use crate::view::FrameRef;

/// Observer ID, unique within one [`FrameGraph`](crate::FrameGraph)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Receives a notification each time the observed frame's local state changes
pub trait FrameObserver {
    fn on_frame_modified(&mut self, frame: FrameRef<'_>);
}

// Blanket implementation
impl<F> FrameObserver for F
where
    F: FnMut(FrameRef<'_>),
{
    fn on_frame_modified(&mut self, frame: FrameRef<'_>) {
        self(frame)
    }
}

/// Observers registered on one frame
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: Vec<(ObserverId, Box<dyn FrameObserver>)>,
}

impl ObserverList {
    pub fn push(&mut self, id: ObserverId, observer: Box<dyn FrameObserver>) {
        self.entries.push((id, observer));
    }

    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn notify_all(&mut self, frame: FrameRef<'_>) {
        for (_, observer) in &mut self.entries {
            observer.on_frame_modified(frame);
        }
    }
}
