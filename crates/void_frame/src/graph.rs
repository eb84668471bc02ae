//! Arena of frames linked by reference relations
//!
//! Frames refer to their reference frame by [`FrameId`]; the graph owns all
//! of them. Reference chains are kept acyclic: every operation that could
//! close a loop is rejected with [`FrameError::HierarchyCycle`].

use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::handle::{Handle, HandleMap};
use crate::mutate::FrameMut;
use crate::observer::ObserverList;
use crate::view::FrameRef;

/// Storage slot of one frame
#[derive(Default)]
pub struct FrameNode {
    pub(crate) frame: Frame,
    pub(crate) observers: ObserverList,
}

/// Handle to a frame stored in a [`FrameGraph`]
pub type FrameId = Handle<FrameNode>;

/// Owner of every frame and of their observers
pub struct FrameGraph {
    pub(crate) nodes: HandleMap<FrameNode>,
    pub(crate) next_observer_id: u64,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self {
            nodes: HandleMap::new(),
            next_observer_id: 1,
        }
    }

    /// Add a frame. Its reference frame, if any, must be live.
    pub fn insert(&mut self, frame: Frame) -> Result<FrameId> {
        if let Some(reference) = frame.reference {
            if !self.nodes.contains(reference) {
                return Err(FrameError::StaleFrame(reference));
            }
        }
        let id = self
            .nodes
            .insert(FrameNode {
                frame,
                observers: ObserverList::default(),
            })
            .ok_or(FrameError::ArenaExhausted)?;
        log::debug!("Inserted frame {}", id);
        Ok(id)
    }

    /// Remove a frame and drop its observers.
    ///
    /// Refused while another frame still uses it as reference.
    pub fn remove(&mut self, id: FrameId) -> Result<Frame> {
        if !self.nodes.contains(id) {
            return Err(FrameError::StaleFrame(id));
        }
        if let Some(child) = self.children(id).next() {
            return Err(FrameError::StillReferenced { frame: id, child });
        }
        let node = self.nodes.remove(id).ok_or(FrameError::StaleFrame(id))?;
        log::debug!("Removed frame {}", id);
        Ok(node.frame)
    }

    pub fn get(&self, id: FrameId) -> Result<FrameRef<'_>> {
        let node = self.nodes.get(id).ok_or(FrameError::StaleFrame(id))?;
        Ok(FrameRef {
            graph: self,
            id,
            frame: &node.frame,
        })
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Result<FrameMut<'_>> {
        if !self.nodes.contains(id) {
            return Err(FrameError::StaleFrame(id));
        }
        Ok(FrameMut { graph: self, id })
    }

    #[inline]
    pub fn contains(&self, id: FrameId) -> bool {
        self.nodes.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// All live frame ids, in slot order
    pub fn ids(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.nodes.iter().map(|(id, _)| id)
    }

    /// Frames whose reference frame is `id`
    pub fn children(&self, id: FrameId) -> impl Iterator<Item = FrameId> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.frame.reference == Some(id))
            .map(|(child, _)| child)
    }

    /// Frames without a reference frame
    pub fn roots(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.frame.reference.is_none())
            .map(|(id, _)| id)
    }

    /// Whether making `candidate` the reference of `frame` would close a loop
    pub fn would_create_loop(&self, frame: FrameId, candidate: FrameId) -> bool {
        if frame == candidate {
            return true;
        }
        match self.get(candidate) {
            Ok(candidate) => candidate.has_ancestor(frame),
            Err(_) => false,
        }
    }

    /// Number of observers registered on `id`
    pub fn observer_count(&self, id: FrameId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.observers.len())
    }

    /// Deliver a modification notice to every observer of `id`
    pub(crate) fn notify(&mut self, id: FrameId) {
        let mut observers = match self.nodes.get_mut(id) {
            Some(node) if !node.observers.is_empty() => core::mem::take(&mut node.observers),
            _ => return,
        };
        if let Ok(frame) = self.get(id) {
            observers.notify_all(frame);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.observers = observers;
        }
    }
}

impl Default for FrameGraph {
    fn default() -> Self {
        Self::new()
    }
}
