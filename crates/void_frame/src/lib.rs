//! # void_frame - Hierarchical Rigid Frames
//!
//! A tree of coordinate systems, each a translation and rotation relative to
//! an optional reference frame, with:
//! - Point and vector conversion across the hierarchy
//! - Column-major 4x4 matrices for rendering
//! - Optional motion constraints
//! - Synchronous change observers
//!
//! Frames live in a [`FrameGraph`] and are addressed by generational
//! [`FrameId`]s. Queries go through [`FrameRef`], mutations through
//! [`FrameMut`].
//!
//! ```ignore
//! let mut graph = FrameGraph::new();
//! let parent = graph.insert(Frame::from_rotation(Quat::from_rotation_y(FRAC_PI_2)))?;
//! let child = graph.insert(Frame::from_translation(Vec3::X).with_reference(parent))?;
//! let world = graph.get(child)?.position(); // (0, 0, -1)
//! ```

pub mod constraint;
pub mod error;
pub mod frame;
pub mod graph;
pub mod handle;
pub mod mutate;
pub mod node;
pub mod observer;
pub mod view;

pub use constraint::{
    AxisPlaneConstraint, Constraint, ConstraintSpace, RotationRule, TranslationRule, Unconstrained,
};
pub use error::{FrameError, Result};
pub use frame::Frame;
pub use graph::{FrameGraph, FrameId, FrameNode};
pub use handle::Handle;
pub use mutate::FrameMut;
pub use node::RigidTransformNode;
pub use observer::{FrameObserver, ObserverId};
pub use view::FrameRef;

pub mod prelude {
    pub use crate::constraint::{
        AxisPlaneConstraint, Constraint, ConstraintSpace, RotationRule, TranslationRule,
    };
    pub use crate::error::FrameError;
    pub use crate::frame::Frame;
    pub use crate::graph::{FrameGraph, FrameId};
    pub use crate::mutate::FrameMut;
    pub use crate::node::RigidTransformNode;
    pub use crate::observer::{FrameObserver, ObserverId};
    pub use crate::view::FrameRef;
}
