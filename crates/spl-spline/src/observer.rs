//! Change notification for code that derives data from a spline (meshes,
//! distance caches, junctioned splines).

use serde::{Deserialize, Serialize};
use spl_topology::CurveMode;

/// What a mutation did to the point store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SplineChange {
    Appended { index: usize },
    Inserted { index: usize },
    Removed { index: usize },
    PointChanged { index: usize },
    Reversed,
    Resized { from: usize, to: usize },
    ClosedChanged { closed: bool },
    ModeChanged { from: CurveMode, to: CurveMode },
    /// Stored points unchanged, world placement changed.
    SpaceChanged,
    /// Closing point or mirrored closing handle rewritten.
    ClosingRepaired,
}

/// Delivered to every observer after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineEvent {
    /// Revision of the spline after the change.
    pub revision: u64,
    pub change: SplineChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

pub type Callback = Box<dyn FnMut(&SplineEvent) + Send>;

/// Plain callback list, notified in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(ObserverId, Callback)>,
}

impl Observers {
    pub fn subscribe(&mut self, callback: Callback) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(other, _)| *other != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub(crate) fn notify(&mut self, event: &SplineEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("count", &self.callbacks.len()).finish()
    }
}
