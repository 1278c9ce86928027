//! Exhibit catalog — the lookup table that resolves tour targets.
//!
//! An exhibit is a picture frame (or any subject) paired with a designated
//! stand point in front of it.  Tours are requested as `ExhibitId` lists;
//! the controller resolves each id here and snaps the stand point onto the
//! navigable surface.  Ids that resolve to nothing are skipped with a
//! warning, not a failure — a museum with one broken frame still tours.

use mg_core::{ExhibitId, Vec3};

/// One tour subject.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exhibit {
    /// Scene name of the frame, for logs and by-name lookup.
    pub name: String,

    /// Designated stand point in front of the subject (world space,
    /// pre-snap).  Usually authored a step or two back from the wall.
    pub stand_target: Vec3,

    /// Center of the subject — what a presenting guide faces.
    pub center: Vec3,

    /// Outward normal of the subject's plane.  The hold facing combines
    /// this with the agent's approach direction so the guide ends up
    /// squarely in front of the piece rather than at an oblique angle.
    pub normal: Vec3,
}

/// Registry of all exhibits in the scene, indexed by [`ExhibitId`].
///
/// Built once at scene-load time and shared immutably with the tour layer.
#[derive(Default)]
pub struct ExhibitCatalog {
    exhibits: Vec<Exhibit>,
}

impl ExhibitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exhibit, returning its id (sequential from 0).
    pub fn add(&mut self, exhibit: Exhibit) -> ExhibitId {
        let id = ExhibitId(self.exhibits.len() as u32);
        self.exhibits.push(exhibit);
        id
    }

    /// Resolve an id.  `None` for stale or foreign ids.
    pub fn get(&self, id: ExhibitId) -> Option<&Exhibit> {
        self.exhibits.get(id.index())
    }

    /// Find an exhibit by its scene name.
    pub fn by_name(&self, name: &str) -> Option<ExhibitId> {
        self.exhibits
            .iter()
            .position(|e| e.name == name)
            .map(|i| ExhibitId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.exhibits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exhibits.is_empty()
    }

    /// All ids in registration order — the natural "full tour" ordering.
    pub fn ids(&self) -> impl Iterator<Item = ExhibitId> + '_ {
        (0..self.exhibits.len() as u32).map(ExhibitId)
    }
}
