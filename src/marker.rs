// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named, hierarchical tags attached to log calls.
//!
//! A [`Marker`] has a name and a set of direct parents. A marker "is an
//! instance of" another marker when it is that marker or one of its
//! ancestors is. Markers are only created through a [`MarkerRegistry`], which
//! interns them by name, so two markers with the same name from the same
//! registry are the same marker.
//!
//! ```
//! use logdispatch::MarkerRegistry;
//!
//! let markers = MarkerRegistry::new();
//! let sql = markers.get_or_create("SQL");
//! let update = markers.get_or_create("SQL_UPDATE");
//! update.add_parents(&[sql.clone()]);
//!
//! assert!(update.is_instance_of(&sql));
//! assert!(!sql.is_instance_of(&update));
//! assert_eq!(update.label(), "[SQL_UPDATE [SQL]]");
//! ```
//!
//! # Concurrency
//!
//! The parent set is an immutable `Vec` behind an [`ArcSwap`]. Mutations build
//! a new `Vec` and swap it in, so readers always see a whole parent set, never
//! one that is half-updated.

use crate::status;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

struct MarkerInner {
    name: String,
    parents: ArcSwap<Vec<Marker>>,
}

/// A named tag with a mutable set of parents.
///
/// Cloning is cheap and yields the same marker. Equality is identity.
#[derive(Clone)]
pub struct Marker {
    inner: Arc<MarkerInner>,
}

impl Marker {
    pub(crate) fn new(name: &str) -> Marker {
        Marker {
            inner: Arc::new(MarkerInner {
                name: name.to_string(),
                parents: ArcSwap::from_pointee(Vec::new()),
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Adds each marker in `parents` that is not already a direct parent.
    ///
    /// Adding a marker as its own parent is ignored. Longer cycles are
    /// accepted, but parents are strong references: markers on a cycle are
    /// never freed until one of its edges is removed with
    /// [`remove_parent`](Self::remove_parent) or [`set_parents`](Self::set_parents).
    pub fn add_parents(&self, parents: &[Marker]) {
        let current = self.inner.parents.load();
        if parents.iter().all(|p| p == self || current.contains(p)) {
            return;
        }
        drop(current);
        if parents.contains(self) {
            status::warn(format_args!(
                "marker {} cannot be its own parent",
                self.name()
            ));
        }
        self.inner.parents.rcu(|current| {
            let mut next = Vec::clone(current);
            for parent in parents {
                if parent != self && !next.contains(parent) {
                    next.push(parent.clone());
                }
            }
            Arc::new(next)
        });
    }

    /// Replaces the parent set. Duplicates and `self` are dropped.
    pub fn set_parents(&self, parents: &[Marker]) {
        let mut next: Vec<Marker> = Vec::with_capacity(parents.len());
        for parent in parents {
            if parent != self && !next.contains(parent) {
                next.push(parent.clone());
            }
        }
        self.inner.parents.store(Arc::new(next));
    }

    /// Detaches a direct parent. Returns false if `parent` was not one.
    pub fn remove_parent(&self, parent: &Marker) -> bool {
        if !self.inner.parents.load().contains(parent) {
            return false;
        }
        let mut removed = false;
        self.inner.parents.rcu(|current| {
            let next: Vec<Marker> = current.iter().filter(|m| *m != parent).cloned().collect();
            removed = next.len() != current.len();
            Arc::new(next)
        });
        removed
    }

    /// Snapshot of the direct parents.
    pub fn parents(&self) -> Vec<Marker> {
        Vec::clone(&self.inner.parents.load())
    }

    pub fn has_parents(&self) -> bool {
        !self.inner.parents.load().is_empty()
    }

    /// True if `self` is `other` or has `other` as an ancestor.
    ///
    /// Each ancestor is visited at most once, so a cyclic parent graph
    /// terminates.
    pub fn is_instance_of(&self, other: &Marker) -> bool {
        if self == other {
            return true;
        }
        let direct = self.inner.parents.load();
        if direct.is_empty() {
            return false;
        }
        let mut visited: HashSet<*const MarkerInner> = HashSet::new();
        visited.insert(Arc::as_ptr(&self.inner));
        let mut pending: Vec<Marker> = Vec::clone(&direct);
        while let Some(marker) = pending.pop() {
            if marker == *other {
                return true;
            }
            if !visited.insert(Arc::as_ptr(&marker.inner)) {
                continue;
            }
            pending.extend(marker.inner.parents.load().iter().cloned());
        }
        false
    }

    /// `[name]`, or `[name [parent1, parent2]]` when there are direct parents.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Marker {}

impl Hash for Marker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parents = self.inner.parents.load();
        write!(f, "[{}", self.name())?;
        if !parents.is_empty() {
            f.write_str(" [")?;
            for (i, parent) in parents.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(parent.name())?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

//parents are printed by name only; a full Debug walk would not terminate on a cycle
impl Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parents = self.inner.parents.load();
        f.debug_struct("Marker")
            .field("name", &self.name())
            .field(
                "parents",
                &parents.iter().map(Marker::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/*
Boilerplate notes.

Clone: cheap, Arc-based, same identity.
PartialEq/Eq/Hash: identity (Arc pointer).  The registry
guarantees that identity and name agree within a registry.
Ord: no meaningful ordering.
Default: a marker needs a name.
*/

/// Interns markers by name.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: DashMap<String, Marker>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The marker called `name`, created on first use.
    pub fn get_or_create(&self, name: &str) -> Marker {
        if let Some(marker) = self.markers.get(name) {
            return marker.value().clone();
        }
        self.markers
            .entry(name.to_string())
            .or_insert_with(|| Marker::new(name))
            .value()
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Marker> {
        self.markers.get(name).map(|m| m.value().clone())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.markers.contains_key(name)
    }

    /// Sorted names of every registered marker.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.markers.iter().map(|m| m.key().clone()).collect();
        names.sort();
        names
    }

    /// Resolves `name` in this registry and tests `marker` against it.
    ///
    /// An unregistered name matches nothing.
    pub fn is_instance_of_name(&self, marker: &Marker, name: &str) -> bool {
        match self.get(name) {
            Some(target) => marker.is_instance_of(&target),
            None => false,
        }
    }

    /// Forgets every marker. Markers already handed out keep working.
    pub fn clear(&self) {
        self.markers.clear();
    }
}
