//! Instance index with spatial queries
//!
//! Instances are kept in id order, which is also creation order, so every
//! query and dispatch walks them deterministically. Queries only report live
//! (`Active`) instances.

use std::collections::BTreeMap;

use super::boundary::PositionedBoundary;
use super::state::{Instance, InstanceId};

#[derive(Debug, Default)]
pub struct InstanceIndex {
    instances: BTreeMap<InstanceId, Instance>,
}

impl InstanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.id(), instance);
    }

    pub(crate) fn remove(&mut self, id: InstanceId) -> Option<Instance> {
        self.instances.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Snapshot of ids, safe to walk while the index changes
    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    /// Every instance regardless of status
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Instance> {
        self.instances.values_mut()
    }

    pub fn live(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values().filter(|i| i.is_live())
    }

    /// Live instances of one actor kind
    pub fn of_actor<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Instance> + 'a {
        self.live().filter(move |i| i.actor_name() == name)
    }

    /// Live instances whose boundary contains a point
    pub fn at_position(&self, x: f32, y: f32) -> impl Iterator<Item = &Instance> {
        self.live()
            .filter(move |i| i.boundary().is_some_and(|b| b.contains_point(x, y)))
    }

    /// Live instances overlapping `boundary` (tested as `boundary.collides_with(other)`)
    pub fn within<'a>(
        &'a self,
        boundary: &'a PositionedBoundary,
    ) -> impl Iterator<Item = &'a Instance> + 'a {
        self.live()
            .filter(move |i| i.boundary().is_some_and(|b| boundary.collides_with(&b)))
    }

    /// Solid subset of [`within`](Self::within)
    pub fn solid_within<'a>(
        &'a self,
        boundary: &'a PositionedBoundary,
    ) -> impl Iterator<Item = &'a Instance> + 'a {
        self.within(boundary).filter(|i| i.is_solid())
    }

    pub fn any_solid_within(&self, boundary: &PositionedBoundary) -> bool {
        self.solid_within(boundary).next().is_some()
    }
}
