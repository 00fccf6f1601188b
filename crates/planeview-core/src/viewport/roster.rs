//! Per-role registries of scene objects, sharing one depth table.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::object::{Capabilities, ObjectId};
use crate::registry::{DepthKey, Registry, draw_cmp, priority_cmp};
use crate::schedule::LayerId;

/// Interaction roles an object can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Drawn,
    MouseListening,
    Tickable,
    Aware,
    Overlapping,
    Held,
    Dragged,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Drawn,
        Role::MouseListening,
        Role::Tickable,
        Role::Aware,
        Role::Overlapping,
        Role::Held,
        Role::Dragged,
    ];
}

type DepthCmp = fn(&DepthKey, &DepthKey) -> Ordering;

fn depth_of(depth: &HashMap<ObjectId, DepthKey>, id: &ObjectId) -> DepthKey {
    depth.get(id).copied().unwrap_or_default()
}

/// Registry membership of every registered object.
///
/// The drawn registry is kept in painter's order; every other sorted
/// registry is kept in event-priority order. Tickables are unsorted.
#[derive(Debug, Clone)]
pub(crate) struct Roster {
    depth: HashMap<ObjectId, DepthKey>,
    layers: HashMap<ObjectId, LayerId>,
    drawn: Registry<ObjectId>,
    mouse_listening: Registry<ObjectId>,
    tickable: Registry<ObjectId>,
    aware: Registry<ObjectId>,
    overlapping: Registry<ObjectId>,
    held: Registry<ObjectId>,
    dragged: Registry<ObjectId>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            depth: HashMap::new(),
            layers: HashMap::new(),
            drawn: Registry::sorted(),
            mouse_listening: Registry::sorted(),
            tickable: Registry::unsorted(),
            aware: Registry::sorted(),
            overlapping: Registry::sorted(),
            held: Registry::sorted(),
            dragged: Registry::sorted(),
        }
    }
}

impl Roster {
    fn registry(&self, role: Role) -> &Registry<ObjectId> {
        match role {
            Role::Drawn => &self.drawn,
            Role::MouseListening => &self.mouse_listening,
            Role::Tickable => &self.tickable,
            Role::Aware => &self.aware,
            Role::Overlapping => &self.overlapping,
            Role::Held => &self.held,
            Role::Dragged => &self.dragged,
        }
    }

    fn split(&mut self, role: Role) -> (&HashMap<ObjectId, DepthKey>, &mut Registry<ObjectId>, DepthCmp) {
        let Roster {
            depth,
            drawn,
            mouse_listening,
            tickable,
            aware,
            overlapping,
            held,
            dragged,
            ..
        } = self;
        let registry = match role {
            Role::Drawn => drawn,
            Role::MouseListening => mouse_listening,
            Role::Tickable => tickable,
            Role::Aware => aware,
            Role::Overlapping => overlapping,
            Role::Held => held,
            Role::Dragged => dragged,
        };
        let cmp: DepthCmp = match role {
            Role::Drawn => draw_cmp,
            _ => priority_cmp,
        };
        (&*depth, registry, cmp)
    }

    /// Record a new object and join the registries its capabilities ask for.
    pub fn insert(&mut self, id: ObjectId, key: DepthKey, layer: LayerId, caps: Capabilities) {
        self.depth.insert(id, key);
        self.layers.insert(id, layer);
        if caps.drawable {
            self.add(Role::Drawn, id);
        }
        if caps.mouse_listening {
            self.add(Role::MouseListening, id);
        }
        if caps.tickable {
            self.add(Role::Tickable, id);
        }
    }

    /// Drop an object from every registry. Returns the roles it held.
    pub fn remove_everywhere(&mut self, id: ObjectId) -> Vec<Role> {
        let roles: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|role| self.remove(*role, id))
            .collect();
        self.depth.remove(&id);
        self.layers.remove(&id);
        roles
    }

    pub fn add(&mut self, role: Role, id: ObjectId) -> bool {
        let (depth, registry, cmp) = self.split(role);
        registry.add(id, |a, b| cmp(&depth_of(depth, a), &depth_of(depth, b)))
    }

    pub fn remove(&mut self, role: Role, id: ObjectId) -> bool {
        let (depth, registry, cmp) = self.split(role);
        registry.remove(&id, |a, b| cmp(&depth_of(depth, a), &depth_of(depth, b)))
    }

    pub fn clear(&mut self, role: Role) {
        let (_, registry, _) = self.split(role);
        registry.clear();
    }

    pub fn contains(&self, role: Role, id: ObjectId) -> bool {
        self.registry(role).contains(&id)
    }

    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.depth.contains_key(&id)
    }

    /// Sorted members of a role. Empty for tickables, see [`Roster::snapshot`].
    pub fn ordered(&self, role: Role) -> &[ObjectId] {
        self.registry(role).ordered()
    }

    /// Copy of a role's members in dispatch order.
    pub fn snapshot(&self, role: Role) -> Vec<ObjectId> {
        let mut ids = self.registry(role).snapshot();
        if !self.registry(role).is_sorted() {
            ids.sort();
        }
        ids
    }

    pub fn len(&self, role: Role) -> usize {
        self.registry(role).len()
    }

    pub fn depth(&self, id: ObjectId) -> Option<DepthKey> {
        self.depth.get(&id).copied()
    }

    pub fn layer(&self, id: ObjectId) -> Option<LayerId> {
        self.layers.get(&id).copied()
    }

    /// Change an object's depth, re-sorting every sorted registry it is in.
    pub fn set_depth(&mut self, id: ObjectId, key: DepthKey) {
        let Some(old) = self.depth.insert(id, key) else {
            log::warn!("Depth change for unregistered object {:?}", id);
            return;
        };
        if old == key {
            return;
        }
        for role in Role::ALL {
            let (depth, registry, cmp) = self.split(role);
            let lookup_old = |k: &ObjectId| if *k == id { old } else { depth_of(depth, k) };
            registry.reinsert(
                id,
                |a, b| cmp(&lookup_old(a), &lookup_old(b)),
                |a, b| cmp(&depth_of(depth, a), &depth_of(depth, b)),
            );
        }
        log::debug!("Re-ordered {:?} from {:?} to {:?}", id, old, key);
    }
}
