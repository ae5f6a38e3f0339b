//! Scene: body ownership and the tick pipeline
//!
//! The scene exclusively owns every body and force creator registered in it.
//! Bodies live in a generation-counted slot arena and are addressed by
//! [`BodyHandle`]; force creators hold handles, never references, and
//! re-validate liveness on every evaluation.
//!
//! Removal is two-step everywhere: `remove_body` tombstones, `sweep` frees.
//! Nothing is compacted inside `tick`, so handles and iteration stay valid
//! for the whole frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::forces::ForceCreator;
use crate::config::SimConfig;

/// Generation-counted reference to a body slot.
///
/// Stays valid until the body is swept; afterwards the handle is stale and
/// the panicking accessors treat it as caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// A response fired during the collision pass, drained by the caller after
/// `tick`. Game rules react to these (scoring, tombstoning a projectile,
/// granting an ability) without the engine knowing about any of that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// A destructive collision resolved an impulse between two bodies
    Impact {
        a: BodyHandle,
        b: BodyHandle,
        axis: Vec2,
        overlap: f32,
    },
    /// A falling body came to rest on a platform's upper surface
    Landed {
        body: BodyHandle,
        platform: BodyHandle,
    },
    /// A pickup sensor consumed its pickup
    PickupCollected {
        body: BodyHandle,
        pickup: BodyHandle,
    },
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Owner of all simulation state; the external game loop calls `tick(dt)`
/// once per frame, drains events, and sweeps tombstoned bodies between
/// frames.
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    creators: Vec<ForceCreator>,
    events: Vec<SimEvent>,
    config: SimConfig,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            creators: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Add a body; the scene takes ownership and returns its handle.
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyHandle {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Liveness-checked lookup; `None` once the body has been swept.
    /// Tombstoned-but-unswept bodies still resolve.
    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut()
    }

    /// Borrow a body. Panics on a stale handle: handles are caller-tracked,
    /// never guessed, so a miss is a programming error.
    pub fn body(&self, handle: BodyHandle) -> &Body {
        match self.get(handle) {
            Some(body) => body,
            None => panic!("stale body handle {handle:?}"),
        }
    }

    /// Mutably borrow a body. Panics on a stale handle.
    pub fn body_mut(&mut self, handle: BodyHandle) -> &mut Body {
        match self.get_mut(handle) {
            Some(body) => body,
            None => panic!("stale body handle {handle:?}"),
        }
    }

    /// Tombstone a body: it stops participating in forces and collisions but
    /// stays allocated (and its handle valid) until the next `sweep`.
    /// Panics on a stale handle.
    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.body_mut(handle).mark_removed();
    }

    /// Free every tombstoned body and retire its handle generation. The only
    /// compaction point; never called from inside `tick`. Returns how many
    /// bodies were freed.
    pub fn sweep(&mut self) -> usize {
        let mut swept = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.body.as_ref().is_some_and(Body::is_removed) {
                slot.body = None;
                slot.generation += 1;
                self.free.push(index as u32);
                swept += 1;
            }
        }
        if swept > 0 {
            log::debug!("sweep freed {swept} bodies");
        }
        swept
    }

    /// Number of live (non-tombstoned) bodies
    pub fn body_count(&self) -> usize {
        self.iter().count()
    }

    /// Iterate live (non-tombstoned) bodies with their handles
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body
                .as_ref()
                .filter(|body| !body.is_removed())
                .map(|body| {
                    (
                        BodyHandle {
                            index: index as u32,
                            generation: slot.generation,
                        },
                        body,
                    )
                })
        })
    }

    /// Register continuous newtonian attraction between two bodies
    pub fn add_newtonian_gravity(&mut self, g: f32, a: BodyHandle, b: BodyHandle) {
        self.creators.push(ForceCreator::NewtonianGravity { g, a, b });
    }

    /// Register a destructive impact response between two bodies.
    /// `elasticity` is clamped to `[0, 1]`.
    pub fn add_destructive_collision(&mut self, elasticity: f32, a: BodyHandle, b: BodyHandle) {
        self.creators.push(ForceCreator::Impact {
            elasticity: elasticity.clamp(0.0, 1.0),
            a,
            b,
            in_contact: false,
        });
    }

    /// Register one-way support that catches `body` on top of `platform`
    pub fn add_platform_support(&mut self, platform: BodyHandle, body: BodyHandle) {
        self.creators.push(ForceCreator::PlatformSupport { platform, body });
    }

    /// Register a one-shot pickup sensor between `body` and `pickup`
    pub fn add_pickup_trigger(&mut self, body: BodyHandle, pickup: BodyHandle) {
        self.creators.push(ForceCreator::PickupTrigger { body, pickup });
    }

    pub fn creator_count(&self) -> usize {
        self.creators.len()
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Phases run in strict order: (1) continuous creators accumulate forces
    /// into live bodies, (2) every live finite-mass body integrates and its
    /// accumulator is consumed, (3) collision-triggered creators test and
    /// respond. Creators that find a bound body gone unregister themselves.
    /// Body storage is never resized or compacted during a tick.
    pub fn tick(&mut self, dt: f32) {
        let mut creators = std::mem::take(&mut self.creators);

        creators.retain_mut(|creator| creator.accumulate(self));

        for slot in &mut self.slots {
            if let Some(body) = slot.body.as_mut() {
                if !body.is_removed() {
                    body.integrate(dt);
                }
            }
        }

        creators.retain_mut(|creator| creator.respond(self));

        self.creators = creators;
    }

    /// Drain the responses fired since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Resolve two distinct handles to live, non-tombstoned bodies. Force
    /// creators route all body access through this; `None` is their signal
    /// to self-unregister.
    pub(crate) fn get_pair_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut Body, &mut Body)> {
        let (ia, ib) = (a.index as usize, b.index as usize);
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            return None;
        }
        if self.slots[ia].generation != a.generation || self.slots[ib].generation != b.generation {
            return None;
        }

        let (lo, hi) = (ia.min(ib), ia.max(ib));
        let (head, tail) = self.slots.split_at_mut(hi);
        let body_lo = head[lo].body.as_mut()?;
        let body_hi = tail[0].body.as_mut()?;
        if body_lo.is_removed() || body_hi.is_removed() {
            return None;
        }

        if ia < ib {
            Some((body_lo, body_hi))
        } else {
            Some((body_hi, body_lo))
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{Mass, Rgb, Tag};
    use crate::sim::polygon::Polygon;

    fn square_body(center: Vec2, mass: Mass) -> Body {
        Body::new(
            Polygon::rect(20.0, 20.0, center),
            mass,
            Rgb::new(0.5, 0.5, 0.5),
        )
    }

    #[test]
    fn test_add_get_roundtrip() {
        let mut scene = Scene::new();
        let handle = scene.add_body(square_body(Vec2::new(3.0, 4.0), Mass::finite(1.0)));
        assert_eq!(scene.body(handle).centroid(), Vec2::new(3.0, 4.0));
        assert_eq!(scene.body_count(), 1);
    }

    #[test]
    fn test_remove_tombstones_until_sweep() {
        let mut scene = Scene::new();
        let handle = scene.add_body(square_body(Vec2::ZERO, Mass::finite(1.0)));
        scene.remove_body(handle);

        // Still allocated and addressable, just excluded from simulation
        assert!(scene.body(handle).is_removed());
        assert_eq!(scene.body_count(), 0);

        assert_eq!(scene.sweep(), 1);
        assert!(scene.get(handle).is_none());
    }

    #[test]
    #[should_panic(expected = "stale body handle")]
    fn test_swept_handle_is_fatal() {
        let mut scene = Scene::new();
        let handle = scene.add_body(square_body(Vec2::ZERO, Mass::finite(1.0)));
        scene.remove_body(handle);
        scene.sweep();
        scene.body(handle);
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut scene = Scene::new();
        let old = scene.add_body(square_body(Vec2::ZERO, Mass::finite(1.0)));
        scene.remove_body(old);
        scene.sweep();

        let new = scene.add_body(square_body(Vec2::new(9.0, 9.0), Mass::finite(1.0)));
        assert_ne!(old, new);
        assert!(scene.get(old).is_none());
        assert_eq!(scene.body(new).centroid(), Vec2::new(9.0, 9.0));
    }

    #[test]
    fn test_tick_integrates_live_bodies_only() {
        let mut scene = Scene::new();
        let moving = scene.add_body(square_body(Vec2::ZERO, Mass::finite(1.0)));
        let dead = scene.add_body(square_body(Vec2::new(100.0, 0.0), Mass::finite(1.0)));

        scene.body_mut(moving).set_velocity(Vec2::new(10.0, 0.0));
        scene.body_mut(dead).set_velocity(Vec2::new(10.0, 0.0));
        scene.remove_body(dead);

        scene.tick(0.5);

        assert!((scene.body(moving).centroid().x - 5.0).abs() < 1e-6);
        assert_eq!(scene.body(dead).centroid(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_infinite_mass_body_is_immovable_under_forces() {
        let mut scene = Scene::new();
        let anchor = scene.add_body(square_body(Vec2::ZERO, Mass::Infinite));
        for _ in 0..50 {
            scene.body_mut(anchor).add_force(Vec2::new(0.0, -1e6));
            scene.tick(1.0 / 60.0);
        }
        assert_eq!(scene.body(anchor).velocity(), Vec2::ZERO);
        assert_eq!(scene.body(anchor).centroid(), Vec2::ZERO);
    }

    #[test]
    fn test_iter_skips_tombstoned() {
        let mut scene = Scene::new();
        let a = scene.add_body(square_body(Vec2::ZERO, Mass::finite(1.0)));
        let b = scene.add_body(square_body(Vec2::new(50.0, 0.0), Mass::finite(1.0)));
        scene.remove_body(a);

        let handles: Vec<_> = scene.iter().map(|(h, _)| h).collect();
        assert_eq!(handles, vec![b]);
    }

    #[test]
    fn test_events_drain_once() {
        let mut scene = Scene::new();
        let a = scene.add_body(square_body(Vec2::ZERO, Mass::finite(1.0)));
        let b = scene.add_body(square_body(Vec2::new(5.0, 0.0), Mass::finite(1.0)));
        scene.add_destructive_collision(1.0, a, b);

        scene.tick(1.0 / 120.0);
        let events = scene.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SimEvent::Impact { .. }));
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_bodies_keep_tag() {
        let mut scene = Scene::new();
        let handle = scene.add_body(Body::with_tag(
            Polygon::regular(16, 15.0, Vec2::ZERO),
            Mass::finite(0.0001),
            Rgb::new(0.0, 1.0, 0.0),
            Tag::Powerup,
        ));
        assert_eq!(scene.body(handle).tag(), Tag::Powerup);
    }
}
