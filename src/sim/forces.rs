//! Built-in force creators
//!
//! A force creator is a per-tick effect bound to the bodies it acts on.
//! Continuous creators add into force accumulators every tick; collision-
//! triggered creators run a pairwise separating-axis test and fire a
//! response on a hit. Creators hold body handles, never references: when a
//! bound body is tombstoned or swept, the creator unregisters itself on its
//! next evaluation instead of touching a dead body.

use glam::Vec2;

use super::body::Body;
use super::collision::find_collision;
use super::scene::{BodyHandle, Scene, SimEvent};

/// A registered per-tick effect, dispatched by `Scene::tick`
#[derive(Debug, Clone)]
pub enum ForceCreator {
    /// Continuous attraction `G·mA·mB / d²` along the line joining the
    /// centroids, applied equal-and-opposite to both bodies
    NewtonianGravity {
        g: f32,
        a: BodyHandle,
        b: BodyHandle,
    },
    /// Repeatable impulse response along the axis of least penetration.
    /// `in_contact` latches a detected overlap so the response fires once
    /// per new overlap, not every tick of a persisting one.
    Impact {
        elasticity: f32,
        a: BodyHandle,
        b: BodyHandle,
        in_contact: bool,
    },
    /// One-way support: catches `body` on the platform's upper surface
    /// while it is moving downward
    PlatformSupport {
        platform: BodyHandle,
        body: BodyHandle,
    },
    /// One-shot overlap sensor: consumes the pickup and unregisters
    PickupTrigger {
        body: BodyHandle,
        pickup: BodyHandle,
    },
}

impl ForceCreator {
    /// Continuous force application (tick phase 1). Returns `false` to
    /// unregister.
    pub(crate) fn accumulate(&mut self, scene: &mut Scene) -> bool {
        match self {
            ForceCreator::NewtonianGravity { g, a, b } => {
                let min_dist = scene.config().min_gravity_distance;
                let Some((body_a, body_b)) = scene.get_pair_mut(*a, *b) else {
                    log::debug!("gravity creator unregistered: bound body gone");
                    return false;
                };

                let (mass_a, mass_b) = (body_a.mass(), body_b.mass());
                if mass_a.is_infinite() || mass_b.is_infinite() {
                    return true;
                }
                let delta = body_b.centroid() - body_a.centroid();
                let dist = delta.length();
                if dist < min_dist {
                    // Skip the tick rather than diverge
                    return true;
                }

                let magnitude = *g * mass_a.value() * mass_b.value() / (dist * dist);
                let direction = delta / dist;
                body_a.add_force(direction * magnitude);
                body_b.add_force(-direction * magnitude);
                true
            }
            // Collision-triggered creators act in the collision pass
            _ => true,
        }
    }

    /// Collision test and response (tick phase 3). Returns `false` to
    /// unregister.
    pub(crate) fn respond(&mut self, scene: &mut Scene) -> bool {
        match self {
            ForceCreator::NewtonianGravity { .. } => true,

            ForceCreator::Impact {
                elasticity,
                a,
                b,
                in_contact,
            } => {
                let Some((body_a, body_b)) = scene.get_pair_mut(*a, *b) else {
                    log::debug!("impact creator unregistered: bound body gone");
                    return false;
                };
                match find_collision(body_a.shape(), body_b.shape()) {
                    Some(hit) => {
                        if !*in_contact {
                            *in_contact = true;
                            apply_impulse(body_a, body_b, hit.axis, *elasticity);
                            scene.push_event(SimEvent::Impact {
                                a: *a,
                                b: *b,
                                axis: hit.axis,
                                overlap: hit.overlap,
                            });
                        }
                    }
                    None => *in_contact = false,
                }
                true
            }

            ForceCreator::PlatformSupport { platform, body } => {
                let Some((plat, bod)) = scene.get_pair_mut(*platform, *body) else {
                    log::debug!("platform support unregistered: bound body gone");
                    return false;
                };
                // No effect while separating or moving upward
                if bod.velocity().y >= 0.0 {
                    return true;
                }
                if find_collision(plat.shape(), bod.shape()).is_none() {
                    return true;
                }

                let lift = plat.shape().max_y() - bod.shape().min_y();
                if lift > 0.0 {
                    bod.translate(Vec2::new(0.0, lift));
                }
                let v = bod.velocity();
                bod.set_velocity(Vec2::new(v.x, 0.0));
                scene.push_event(SimEvent::Landed {
                    body: *body,
                    platform: *platform,
                });
                true
            }

            ForceCreator::PickupTrigger { body, pickup } => {
                let Some((bod, pick)) = scene.get_pair_mut(*body, *pickup) else {
                    log::debug!("pickup trigger unregistered: bound body gone");
                    return false;
                };
                if find_collision(bod.shape(), pick.shape()).is_none() {
                    return true;
                }

                pick.mark_removed();
                scene.push_event(SimEvent::PickupCollected {
                    body: *body,
                    pickup: *pickup,
                });
                // One-shot: a consumed pickup can never fire again
                false
            }
        }
    }
}

/// 1D impulse along the axis of least penetration. `elasticity` of 1
/// conserves kinetic energy and momentum; 0 leaves both bodies with a shared
/// velocity along the axis. Immovable bodies take no velocity change.
fn apply_impulse(a: &mut Body, b: &mut Body, axis: Vec2, elasticity: f32) {
    let inv_sum = a.mass().inverse() + b.mass().inverse();
    if inv_sum == 0.0 {
        return;
    }
    let approach = (b.velocity() - a.velocity()).dot(axis);
    if approach >= 0.0 {
        // Overlapping but already separating along the axis
        return;
    }
    let impulse = -(1.0 + elasticity) * approach / inv_sum;
    let delta = axis * impulse;
    a.set_velocity(a.velocity() - delta * a.mass().inverse());
    b.set_velocity(b.velocity() + delta * b.mass().inverse());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{Mass, Rgb};
    use crate::sim::polygon::Polygon;
    use crate::sim::scene::Scene;

    const DT: f32 = 1.0 / 120.0;

    fn square(center: Vec2, side: f32, mass: Mass) -> Body {
        Body::new(
            Polygon::rect(side, side, center),
            mass,
            Rgb::new(1.0, 1.0, 1.0),
        )
    }

    #[test]
    fn test_gravity_magnitude_and_opposition() {
        let mut scene = Scene::new();
        let a = scene.add_body(square(Vec2::ZERO, 2.0, Mass::finite(2.0)));
        let b = scene.add_body(square(Vec2::new(4.0, 0.0), 2.0, Mass::finite(8.0)));
        scene.add_newtonian_gravity(1.0, a, b);

        scene.tick(DT);

        // F = G * mA * mB / d^2 = 1 * 2 * 8 / 16 = 1, attraction along +x
        let va = scene.body(a).velocity();
        let vb = scene.body(b).velocity();
        assert!((va.x - DT / 2.0).abs() < 1e-6);
        assert!((vb.x + DT / 8.0).abs() < 1e-6);
        assert!(va.y.abs() < 1e-9 && vb.y.abs() < 1e-9);
        // Equal and opposite momentum change
        assert!((2.0 * va.x + 8.0 * vb.x).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_skips_below_min_distance() {
        let mut scene = Scene::new();
        let a = scene.add_body(square(Vec2::ZERO, 2.0, Mass::finite(1.0)));
        let b = scene.add_body(square(Vec2::ZERO, 2.0, Mass::finite(1.0)));
        scene.add_newtonian_gravity(100.0, a, b);

        scene.tick(DT);

        assert_eq!(scene.body(a).velocity(), Vec2::ZERO);
        assert_eq!(scene.body(b).velocity(), Vec2::ZERO);
        assert!(scene.body(a).velocity().is_finite());
        assert_eq!(scene.creator_count(), 1);
    }

    #[test]
    fn test_gravity_skips_infinite_mass() {
        let mut scene = Scene::new();
        let anchor = scene.add_body(square(Vec2::ZERO, 2.0, Mass::Infinite));
        let b = scene.add_body(square(Vec2::new(10.0, 0.0), 2.0, Mass::finite(1.0)));
        scene.add_newtonian_gravity(1.0, anchor, b);

        scene.tick(DT);

        assert_eq!(scene.body(b).velocity(), Vec2::ZERO);
        assert_eq!(scene.creator_count(), 1);
    }

    #[test]
    fn test_gravity_unregisters_on_tombstoned_body() {
        let mut scene = Scene::new();
        let a = scene.add_body(square(Vec2::ZERO, 2.0, Mass::finite(1.0)));
        let b = scene.add_body(square(Vec2::new(10.0, 0.0), 2.0, Mass::finite(1.0)));
        scene.add_newtonian_gravity(1.0, a, b);

        scene.remove_body(b);
        scene.tick(DT);

        assert_eq!(scene.creator_count(), 0);
        assert_eq!(scene.body(a).velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_elastic_impact_exchanges_equal_mass_velocities() {
        let mut scene = Scene::new();
        let a = scene.add_body(square(Vec2::ZERO, 20.0, Mass::finite(3.0)));
        let b = scene.add_body(square(Vec2::new(18.0, 0.0), 20.0, Mass::finite(3.0)));
        scene.body_mut(a).set_velocity(Vec2::new(50.0, 0.0));
        scene.body_mut(b).set_velocity(Vec2::new(-50.0, 0.0));
        scene.add_destructive_collision(1.0, a, b);

        scene.tick(DT);

        assert!((scene.body(a).velocity().x + 50.0).abs() < 1e-3);
        assert!((scene.body(b).velocity().x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_inelastic_impact_shares_velocity() {
        let mut scene = Scene::new();
        let a = scene.add_body(square(Vec2::ZERO, 20.0, Mass::finite(5.0)));
        let b = scene.add_body(square(Vec2::new(18.0, 0.0), 20.0, Mass::finite(5.0)));
        scene.body_mut(a).set_velocity(Vec2::new(10.0, 0.0));
        scene.body_mut(b).set_velocity(Vec2::new(-10.0, 0.0));
        scene.add_destructive_collision(0.0, a, b);

        scene.tick(DT);

        assert!(scene.body(a).velocity().x.abs() < 1e-3);
        assert!(scene.body(b).velocity().x.abs() < 1e-3);
    }

    #[test]
    fn test_impact_against_immovable_body_reflects() {
        let mut scene = Scene::new();
        let wall = scene.add_body(square(Vec2::new(18.0, 0.0), 20.0, Mass::Infinite));
        let ball = scene.add_body(square(Vec2::ZERO, 20.0, Mass::finite(1.0)));
        scene.body_mut(ball).set_velocity(Vec2::new(40.0, 0.0));
        scene.add_destructive_collision(1.0, ball, wall);

        scene.tick(DT);

        assert!((scene.body(ball).velocity().x + 40.0).abs() < 1e-3);
        assert_eq!(scene.body(wall).velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_impact_fires_once_per_new_overlap() {
        let mut scene = Scene::new();
        let a = scene.add_body(square(Vec2::ZERO, 20.0, Mass::finite(1.0)));
        let b = scene.add_body(square(Vec2::new(18.0, 0.0), 20.0, Mass::finite(1.0)));
        scene.body_mut(a).set_velocity(Vec2::new(20.0, 0.0));
        scene.body_mut(b).set_velocity(Vec2::new(-20.0, 0.0));
        scene.add_destructive_collision(1.0, a, b);

        scene.tick(DT);
        assert_eq!(scene.drain_events().len(), 1);

        // Still interpenetrating: the latched response must not re-fire
        scene.tick(DT);
        assert!(scene.drain_events().is_empty());

        // Separate, then re-collide: a fresh overlap fires again
        scene.body_mut(b).set_centroid(Vec2::new(100.0, 0.0));
        scene.tick(DT);
        assert!(scene.drain_events().is_empty());

        scene.body_mut(b).set_centroid(Vec2::new(18.0, 0.0));
        scene.body_mut(a).set_velocity(Vec2::new(20.0, 0.0));
        scene.body_mut(b).set_velocity(Vec2::new(-20.0, 0.0));
        scene.tick(DT);
        assert_eq!(scene.drain_events().len(), 1);
    }

    #[test]
    fn test_platform_catches_falling_body() {
        let mut scene = Scene::new();
        let platform = scene.add_body(square(Vec2::new(0.0, 10.0), 20.0, Mass::Infinite));
        let faller = scene.add_body(square(Vec2::new(0.0, 40.0), 20.0, Mass::finite(1.0)));
        scene.body_mut(faller).set_velocity(Vec2::new(5.0, -120.0));
        scene.add_platform_support(platform, faller);

        let mut landed = false;
        for _ in 0..60 {
            scene.tick(DT);
            landed |= scene
                .drain_events()
                .iter()
                .any(|e| matches!(e, SimEvent::Landed { .. }));
        }

        assert!(landed);
        let body = scene.body(faller);
        // Flush on the platform's upper surface, downward motion cancelled
        assert!((body.shape().min_y() - 20.0).abs() < 1e-3);
        assert_eq!(body.velocity().y, 0.0);
        // Horizontal motion is untouched
        assert!((body.velocity().x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_platform_ignores_rising_body() {
        let mut scene = Scene::new();
        let platform = scene.add_body(square(Vec2::new(0.0, 10.0), 20.0, Mass::Infinite));
        let jumper = scene.add_body(square(Vec2::new(0.0, 25.0), 20.0, Mass::finite(1.0)));
        scene.body_mut(jumper).set_velocity(Vec2::new(0.0, 60.0));
        scene.add_platform_support(platform, jumper);

        scene.tick(DT);

        assert!(scene.drain_events().is_empty());
        assert!((scene.body(jumper).velocity().y - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_tunneling_at_large_dt() {
        // 20x20 body over a static platform, large steps: the body must
        // never end a tick fully past the platform's upper surface.
        let mut scene = Scene::new();
        let platform = scene.add_body(square(Vec2::new(0.0, 10.0), 20.0, Mass::Infinite));
        let faller = scene.add_body(square(Vec2::new(0.0, 50.0), 20.0, Mass::finite(1.0)));
        scene.body_mut(faller).set_velocity(Vec2::new(0.0, -80.0));
        scene.add_platform_support(platform, faller);

        let platform_top = scene.body(platform).shape().max_y();
        for _ in 0..10 {
            scene.tick(0.3);
            assert!(scene.body(faller).shape().max_y() >= platform_top);
        }
        assert!((scene.body(faller).shape().min_y() - platform_top).abs() < 1e-3);
    }

    #[test]
    fn test_pickup_fires_exactly_once() {
        let mut scene = Scene::new();
        let player = scene.add_body(square(Vec2::ZERO, 20.0, Mass::finite(1.0)));
        let powerup = scene.add_body(Body::with_tag(
            Polygon::regular(16, 8.0, Vec2::new(5.0, 0.0)),
            Mass::finite(0.0001),
            Rgb::new(0.0, 1.0, 0.0),
            crate::sim::body::Tag::Powerup,
        ));
        scene.add_pickup_trigger(player, powerup);

        scene.tick(DT);
        let events = scene.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SimEvent::PickupCollected { .. }));
        assert!(scene.body(powerup).is_removed());
        assert_eq!(scene.creator_count(), 0);

        // Re-running the collision pass on the still-overlapping pair
        scene.tick(DT);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_pickup_trigger_unregisters_without_firing_if_pickup_gone() {
        let mut scene = Scene::new();
        let player = scene.add_body(square(Vec2::ZERO, 20.0, Mass::finite(1.0)));
        let powerup = scene.add_body(square(Vec2::new(100.0, 0.0), 10.0, Mass::finite(0.0001)));
        scene.add_pickup_trigger(player, powerup);

        scene.remove_body(powerup);
        scene.sweep();
        scene.tick(DT);

        assert!(scene.drain_events().is_empty());
        assert_eq!(scene.creator_count(), 0);
    }
}
