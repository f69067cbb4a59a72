//! Motion resolution against solid instances
//!
//! Movers advance by `speed` along `direction` each step. Each axis is
//! resolved on its own against the solid instances of the mover's layer:
//! a blocked axis backs off one unit at a time until it is free or zero.
//! Resolving X before Y lets a mover slide along a wall it hits diagonally.
//!
//! After the step callback ran, a mover that changed position dispatches its
//! collision handlers against every live instance it now overlaps.

use std::rc::Rc;

use glam::Vec2;

use super::context::StepContext;
use super::index::InstanceIndex;
use super::state::{Instance, InstanceId};
use crate::{length_direction_x, length_direction_y};

/// Integer displacement for one axis
///
/// Pre-scaling by 10 absorbs trig noise such as `cos(90°)` before the final
/// rounding to whole units.
#[inline]
fn axis_delta(component: f32) -> f32 {
    ((component * 10.0).round() / 10.0).round()
}

/// Largest magnitude not exceeding `|delta|`, stepping down by one unit,
/// for which `is_free` holds; zero if none does
fn resolve_axis(delta: f32, mut is_free: impl FnMut(f32) -> bool) -> f32 {
    let sign = delta.signum();
    // Count in integers: past 2^24 an f32 no longer changes when 1 is
    // subtracted
    let steps = delta.abs() as u64;
    (1..=steps)
        .rev()
        .map(|magnitude| sign * magnitude as f32)
        .find(|&candidate| is_free(candidate))
        .unwrap_or(0.0)
}

/// Move the instance for this step
///
/// `solids` must not contain the instance itself.
pub(crate) fn before_step(instance: &mut Instance, solids: &InstanceIndex) {
    let Some(motion) = instance.motion.as_mut() else {
        return;
    };
    motion.previous = instance.pos;
    if motion.speed == 0.0 {
        return;
    }

    let dx = axis_delta(length_direction_x(motion.speed, motion.direction));
    let dy = axis_delta(length_direction_y(motion.speed, motion.direction));

    let base = instance.pos.round();
    let Some(shape) = instance.definition().boundary().copied() else {
        // Nothing to collide with
        instance.pos = base + Vec2::new(dx, dy);
        return;
    };

    let moved_x = resolve_axis(dx, |d| !solids.any_solid_within(&shape.at(base.x + d, base.y)));
    let x = base.x + moved_x;
    let moved_y = resolve_axis(dy, |d| !solids.any_solid_within(&shape.at(x, base.y + d)));
    let y = base.y + moved_y;

    if moved_x != dx || moved_y != dy {
        log::trace!(
            "{} blocked: wanted ({dx}, {dy}), moved ({moved_x}, {moved_y})",
            instance.id()
        );
    }
    instance.pos = Vec2::new(x, y);
}

/// Dispatch collision handlers for a mover that changed position
pub(crate) fn after_step(instance: &mut Instance, ctx: &mut StepContext<'_>) {
    let Some(motion) = instance.motion else {
        return;
    };
    if instance.pos == motion.previous || instance.boundary().is_none() {
        return;
    }

    let def = Rc::clone(instance.definition());
    for (other_name, handler) in def.collision_handlers() {
        let candidates: Vec<InstanceId> = ctx
            .instances()
            .of_actor(other_name)
            .map(|other| other.id())
            .collect();

        for other in candidates {
            if ctx.is_destroyed(instance) {
                return;
            }
            let overlapping = match (instance.boundary(), ctx.instance(other)) {
                (Some(own), Some(o)) if o.is_live() => {
                    o.boundary().is_some_and(|b| own.collides_with(&b))
                }
                _ => false,
            };
            if overlapping && ctx.claim_pair(instance.id(), other) {
                handler(ctx, instance, other);
            }
        }
    }
}
