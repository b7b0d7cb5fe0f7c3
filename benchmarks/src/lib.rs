//! Scene builders and a brute-force circle narrow phase shared by the benches.

use rein_contact::glam::DVec2;
use rein_contact::{
    ArbiterError, Body, ContactConfig, ContactPoint, ContactWorld, ManifoldGeometry,
    Narrowphase, NarrowphaseContext, Shape, ShapeId, ShapeKind, Side,
};

pub const DT: f64 = 1.0 / 60.0;
pub const RADIUS: f64 = 0.5;

/// Every circle against every other circle, plus the ground plane `y <= 0`.
pub struct CircleScene {
    pub floor: ShapeId,
    pub circles: Vec<ShapeId>,
}

impl CircleScene {
    fn centre(ctx: &NarrowphaseContext<'_>, shape: ShapeId) -> Option<(DVec2, DVec2, f64)> {
        let shape = ctx.shape(shape)?;
        let body = ctx.body(shape.body)?;
        let local = match shape.kind {
            ShapeKind::Circle { center, .. } => center,
            ShapeKind::Polygon { .. } => DVec2::ZERO,
        };
        Some((body.local_to_world(local), local, shape.radius()))
    }

    fn collide_ground(
        &self,
        ctx: &mut NarrowphaseContext<'_>,
        circle: ShapeId,
    ) -> Result<(), ArbiterError> {
        let Some((centre, _, radius)) = Self::centre(ctx, circle) else {
            return Ok(());
        };
        let dist = centre.y - radius;
        if dist > 0.0 {
            return Ok(());
        }
        let key = ctx.pair(self.floor, circle)?;
        let (reference, normal) = if ctx.is_first(key, self.floor) {
            (Side::First, DVec2::Y)
        } else {
            (Side::Second, -DVec2::Y)
        };
        ctx.set_geometry(
            key,
            ManifoldGeometry::Edge {
                reference,
                local_normal: DVec2::Y,
                local_projection: 0.0,
                radius,
            },
        )?;
        let point = ContactPoint::new(DVec2::new(centre.x, 0.5 * dist), normal, dist, 0);
        ctx.inject_contact(key, point)?;
        Ok(())
    }

    fn collide_pair(
        ctx: &mut NarrowphaseContext<'_>,
        a: ShapeId,
        b: ShapeId,
    ) -> Result<(), ArbiterError> {
        let (Some((ca, la, ra)), Some((cb, lb, rb))) = (Self::centre(ctx, a), Self::centre(ctx, b))
        else {
            return Ok(());
        };
        let delta = cb - ca;
        let len = delta.length();
        let dist = len - ra - rb;
        if dist > 0.0 || len <= f64::EPSILON {
            return Ok(());
        }

        let key = ctx.pair(a, b)?;
        let n = delta / len;
        let (normal, geometry) = if ctx.is_first(key, a) {
            (
                n,
                ManifoldGeometry::Circles {
                    local1: la,
                    radius1: ra,
                    local2: lb,
                    radius2: rb,
                },
            )
        } else {
            (
                -n,
                ManifoldGeometry::Circles {
                    local1: lb,
                    radius1: rb,
                    local2: la,
                    radius2: ra,
                },
            )
        };
        ctx.set_geometry(key, geometry)?;
        let position = ca + n * (ra + 0.5 * dist);
        ctx.inject_contact(key, ContactPoint::new(position, normal, dist, 0))?;
        Ok(())
    }
}

impl Narrowphase for CircleScene {
    fn collide(&mut self, ctx: &mut NarrowphaseContext<'_>) -> Result<(), ArbiterError> {
        for (i, &a) in self.circles.iter().enumerate() {
            self.collide_ground(ctx, a)?;
            for &b in &self.circles[i + 1..] {
                Self::collide_pair(ctx, a, b)?;
            }
        }
        Ok(())
    }
}

/// `columns` stacks of `height` circles resting on the ground, slightly overlapping.
pub fn setup_stacks(columns: usize, height: usize) -> anyhow::Result<(ContactWorld, CircleScene)> {
    let mut world = ContactWorld::new(ContactConfig::default())?;
    let ground = world.add_body(Body::new_static());
    let floor = world.add_shape(Shape::rect(ground, DVec2::new(1000.0, 0.5)))?;

    let inertia = 0.5 * RADIUS * RADIUS;
    let mut circles = Vec::with_capacity(columns * height);
    for column in 0..columns {
        let x = column as f64 * 4.0 * RADIUS;
        for row in 0..height {
            let y = RADIUS + row as f64 * (2.0 * RADIUS - 0.01) - 0.01;
            let body =
                world.add_body(Body::new_dynamic(1.0, inertia).with_position(DVec2::new(x, y)));
            circles.push(world.add_shape(Shape::circle(body, DVec2::ZERO, RADIUS))?);
        }
    }
    Ok((world, CircleScene { floor, circles }))
}

/// A stacked scene after `warmup` steps, so arbiters and caches are populated.
pub fn setup_settled(
    columns: usize,
    height: usize,
    warmup: usize,
) -> anyhow::Result<(ContactWorld, CircleScene)> {
    let (mut world, mut scene) = setup_stacks(columns, height)?;
    for _ in 0..warmup {
        world.fixed_step(DT, &mut scene)?;
    }
    Ok((world, scene))
}
