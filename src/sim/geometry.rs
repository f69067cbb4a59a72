//! Overlap and containment predicates
//!
//! Pure functions on primitive coordinates. The edge cases are part of the
//! contract: rectangle containment is closed on every side, while rectangle
//! overlap treats an exact touch on the second rectangle's near edge as a
//! miss. Motion resolution relies on that asymmetry to park a mover flush
//! against an obstacle.

/// Closed-interval containment: edges and corners count as inside
#[inline]
pub fn rect_contains_point(rx: f32, ry: f32, rw: f32, rh: f32, px: f32, py: f32) -> bool {
    rx <= px && px <= rx + rw && ry <= py && py <= ry + rh
}

/// Rectangle overlap with the asymmetric edge tie-break
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn rect_intersects_rect(
    ax: f32,
    ay: f32,
    aw: f32,
    ah: f32,
    bx: f32,
    by: f32,
    bw: f32,
    bh: f32,
) -> bool {
    !(ax > bx + bw || bx >= ax + aw || ay > by + bh || by >= ay + ah)
}

/// Strict containment: a point on the circumference is outside
#[inline]
pub fn circle_contains_point(cx: f32, cy: f32, r: f32, px: f32, py: f32) -> bool {
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy < r * r
}

/// Strict overlap: tangent circles do not intersect
#[inline]
pub fn circle_intersects_circle(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = bx - ax;
    let dy = by - ay;
    let reach = ar + br;
    dx * dx + dy * dy < reach * reach
}

/// Clamp the circle center into the rectangle and compare against the radius
#[inline]
pub fn rect_intersects_circle(
    rx: f32,
    ry: f32,
    rw: f32,
    rh: f32,
    cx: f32,
    cy: f32,
    r: f32,
) -> bool {
    let nearest_x = cx.clamp(rx, rx + rw);
    let nearest_y = cy.clamp(ry, ry + rh);
    let dx = cx - nearest_x;
    let dy = cy - nearest_y;
    dx * dx + dy * dy < r * r
}
