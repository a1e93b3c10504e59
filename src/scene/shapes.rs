//! Tessellation of the primitive shapes used by procedural assemblies.
//!
//! Conventions follow the usual real-time 3D defaults: shapes are centred on
//! the origin, cylinders and cones run along +Y, tori lie in the XY plane.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::Geometry;

pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) * 0.5;
    // (normal, u, v) with u × v = normal so each quad winds outward.
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    let mut g = Geometry::default();
    for (n, u, v) in faces {
        let base = g.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            g.positions.push((n + u * su + v * sv) * half);
            g.normals.push(n);
        }
        g.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    g
}

pub fn cylinder_geometry(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    segments: u32,
) -> Geometry {
    let segments = segments.max(3);
    let half_h = height * 0.5;
    let slope = if height.abs() > f32::EPSILON {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };
    let mut g = Geometry::default();

    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (s, c) = theta.sin_cos();
        let n = Vec3::new(s, slope, c).normalize();
        g.positions.push(Vec3::new(radius_top * s, half_h, radius_top * c));
        g.normals.push(n);
        g.positions
            .push(Vec3::new(radius_bottom * s, -half_h, radius_bottom * c));
        g.normals.push(n);
    }
    for i in 0..segments {
        let top = 2 * i;
        let bottom = top + 1;
        let next_top = top + 2;
        let next_bottom = top + 3;
        g.indices
            .extend_from_slice(&[top, bottom, next_top, bottom, next_bottom, next_top]);
    }

    for (radius, y, normal) in [(radius_top, half_h, Vec3::Y), (radius_bottom, -half_h, Vec3::NEG_Y)] {
        if radius <= 0.0 {
            continue;
        }
        let center = g.positions.len() as u32;
        g.positions.push(Vec3::new(0.0, y, 0.0));
        g.normals.push(normal);
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            g.positions.push(Vec3::new(radius * s, y, radius * c));
            g.normals.push(normal);
        }
        for i in 0..segments {
            let a = center + 1 + i;
            let b = a + 1;
            if normal.y > 0.0 {
                g.indices.extend_from_slice(&[center, a, b]);
            } else {
                g.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }
    g
}

pub fn cone_geometry(radius: f32, height: f32, segments: u32) -> Geometry {
    cylinder_geometry(0.0, radius, height, segments)
}

pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut g = Geometry::default();
    for y in 0..=hs {
        let phi = y as f32 / hs as f32 * PI;
        for x in 0..=ws {
            let theta = x as f32 / ws as f32 * TAU;
            let n = Vec3::new(
                -theta.cos() * phi.sin(),
                phi.cos(),
                theta.sin() * phi.sin(),
            );
            g.positions.push(n * radius);
            g.normals.push(n);
        }
    }
    let row = ws + 1;
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                g.indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                g.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    g
}

pub fn torus_geometry(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> Geometry {
    let rs = radial_segments.max(3);
    let ts = tubular_segments.max(3);
    let mut g = Geometry::default();
    for j in 0..=rs {
        let v = j as f32 / rs as f32 * TAU;
        for i in 0..=ts {
            let u = i as f32 / ts as f32 * TAU;
            let p = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            g.positions.push(p);
            g.normals.push((p - center).normalize_or_zero());
        }
    }
    let row = ts + 1;
    for j in 1..=rs {
        for i in 1..=ts {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            g.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    g
}
