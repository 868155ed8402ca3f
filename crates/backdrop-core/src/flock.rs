//! Boids-style particle flock used by the built-in canvas engine.
//!
//! Positions are in CSS pixels inside `bounds`; the field wraps at the
//! edges. Neighbour lookups go through a uniform grid rebuilt every step.

use crate::constants::*;
use crate::policy::RenderParameters;
use fnv::FnvHashMap;
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Pair of particle indices closer than the connect distance, with an
/// opacity that fades out towards that distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: u32,
    pub b: u32,
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Weights {
    separation: f32,
    alignment: f32,
    cohesion: f32,
    min_speed: f32,
    max_speed: f32,
}

impl Weights {
    fn from_params(p: &RenderParameters) -> Self {
        let cruise = FLOCK_BASE_SPEED * p.speed.max(0.05);
        Self {
            separation: p.separation * 0.5,
            alignment: p.alignment * 0.01,
            cohesion: p.cohesion * 0.002,
            min_speed: cruise * 0.4,
            max_speed: cruise * 1.5,
        }
    }
}

type Cell = (i32, i32);

pub struct Flock {
    particles: Vec<Particle>,
    bounds: Vec2,
    weights: Weights,
    size: f32,
    connect_lines: bool,
    grid: FnvHashMap<Cell, SmallVec<[u32; 8]>>,
    links: Vec<Link>,
}

impl Flock {
    pub fn new(params: &RenderParameters, bounds: Vec2, seed: u64) -> Self {
        let bounds = bounds.max(Vec2::ONE);
        let weights = Weights::from_params(params);
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..params.particle_count.max(1))
            .map(|_| {
                let pos = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                let speed = weights.min_speed + rng.gen::<f32>() * (weights.max_speed - weights.min_speed);
                Particle {
                    pos,
                    vel: Vec2::from_angle(angle) * speed,
                }
            })
            .collect();
        let mut flock = Self {
            particles,
            bounds,
            weights,
            size: params.size,
            connect_lines: params.features.connect_lines,
            grid: FnvHashMap::default(),
            links: Vec::new(),
        };
        flock.rebuild_grid();
        flock
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn particle_size(&self) -> f32 {
        self.size
    }

    /// Rescale positions into new bounds so the distribution survives resize.
    pub fn resize(&mut self, bounds: Vec2) {
        let bounds = bounds.max(Vec2::ONE);
        let scale = bounds / self.bounds;
        for p in &mut self.particles {
            p.pos = (p.pos * scale).clamp(Vec2::ZERO, bounds - Vec2::splat(f32::EPSILON));
        }
        self.bounds = bounds;
        self.rebuild_grid();
    }

    pub fn step(&mut self, dt: Duration, pointer: Option<Vec2>) {
        let dt = dt.as_secs_f32().min(FLOCK_MAX_DT_SEC);
        if dt <= 0.0 {
            return;
        }
        let w = self.weights;
        let radius_sq = FLOCK_NEIGHBOR_RADIUS * FLOCK_NEIGHBOR_RADIUS;
        let mut accel = vec![Vec2::ZERO; self.particles.len()];

        for (i, acc) in accel.iter_mut().enumerate() {
            let me = self.particles[i];
            let mut push = Vec2::ZERO;
            let mut vel_sum = Vec2::ZERO;
            let mut pos_sum = Vec2::ZERO;
            let mut n = 0u32;
            self.for_each_near(me.pos, |j| {
                if j as usize == i {
                    return;
                }
                let other = self.particles[j as usize];
                let d = me.pos - other.pos;
                let dist_sq = d.length_squared();
                if dist_sq > radius_sq || dist_sq < 1e-6 {
                    return;
                }
                push += d / dist_sq;
                vel_sum += other.vel;
                pos_sum += other.pos;
                n += 1;
            });
            if n > 0 {
                let inv = 1.0 / n as f32;
                *acc += push * w.separation * FLOCK_BASE_SPEED;
                *acc += (vel_sum * inv - me.vel) * w.alignment;
                *acc += (pos_sum * inv - me.pos) * w.cohesion;
            }
            if let Some(target) = pointer {
                let to = target - me.pos;
                let dist = to.length();
                if dist > 1.0 && dist < FLOCK_CONNECT_DISTANCE * 2.0 {
                    *acc += to / dist * FLOCK_BASE_SPEED * FLOCK_POINTER_PULL;
                }
            }
        }

        let bounds = self.bounds;
        for (p, a) in self.particles.iter_mut().zip(accel) {
            p.vel += a * dt;
            let speed = p.vel.length();
            if speed > w.max_speed {
                p.vel *= w.max_speed / speed;
            } else if speed < w.min_speed {
                p.vel = if speed > 1e-4 {
                    p.vel * (w.min_speed / speed)
                } else {
                    Vec2::X * w.min_speed
                };
            }
            p.pos += p.vel * dt;
            p.pos.x = p.pos.x.rem_euclid(bounds.x);
            p.pos.y = p.pos.y.rem_euclid(bounds.y);
        }

        self.rebuild_grid();
    }

    fn cell_of(pos: Vec2) -> Cell {
        (
            (pos.x / FLOCK_CONNECT_DISTANCE).floor() as i32,
            (pos.y / FLOCK_CONNECT_DISTANCE).floor() as i32,
        )
    }

    fn for_each_near(&self, pos: Vec2, mut f: impl FnMut(u32)) {
        let (cx, cy) = Self::cell_of(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(bucket) = self.grid.get(&(cx + dx, cy + dy)) {
                    for &j in bucket {
                        f(j);
                    }
                }
            }
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (i, p) in self.particles.iter().enumerate() {
            self.grid.entry(Self::cell_of(p.pos)).or_default().push(i as u32);
        }
        self.links.clear();
        if !self.connect_lines {
            return;
        }
        let max_sq = FLOCK_CONNECT_DISTANCE * FLOCK_CONNECT_DISTANCE;
        let mut links = std::mem::take(&mut self.links);
        for (i, p) in self.particles.iter().enumerate() {
            let i = i as u32;
            self.for_each_near(p.pos, |j| {
                if j <= i {
                    return;
                }
                let dist_sq = p.pos.distance_squared(self.particles[j as usize].pos);
                if dist_sq < max_sq {
                    links.push(Link {
                        a: i,
                        b: j,
                        alpha: 1.0 - dist_sq.sqrt() / FLOCK_CONNECT_DISTANCE,
                    });
                }
            });
        }
        self.links = links;
    }
}
