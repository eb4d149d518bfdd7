//! Heart Raid - A wave-based arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, combat, game state)
//! - `tuning`: Data-driven game balance
//! - `ui`: HUD text and end-of-run summary

pub mod sim;
pub mod tuning;
pub mod ui;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical display size
    pub const SCREEN_WIDTH: f32 = 900.0;
    pub const SCREEN_HEIGHT: f32 = 505.0;

    /// Default frame step for hosts without their own clock (ms)
    pub const FRAME_MS: u64 = 16;

    /// Half-extents of the axis-aligned hitboxes
    pub const PLAYER_HALF_EXTENT: f32 = 16.0;
    pub const ENEMY_HALF_EXTENT: f32 = 14.0;
    pub const PROJECTILE_HALF_EXTENT: f32 = 4.0;
    pub const PICKUP_HALF_EXTENT: f32 = 10.0;

    /// Player spawn point (right third of the screen, vertically centered)
    pub const PLAYER_START_X: f32 = 760.0;
    pub const PLAYER_START_Y: f32 = SCREEN_HEIGHT / 2.0;

    /// Shots leave the player slightly above its center
    pub const SHOT_OFFSET_Y: f32 = 12.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Angle from `from` to `to` in screen space (y grows downward)
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Velocity of magnitude `speed` along `angle`
#[inline]
pub fn velocity_from_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

/// Velocity that moves `from` straight toward `to` at `speed`
///
/// Returns zero when the points coincide.
#[inline]
pub fn velocity_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}
