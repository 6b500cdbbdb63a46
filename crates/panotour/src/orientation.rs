//! Device orientation to camera rotation.
//!
//! Mobile browsers report device orientation as three angles in degrees:
//! `alpha` around the Z axis, `beta` around X and `gamma` around Y, together
//! with the screen's own rotation. The camera quaternion looks along -Z with
//! +Y up, as in the panorama renderer.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::{EulerRot, Quat, Vec3};

/// Rotation of -90° about X, turning a device lying flat face-up into a
/// camera looking at the horizon.
const DEVICE_TO_CAMERA: Quat = Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);

/// Camera orientation for a device orientation reading.
///
/// All angles are in degrees. `screen_orientation` is the angle of the screen
/// relative to the device's natural orientation (0, 90, -90 or 180).
#[must_use]
pub fn device_quaternion(alpha: f32, beta: f32, gamma: f32, screen_orientation: f32) -> Quat {
    let device = Quat::from_euler(
        EulerRot::YXZ,
        alpha.to_radians(),
        beta.to_radians(),
        -gamma.to_radians(),
    );
    let screen = Quat::from_axis_angle(Vec3::Z, -screen_orientation.to_radians());
    (device * DEVICE_TO_CAMERA * screen).normalize()
}
