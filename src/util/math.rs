//! Math type re-exports.
//!
//! Vector properties are stored as `glam` single precision vectors:
//! [`Vec3`] for positions and directions, [`Vec4`] for RGBA colors.

pub use glam::{Vec3, Vec4};

/// Split a comma separated component list, e.g. `"1, 2.5, -3"`.
///
/// Returns `None` unless exactly `N` components parse as `f32`.
pub fn parse_components<const N: usize>(text: &str) -> Option<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut parts = text.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Join components as `"x, y, z"`.
pub fn format_components(components: &[f32]) -> String {
    components
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
