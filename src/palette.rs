//! Stable id to color assignment for drawing trajectories.

use crate::point::TrackId;

pub const DEFAULT_PALETTE: [&str; 10] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
    "#6366F1", "#84CC16",
];

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the UTF-8 bytes of `s`.
pub fn fnv1a(s: &str) -> u32 {
    s.bytes()
        .fold(FNV_OFFSET, |hash, b| (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME))
}

/// Same id always maps to the same entry, `None` only for an empty palette.
pub fn color_for_id<'a, T>(id: &TrackId, palette: &'a [T]) -> Option<&'a T> {
    if palette.is_empty() {
        return None;
    }

    palette.get(fnv1a(id.as_str()) as usize % palette.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fnv_vectors() {
        assert_eq!(fnv1a(""), 0x811c9dc5);
        assert_eq!(fnv1a("a"), 0xe40c292c);
        assert_eq!(fnv1a("foobar"), 0xbf9cf968);
    }

    #[test]
    fn deterministic_and_canonical() {
        let a = color_for_id(&TrackId::from(42u64), &DEFAULT_PALETTE);
        let b = color_for_id(&TrackId::from("42"), &DEFAULT_PALETTE);
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn empty_palette() {
        let palette: [&str; 0] = [];
        assert_eq!(color_for_id(&"1".into(), &palette), None);
    }
}
