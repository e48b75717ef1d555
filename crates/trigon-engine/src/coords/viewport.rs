/// Rendering viewport in framebuffer pixels.
///
/// Origin is the top-left corner of the framebuffer. The extent is not
/// corrected for aspect ratio; whatever the framebuffer reports is used.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole framebuffer of the given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Intersects the viewport with a `target_width` x `target_height` render
    /// target and returns `(x, y, w, h)` as floats for a render pass.
    ///
    /// Returns `None` when nothing of the viewport lands on the target.
    pub fn clipped_to(self, target_width: u32, target_height: u32) -> Option<(f32, f32, f32, f32)> {
        let x0 = i64::from(self.x).clamp(0, i64::from(target_width));
        let y0 = i64::from(self.y).clamp(0, i64::from(target_height));
        let x1 = (i64::from(self.x) + i64::from(self.width)).clamp(0, i64::from(target_width));
        let y1 = (i64::from(self.y) + i64::from(self.height)).clamp(0, i64::from(target_height));

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some((x0 as f32, y0 as f32, (x1 - x0) as f32, (y1 - y0) as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_size_is_anchored_at_origin() {
        assert_eq!(Viewport::from_size(800, 600), Viewport::new(0, 0, 800, 600));
    }

    #[test]
    fn zero_extent_lands_nowhere() {
        assert_eq!(Viewport::from_size(0, 600).clipped_to(800, 600), None);
        assert_eq!(Viewport::from_size(800, 0).clipped_to(800, 600), None);
    }

    #[test]
    fn clipped_to_matching_target_is_identity() {
        let vp = Viewport::from_size(800, 600);
        assert_eq!(vp.clipped_to(800, 600), Some((0.0, 0.0, 800.0, 600.0)));
    }

    #[test]
    fn clipped_to_smaller_target_shrinks() {
        // Framebuffer shrank before the resize callback ran.
        let vp = Viewport::from_size(800, 600);
        assert_eq!(vp.clipped_to(640, 480), Some((0.0, 0.0, 640.0, 480.0)));
    }

    #[test]
    fn clipped_negative_origin() {
        let vp = Viewport::new(-100, -50, 300, 200);
        assert_eq!(vp.clipped_to(800, 600), Some((0.0, 0.0, 200.0, 150.0)));
    }

    #[test]
    fn clipped_outside_target_is_none() {
        assert_eq!(Viewport::new(900, 0, 100, 100).clipped_to(800, 600), None);
        assert_eq!(Viewport::from_size(0, 0).clipped_to(800, 600), None);
    }
}
