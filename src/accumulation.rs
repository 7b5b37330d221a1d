/// Number of frames blended into the off-screen target since the last change
/// to anything the ray tracer sees.
///
/// The shader writes each sample with alpha `1 / frame` on top of the previous
/// image, which turns hardware blending into a running average. Frame 1 after
/// an invalidation therefore replaces the old image completely.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Accumulation {
    frame_count: u32,
}

impl Accumulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames accumulated so far. Zero right after an invalidation.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Drop the accumulated history. Called when the camera moves or the
    /// output target is recreated.
    pub fn invalidate(&mut self) {
        self.frame_count = 0;
    }

    /// Advance to the next rendered frame and return its 1-based index.
    pub fn next_frame(&mut self) -> u32 {
        self.frame_count = self.frame_count.saturating_add(1);
        self.frame_count
    }

    /// Start a frame: drop the history first when `invalidate` is set (the
    /// view changed), then return the frame's 1-based index.
    pub fn advance(&mut self, invalidate: bool) -> u32 {
        if invalidate {
            self.invalidate();
        }
        self.next_frame()
    }

    /// Blend weight the shader applies to this frame's sample.
    pub fn blend_weight(&self) -> f32 {
        if self.frame_count == 0 {
            1.0
        } else {
            1.0 / self.frame_count as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(Accumulation::new().frame_count(), 0);
    }

    #[test]
    fn increments_by_one_per_frame() {
        let mut acc = Accumulation::new();
        for expected in 1..=10 {
            assert_eq!(acc.next_frame(), expected);
            assert_eq!(acc.frame_count(), expected);
        }
    }

    #[test]
    fn invalidate_resets_then_counts_again() {
        let mut acc = Accumulation::new();
        for _ in 0..5 {
            acc.next_frame();
        }
        acc.invalidate();
        assert_eq!(acc.frame_count(), 0);
        assert_eq!(acc.next_frame(), 1);
        assert_eq!(acc.next_frame(), 2);
    }

    #[test]
    fn repeated_invalidation_holds_at_zero() {
        let mut acc = Accumulation::new();
        acc.next_frame();
        acc.invalidate();
        acc.invalidate();
        assert_eq!(acc.frame_count(), 0);
    }

    #[test]
    fn first_frame_after_reset_fully_replaces() {
        let mut acc = Accumulation::new();
        acc.next_frame();
        acc.next_frame();
        acc.invalidate();
        acc.next_frame();
        assert_eq!(acc.blend_weight(), 1.0);
        acc.next_frame();
        assert_eq!(acc.blend_weight(), 0.5);
    }

    #[test]
    fn advance_continues_while_view_is_still() {
        let mut acc = Accumulation::new();
        assert_eq!(acc.advance(false), 1);
        assert_eq!(acc.advance(false), 2);
        assert_eq!(acc.advance(false), 3);
    }

    #[test]
    fn advance_restarts_every_frame_while_view_changes() {
        let mut acc = Accumulation::new();
        acc.advance(false);
        acc.advance(false);
        assert_eq!(acc.advance(true), 1);
        assert_eq!(acc.advance(true), 1);
        assert_eq!(acc.blend_weight(), 1.0);
        assert_eq!(acc.advance(false), 2);
    }

    #[test]
    fn dropped_frame_restarts_on_next_advance() {
        let mut acc = Accumulation::new();
        for _ in 0..4 {
            acc.advance(false);
        }
        // surface texture could not be acquired for frame 4
        acc.invalidate();
        assert_eq!(acc.advance(false), 1);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let mut acc = Accumulation {
            frame_count: u32::MAX - 1,
        };
        assert_eq!(acc.next_frame(), u32::MAX);
        assert_eq!(acc.next_frame(), u32::MAX);
    }
}
