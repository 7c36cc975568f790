use rand::Rng;

/// Straight (non-premultiplied) RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const YELLOW: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);
    pub const PINK: Rgba = Rgba::new(1.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Samples a random RGB color with a fixed alpha.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, alpha: f32) -> Self {
        Self::new(
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            alpha,
        )
    }

    /// Photographic negative of the RGB channels, fully opaque.
    pub fn negative(self) -> Self {
        Self::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, 1.0)
    }

    /// Exact comparison of the RGB channels, alpha ignored.
    pub fn same_rgb(self, other: Rgba) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn negative_inverts_rgb_and_forces_opaque() {
        let c = Rgba::new(0.25, 1.0, 0.0, 0.5).negative();
        assert_eq!(c, Rgba::new(0.75, 0.0, 1.0, 1.0));
    }

    #[test]
    fn random_keeps_requested_alpha() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let c = Rgba::random(&mut rng, 0.5);
            assert_eq!(c.a, 0.5);
            for v in [c.r, c.g, c.b] {
                assert!((0.0..1.0).contains(&v));
            }
        }
    }

    #[test]
    fn same_rgb_ignores_alpha() {
        assert!(Rgba::YELLOW.same_rgb(Rgba::YELLOW.with_alpha(0.5)));
        assert!(!Rgba::YELLOW.same_rgb(Rgba::new(1.0, 0.999, 0.0, 1.0)));
    }
}
