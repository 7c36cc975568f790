use std::fmt::Display;

/// Logical point on the canvas. Origin is the top-left corner of the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Pt(pub(crate) f32);

impl Display for Pt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Pt {
    pub const ZERO: Pt = Pt(0.0);

    pub fn as_f32(self) -> f32 {
        self.0
    }

    pub(crate) fn from_physical_px(px: f64, scale_factor: f64) -> Self {
        let sf = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Pt::from(px / sf)
    }

    pub(crate) fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }
}

impl From<u32> for Pt {
    fn from(value: u32) -> Self {
        Pt(value as f32)
    }
}

impl From<f32> for Pt {
    fn from(value: f32) -> Self {
        let v = if value.is_finite() { value } else { 0.0 };
        Pt(v)
    }
}

impl From<f64> for Pt {
    fn from(value: f64) -> Self {
        let v = if value.is_finite() { value } else { 0.0 };
        Pt(v as f32)
    }
}

impl std::ops::Add for Pt {
    type Output = Pt;
    fn add(self, rhs: Pt) -> Pt {
        Pt(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Pt {
    type Output = Pt;
    fn sub(self, rhs: Pt) -> Pt {
        Pt(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Pt {
    fn add_assign(&mut self, rhs: Pt) {
        self.0 += rhs.0;
    }
}

impl std::ops::Mul<f32> for Pt {
    type Output = Pt;
    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl std::ops::Div<f32> for Pt {
    type Output = Pt;
    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_collapse_to_zero() {
        assert_eq!(Pt::from(f32::NAN), Pt::ZERO);
        assert_eq!(Pt::from(f64::INFINITY), Pt::ZERO);
    }

    #[test]
    fn physical_px_respects_scale_factor() {
        assert_eq!(Pt::from_physical_px(300.0, 2.0), Pt(150.0));
        assert_eq!(Pt::from_physical_px(300.0, 0.0), Pt(300.0));
    }
}
