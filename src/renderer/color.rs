//! RGBA colors and colormaps

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity 0-1
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const GOLD: Self = Self::rgb(255, 215, 0);
    pub const LASER: Self = Self::rgb(0, 255, 0);

    /// Positive polarity (red)
    pub const POSITIVE: Self = Self::hex(0xef4444);
    /// Negative polarity (blue)
    pub const NEGATIVE: Self = Self::hex(0x3b82f6);
    /// Zero charge (grey)
    pub const NEUTRAL: Self = Self::hex(0x9ca3af);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// HSL to RGB; hue in degrees, saturation/lightness 0-1
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    /// Red for positive, blue for negative, grey for zero
    pub fn polarity(q: f32) -> Self {
        if q > 0.0 {
            Self::POSITIVE
        } else if q < 0.0 {
            Self::NEGATIVE
        } else {
            Self::NEUTRAL
        }
    }

    /// Blue (t=0) to red (t=1) heat ramp used for field magnitudes
    pub fn heat(t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgb((255.0 * t) as u8, 50, (255.0 * (1.0 - t)) as u8)
    }

    /// CSS color string for Canvas2D styles
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a.max(0.0))
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, (self.a.clamp(0.0, 1.0) * 255.0) as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Color::hex(0xef4444), Color::rgb(0xef, 0x44, 0x44));
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Color::hsl(0.0, 1.0, 0.5), Color::rgb(255, 0, 0));
        assert_eq!(Color::hsl(120.0, 1.0, 0.5), Color::rgb(0, 255, 0));
        assert_eq!(Color::hsl(240.0, 1.0, 0.5), Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_heat_ramp_endpoints() {
        assert_eq!(Color::heat(0.0), Color::rgb(0, 50, 255));
        assert_eq!(Color::heat(5.0), Color::rgb(255, 50, 0));
    }

    #[test]
    fn test_css() {
        assert_eq!(Color::rgb(1, 2, 3).css(), "rgb(1, 2, 3)");
        assert_eq!(Color::rgba(1, 2, 3, 0.5).css(), "rgba(1, 2, 3, 0.5)");
    }
}
