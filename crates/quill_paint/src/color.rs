//! Ink colors

/// Straight-alpha RGBA color, each channel in `0.0..=1.0`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let unit = |c: u8| f32::from(c) / 255.0;
        Self::new(unit(r), unit(g), unit(b), unit(a))
    }

    /// Parse a packed `0xRRGGBB` value, or `0xRRGGBBAA` when it does not fit in 24 bits.
    ///
    /// `0x000000FF` is therefore opaque blue, not transparent black.
    pub fn from_hex(hex: u32) -> Self {
        let [b0, b1, b2, b3] = hex.to_be_bytes();
        if hex > 0xFF_FFFF {
            Self::from_rgba8(b0, b1, b2, b3)
        } else {
            Self::from_rgba8(b1, b2, b3, u8::MAX)
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Quantize to 8-bit channels, clamping and rounding each one
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}
