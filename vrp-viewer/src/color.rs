/// RGBA color of a line or marker.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Green color: `#00FF00FF`
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    /// Blue color: `#0000FFFF`
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    /// Magenta color: `#FF00FFFF`
    pub const MAGENTA: Color = Color::rgba(255, 0, 255, 255);
    /// Gray color: `#808080FF`
    pub const GRAY: Color = Color::rgba(128, 128, 128, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Converts the color into HEX6 string `#RRGGBB` if it is opaque, or HEX8 `#RRGGBBAA`
    /// otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || !hex_string.starts_with('#') {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(hex_string.get(i..i + 2)?, 16).ok();
        let a = if hex_string.len() == 9 { channel(7)? } else { 255 };

        Some(Self {
            r: channel(1)?,
            g: channel(3)?,
            b: channel(5)?,
            a,
        })
    }

    /// Returns a copy of the color with the alpha channel set from `opacity` in `0.0..=1.0`.
    /// Values out of the range are clamped.
    pub fn with_opacity(&self, opacity: f64) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..*self }
    }

    /// Red channel.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green channel.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue channel.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Alpha channel.
    pub fn a(&self) -> u8 {
        self.a
    }
}
