use foundation::Color;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    /// Ambient light blended between a sky colour (from above) and a ground
    /// colour (from below).
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
}

impl Light {
    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Light::Hemisphere {
            sky,
            ground,
            intensity,
        }
    }
}
