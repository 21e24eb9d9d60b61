/// RGBA color tuple (red, green, blue, alpha) with values in 0.0..=1.0.
pub type Rgba = (f32, f32, f32, f32);

/// Configuration for Rerun plots of a solved field.
///
/// Every z-slice is drawn as a height field: grid point `(x_i, y_j)` is
/// lifted to `height_scale * u[i, j]` and colored by value.
pub struct PlotConfig {
    // Labels
    pub session_name: String,
    pub entity_prefix: String,

    // Height field
    pub point_radius: f32,
    pub height_scale: f32,
    pub color_low: Rgba,
    pub color_mid: Rgba,
    pub color_high: Rgba,
}

impl PlotConfig {
    pub fn new() -> Self {
        Self {
            session_name: "biharmonic3d".to_string(),
            entity_prefix: "Biharmonic3d".to_string(),

            point_radius: 0.01,
            height_scale: 1.0,
            color_low: (0.0, 0.0, 1.0, 1.0),
            color_mid: (1.0, 1.0, 1.0, 1.0),
            color_high: (1.0, 0.0, 0.0, 1.0),
        }
    }

    /// Entity path of a plotted field.
    pub fn entity(&self, name: &str) -> String {
        format!("{}/{}", self.entity_prefix, name)
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlotConfig::new();
        assert_eq!(config.session_name, "biharmonic3d");
        assert_eq!(config.entity_prefix, "Biharmonic3d");
        assert_eq!(config.color_low, (0.0, 0.0, 1.0, 1.0));
        assert_eq!(config.color_high, (1.0, 0.0, 0.0, 1.0));
        assert_eq!(config.entity("error"), "Biharmonic3d/error");
    }

    #[test]
    fn test_default_trait() {
        let config = PlotConfig::default();
        assert_eq!(config.session_name, "biharmonic3d");
    }
}
