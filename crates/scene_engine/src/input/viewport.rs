//! Screen rectangle the scene is drawn into
//!
//! Converts window-pixel mouse positions into normalized device
//! coordinates for picking. The rectangle's top strip of
//! `title_bar_height` pixels belongs to the window chrome and is excluded.

/// Scene viewport in window pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height, title bar included
    pub height: f32,
    /// Height of the title bar strip at the top
    pub title_bar_height: f32,
}

impl Viewport {
    /// Viewport covering a whole window
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            title_bar_height: 0.0,
        }
    }

    /// Same viewport with a title bar strip
    #[must_use]
    pub fn with_title_bar(mut self, height: f32) -> Self {
        self.title_bar_height = height;
        self
    }

    /// Width over drawable height
    pub fn aspect_ratio(&self) -> f32 {
        let height = self.height - self.title_bar_height;
        if height > 0.0 {
            self.width / height
        } else {
            1.0
        }
    }

    /// Mouse position to NDC
    ///
    /// X grows to the right and Y grows upward, both in [-1, 1]. Positions
    /// outside the drawable area, or a collapsed viewport, yield `None`.
    pub fn to_ndc(&self, mouse_x: f32, mouse_y: f32) -> Option<(f32, f32)> {
        let drawable_height = self.height - self.title_bar_height;
        if self.width <= 0.0 || drawable_height <= 0.0 {
            return None;
        }

        let ndc_x = ((mouse_x - self.x) / self.width - 0.5) / 0.5;
        let ndc_y = -(((mouse_y - (self.y + self.title_bar_height)) / drawable_height) - 0.5) / 0.5;

        let inside = (-1.0..=1.0).contains(&ndc_x) && (-1.0..=1.0).contains(&ndc_y);
        inside.then_some((ndc_x, ndc_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_maps_to_origin() {
        let viewport = Viewport::new(1600.0, 900.0);
        let (x, y) = viewport.to_ndc(800.0, 450.0).unwrap();
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);
    }

    #[test]
    fn test_corners_and_title_bar() {
        let viewport = Viewport {
            x: 100.0,
            y: 50.0,
            width: 800.0,
            height: 620.0,
            title_bar_height: 20.0,
        };
        let (x, y) = viewport.to_ndc(100.0, 70.0).unwrap();
        assert_relative_eq!(x, -1.0);
        assert_relative_eq!(y, 1.0);

        let (x, y) = viewport.to_ndc(900.0, 670.0).unwrap();
        assert_relative_eq!(x, 1.0);
        assert_relative_eq!(y, -1.0);

        // Clicks on the title bar are outside the scene
        assert!(viewport.to_ndc(500.0, 60.0).is_none());
        assert!(viewport.to_ndc(50.0, 300.0).is_none());
    }

    #[test]
    fn test_collapsed_viewport_rejects_everything() {
        let viewport = Viewport::new(0.0, 600.0);
        assert!(viewport.to_ndc(0.0, 300.0).is_none());
    }
}
