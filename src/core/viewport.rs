/// Viewport - physical size of the drawing area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for a collapsed viewport
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Minimised windows report a zero dimension
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        let vp = Viewport::new(1920, 1080);
        assert!((vp.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_height_does_not_divide() {
        let vp = Viewport::new(800, 0);
        assert_eq!(vp.aspect(), 1.0);
        assert!(vp.is_empty());
    }

    #[test]
    fn test_from_physical_size() {
        let vp: Viewport = winit::dpi::PhysicalSize::new(640u32, 480u32).into();
        assert_eq!(vp, Viewport::new(640, 480));
        assert!(!vp.is_empty());
    }
}
