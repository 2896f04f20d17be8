/// Zoom bounds and step for the editor view.
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Editor zoom factor. All changes go through [`Zoom::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    factor: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { factor: DEFAULT_ZOOM }
    }
}

impl Zoom {
    pub fn new(factor: f64) -> Self {
        let mut zoom = Self::default();
        zoom.set(factor);
        zoom
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Clamp and store. Returns the new factor if it changed.
    pub fn set(&mut self, factor: f64) -> Option<f64> {
        if !factor.is_finite() {
            return None;
        }
        // Round to whole percent so repeated steps don't drift
        let clamped = (factor.clamp(MIN_ZOOM, MAX_ZOOM) * 100.0).round() / 100.0;
        if (clamped - self.factor).abs() < 0.001 {
            return None;
        }
        self.factor = clamped;
        Some(clamped)
    }

    pub fn zoom_in(&mut self) -> Option<f64> {
        self.set(self.factor + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Option<f64> {
        self.set(self.factor - ZOOM_STEP)
    }

    pub fn reset(&mut self) -> Option<f64> {
        self.set(DEFAULT_ZOOM)
    }

    /// "110%"
    pub fn display(&self) -> String {
        format!("{}%", (self.factor * 100.0).round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_do_not_drift() {
        let mut zoom = Zoom::default();
        for _ in 0..5 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.factor(), 1.5);
        for _ in 0..5 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.factor(), 1.0);
    }

    #[test]
    fn test_clamped_at_bounds() {
        let mut zoom = Zoom::new(2.95);
        assert_eq!(zoom.zoom_in(), Some(MAX_ZOOM));
        assert_eq!(zoom.zoom_in(), None);

        let mut zoom = Zoom::new(0.1);
        assert_eq!(zoom.factor(), MIN_ZOOM);
        assert_eq!(zoom.zoom_out(), None);
    }

    #[test]
    fn test_reset_and_display() {
        let mut zoom = Zoom::new(1.3);
        assert_eq!(zoom.display(), "130%");
        assert_eq!(zoom.reset(), Some(1.0));
        assert_eq!(zoom.reset(), None);
        assert_eq!(zoom.display(), "100%");
    }

    #[test]
    fn test_non_finite_is_ignored() {
        let mut zoom = Zoom::default();
        assert_eq!(zoom.set(f64::NAN), None);
        assert_eq!(zoom.factor(), 1.0);
    }
}
