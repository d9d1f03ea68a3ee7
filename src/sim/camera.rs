//! Camera follow/zoom state
//!
//! `scroll` is the world position of the top-left corner of the view.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub following: bool,
    pub zoom: f32,
    pub scroll: Vec2,
    /// Viewport size in screen pixels
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            following: false,
            zoom: 1.0,
            scroll: Vec2::ZERO,
            viewport,
        }
    }

    pub fn start_follow(&mut self) {
        self.following = true;
    }

    pub fn stop_follow(&mut self) {
        self.following = false;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = scroll;
    }

    /// Back to the level-1 view: unfollowed, 1x, origin
    pub fn reset(&mut self) {
        self.stop_follow();
        self.set_zoom(1.0);
        self.set_scroll(Vec2::ZERO);
    }

    /// World-space size of the visible area
    pub fn view_size(&self) -> Vec2 {
        self.viewport / self.zoom
    }

    /// Center the view on `target` while following (never scrolls past the origin)
    pub fn update(&mut self, target: Vec2) {
        if self.following {
            self.scroll = (target - self.view_size() / 2.0).max(Vec2::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_camera_ignores_target() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0));
        camera.update(Vec2::new(1000.0, 1000.0));
        assert_eq!(camera.scroll, Vec2::ZERO);
    }

    #[test]
    fn test_follow_centers_target() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0));
        camera.start_follow();
        camera.set_zoom(2.0);
        camera.update(Vec2::new(500.0, 400.0));
        // View is 400x300 world units
        assert_eq!(camera.scroll, Vec2::new(300.0, 250.0));
    }

    #[test]
    fn test_follow_clamps_at_origin() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0));
        camera.start_follow();
        camera.update(Vec2::new(10.0, 10.0));
        assert_eq!(camera.scroll, Vec2::ZERO);
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0));
        camera.start_follow();
        camera.set_zoom(1.5);
        camera.set_scroll(Vec2::new(40.0, 80.0));
        camera.reset();
        assert!(!camera.following);
        assert_eq!(camera.zoom, 1.0);
        assert_eq!(camera.scroll, Vec2::ZERO);
    }
}
