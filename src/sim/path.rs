//! Flight path recorder
//!
//! Remembers where the disc has been while flying so rewind-style recalls can
//! retrace it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Ordered positions visited by the disc during one flight (oldest first)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathRecorder {
    points: Vec<Vec3>,
}

impl PathRecorder {
    /// Start a new flight from `origin`
    pub fn begin(&mut self, origin: Vec3) {
        self.points.clear();
        self.points.push(origin);
    }

    pub fn record(&mut self, point: Vec3) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the path newest-first, always ending at `home`
    ///
    /// `home` is appended unless the flight already started exactly there.
    pub fn take_rewind_route(&mut self, home: Vec3) -> Vec<Vec3> {
        let mut route = std::mem::take(&mut self.points);
        if route.first() != Some(&home) {
            route.insert(0, home);
        }
        route.reverse();
        route
    }

    /// Consume the path newest-first with no extra waypoint
    pub fn take_reversed(&mut self) -> Vec<Vec3> {
        let mut route = std::mem::take(&mut self.points);
        route.reverse();
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_rewind_route_appends_home() {
        let mut path = PathRecorder::default();
        path.begin(v(0.0));
        path.record(v(1.0));
        path.record(v(2.0));

        let route = path.take_rewind_route(v(-1.0));
        assert_eq!(route, vec![v(2.0), v(1.0), v(0.0), v(-1.0)]);
        assert!(path.is_empty());
    }

    #[test]
    fn test_rewind_route_does_not_duplicate_home() {
        let mut path = PathRecorder::default();
        path.begin(v(0.0));
        path.record(v(5.0));

        let route = path.take_rewind_route(v(0.0));
        assert_eq!(route, vec![v(5.0), v(0.0)]);
    }

    #[test]
    fn test_begin_clears_previous_flight() {
        let mut path = PathRecorder::default();
        path.begin(v(0.0));
        path.record(v(3.0));
        path.begin(v(9.0));
        assert_eq!(path.points(), &[v(9.0)]);
    }
}
