//! Input trail: recent pointer positions, most recent last

use std::collections::VecDeque;

use glam::Vec2;

/// Fixed-capacity FIFO of pointer samples
#[derive(Debug, Clone)]
pub struct InputTrail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl InputTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest once over capacity
    pub fn push(&mut self, point: Vec2) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    /// Most recent movement (second-to-last → last)
    pub fn last_segment(&self) -> Option<(Vec2, Vec2)> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Some((self.points[n - 2], self.points[n - 1]))
    }

    /// Oldest to newest, for rendering
    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segment_needs_two_points() {
        let mut trail = InputTrail::new(4);
        assert!(trail.last_segment().is_none());
        trail.push(Vec2::new(1.0, 1.0));
        assert!(trail.last_segment().is_none());
        trail.push(Vec2::new(2.0, 3.0));
        assert_eq!(
            trail.last_segment(),
            Some((Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0)))
        );
    }

    #[test]
    fn test_drops_oldest() {
        let mut trail = InputTrail::new(3);
        for i in 0..5 {
            trail.push(Vec2::splat(i as f32));
        }
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    proptest! {
        #[test]
        fn length_stays_within_capacity(cap in 0usize..16, pushes in 0usize..64) {
            let mut trail = InputTrail::new(cap);
            for i in 0..pushes {
                trail.push(Vec2::new(i as f32, 0.0));
                prop_assert!(trail.len() <= cap);
            }
            prop_assert_eq!(trail.len(), pushes.min(cap));
        }
    }
}
