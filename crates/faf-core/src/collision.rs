//! Sample-versus-obstacle validation.

use crate::models::{Collision, Obstacle, Point3};

/// Scans sampled positions against a fixed obstacle set.
#[derive(Debug, Clone, Copy)]
pub struct CollisionChecker<'a> {
    obstacles: &'a [Obstacle],
}

impl<'a> CollisionChecker<'a> {
    pub fn new(obstacles: &'a [Obstacle]) -> Self {
        Self { obstacles }
    }

    fn check(&self, index: usize, position: &Point3) -> Option<Collision> {
        self.obstacles
            .iter()
            .enumerate()
            .find(|(_, obstacle)| obstacle.contains(position))
            .map(|(obstacle_index, obstacle)| Collision {
                obstacle_index,
                sample_index: index,
                horizontal_distance_km: obstacle.center().distance(position.horizontal()),
                altitude_km: position.z,
            })
    }

    /// First sample inside any obstacle, scanning in flight order.
    pub fn first_collision<'p, I>(&self, positions: I) -> Option<Collision>
    where
        I: IntoIterator<Item = &'p Point3>,
    {
        positions
            .into_iter()
            .enumerate()
            .find_map(|(index, position)| self.check(index, position))
    }

    /// Smallest horizontal clearance beyond any radius among samples below
    /// that obstacle's top. `None` when no sample is below any obstacle.
    pub fn min_clearance_km<'p, I>(&self, positions: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'p Point3>,
    {
        positions
            .into_iter()
            .flat_map(|position| {
                self.obstacles
                    .iter()
                    .filter(move |obstacle| position.z <= obstacle.height)
                    .map(move |obstacle| {
                        obstacle.center().distance(position.horizontal()) - obstacle.radius
                    })
            })
            .reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_first_intrusion_in_flight_order() {
        let obstacles = [
            Obstacle::new(10.0, 0.0, 1.0, 2.0),
            Obstacle::new(5.0, 0.0, 1.0, 2.0),
        ];
        let checker = CollisionChecker::new(&obstacles);
        let path: Vec<Point3> = (0..=20).map(|i| Point3::new(i as f64, 0.0, 1.0)).collect();

        let hit = checker.first_collision(&path).unwrap();
        assert_eq!(hit.obstacle_index, 1);
        assert_eq!(hit.sample_index, 4);
    }

    #[test]
    fn flying_over_is_clear() {
        let obstacles = [Obstacle::new(10.0, 0.0, 1.0, 2.0)];
        let checker = CollisionChecker::new(&obstacles);
        let path: Vec<Point3> = (0..=20).map(|i| Point3::new(i as f64, 0.0, 2.5)).collect();
        assert!(checker.first_collision(&path).is_none());
        assert!(checker.min_clearance_km(&path).is_none());
    }

    #[test]
    fn clearance_measures_closest_pass() {
        let obstacles = [Obstacle::new(10.0, 3.0, 1.0, 2.0)];
        let checker = CollisionChecker::new(&obstacles);
        let path: Vec<Point3> = (0..=20).map(|i| Point3::new(i as f64, 0.0, 1.0)).collect();
        assert!((checker.min_clearance_km(&path).unwrap() - 2.0).abs() < 1e-12);
    }
}
