use kfilter::{
    Kalman1M, KalmanFilter, KalmanPredict, measurement::LinearMeasurement,
    system::LinearNoInputSystem,
};
use nalgebra::{SMatrix, SVector};

use crate::{bbox::BBox, config::KalmanFilterConfig};

/// Constant velocity filter over the box center.
///
/// The state is `[cx, dcx, cy, dcy]` in pixels and pixels per frame, so it
/// does not depend on the frame rate. Only the center is measured:
///
/// ```text
///  cx      1 1 0 0    cx          cx     1 0 0 0    cx
/// dcx  =   0 1 0 0   dcx     z =  cy  =  0 0 1 0   dcx
///  cy      0 0 1 1    cy                            cy
/// dcy      0 0 0 1   dcy                           dcy
/// ```
pub struct CenterKalmanFilter {
    kalman_filter:
        Kalman1M<f64, 4, 0, 2, LinearNoInputSystem<f64, 4>, LinearMeasurement<f64, 4, 2>>,
}

impl CenterKalmanFilter {
    #[allow(non_snake_case)]
    pub fn new(config: &KalmanFilterConfig, initial_bbox: &BBox) -> Self {
        let (cx, cy) = initial_bbox.center();

        #[rustfmt::skip]
        let F = SMatrix::<f64, 4, 4>::new(
            1.0, 1.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 1.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let Q = SMatrix::<f64, 4, 4>::identity() * config.process_noise;
        let x_initial = SVector::<f64, 4>::new(cx, 0.0, cy, 0.0);
        let system = LinearNoInputSystem::new(F, Q, x_initial);

        let P = SMatrix::<f64, 4, 4>::identity() * config.p;

        #[rustfmt::skip]
        let H = SMatrix::<f64, 2, 4>::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
        );
        let R = SMatrix::<f64, 2, 2>::from_diagonal_element(config.r);
        let measurement = LinearMeasurement::new(H, R, SVector::<f64, 2>::new(cx, cy));

        Self {
            kalman_filter: Kalman1M::new_custom(system, P, measurement),
        }
    }

    pub fn predict(&mut self) {
        self.kalman_filter.predict();
    }

    pub fn update(&mut self, (cx, cy): (f64, f64)) {
        self.kalman_filter.update(SVector::<f64, 2>::new(cx, cy));
    }

    pub fn center(&self) -> (f64, f64) {
        let x = self.kalman_filter.state();
        (x[0], x[2])
    }

    pub fn velocity(&self) -> (f64, f64) {
        let x = self.kalman_filter.state();
        (x[1], x[3])
    }
}

impl std::fmt::Debug for CenterKalmanFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CenterKalmanFilter")
            .field("center", &self.center())
            .field("velocity", &self.velocity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn config() -> KalmanFilterConfig {
        KalmanFilterConfig {
            r: 1.0,
            p: 10.0,
            kalman_delay: 0,
            process_noise: 1.0,
        }
    }

    #[test]
    fn test_initial_state_is_box_center_at_rest() {
        let filter = CenterKalmanFilter::new(&config(), &BBox::new(0.0, 0.0, 20.0, 10.0));

        assert_eq!(filter.center(), (10.0, 5.0));
        assert_eq!(filter.velocity(), (0.0, 0.0));
    }

    #[test]
    fn test_predict_without_velocity_keeps_center() {
        let mut filter = CenterKalmanFilter::new(&config(), &BBox::new(0.0, 0.0, 20.0, 10.0));
        filter.predict();
        filter.predict();

        assert_relative_eq!(filter.center().0, 10.0);
        assert_relative_eq!(filter.center().1, 5.0);
    }

    #[test]
    fn test_update_pulls_center_towards_measurement() {
        let mut filter = CenterKalmanFilter::new(&config(), &BBox::new(0.0, 0.0, 20.0, 10.0));
        filter.predict();
        filter.update((20.0, 5.0));

        let (cx, cy) = filter.center();
        assert!(cx > 10.0 && cx < 20.0);
        assert_relative_eq!(cy, 5.0);
        assert!(filter.velocity().0 > 0.0);
    }

    #[test]
    fn test_learns_constant_velocity() {
        let mut filter = CenterKalmanFilter::new(&config(), &BBox::new(0.0, 0.0, 2.0, 2.0));

        for step in 1..=50 {
            filter.predict();
            filter.update((1.0 + 2.0 * step as f64, 1.0 - step as f64));
        }

        let (dcx, dcy) = filter.velocity();
        assert_relative_eq!(dcx, 2.0, epsilon = 0.05);
        assert_relative_eq!(dcy, -1.0, epsilon = 0.05);
    }
}
