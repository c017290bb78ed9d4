#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePoint {
    pub x: f32,
    pub y: f32,
}

/// Una línea de carril, con los puntos ordenados de arriba abajo (y creciente).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLane {
    pub points: Vec<LanePoint>,
    pub confidence: f32,
}

impl DetectedLane {
    /// x del punto más cercano al vehículo (mayor y).
    pub fn bottom_x(&self) -> Option<f32> {
        self.points
            .iter()
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .map(|p| p.x)
    }
}

/// Decide si el punto de referencia `center_x` está fuera del carril.
///
/// Con menos de dos líneas no se puede evaluar y se devuelve `false`.
/// Si el punto cae fuera de todas las líneas hay salida de carril; si cae entre
/// dos, se calcula el desplazamiento lateral normalizado en [-1, 1] respecto al
/// centro del carril y se compara con `threshold`.
pub fn check_lane_departure(lanes: &[DetectedLane], center_x: u32, threshold: f32) -> bool {
    let mut xs: Vec<f32> = lanes.iter().filter_map(DetectedLane::bottom_x).collect();
    if xs.len() < 2 {
        return false;
    }
    xs.sort_by(|a, b| a.total_cmp(b));

    let vehicle_x = center_x as f32;
    if vehicle_x < xs[0] || vehicle_x > xs[xs.len() - 1] {
        return true;
    }

    for pair in xs.windows(2) {
        let (left_x, right_x) = (pair[0], pair[1]);
        if left_x <= vehicle_x && vehicle_x <= right_x {
            let lane_width = right_x - left_x;
            if lane_width <= f32::EPSILON {
                // sobre la propia línea
                return true;
            }
            let offset = ((vehicle_x - left_x) / lane_width - 0.5) * 2.0;
            return offset.abs() > threshold;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_lane(x: f32) -> DetectedLane {
        DetectedLane {
            points: (0..5).map(|i| LanePoint { x, y: 100.0 + i as f32 * 10.0 }).collect(),
            confidence: 1.0,
        }
    }

    #[test]
    fn no_lanes_never_departs() {
        for center_x in [0, 1, 320, 10_000] {
            assert!(!check_lane_departure(&[], center_x, 0.7));
        }
    }

    #[test]
    fn single_lane_cannot_be_assessed() {
        assert!(!check_lane_departure(&[vertical_lane(300.0)], 310, 0.7));
    }

    #[test]
    fn centred_vehicle_stays_in_lane() {
        let lanes = [vertical_lane(200.0), vertical_lane(440.0)];
        assert!(!check_lane_departure(&lanes, 320, 0.7));
    }

    #[test]
    fn vehicle_close_to_boundary_departs() {
        let lanes = [vertical_lane(300.0), vertical_lane(500.0)];
        // offset = (20/200 - 0.5) * 2 = -0.8
        assert!(check_lane_departure(&lanes, 320, 0.7));
    }

    #[test]
    fn vehicle_outside_all_lanes_departs() {
        let lanes = [vertical_lane(400.0), vertical_lane(600.0)];
        assert!(check_lane_departure(&lanes, 320, 0.7));
    }

    #[test]
    fn uses_bottom_point_of_each_lane() {
        let slanted = DetectedLane {
            points: vec![LanePoint { x: 330.0, y: 10.0 }, LanePoint { x: 200.0, y: 200.0 }],
            confidence: 0.5,
        };
        assert_eq!(slanted.bottom_x(), Some(200.0));
        assert!(!check_lane_departure(&[slanted, vertical_lane(440.0)], 320, 0.7));
    }
}
