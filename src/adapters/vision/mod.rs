pub mod lane_detector;
