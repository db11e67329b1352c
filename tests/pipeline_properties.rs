use scout_vision::config::{MotionConfig, PolicyConfig, TrackingConfig};
use scout_vision::core_modules::color_tracker::ColorTracker;
use scout_vision::core_modules::contour::BoundingBox;
use scout_vision::core_modules::direction_policy::{self, Command};
use scout_vision::core_modules::motion_detector::{DetectionResult, MotionDetector, MotionLabel};
use scout_vision::io::synthetic::{backdrop, with_block, with_disk};

const GREY: [u8; 3] = [70, 70, 70];
const BRIGHT: [u8; 3] = [230, 230, 230];
const BLUE: [u8; 3] = [20, 40, 220];

#[test]
fn first_ingest_is_always_normal() {
    let scenes = [
        backdrop(500, 375, GREY),
        with_block(&backdrop(500, 375, GREY), 0, 0, 400, 300, BRIGHT),
        backdrop(1280, 720, [0, 0, 0]),
        backdrop(37, 11, [255, 0, 255]),
    ];
    for scene in &scenes {
        let mut detector = MotionDetector::new(MotionConfig::default());
        assert_eq!(detector.ingest(scene).unwrap(), DetectionResult::normal());
    }
}

#[test]
fn unchanged_scene_stays_normal() {
    let scene = with_block(&backdrop(640, 480, GREY), 100, 100, 80, 80, BRIGHT);
    let mut detector = MotionDetector::new(MotionConfig::default());
    detector.ingest(&scene).unwrap();
    assert_eq!(detector.ingest(&scene).unwrap(), DetectionResult::normal());
    assert_eq!(detector.ingest(&scene).unwrap(), DetectionResult::normal());
}

#[test]
fn injected_rectangle_is_detected_where_it_is() {
    let base = backdrop(500, 375, GREY);
    let mut detector = MotionDetector::new(MotionConfig::default());
    detector.ingest(&base).unwrap();

    let result = detector.ingest(&with_block(&base, 300, 120, 40, 40, BRIGHT)).unwrap();
    assert_eq!(result.label, MotionLabel::MotionDetected);
    let injected = BoundingBox::new(300, 120, 40, 40);
    assert!(result.regions.iter().any(|region| region.overlaps(&injected)));
    for region in &result.regions {
        assert!(region.x + 15 >= 300 && region.right() <= 340 + 15, "{region:?}");
    }
}

fn label_for_block(side: u32, at: (i32, i32)) -> MotionLabel {
    let base = backdrop(500, 375, GREY);
    let mut detector = MotionDetector::new(MotionConfig::default());
    detector.ingest(&base).unwrap();
    detector.ingest(&with_block(&base, at.0, at.1, side, side, BRIGHT)).unwrap().label
}

// The area gate sees the blurred, thresholded and dilated region, which is
// several pixels wider than the block itself.
#[test]
fn twelve_pixel_block_stays_below_the_area_gate() {
    for at in [(50, 50), (250, 180), (440, 320)] {
        assert_eq!(label_for_block(12, at), MotionLabel::Normal, "block at {at:?}");
    }
}

#[test]
fn sixteen_pixel_block_clears_the_area_gate() {
    for at in [(50, 50), (250, 180), (440, 320)] {
        assert_eq!(label_for_block(16, at), MotionLabel::MotionDetected, "block at {at:?}");
    }
}

#[test]
fn disk_centroid_and_radius_are_recovered() {
    let tracker = ColorTracker::new(TrackingConfig::default(), PolicyConfig::default());
    for (cx, cy, r) in [(450, 300, 40), (200, 150, 25), (700, 420, 90)] {
        let frame = with_disk(&backdrop(900, 600, [200, 200, 190]), (cx, cy), r, BLUE);
        let result = tracker.track(&frame).unwrap();
        let (x, y) = result.center().unwrap();
        assert!((x - cx as f64).abs() < 3.0, "x {x} vs {cx}");
        assert!((y - cy as f64).abs() < 3.0, "y {y} vs {cy}");
        let radius = result.radius().unwrap();
        assert!((radius - r as f64).abs() < 4.0, "radius {radius} vs {r}");
    }
}

#[test]
fn empty_mask_tracks_nothing() {
    let tracker = ColorTracker::new(TrackingConfig::default(), PolicyConfig::default());
    let frame = with_disk(&backdrop(900, 600, [200, 200, 190]), (450, 300), 60, [220, 30, 30]);
    let result = tracker.track(&frame).unwrap();
    assert_eq!(result.center(), None);
    assert_eq!(result.radius(), None);
    assert_eq!(result.command, Command::None);
}

#[test]
fn policy_is_total_and_deterministic() {
    let policy = PolicyConfig::default();
    let xs = [0.0, 149.0, 150.0, 151.0, 300.0, 449.0, 450.0, 451.0, 900.0];
    let radii = [0.0, 10.0, 11.0, 249.0, 250.0, 251.0, 1000.0];
    for &x in &xs {
        for &r in &radii {
            let first = direction_policy::decide(x, r, 900, &policy);
            assert!(matches!(first, Command::Left | Command::Right | Command::Front | Command::Stop));
            assert_eq!(first, direction_policy::decide(x, r, 900, &policy));
        }
    }
    assert_eq!(direction_policy::decide(150.0, 10.0, 900, &policy), Command::Front);
    assert_eq!(direction_policy::decide(450.0, 10.0, 900, &policy), Command::Front);
    assert_eq!(direction_policy::decide(300.0, 250.0, 900, &policy), Command::Stop);
    assert_eq!(direction_policy::decide(451.0, 251.0, 900, &policy), Command::Stop);
}
