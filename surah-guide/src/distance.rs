//! Closest landmark and direction of correction

use surah_core::{BoundingBox, DirectionVote, Horizontal, Landmark, LandmarkSet, Vertical};

use crate::error::GuidanceError;

/// The landmark nearest the target centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closest {
    pub landmark: Landmark,
    pub distance: f64,
}

/// Euclidean pixel distance from a landmark to the centre of `target`
pub fn distance_to_center(landmark: &Landmark, target: &BoundingBox) -> f64 {
    let (cx, cy) = target.center();
    (landmark.x as f64 - cx).hypot(landmark.y as f64 - cy)
}

/// Nearest landmark to the target centre. Ties go to the earliest landmark.
pub fn closest(landmarks: &LandmarkSet, target: &BoundingBox) -> Result<Closest, GuidanceError> {
    let mut best: Option<Closest> = None;
    for landmark in landmarks {
        let distance = distance_to_center(landmark, target);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Closest {
                landmark: *landmark,
                distance,
            });
        }
    }
    best.ok_or(GuidanceError::NoLandmarks)
}

/// Which way the hand must move on each axis.
///
/// A landmark left of the band must move right and vice versa; above the
/// band (smaller y) it must move backwards, below it forwards. Points on
/// the band edge count as inside.
pub fn direction(closest: &Landmark, target: &BoundingBox, tolerance: i32) -> DirectionVote {
    let (cx, cy) = target.center();
    let tol = tolerance as f64;
    let (x, y) = (closest.x as f64, closest.y as f64);

    let horizontal = if x < cx - tol {
        Horizontal::Right
    } else if x > cx + tol {
        Horizontal::Left
    } else {
        Horizontal::None
    };

    let vertical = if y < cy - tol {
        Vertical::Backward
    } else if y > cy + tol {
        Vertical::Forward
    } else {
        Vertical::None
    };

    DirectionVote::new(horizontal, vertical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use surah_core::HandLandmark;

    fn lm(id: HandLandmark, x: i32, y: i32) -> Landmark {
        Landmark::new(id, x, y)
    }

    #[test]
    fn test_closest_picks_minimum() {
        let target = BoundingBox::new(100, 100, 50, 50);
        let set: LandmarkSet = vec![
            lm(HandLandmark::Wrist, 300, 300),
            lm(HandLandmark::IndexFingerTip, 120, 120),
            lm(HandLandmark::ThumbTip, 200, 125),
        ]
        .into();

        let c = closest(&set, &target).unwrap();
        assert_eq!(c.landmark.id, HandLandmark::IndexFingerTip);
        assert!((c.distance - 50f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_closest_tie_goes_to_first() {
        let target = BoundingBox::new(0, 0, 100, 100);
        let set: LandmarkSet = vec![
            lm(HandLandmark::ThumbTip, 60, 50),
            lm(HandLandmark::PinkyFingerTip, 40, 50),
        ]
        .into();
        assert_eq!(closest(&set, &target).unwrap().landmark.id, HandLandmark::ThumbTip);
    }

    #[test]
    fn test_closest_empty() {
        let target = BoundingBox::new(0, 0, 10, 10);
        assert!(matches!(closest(&LandmarkSet::new(), &target), Err(GuidanceError::NoLandmarks)));
    }

    #[test]
    fn test_direction_landmark_right_of_target() {
        // Centre (200, 200)
        let target = BoundingBox::new(150, 150, 100, 100);
        let vote = direction(&lm(HandLandmark::IndexFingerTip, 260, 200), &target, 40);
        assert_eq!(vote, DirectionVote::new(Horizontal::Left, Vertical::None));
    }

    #[test]
    fn test_direction_each_quadrant() {
        let target = BoundingBox::new(150, 150, 100, 100);
        let vote = direction(&lm(HandLandmark::Wrist, 100, 100), &target, 40);
        assert_eq!(vote, DirectionVote::new(Horizontal::Right, Vertical::Backward));
        let vote = direction(&lm(HandLandmark::Wrist, 300, 300), &target, 40);
        assert_eq!(vote, DirectionVote::new(Horizontal::Left, Vertical::Forward));
    }

    #[test]
    fn test_direction_band_edges_inclusive() {
        let target = BoundingBox::new(150, 150, 100, 100);
        for (x, y) in [(160, 160), (240, 240), (160, 240), (240, 160)] {
            let vote = direction(&lm(HandLandmark::Wrist, x, y), &target, 40);
            assert!(vote.is_centered(), "({}, {}) should be inside the band", x, y);
        }
        let vote = direction(&lm(HandLandmark::Wrist, 159, 241), &target, 40);
        assert_eq!(vote, DirectionVote::new(Horizontal::Right, Vertical::Forward));
    }

    #[test]
    fn test_direction_is_pure() {
        let target = BoundingBox::new(10, 20, 30, 40);
        let landmark = lm(HandLandmark::MiddleFingerTip, 90, 5);
        assert_eq!(direction(&landmark, &target, 12), direction(&landmark, &target, 12));
    }

    fn landmark_strategy() -> impl Strategy<Value = Landmark> {
        (0usize..21, -500i32..1500, -500i32..1500)
            .prop_map(|(i, x, y)| Landmark::new(HandLandmark::ALL[i], x, y))
    }

    proptest! {
        #[test]
        fn prop_closest_is_minimal_and_earliest(
            landmarks in prop::collection::vec(landmark_strategy(), 1..30),
            x in 0i32..800, y in 0i32..600, w in 0u32..300, h in 0u32..300,
        ) {
            let target = BoundingBox::new(x, y, w, h);
            let set: LandmarkSet = landmarks.clone().into();
            let c = closest(&set, &target).unwrap();

            let first_min = landmarks
                .iter()
                .position(|l| distance_to_center(l, &target) == c.distance)
                .unwrap();
            prop_assert_eq!(landmarks[first_min], c.landmark);
            for l in &landmarks {
                prop_assert!(c.distance <= distance_to_center(l, &target));
            }
        }

        #[test]
        fn prop_band_edges_vote_none(
            x in 0i32..800, y in 0i32..600, half_w in 0u32..150, half_h in 0u32..150,
            tolerance in 0i32..100, sx in prop::bool::ANY, sy in prop::bool::ANY,
        ) {
            let target = BoundingBox::new(x, y, half_w * 2, half_h * 2);
            let (cx, cy) = target.center_px();
            let px = if sx { cx + tolerance } else { cx - tolerance };
            let py = if sy { cy + tolerance } else { cy - tolerance };
            let vote = direction(&Landmark::new(HandLandmark::Wrist, px, py), &target, tolerance);
            prop_assert_eq!(vote.horizontal, Horizontal::None);
            prop_assert_eq!(vote.vertical, Vertical::None);
        }

        #[test]
        fn prop_direction_idempotent(
            l in landmark_strategy(), x in 0i32..800, y in 0i32..600,
            w in 0u32..300, h in 0u32..300, tolerance in 0i32..100,
        ) {
            let target = BoundingBox::new(x, y, w, h);
            prop_assert_eq!(direction(&l, &target, tolerance), direction(&l, &target, tolerance));
        }
    }
}
