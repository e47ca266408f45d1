use loam_stream::{LodInfo, StreamSettings};
use proptest::prelude::*;

fn levels() -> impl Strategy<Value = Vec<LodInfo>> {
    prop::collection::vec((0u32..3, 1.0f32..100.0), 1..6).prop_map(|steps| {
        let mut lod = 0u32;
        let mut range = 0.0f32;
        steps
            .into_iter()
            .map(|(dl, dr)| {
                lod += dl;
                range += dr;
                LodInfo { lod, range }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn lod_never_gets_finer_with_distance(
        detail_levels in levels(),
        a in 0.0f32..600.0,
        b in 0.0f32..600.0,
    ) {
        let s = StreamSettings { detail_levels, move_threshold: 0.0 };
        prop_assert!(s.validate().is_ok());
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(s.lod_for(near) <= s.lod_for(far));
    }

    #[test]
    fn lod_is_bounded_by_first_and_last_levels(detail_levels in levels(), d in 0.0f32..600.0) {
        let s = StreamSettings { detail_levels, move_threshold: 0.0 };
        let first = s.detail_levels[0];
        let last = *s.detail_levels.last().unwrap();
        let lod = s.lod_for(d);
        prop_assert!(lod >= first.lod && lod <= last.lod);
        if d <= first.range {
            prop_assert_eq!(lod, first.lod);
        }
        if d > s.max_view_distance() {
            prop_assert_eq!(lod, last.lod);
        }
    }
}
