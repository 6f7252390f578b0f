use approx::assert_relative_eq;
use spl_topology::{BSplineSlot, CurveMode, Topology};

#[test]
fn test_linear_segment_counts() {
    assert_eq!(Topology::resolve(CurveMode::Linear, false, 2).segment_count(), 1);
    assert_eq!(Topology::resolve(CurveMode::Linear, false, 5).segment_count(), 4);
    // Closed linear stores the closing point, so 4 distinct points + 1
    assert_eq!(Topology::resolve(CurveMode::Linear, true, 5).segment_count(), 4);
}

#[test]
fn test_bezier_segment_counts() {
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 4).segment_count(), 1);
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 7).segment_count(), 2);
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 10).group_count(), 9);
    // Incomplete trailing group is ignored
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 9).segment_count(), 2);
}

#[test]
fn test_bspline_segment_counts() {
    assert_eq!(Topology::resolve(CurveMode::BSpline, false, 5).segment_count(), 4);
    assert_eq!(Topology::resolve(CurveMode::BSpline, true, 5).segment_count(), 5);
}

#[test]
fn test_degenerate_counts_have_no_segments() {
    for mode in [CurveMode::Linear, CurveMode::Bezier, CurveMode::BSpline] {
        for closed in [false, true] {
            assert_eq!(Topology::resolve(mode, closed, 0).segment_count(), 0);
            assert_eq!(Topology::resolve(mode, closed, 1).segment_count(), 0);
        }
    }
    assert!(Topology::resolve(CurveMode::Bezier, false, 3).is_degenerate());
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 3).segment_count(), 0);
}

#[test]
fn test_anchor_counts() {
    assert_eq!(Topology::resolve(CurveMode::Linear, true, 5).anchor_count(), 4);
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 1).anchor_count(), 1);
    assert_eq!(Topology::resolve(CurveMode::Bezier, false, 7).anchor_count(), 3);
    assert_eq!(Topology::resolve(CurveMode::Bezier, true, 10).anchor_count(), 3);
    assert_eq!(Topology::resolve(CurveMode::BSpline, true, 6).anchor_count(), 6);
}

#[test]
fn test_locate_and_back() {
    let topo = Topology::resolve(CurveMode::Linear, false, 5);
    let loc = topo.locate(0.6);
    assert_eq!(loc.segment, 2);
    assert_relative_eq!(loc.local_t, 0.4, epsilon = 1e-12);
    assert_relative_eq!(topo.to_global(loc.segment, loc.local_t), 0.6, epsilon = 1e-12);

    let end = topo.locate(1.0);
    assert_eq!(end.segment, 3);
    assert_relative_eq!(end.local_t, 1.0);
}

#[test]
fn test_to_global_wraps_closed() {
    let topo = Topology::resolve(CurveMode::BSpline, true, 4);
    assert_eq!(topo.to_global(3, 1.0), 0.0);
    assert_relative_eq!(topo.to_global(1, 0.5), 0.375, epsilon = 1e-12);
}

#[test]
fn test_linear_wrap() {
    let open = Topology::resolve(CurveMode::Linear, false, 4);
    assert_eq!(open.wrap(-1), 0);
    assert_eq!(open.wrap(7), 3);

    let closed = Topology::resolve(CurveMode::Linear, true, 5);
    assert_eq!(closed.wrap(4), 0);
    assert_eq!(closed.wrap(-1), 3);
    assert_eq!(closed.linear_window(3), [3, 0]);
}

#[test]
fn test_bezier_window() {
    let topo = Topology::resolve(CurveMode::Bezier, false, 7);
    assert_eq!(topo.bezier_window(0), [0, 1, 2, 3]);
    assert_eq!(topo.bezier_window(1), [3, 4, 5, 6]);
    // Out-of-range segments are pinned to the last full group
    assert_eq!(topo.bezier_window(5), [3, 4, 5, 6]);
}

#[test]
fn test_bspline_window_open_extrapolates() {
    let topo = Topology::resolve(CurveMode::BSpline, false, 4);
    assert_eq!(
        topo.bspline_window(0),
        [
            BSplineSlot::Extrapolated { near: 0, next: 1 },
            BSplineSlot::Point(0),
            BSplineSlot::Point(1),
            BSplineSlot::Point(2),
        ]
    );
    assert_eq!(
        topo.bspline_window(2),
        [
            BSplineSlot::Point(1),
            BSplineSlot::Point(2),
            BSplineSlot::Point(3),
            BSplineSlot::Extrapolated { near: 3, next: 2 },
        ]
    );
}

#[test]
fn test_bspline_window_closed_wraps() {
    let topo = Topology::resolve(CurveMode::BSpline, true, 4);
    assert_eq!(
        topo.bspline_window(0),
        [
            BSplineSlot::Point(3),
            BSplineSlot::Point(0),
            BSplineSlot::Point(1),
            BSplineSlot::Point(2),
        ]
    );
    assert_eq!(
        topo.bspline_window(3),
        [
            BSplineSlot::Point(2),
            BSplineSlot::Point(3),
            BSplineSlot::Point(0),
            BSplineSlot::Point(1),
        ]
    );
}
