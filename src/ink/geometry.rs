//! Bounding-box queries over collections of ink.
//!
//! Everything here is a plain sequential scan, and where several candidates
//! qualify the first one in input order wins. Clustering in particular is
//! first fit: results depend on the order strokes are given in.
//!
//! Overlap is open and needs area: boxes that only share an edge do not
//! overlap, and a stroke whose bounds have no width or no height (a dot, a
//! straight horizontal or vertical line) neither overlaps nor is contained.

use super::{Ink, InkStroke};
use crate::types::{Pt, Rect};

fn all_strokes(ink_well: &[Ink]) -> impl Iterator<Item = &InkStroke> {
    ink_well.iter().flat_map(|ink| ink.strokes())
}

/// Strokes whose bounds lie entirely within `container`'s bounds. The
/// container itself is never returned, even when another stroke has the
/// very same bounds.
pub fn find_all_strokes_contained_within<'a>(ink_well: &'a [Ink], container: &InkStroke) -> Vec<&'a InkStroke> {
    let bounds = container.bounds();
    all_strokes(ink_well)
        .filter(|s| s != &container && bounds.encloses(&s.bounds()))
        .collect()
}

/// Strokes whose bounds do not overlap `container`'s bounds. Strokes that
/// merely touch its edge are outside.
pub fn find_all_strokes_outside<'a>(ink_well: &'a [Ink], container: &InkStroke) -> Vec<&'a InkStroke> {
    let bounds = container.bounds();
    all_strokes(ink_well)
        .filter(|s| !bounds.overlaps(&s.bounds()))
        .collect()
}

/// Strokes that overlap `container`'s bounds without fitting inside them.
pub fn find_all_strokes_partly_outside<'a>(ink_well: &'a [Ink], container: &InkStroke) -> Vec<&'a InkStroke> {
    let bounds = container.bounds();
    all_strokes(ink_well)
        .filter(|s| {
            let b = s.bounds();
            bounds.overlaps(&b) && !bounds.encloses(&b)
        })
        .collect()
}

struct Cluster {
    bounds: Rect,
    strokes: Vec<InkStroke>,
}

/// Group strokes whose boxes, each grown by `margin` times its own size,
/// overlap.
///
/// Strokes are taken in order. Each joins the first existing cluster whose
/// bounds meet its grown box, or starts a new one. A cluster's bounds are the
/// union of its members' grown boxes, so clusters only ever grow and are never
/// merged after the fact. Clusters are returned in creation order, named
/// `cluster-0`, `cluster-1`, ...
pub fn cluster_strokes(strokes: &[InkStroke], margin: f64) -> Vec<Ink> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for stroke in strokes {
        let grown = stroke.bounds().expand_by_fraction(margin);
        match clusters.iter_mut().find(|c| c.bounds.overlaps(&grown)) {
            Some(cluster) => {
                cluster.bounds = cluster.bounds.union(&grown);
                cluster.strokes.push(stroke.clone());
            }
            None => clusters.push(Cluster {
                bounds: grown,
                strokes: vec![stroke.clone()],
            }),
        }
    }
    clusters
        .into_iter()
        .enumerate()
        .map(|(i, c)| Ink::with_strokes(format!("cluster-{i}"), c.strokes))
        .collect()
}

/// The first ink with a stroke whose bounds overlap the square window of
/// half-width `range` around `point`. First hit, not nearest. A negative
/// range matches nothing.
pub fn find_ink_near_point(ink_well: &[Ink], point: Pt, range: f64) -> Option<&Ink> {
    if range < 0.0 {
        return None;
    }
    let window = Rect::around(point, range);
    ink_well
        .iter()
        .find(|ink| ink.strokes().iter().any(|s| window.overlaps(&s.bounds())))
}

/// The stroke with the largest bounding-box area across all inks. Ties go to
/// the first one seen. Strokes without area never qualify.
pub fn find_stroke_with_largest_area(ink_well: &[Ink]) -> Option<&InkStroke> {
    let mut best: Option<&InkStroke> = None;
    for stroke in all_strokes(ink_well) {
        if stroke.area() > best.map_or(0.0, InkStroke::area) {
            best = Some(stroke);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, side: f64) -> InkStroke {
        InkStroke::from_points(&[(x, y), (x + side, y + side)])
    }

    fn well(strokes: &[&InkStroke]) -> Vec<Ink> {
        vec![Ink::with_strokes("all", strokes.iter().map(|s| (*s).clone()).collect())]
    }

    #[test]
    fn containment_excludes_the_container_itself() {
        let container = square(0.0, 0.0, 10.0);
        let twin = square(0.0, 0.0, 10.0);
        let inner = square(2.0, 2.0, 3.0);
        let straddle = square(8.0, 8.0, 5.0);
        let far = square(20.0, 20.0, 1.0);
        let ink = well(&[&container, &twin, &inner, &straddle, &far]);

        let inside = find_all_strokes_contained_within(&ink, &container);
        assert_eq!(inside, [&twin, &inner]);
        assert_eq!(find_all_strokes_partly_outside(&ink, &container), [&straddle]);
        assert_eq!(find_all_strokes_outside(&ink, &container), [&far]);
    }

    #[test]
    fn touching_and_flat_strokes_are_outside() {
        let container = square(0.0, 0.0, 10.0);
        let touching = square(10.0, 0.0, 2.0);
        let line = InkStroke::from_points(&[(2.0, 5.0), (8.0, 5.0)]);
        let ink = well(&[&touching, &line]);
        assert_eq!(find_all_strokes_outside(&ink, &container), [&touching, &line]);
        assert!(find_all_strokes_contained_within(&ink, &container).is_empty());
        assert!(find_all_strokes_partly_outside(&ink, &container).is_empty());
    }

    #[test]
    fn flat_container_contains_nothing() {
        let rule = InkStroke::from_points(&[(0.0, 5.0), (10.0, 5.0)]);
        let dot = InkStroke::from_points(&[(4.0, 5.0)]);
        let ink = well(&[&rule, &dot]);
        assert!(find_all_strokes_contained_within(&ink, &rule).is_empty());
        assert_eq!(find_all_strokes_outside(&ink, &rule), [&rule, &dot]);
    }

    #[test]
    fn zero_margin_keeps_touching_strokes_apart() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(10.0, 0.0, 2.0);
        assert_eq!(cluster_strokes(&[a, b], 0.0).len(), 2);
    }

    #[test]
    fn dots_form_their_own_clusters() {
        let dot = InkStroke::from_points(&[(1.0, 1.0)]);
        let around = square(0.0, 0.0, 2.0);
        let clusters = cluster_strokes(&[around, dot.clone()], 1.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].strokes(), [dot]);
    }

    #[test]
    fn margin_is_relative_to_each_stroke() {
        // 10-wide strokes 4 apart: a 0.5 margin grows each side by 2.5.
        let a = square(0.0, 0.0, 10.0);
        let b = square(14.0, 0.0, 10.0);
        assert_eq!(cluster_strokes(&[a.clone(), b.clone()], 0.0).len(), 2);
        assert_eq!(cluster_strokes(&[a, b], 0.5).len(), 1);
    }

    #[test]
    fn clusters_keep_input_order() {
        let a = square(0.0, 0.0, 1.0);
        let far = square(50.0, 50.0, 1.0);
        let b = square(1.5, 0.0, 1.0);
        let clusters = cluster_strokes(&[a.clone(), far.clone(), b.clone()], 1.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].strokes(), [a, b]);
        assert_eq!(clusters[1].strokes(), [far]);
        assert_eq!(clusters[1].name(), "cluster-1");
    }

    #[test]
    fn near_point_returns_first_ink_hit() {
        let first = Ink::with_strokes("first", vec![square(0.0, 0.0, 1.0)]);
        let second = Ink::with_strokes("second", vec![square(3.0, 0.0, 1.0)]);
        let inks = [first, second];
        // The window reaches both inks; the first in list order wins even
        // though the second is closer.
        let hit = find_ink_near_point(&inks, Pt::new(3.0, 0.5), 2.5).unwrap();
        assert_eq!(hit.name(), "first");
        assert_eq!(find_ink_near_point(&inks, Pt::new(3.0, 0.5), 0.5).unwrap().name(), "second");
        assert!(find_ink_near_point(&inks, Pt::new(30.0, 30.0), 1.0).is_none());
    }

    #[test]
    fn negative_or_zero_range_matches_nothing() {
        let inks = [Ink::with_strokes("only", vec![square(0.0, 0.0, 4.0)])];
        assert!(find_ink_near_point(&inks, Pt::new(2.0, 2.0), 1.0).is_some());
        assert!(find_ink_near_point(&inks, Pt::new(2.0, 2.0), -1.0).is_none());
        assert!(find_ink_near_point(&inks, Pt::new(2.0, 2.0), 0.0).is_none());
    }

    #[test]
    fn largest_area_keeps_first_maximum() {
        let small = square(0.0, 0.0, 1.0);
        let big = square(0.0, 0.0, 4.0);
        let also_big = square(10.0, 10.0, 4.0);
        let inks = [
            Ink::with_strokes("a", vec![small]),
            Ink::with_strokes("b", vec![big.clone(), also_big]),
        ];
        assert_eq!(find_stroke_with_largest_area(&inks), Some(&big));
        assert_eq!(find_stroke_with_largest_area(&[]), None);
    }

    #[test]
    fn zero_area_strokes_never_win() {
        let dot = InkStroke::from_points(&[(1.0, 1.0)]);
        let line = InkStroke::from_points(&[(0.0, 0.0), (9.0, 0.0)]);
        let inks = [Ink::with_strokes("flat", vec![dot, line])];
        assert_eq!(find_stroke_with_largest_area(&inks), None);

        let tiny = square(5.0, 5.0, 0.1);
        let inks = [Ink::with_strokes("mixed", vec![inks[0].strokes()[0].clone(), tiny.clone()])];
        assert_eq!(find_stroke_with_largest_area(&inks), Some(&tiny));
    }
}
