//! Grouping and querying strokes by their bounding boxes.

use std::collections::HashMap;

use paperkit::ink::{
    StrokeId, cluster_strokes, find_all_strokes_contained_within, find_all_strokes_outside,
    find_all_strokes_partly_outside, find_ink_near_point, find_stroke_with_largest_area,
};
use paperkit::{Ink, InkStroke, Pt};

/// Strokes with a label each, so cluster partitions can be printed.
#[derive(Default)]
struct Labeled {
    labels: HashMap<StrokeId, &'static str>,
}

impl Labeled {
    /// A one-unit-tall stroke spanning `x0..x1`.
    fn bar(&mut self, label: &'static str, x0: f64, x1: f64) -> InkStroke {
        let stroke = InkStroke::from_points(&[(x0, 0.0), (x1, 1.0)]);
        self.labels.insert(stroke.id(), label);
        stroke
    }

    fn partition(&self, clusters: &[Ink]) -> String {
        clusters
            .iter()
            .map(|c| {
                let members: Vec<_> = c.strokes().iter().map(|s| self.labels[&s.id()]).collect();
                format!("{{{}}}", members.join(","))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn names<'a>(&self, strokes: impl IntoIterator<Item = &'a InkStroke>) -> Vec<&'static str> {
        strokes.into_iter().map(|s| self.labels[&s.id()]).collect()
    }
}

#[test]
fn isolated_stroke_stays_alone_in_any_order() {
    let mut l = Labeled::default();
    let a = l.bar("A", 0.0, 1.0);
    let b = l.bar("B", 1.2, 2.2);
    let c = l.bar("C", 10.0, 11.0);

    let forward = cluster_strokes(&[a.clone(), b.clone(), c.clone()], 0.5);
    insta::assert_snapshot!(l.partition(&forward), @"{A,B} {C}");

    let rotated = cluster_strokes(&[c, a, b], 0.5);
    insta::assert_snapshot!(l.partition(&rotated), @"{C} {A,B}");
}

#[test]
fn bridging_stroke_makes_clustering_order_dependent() {
    // With a margin of 1.0 each bar grows by half a unit per side. A and B
    // overlap, B and C overlap, A and C do not.
    let mut l = Labeled::default();
    let a = l.bar("A", 0.0, 1.0);
    let b = l.bar("B", 1.8, 2.8);
    let c = l.bar("C", 3.6, 4.6);

    // B arrives second and grows A's cluster far enough to catch C.
    let bridged = cluster_strokes(&[a.clone(), b.clone(), c.clone()], 1.0);
    insta::assert_snapshot!(l.partition(&bridged), @"{A,B,C}");

    // C arrives before the bridge and starts its own cluster; B then joins
    // the first cluster it meets and the two are never merged.
    let split = cluster_strokes(&[a, c, b], 1.0);
    insta::assert_snapshot!(l.partition(&split), @"{A,B} {C}");
}

#[test]
fn zero_margin_groups_overlapping_boxes_only() {
    // B overlaps A; C only touches B's right edge.
    let mut l = Labeled::default();
    let a = l.bar("A", 0.0, 1.0);
    let b = l.bar("B", 0.5, 2.0);
    let c = l.bar("C", 2.0, 3.0);
    let clusters = cluster_strokes(&[a, b, c], 0.0);
    insta::assert_snapshot!(l.partition(&clusters), @"{A,B} {C}");

    let mut l = Labeled::default();
    let a = l.bar("A", 0.0, 1.0);
    let b = l.bar("B", 1.0, 2.0);
    let clusters = cluster_strokes(&[a, b], 0.0);
    insta::assert_snapshot!(l.partition(&clusters), @"{A} {B}");
}

#[test]
fn edge_and_flat_strokes_fall_outside_the_container() {
    let mut l = Labeled::default();
    let frame = InkStroke::from_points(&[(0.0, 0.0), (10.0, 10.0)]);
    let touching = InkStroke::from_points(&[(10.0, 0.0), (12.0, 2.0)]);
    l.labels.insert(touching.id(), "touching");
    let rule = InkStroke::from_points(&[(2.0, 5.0), (8.0, 5.0)]);
    l.labels.insert(rule.id(), "rule");
    let well = vec![Ink::with_strokes("page", vec![touching, rule])];

    assert_eq!(l.names(find_all_strokes_outside(&well, &frame)), ["touching", "rule"]);
    assert!(find_all_strokes_contained_within(&well, &frame).is_empty());
    assert!(find_all_strokes_partly_outside(&well, &frame).is_empty());
}

#[test]
fn reloaded_strokes_keep_geometry_but_not_identity() {
    let original = InkStroke::from_points(&[(100.0, 100.0), (101.0, 101.0)]);
    let synced: Ink = serde_json::from_str(
        &serde_json::to_string(&Ink::with_strokes("batch", vec![original.clone()])).unwrap(),
    )
    .unwrap();
    let container = InkStroke::from_points(&[(0.0, 0.0), (200.0, 200.0)]);
    let reloaded = &synced.strokes()[0];

    assert_ne!(reloaded, &original);
    assert_ne!(reloaded, &container);
    assert_eq!(reloaded.bounds(), original.bounds());
    assert_eq!(find_all_strokes_contained_within(&[synced.clone()], &container), [reloaded]);
}

#[test]
fn containment_queries_partition_the_ink_well() {
    let mut l = Labeled::default();
    let frame = InkStroke::from_points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
    l.labels.insert(frame.id(), "frame");
    let copy = frame.clone();
    let inside = l.bar("inside", 2.0, 4.0);
    let edge = l.bar("edge", 9.0, 12.0);
    let away = InkStroke::from_points(&[(20.0, 20.0), (21.0, 21.0)]);
    l.labels.insert(away.id(), "away");

    let well = vec![
        Ink::with_strokes("page", vec![frame.clone(), inside, edge]),
        Ink::with_strokes("margin", vec![away, copy]),
    ];

    // The clone of the frame is the frame itself and is never its own content.
    assert_eq!(l.names(find_all_strokes_contained_within(&well, &frame)), ["inside"]);
    assert_eq!(l.names(find_all_strokes_partly_outside(&well, &frame)), ["edge"]);
    assert_eq!(l.names(find_all_strokes_outside(&well, &frame)), ["away"]);
}

#[test]
fn identical_bounds_are_contained_but_not_the_container() {
    let container = InkStroke::from_points(&[(0.0, 0.0), (5.0, 5.0)]);
    let lookalike = InkStroke::from_points(&[(0.0, 0.0), (5.0, 5.0)]);
    let well = vec![Ink::with_strokes("all", vec![container.clone(), lookalike.clone()])];
    assert_eq!(find_all_strokes_contained_within(&well, &container), [&lookalike]);
    assert_eq!(find_all_strokes_contained_within(&well, &lookalike), [&container]);
}

#[test]
fn near_point_and_largest_area_scan_in_order() {
    let mut l = Labeled::default();
    let small = l.bar("small", 0.0, 1.0);
    let wide = l.bar("wide", 5.0, 9.0);
    let also_wide = l.bar("also_wide", 20.0, 24.0);
    let inks = vec![
        Ink::with_strokes("first", vec![small]),
        Ink::with_strokes("second", vec![wide, also_wide]),
    ];

    assert_eq!(find_ink_near_point(&inks, Pt::new(4.5, 0.5), 0.6).map(Ink::name), Some("second"));
    assert_eq!(find_ink_near_point(&inks, Pt::new(3.0, 0.5), 2.5).map(Ink::name), Some("first"));
    assert!(find_ink_near_point(&inks, Pt::new(3.0, 0.5), 0.5).is_none());

    let biggest = find_stroke_with_largest_area(&inks).unwrap();
    assert_eq!(l.labels[&biggest.id()], "wide");
}
