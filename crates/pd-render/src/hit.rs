//! Hit testing: point → every node under it.
//!
//! Walks the tree in paint order and reports at most one hit per node, so
//! the last entry of the result is the topmost node. Polygons are tested
//! for a vertex first, then an edge, then the interior. A container reports
//! a hit only when one of its descendants was hit, placed right before
//! those descendant hits.

use crate::graph::{SceneGraph, handle_of};
use kurbo::{BezPath, Shape as _};
use pd_core::scene::label_rect;
use pd_core::{HitKind, Point, RawHit, Shape};
use petgraph::graph::NodeIndex;

/// All hits at `point`, back to front.
pub fn hit_test_all(graph: &SceneGraph, point: Point, tolerance: f64) -> Vec<RawHit> {
    let mut hits = Vec::new();
    for &child in graph.children(graph.root) {
        hit_test_node(graph, child, point, tolerance, &mut hits);
    }
    log::trace!("hit test at {point:?} (tol {tolerance}): {} hit(s)", hits.len());
    hits
}

/// Topmost hit at `point`, if any.
pub fn hit_test(graph: &SceneGraph, point: Point, tolerance: f64) -> Option<RawHit> {
    hit_test_all(graph, point, tolerance).pop()
}

fn hit_test_node(
    graph: &SceneGraph,
    idx: NodeIndex,
    point: Point,
    tolerance: f64,
    out: &mut Vec<RawHit>,
) {
    let node = &graph.graph[idx];
    if !node.visible {
        return;
    }

    if let Shape::Group = node.shape {
        let start = out.len();
        for &child in graph.children(idx) {
            hit_test_node(graph, child, point, tolerance, out);
        }
        if out.len() > start {
            out.insert(
                start,
                RawHit {
                    node: handle_of(idx),
                    kind: HitKind::Bounds,
                },
            );
        }
        return;
    }

    if let Some(kind) = hit_shape(&node.shape, point, tolerance) {
        out.push(RawHit {
            node: handle_of(idx),
            kind,
        });
    }
}

fn hit_shape(shape: &Shape, point: Point, tolerance: f64) -> Option<HitKind> {
    match shape {
        Shape::Polygon { points, .. } => hit_polygon(points, point, tolerance),
        Shape::Circle { center, radius, .. } => {
            (center.distance(point) <= radius + tolerance).then_some(HitKind::Fill)
        }
        Shape::Label {
            center,
            text,
            font_size,
            ..
        } => label_rect(*center, text, *font_size)
            .inflate(tolerance, tolerance)
            .contains(point)
            .then_some(HitKind::Fill),
        Shape::MenuItem { rect, .. } => rect.contains(point).then_some(HitKind::Fill),
        Shape::Group | Shape::Overlay { .. } | Shape::Draft { .. } | Shape::Backdrop { .. } => {
            None
        }
    }
}

fn hit_polygon(points: &[Point], point: Point, tolerance: f64) -> Option<HitKind> {
    let nearest_vertex = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.distance(point)))
        .filter(|&(_, d)| d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((vertex, _)) = nearest_vertex {
        return Some(HitKind::Segment { vertex });
    }

    let n = points.len();
    if n >= 2 {
        let nearest_edge = (0..n)
            .map(|i| (i, segment_distance(points[i], points[(i + 1) % n], point)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((edge, _)) = nearest_edge {
            return Some(HitKind::Stroke { edge });
        }
    }

    (n >= 3 && outline_path(points).contains(point)).then_some(HitKind::Fill)
}

fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a.lerp(b, t).distance(p)
}

fn outline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::{Color, Scene};
    use pretty_assertions::assert_eq;

    const RED: Color = Color::rgba(1.0, 0.0, 0.0, 0.7);

    fn square(scene: &mut SceneGraph) -> (pd_core::NodeHandle, pd_core::NodeHandle) {
        let group = scene.insert(None, Shape::Group);
        let outline = scene.insert(
            Some(group),
            Shape::Polygon {
                points: vec![
                    Point::new(10.0, 10.0),
                    Point::new(100.0, 10.0),
                    Point::new(100.0, 100.0),
                    Point::new(10.0, 100.0),
                ],
                fill: RED,
                stroke: RED,
            },
        );
        (group, outline)
    }

    fn kinds(hits: &[RawHit]) -> Vec<HitKind> {
        hits.iter().map(|h| h.kind).collect()
    }

    #[test]
    fn vertex_beats_edge_beats_fill() {
        let mut scene = SceneGraph::default();
        let (group, outline) = square(&mut scene);

        let on_vertex = scene.hit_test_all(Point::new(102.0, 12.0), 10.0);
        assert_eq!(kinds(&on_vertex), vec![HitKind::Bounds, HitKind::Segment { vertex: 1 }]);
        assert_eq!(on_vertex[0].node, group);
        assert_eq!(on_vertex[1].node, outline);

        let on_edge = scene.hit_test_all(Point::new(55.0, 98.0), 10.0);
        assert_eq!(kinds(&on_edge)[1], HitKind::Stroke { edge: 2 });

        let inside = scene.hit_test_all(Point::new(55.0, 55.0), 10.0);
        assert_eq!(kinds(&inside)[1], HitKind::Fill);
    }

    #[test]
    fn closing_edge_wraps_to_first_vertex() {
        let mut scene = SceneGraph::default();
        square(&mut scene);
        let hits = scene.hit_test_all(Point::new(12.0, 55.0), 5.0);
        assert_eq!(kinds(&hits)[1], HitKind::Stroke { edge: 3 });
    }

    #[test]
    fn empty_canvas_misses() {
        let mut scene = SceneGraph::default();
        square(&mut scene);
        assert!(scene.hit_test_all(Point::new(300.0, 300.0), 10.0).is_empty());
        assert_eq!(hit_test(&scene, Point::new(300.0, 300.0), 10.0), None);
    }

    #[test]
    fn container_needs_a_hit_descendant() {
        let mut scene = SceneGraph::default();
        let group = scene.insert(None, Shape::Group);
        scene.insert(
            Some(group),
            Shape::Polygon {
                points: vec![
                    Point::new(100.0, 100.0),
                    Point::new(300.0, 100.0),
                    Point::new(100.0, 300.0),
                ],
                fill: RED,
                stroke: RED,
            },
        );
        // Inside the bounding box, outside the triangle.
        assert!(scene.hit_test_all(Point::new(280.0, 280.0), 10.0).is_empty());

        let inside = scene.hit_test_all(Point::new(150.0, 150.0), 10.0);
        assert_eq!(kinds(&inside), vec![HitKind::Bounds, HitKind::Fill]);
        assert_eq!(inside[0].node, group);
    }

    #[test]
    fn later_nodes_come_last() {
        let mut scene = SceneGraph::default();
        let (_, below) = square(&mut scene);
        let (_, above) = square(&mut scene);
        let top = hit_test(&scene, Point::new(55.0, 55.0), 1.0).unwrap();
        assert_eq!(top.node, above);
        let all = scene.hit_test_all(Point::new(55.0, 55.0), 1.0);
        assert_eq!(all.len(), 4);
        assert_eq!(all[1].node, below);
    }

    #[test]
    fn overlays_and_hidden_nodes_are_never_hit() {
        let mut scene = SceneGraph::default();
        let (group, _) = square(&mut scene);
        scene.insert(
            None,
            Shape::Overlay {
                points: vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0), Point::new(0.0, 200.0)],
                fill: Color::WHITE,
            },
        );
        scene.set_visible(group, false);
        assert!(scene.hit_test_all(Point::new(20.0, 20.0), 10.0).is_empty());
    }

    #[test]
    fn circles_and_labels_hit_as_fill() {
        let mut scene = SceneGraph::default();
        let circle = scene.insert(
            None,
            Shape::Circle {
                center: Point::new(50.0, 50.0),
                radius: 10.0,
                fill: RED,
                stroke: Color::WHITE,
            },
        );
        let label = scene.insert(
            None,
            Shape::Label {
                center: Point::new(300.0, 300.0),
                text: "Zone".into(),
                font_size: 10.0,
                text_color: Color::WHITE,
                background: RED,
            },
        );
        assert_eq!(hit_test(&scene, Point::new(58.0, 58.0), 5.0).map(|h| h.node), Some(circle));
        assert_eq!(hit_test(&scene, Point::new(312.0, 300.0), 0.0).map(|h| h.node), Some(label));
    }
}
