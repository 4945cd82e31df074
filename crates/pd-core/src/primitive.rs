//! Host-facing primitive polygon representation and the conversion between
//! it and the live group collection.

use crate::bus::ChangeBus;
use crate::config::EditorConfig;
use crate::coords::{CoordinateSpace, to_absolute, to_relative};
use crate::group::{GroupSeed, PolygonGroup};
use crate::model::Payload;
use crate::palette::Palette;
use crate::scene::Scene;
use crate::store::{Announce, PolygonStore};
use crate::view::ViewTransform;
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitivePoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for PrimitivePoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PrimitivePoint> for Point {
    fn from(p: PrimitivePoint) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Wire format between host and editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitivePolygon {
    pub points: Vec<PrimitivePoint>,
    pub center: PrimitivePoint,
    /// CSS colour. Reported on output; ignored on input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// Convert every group, in collection order, into its primitive form.
///
/// Relative points are divided by the device size of the viewport, so the
/// result does not change with zoom or pan.
pub fn to_primitive(
    store: &PolygonStore,
    space: CoordinateSpace,
    view: &ViewTransform,
) -> Vec<PrimitivePolygon> {
    let viewport = view.visible_bounds().size();
    let zoom = view.zoom();
    let convert = |p: Point| -> PrimitivePoint {
        match space {
            CoordinateSpace::Absolute => p.into(),
            CoordinateSpace::Relative => to_relative(p, viewport, zoom).into(),
        }
    };
    store
        .iter()
        .map(|group| group_to_primitive(group, &convert))
        .collect()
}

fn group_to_primitive(
    group: &PolygonGroup,
    convert: &impl Fn(Point) -> PrimitivePoint,
) -> PrimitivePolygon {
    PrimitivePolygon {
        points: group.outline().iter().map(|p| convert(*p)).collect(),
        center: convert(group.center().position),
        color: Some(group.color().to_css_hex()),
        payload: group.payload().cloned(),
    }
}

/// Build groups from relative primitives without announcing them.
///
/// Each polygon gets the next palette colour. Entries with fewer than three
/// points are skipped. Returns how many groups were created.
pub fn load_primitives(
    store: &mut PolygonStore,
    scene: &mut dyn Scene,
    config: &EditorConfig,
    bus: &ChangeBus,
    palette: &mut Palette,
    polygons: &[PrimitivePolygon],
) -> usize {
    let viewport = scene.view().view_size();
    let mut loaded = 0;
    for (i, polygon) in polygons.iter().enumerate() {
        if polygon.points.len() < 3 {
            log::warn!(
                "skipping primitive polygon {i}: {} point(s), need at least 3",
                polygon.points.len()
            );
            continue;
        }
        let seed = GroupSeed {
            outline: polygon
                .points
                .iter()
                .map(|p| to_absolute((*p).into(), viewport))
                .collect(),
            center: Some(to_absolute(polygon.center.into(), viewport)),
            color: palette.next_color(config.fill_opacity),
            payload: polygon.payload.clone(),
        };
        match store.create(scene, config, bus, seed, Announce::Silent) {
            Ok(_) => loaded += 1,
            Err(err) => log::warn!("skipping primitive polygon {i}: {err}"),
        }
    }
    log::debug!("loaded {loaded} of {} primitive polygon(s)", polygons.len());
    loaded
}
