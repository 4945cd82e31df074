//! Editor configuration.
//!
//! One [`EditorConfig`] is owned by each editor and handed by reference to
//! whatever needs it. Hosts change it through typed [`ConfigField`]s or
//! through a JSON [`PartialConfig`].

use crate::error::EditorError;
use crate::model::Payload;
use serde::Deserialize;
use std::fmt;
use std::rc::Rc;

/// Turns a group's payload into the text shown on its center marker.
pub type LabelFormatter = Rc<dyn Fn(&Payload) -> Option<String>>;

#[derive(Clone)]
pub struct EditorConfig {
    /// Pointer actuation distance in screen pixels (dragging, clicking,
    /// magnetic close). Divided by the zoom before hit testing.
    pub pointer_tolerance: f64,
    /// Polygon fill alpha, 0..1.
    pub fill_opacity: f64,
    /// Radius of an unlabelled center marker.
    pub center_radius: f64,
    /// Relative zoom change per wheel step, 0..1.
    pub zoom_factor: f64,
    pub label_formatter: LabelFormatter,
    pub label_font_size: f64,
    /// Hidden markers keep their coordinates but are neither drawn nor hit.
    pub centers_hidden: bool,
    pub confirm_deletion: bool,
    pub delete_confirm_text: String,
    pub delete_polygon_label: String,
    pub delete_vertex_label: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pointer_tolerance: 10.0,
            fill_opacity: 0.7,
            center_radius: 10.0,
            zoom_factor: 0.1,
            label_formatter: Rc::new(|_| None),
            label_font_size: 13.0,
            centers_hidden: false,
            confirm_deletion: true,
            delete_confirm_text: "Are you sure you want to delete this polygon?".into(),
            delete_polygon_label: "Delete polygon".into(),
            delete_vertex_label: "Delete vertex".into(),
        }
    }
}

impl fmt::Debug for EditorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorConfig")
            .field("pointer_tolerance", &self.pointer_tolerance)
            .field("fill_opacity", &self.fill_opacity)
            .field("center_radius", &self.center_radius)
            .field("zoom_factor", &self.zoom_factor)
            .field("label_font_size", &self.label_font_size)
            .field("centers_hidden", &self.centers_hidden)
            .field("confirm_deletion", &self.confirm_deletion)
            .finish_non_exhaustive()
    }
}

impl EditorConfig {
    /// Label text for `payload`, if the formatter produces one.
    pub fn label_for(&self, payload: Option<&Payload>) -> Option<String> {
        payload
            .and_then(|p| (self.label_formatter)(p))
            .filter(|text| !text.is_empty())
    }

    /// Apply a single typed field.
    pub fn set(&mut self, field: ConfigField) {
        match field {
            ConfigField::PointerTolerance(v) => self.pointer_tolerance = v.max(0.0),
            ConfigField::FillOpacity(v) => self.fill_opacity = clamp_unit("fill_opacity", v),
            ConfigField::CenterRadius(v) => self.center_radius = v.max(0.0),
            ConfigField::ZoomFactor(v) => self.zoom_factor = clamp_unit("zoom_factor", v),
            ConfigField::LabelFormatter(f) => self.label_formatter = f,
            ConfigField::LabelFontSize(v) => self.label_font_size = v.max(0.0),
            ConfigField::CentersHidden(v) => self.centers_hidden = v,
            ConfigField::ConfirmDeletion(v) => self.confirm_deletion = v,
            ConfigField::DeleteConfirmText(v) => self.delete_confirm_text = v,
            ConfigField::DeletePolygonLabel(v) => self.delete_polygon_label = v,
            ConfigField::DeleteVertexLabel(v) => self.delete_vertex_label = v,
        }
    }

    /// Apply every field present in `partial`.
    pub fn apply(&mut self, partial: PartialConfig) {
        for field in partial.into_fields() {
            self.set(field);
        }
    }
}

fn clamp_unit(name: &str, value: f64) -> f64 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if clamped != value {
        log::warn!("{name} {value} out of range, clamped to {clamped}");
    }
    clamped
}

/// One configuration key with its new value.
#[derive(Clone)]
pub enum ConfigField {
    PointerTolerance(f64),
    FillOpacity(f64),
    CenterRadius(f64),
    ZoomFactor(f64),
    LabelFormatter(LabelFormatter),
    LabelFontSize(f64),
    CentersHidden(bool),
    ConfirmDeletion(bool),
    DeleteConfirmText(String),
    DeletePolygonLabel(String),
    DeleteVertexLabel(String),
}

impl fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointerTolerance(v) => write!(f, "PointerTolerance({v})"),
            Self::FillOpacity(v) => write!(f, "FillOpacity({v})"),
            Self::CenterRadius(v) => write!(f, "CenterRadius({v})"),
            Self::ZoomFactor(v) => write!(f, "ZoomFactor({v})"),
            Self::LabelFormatter(_) => f.write_str("LabelFormatter(..)"),
            Self::LabelFontSize(v) => write!(f, "LabelFontSize({v})"),
            Self::CentersHidden(v) => write!(f, "CentersHidden({v})"),
            Self::ConfirmDeletion(v) => write!(f, "ConfirmDeletion({v})"),
            Self::DeleteConfirmText(v) => write!(f, "DeleteConfirmText({v:?})"),
            Self::DeletePolygonLabel(v) => write!(f, "DeletePolygonLabel({v:?})"),
            Self::DeleteVertexLabel(v) => write!(f, "DeleteVertexLabel({v:?})"),
        }
    }
}

/// Host-supplied configuration patch.
///
/// Keys are camelCase; the names used by earlier hosts
/// (`pointerEventsTolerance`, `polygonTransparency`, …) are accepted as
/// aliases. The label formatter is a function and can only be set through
/// [`ConfigField::LabelFormatter`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(alias = "pointerEventsTolerance")]
    pub pointer_tolerance: Option<f64>,
    #[serde(alias = "polygonTransparency")]
    pub fill_opacity: Option<f64>,
    #[serde(alias = "draggableCenterCircleRadius", alias = "draggableCenterRadius")]
    pub center_radius: Option<f64>,
    pub zoom_factor: Option<f64>,
    #[serde(alias = "centerPointLabelFontSize")]
    pub label_font_size: Option<f64>,
    #[serde(alias = "centerPointsHidden")]
    pub centers_hidden: Option<bool>,
    #[serde(alias = "shouldConfirmPolygonDeletion")]
    pub confirm_deletion: Option<bool>,
    #[serde(alias = "labelDeletePolygonConfirm")]
    pub delete_confirm_text: Option<String>,
    #[serde(alias = "labelDeletePolygon")]
    pub delete_polygon_label: Option<String>,
    #[serde(alias = "labelDeleteVertex")]
    pub delete_vertex_label: Option<String>,
}

impl PartialConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A patch holding the single entry `key: value`.
    pub fn from_field(key: &str, value: serde_json::Value) -> Result<Self, EditorError> {
        let mut object = serde_json::Map::new();
        object.insert(key.to_string(), value);
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn into_fields(self) -> Vec<ConfigField> {
        let mut fields = Vec::new();
        if let Some(v) = self.pointer_tolerance {
            fields.push(ConfigField::PointerTolerance(v));
        }
        if let Some(v) = self.fill_opacity {
            fields.push(ConfigField::FillOpacity(v));
        }
        if let Some(v) = self.center_radius {
            fields.push(ConfigField::CenterRadius(v));
        }
        if let Some(v) = self.zoom_factor {
            fields.push(ConfigField::ZoomFactor(v));
        }
        if let Some(v) = self.label_font_size {
            fields.push(ConfigField::LabelFontSize(v));
        }
        if let Some(v) = self.centers_hidden {
            fields.push(ConfigField::CentersHidden(v));
        }
        if let Some(v) = self.confirm_deletion {
            fields.push(ConfigField::ConfirmDeletion(v));
        }
        if let Some(v) = self.delete_confirm_text {
            fields.push(ConfigField::DeleteConfirmText(v));
        }
        if let Some(v) = self.delete_polygon_label {
            fields.push(ConfigField::DeletePolygonLabel(v));
        }
        if let Some(v) = self.delete_vertex_label {
            fields.push(ConfigField::DeleteVertexLabel(v));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.pointer_tolerance, 10.0);
        assert_eq!(config.fill_opacity, 0.7);
        assert_eq!(config.center_radius, 10.0);
        assert_eq!(config.zoom_factor, 0.1);
        assert_eq!(config.label_font_size, 13.0);
        assert!(config.confirm_deletion);
        assert!(!config.centers_hidden);
        assert_eq!(config.label_for(Some(&Payload::new())), None);
    }

    #[test]
    fn partial_config_from_json() {
        let partial =
            PartialConfig::from_json(r#"{"centerRadius": 14, "confirmDeletion": false}"#).unwrap();
        let mut config = EditorConfig::default();
        config.apply(partial);
        assert_eq!(config.center_radius, 14.0);
        assert!(!config.confirm_deletion);
        assert_eq!(config.pointer_tolerance, 10.0);
    }

    #[test]
    fn legacy_key_names_are_accepted() {
        let partial = PartialConfig::from_field("draggableCenterCircleRadius", json!(20)).unwrap();
        assert_eq!(partial.center_radius, Some(20.0));
        let partial = PartialConfig::from_field("draggableCenterRadius", json!(14)).unwrap();
        assert_eq!(partial.center_radius, Some(14.0));
        let patch = PartialConfig::from_json(r#"{"draggableCenterRadius": 8}"#).unwrap();
        assert_eq!(patch.center_radius, Some(8.0));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = PartialConfig::from_field("radius", json!(3)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidConfig(_)));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        assert!(PartialConfig::from_field("centersHidden", json!("yes")).is_err());
    }

    #[test]
    fn opacity_and_zoom_factor_are_clamped() {
        let mut config = EditorConfig::default();
        config.set(ConfigField::FillOpacity(1.5));
        config.set(ConfigField::ZoomFactor(-0.2));
        assert_eq!(config.fill_opacity, 1.0);
        assert_eq!(config.zoom_factor, 0.0);
    }

    #[test]
    fn empty_label_counts_as_none() {
        let mut config = EditorConfig::default();
        config.set(ConfigField::LabelFormatter(Rc::new(|p: &Payload| {
            p.get("name").and_then(|v| v.as_str()).map(str::to_string)
        })));
        let mut payload = Payload::new();
        payload.insert("name".into(), json!(""));
        assert_eq!(config.label_for(Some(&payload)), None);
        payload.insert("name".into(), json!("Zone A"));
        assert_eq!(config.label_for(Some(&payload)).as_deref(), Some("Zone A"));
        assert_eq!(config.label_for(None), None);
    }
}
