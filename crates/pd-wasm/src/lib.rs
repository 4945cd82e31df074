//! WASM bridge for PD: exposes the polygon editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the
//! canvas: it loads the backdrop image, forwards DOM pointer/wheel/key
//! events, calls `poll()` once per animation frame, and paints the node
//! list returned by `render_list()`. Structured data crosses the boundary
//! as JSON strings.

use js_sys::Function;
use pd_core::{
    ConfigField, CoordinateSpace, Cursor, EditorConfig, EditorError, NodeHandle, PartialConfig,
    Payload, Point, PrimitivePolygon, Scene, Shape, Size,
};
use pd_editor::{Clock, Confirm, Editor, InputEvent, Key, Modifiers, MouseButton};
use pd_render::SceneGraph;
use serde::Serialize;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor handle.
#[wasm_bindgen]
pub struct PdEditor {
    editor: Editor<SceneGraph>,
}

#[wasm_bindgen]
impl PdEditor {
    /// Create an editor for a canvas of `width` × `height` device pixels.
    /// `config_json` is an optional camelCase configuration object.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Result<PdEditor, JsValue> {
        console_error_panic_hook_setup();

        let mut config = EditorConfig::default();
        if let Some(json) = config_json {
            config.apply(PartialConfig::from_json(&json).map_err(js_err)?);
        }
        let scene = SceneGraph::new(Size::new(width, height));
        Ok(Self {
            editor: Editor::with_clock(scene, config, host_clock()),
        })
    }

    /// Start the editor once the backdrop image has loaded.
    /// `initial_json` is an optional array of relative primitive polygons.
    pub fn init(
        &mut self,
        image_width: f64,
        image_height: f64,
        initial_json: Option<String>,
    ) -> Result<(), JsValue> {
        let initial: Vec<PrimitivePolygon> = match initial_json {
            Some(json) => serde_json::from_str(&json).map_err(|e| js_err(e.into()))?,
            None => Vec::new(),
        };
        self.editor
            .init_with_backdrop(Size::new(image_width, image_height), &initial)
            .map_err(js_err)
    }

    pub fn destroy(&mut self) {
        self.editor.destroy();
    }

    // ─── Callbacks ───────────────────────────────────────────────────────

    /// `callback(polygons)` receives the relative polygon list after each
    /// burst of changes. Pass `null` to stop listening.
    pub fn set_on_change_listener(&mut self, callback: Option<Function>) {
        let Some(callback) = callback else {
            self.editor.set_on_change_listener(None);
            return;
        };
        self.editor
            .set_on_change_listener(Some(Box::new(move |polygons: &[PrimitivePolygon]| {
                let Some(arg) = to_js(polygons) else {
                    return;
                };
                if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
                    log::warn!("change listener threw: {err:?}");
                }
            })));
    }

    /// `confirm(message) -> bool` gates polygon deletion. `null` restores
    /// the always-yes default.
    pub fn set_confirm(&mut self, confirm: Option<Function>) {
        match confirm {
            Some(function) => self.editor.set_confirm(Box::new(JsConfirm(function))),
            None => self.editor.set_confirm(Box::new(pd_editor::AlwaysConfirm)),
        }
    }

    /// `formatter(payload) -> string | null` produces center labels.
    pub fn set_label_formatter(&mut self, formatter: Option<Function>) {
        let field = match formatter {
            Some(function) => ConfigField::LabelFormatter(Rc::new(move |payload: &Payload| {
                let arg = to_js(payload)?;
                match function.call1(&JsValue::NULL, &arg) {
                    Ok(value) => value.as_string(),
                    Err(err) => {
                        log::warn!("label formatter threw: {err:?}");
                        None
                    }
                }
            })),
            None => ConfigField::LabelFormatter(EditorConfig::default().label_formatter),
        };
        self.editor.set_config_field(field);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// `button` is the DOM `MouseEvent.button` index.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) {
        self.editor.handle_input(&InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::from_index(button),
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.editor.handle_input(&InputEvent::PointerMove {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        button: i32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) {
        self.editor.handle_input(&InputEvent::PointerUp {
            x,
            y,
            button: MouseButton::from_index(button),
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
        self.editor.handle_input(&InputEvent::Wheel { x, y, delta_y });
    }

    /// `key` is the DOM `KeyboardEvent.key` value.
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.editor.handle_input(&InputEvent::Key {
            key: Key::from_name(key),
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    // ─── Change delivery ─────────────────────────────────────────────────

    /// Deliver a due change notification. Call once per animation frame.
    pub fn poll(&mut self) -> bool {
        self.editor.poll()
    }

    pub fn flush(&mut self) -> bool {
        self.editor.flush()
    }

    // ─── Index-addressed operations ──────────────────────────────────────

    pub fn highlight_by_index(&mut self, index: usize) -> bool {
        self.editor.highlight_by_index(index)
    }

    pub fn unhighlight_all(&mut self) {
        self.editor.unhighlight_all();
    }

    pub fn delete_by_index(&mut self, index: usize) -> bool {
        self.editor.delete_by_index(index)
    }

    /// `payload_json` is a JSON object, or `None`/`"null"` to clear.
    pub fn set_payload_by_index(
        &mut self,
        index: usize,
        payload_json: Option<String>,
    ) -> Result<bool, JsValue> {
        let payload: Option<Payload> = match payload_json {
            Some(json) => serde_json::from_str(&json).map_err(|e| js_err(e.into()))?,
            None => None,
        };
        Ok(self.editor.set_payload_by_index(index, payload))
    }

    // ─── Configuration ───────────────────────────────────────────────────

    /// Set one configuration key; `value_json` is its JSON value.
    pub fn set_config_field(&mut self, key: &str, value_json: &str) -> Result<(), JsValue> {
        let value: serde_json::Value =
            serde_json::from_str(value_json).map_err(|e| js_err(e.into()))?;
        let patch = PartialConfig::from_field(key, value).map_err(js_err)?;
        self.editor.set_config(patch);
        Ok(())
    }

    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsValue> {
        self.editor.set_config_json(config_json).map_err(js_err)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Current polygons as JSON, in `"absolute"` or `"relative"` space.
    /// Any other space name throws.
    pub fn get_polygons(&self, space: &str) -> Result<String, JsValue> {
        let space: CoordinateSpace = space.parse().map_err(js_err)?;
        serde_json::to_string(&self.editor.snapshot(space)).map_err(|e| js_err(e.into()))
    }

    /// Everything the host needs to paint one frame, as JSON.
    pub fn render_list(&self) -> String {
        serde_json::to_string(&render_frame(self.editor.scene())).unwrap_or_default()
    }

    pub fn cursor(&self) -> String {
        cursor_name(self.editor.scene().cursor()).to_string()
    }

    pub fn polygon_count(&self) -> usize {
        self.editor.polygons().len()
    }
}

// ─── Host glue ───────────────────────────────────────────────────────────

struct JsConfirm(Function);

impl Confirm for JsConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        match self.0.call1(&JsValue::NULL, &JsValue::from_str(message)) {
            Ok(answer) => answer.as_bool().unwrap_or(false),
            Err(err) => {
                log::warn!("confirm prompt threw: {err:?}");
                false
            }
        }
    }
}

/// Wall-clock time from `Date.now()`.
struct DateClock;

impl Clock for DateClock {
    fn now(&self) -> Duration {
        Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
    }
}

fn host_clock() -> Rc<dyn Clock> {
    if cfg!(target_arch = "wasm32") {
        Rc::new(DateClock)
    } else {
        Rc::new(pd_editor::SystemClock::default())
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Option<JsValue> {
    let json = serde_json::to_string(value).ok()?;
    js_sys::JSON::parse(&json).ok()
}

fn js_err(err: EditorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn cursor_name(cursor: Cursor) -> &'static str {
    match cursor {
        Cursor::Default => "default",
        Cursor::Pointer => "pointer",
    }
}

// ─── Render list ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RenderNode<'a> {
    id: NodeHandle,
    parent: Option<NodeHandle>,
    selected: bool,
    #[serde(flatten)]
    shape: &'a Shape,
}

#[derive(Debug, Serialize)]
struct RenderFrame<'a> {
    zoom: f64,
    /// Project point at the middle of the view.
    center: Point,
    view_size: Size,
    cursor: Cursor,
    /// Visible nodes, back to front.
    nodes: Vec<RenderNode<'a>>,
}

fn render_frame(scene: &SceneGraph) -> RenderFrame<'_> {
    let view = scene.view();
    let nodes = scene
        .paint_order()
        .into_iter()
        .filter_map(|id| {
            let node = scene.node(id)?;
            Some(RenderNode {
                id,
                parent: scene.parent(id),
                selected: node.selected,
                shape: &node.shape,
            })
        })
        .collect();
    RenderFrame {
        zoom: view.zoom(),
        center: view.center(),
        view_size: view.view_size(),
        cursor: scene.cursor(),
        nodes,
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::{Color, Rect};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn render_frame_lists_visible_nodes_back_to_front() {
        let mut scene = SceneGraph::default();
        let backdrop = scene.insert(
            None,
            Shape::Backdrop {
                rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            },
        );
        let group = scene.insert(None, Shape::Group);
        let outline = scene.insert(
            Some(group),
            Shape::Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
                fill: Color::rgba(1.0, 0.0, 0.0, 0.7),
                stroke: Color::rgba(1.0, 0.0, 0.0, 1.0),
            },
        );
        let hidden = scene.insert(Some(group), Shape::Group);
        scene.set_visible(hidden, false);
        scene.set_selected(outline, true);

        let frame = serde_json::to_value(render_frame(&scene)).unwrap();
        let nodes = frame["nodes"].as_array().unwrap();
        let ids: Vec<u64> = nodes.iter().map(|n| n["id"].as_u64().unwrap()).collect();
        assert_eq!(
            ids,
            vec![
                u64::from(backdrop.raw()),
                u64::from(group.raw()),
                u64::from(outline.raw())
            ]
        );
        assert_eq!(nodes[2]["type"], json!("polygon"));
        assert_eq!(nodes[2]["selected"], json!(true));
        assert_eq!(nodes[2]["parent"], json!(group.raw()));
        assert_eq!(nodes[0]["parent"], json!(null));
        assert_eq!(frame["zoom"], json!(1.0));
        assert_eq!(frame["cursor"], json!("default"));
    }

    #[test]
    fn dom_modifiers_and_cursor_names() {
        assert_eq!(modifiers(true, false, false, false), Modifiers::SHIFT);
        assert_eq!(cursor_name(Cursor::Pointer), "pointer");
    }
}
