//! Browser front end: DOM events in, canvas draws and scene snapshots out.
//!
//! JS owns the page. It calls the exported functions with canvas-relative
//! pointer positions and receives every committed scene as a JSON string
//! through the callback registered with [`set_scene_changed_callback`].

use std::cell::RefCell;
use std::collections::HashMap;

use editor::{EditMode, EditorConfig, EditorEvent, Effect, InteractionController};
use foundation::math::{CanvasSize, Vec2};
use render::{RenderCommand, RenderFrame, rgba_css};
use scene::{IngestRequest, SceneSnapshot};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

const LABEL_FONT: &str = "12px system-ui, -apple-system, Segoe UI, Roboto, sans-serif";

struct EditorApp {
    controller: InteractionController,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Bitmap of the current asset, once its load is accepted.
    image: Option<HtmlImageElement>,
    /// Elements still loading, by generation.
    pending_images: HashMap<u64, HtmlImageElement>,
    on_scene_changed: Option<js_sys::Function>,
}

thread_local! {
    static APP: RefCell<Option<EditorApp>> = const { RefCell::new(None) };
}

fn with_app<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut EditorApp) -> R,
{
    APP.try_with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.as_mut()
            .map(f)
            .ok_or_else(|| JsValue::from_str("editor not initialized"))
    })
    .map_err(|_| JsValue::from_str("editor state unavailable"))?
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}

/// Attaches the editor to `canvas_id`. `snapshot_json` is the persisted
/// scene (`{assets, navigation}`, may be empty); `config_json` may be empty.
#[wasm_bindgen]
pub fn init_editor(canvas_id: &str, snapshot_json: &str, config_json: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("missing {canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let config: EditorConfig = if config_json.trim().is_empty() {
        EditorConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&format!("config: {e}")))?
    };
    let snapshot: SceneSnapshot = if snapshot_json.trim().is_empty() {
        SceneSnapshot::default()
    } else {
        serde_json::from_str(snapshot_json)
            .map_err(|e| JsValue::from_str(&format!("scene: {e}")))?
    };

    let (mut controller, mut effects) = InteractionController::open(config, snapshot);
    effects.extend(controller.dispatch(EditorEvent::Resize {
        size: CanvasSize::new(canvas.width() as f64, canvas.height() as f64),
    }));

    APP.with(|cell| {
        *cell.borrow_mut() = Some(EditorApp {
            controller,
            canvas,
            ctx,
            image: None,
            pending_images: HashMap::new(),
            on_scene_changed: None,
        });
    });
    run_effects(effects)
}

/// `callback(sceneJson)` is invoked after every committed mutation.
#[wasm_bindgen]
pub fn set_scene_changed_callback(callback: js_sys::Function) -> Result<(), JsValue> {
    with_app(|app| app.on_scene_changed = Some(callback))
}

#[wasm_bindgen]
pub fn pointer_down(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    dispatch(EditorEvent::PointerDown {
        at: Vec2::new(x_px, y_px),
    })
}

#[wasm_bindgen]
pub fn pointer_move(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    dispatch(EditorEvent::PointerMove {
        at: Vec2::new(x_px, y_px),
    })
}

#[wasm_bindgen]
pub fn pointer_up(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    dispatch(EditorEvent::PointerUp {
        at: Vec2::new(x_px, y_px),
    })
}

#[wasm_bindgen]
pub fn click(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    dispatch(EditorEvent::Click {
        at: Vec2::new(x_px, y_px),
    })
}

#[wasm_bindgen]
pub fn begin_link() -> Result<(), JsValue> {
    dispatch(EditorEvent::BeginLink)
}

#[wasm_bindgen]
pub fn choose_target(target: usize) -> Result<(), JsValue> {
    dispatch(EditorEvent::ChooseTarget { target })
}

#[wasm_bindgen]
pub fn cancel() -> Result<(), JsValue> {
    dispatch(EditorEvent::Cancel)
}

/// `"focus"` or `"navigation"`.
#[wasm_bindgen]
pub fn set_mode(mode: &str) -> Result<(), JsValue> {
    let mode = match mode {
        "focus" => EditMode::Focus,
        "navigation" => EditMode::Navigation,
        other => return Err(JsValue::from_str(&format!("unknown mode: {other}"))),
    };
    dispatch(EditorEvent::SetMode { mode })
}

#[wasm_bindgen]
pub fn select_asset(asset: usize) -> Result<(), JsValue> {
    dispatch(EditorEvent::SelectAsset { asset })
}

#[wasm_bindgen]
pub fn resize(width: f64, height: f64) -> Result<(), JsValue> {
    with_app(|app| {
        app.canvas.set_width(width.max(1.0) as u32);
        app.canvas.set_height(height.max(1.0) as u32);
    })?;
    dispatch(EditorEvent::Resize {
        size: CanvasSize::new(width, height),
    })
}

#[wasm_bindgen]
pub fn ingest(
    url: String,
    thumbnail: Option<String>,
    title: Option<String>,
    description: Option<String>,
) -> Result<(), JsValue> {
    dispatch(EditorEvent::Ingest {
        request: IngestRequest {
            url,
            thumbnail,
            title,
            description,
        },
    })
}

#[wasm_bindgen]
pub fn remove_asset(asset: usize) -> Result<(), JsValue> {
    dispatch(EditorEvent::RemoveAsset { asset })
}

#[wasm_bindgen]
pub fn remove_link(link: usize) -> Result<(), JsValue> {
    dispatch(EditorEvent::RemoveLink { link })
}

#[wasm_bindgen]
pub fn set_asset_title(asset: usize, title: String) -> Result<(), JsValue> {
    dispatch(EditorEvent::SetAssetTitle { asset, title })
}

#[wasm_bindgen]
pub fn set_asset_description(asset: usize, description: String) -> Result<(), JsValue> {
    dispatch(EditorEvent::SetAssetDescription { asset, description })
}

#[wasm_bindgen]
pub fn set_link_label(link: usize, label: String) -> Result<(), JsValue> {
    dispatch(EditorEvent::SetLinkLabel { link, label })
}

#[wasm_bindgen]
pub fn set_link_description(link: usize, description: String) -> Result<(), JsValue> {
    dispatch(EditorEvent::SetLinkDescription { link, description })
}

#[wasm_bindgen]
pub fn reset_view() -> Result<(), JsValue> {
    dispatch(EditorEvent::ResetView)
}

/// Any [`EditorEvent`] as tagged JSON, e.g. `{"type":"cancel"}`.
#[wasm_bindgen]
pub fn dispatch_json(event_json: &str) -> Result<(), JsValue> {
    let event: EditorEvent =
        serde_json::from_str(event_json).map_err(|e| JsValue::from_str(&format!("event: {e}")))?;
    dispatch(event)
}

/// Current scene as JSON, for hosts that poll instead of subscribing.
#[wasm_bindgen]
pub fn scene_json() -> Result<String, JsValue> {
    let snapshot = with_app(|app| app.controller.state().scene.snapshot())?;
    serde_json::to_string(&snapshot).map_err(|e| JsValue::from_str(&format!("json: {e}")))
}

fn dispatch(event: EditorEvent) -> Result<(), JsValue> {
    let effects = with_app(|app| app.controller.dispatch(event))?;
    run_effects(effects)
}

/// Carries out effects with the state borrow released, since JS callbacks
/// may call straight back into the editor.
fn run_effects(effects: Vec<Effect>) -> Result<(), JsValue> {
    for effect in effects {
        match effect {
            Effect::Redraw => with_app(draw)??,
            Effect::SceneChanged(snapshot) => {
                let callback = with_app(|app| app.on_scene_changed.clone())?;
                if let Some(callback) = callback {
                    let payload = serde_json::to_string(&snapshot)
                        .map_err(|e| JsValue::from_str(&format!("json: {e}")))?;
                    callback.call1(&JsValue::NULL, &JsValue::from_str(&payload))?;
                }
            }
            Effect::LoadImage {
                asset,
                url,
                generation,
            } => {
                with_app(|app| app.image = None)?;
                load_image(asset, &url, generation)?;
            }
            Effect::Rejected(rejection) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!("rejected: {rejection}")));
            }
        }
    }
    Ok(())
}

fn load_image(asset: usize, url: &str, generation: u64) -> Result<(), JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_cross_origin(Some("anonymous"));

    let onload = wasm_bindgen::closure::Closure::once(move || {
        let accepted = with_app(|app| {
            let img = app.pending_images.remove(&generation);
            let effects = app.controller.dispatch(EditorEvent::ImageLoaded { generation });
            if !effects.is_empty() {
                app.image = img;
            }
            effects
        });
        if let Err(err) = accepted.and_then(run_effects) {
            web_sys::console::error_1(&err);
        }
    });
    let onerror = wasm_bindgen::closure::Closure::once(move || {
        let effects = with_app(|app| {
            app.pending_images.remove(&generation);
            app.controller.dispatch(EditorEvent::ImageFailed {
                generation,
                reason: format!("could not load panorama {asset}"),
            })
        });
        if let Err(err) = effects.and_then(run_effects) {
            web_sys::console::error_1(&err);
        }
    });
    img.set_onload(Some(onload.as_ref().unchecked_ref()));
    img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();

    img.set_src(url);
    with_app(|app| {
        app.pending_images.insert(generation, img);
    })
}

fn draw(app: &mut EditorApp) -> Result<(), JsValue> {
    let frame = app.controller.render();
    execute_frame(&app.ctx, app.image.as_ref(), &frame)
}

fn execute_frame(
    ctx: &CanvasRenderingContext2d,
    image: Option<&HtmlImageElement>,
    frame: &RenderFrame,
) -> Result<(), JsValue> {
    let canvas_w = ctx.canvas().map(|c| c.width() as f64).unwrap_or(0.0);
    let canvas_h = ctx.canvas().map(|c| c.height() as f64).unwrap_or(0.0);

    for cmd in &frame.commands {
        match cmd {
            RenderCommand::Clear { color } => {
                ctx_set_fill_style(ctx, &rgba_css(*color));
                ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);
            }
            RenderCommand::BeginRoll { center, degrees } => {
                ctx.save();
                ctx.translate(center.x, center.y)?;
                ctx.rotate(degrees.to_radians())?;
                ctx.translate(-center.x, -center.y)?;
            }
            RenderCommand::Image { origin, size } => {
                if let Some(img) = image {
                    ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img,
                        origin.x,
                        origin.y,
                        size.width,
                        size.height,
                    )?;
                }
            }
            RenderCommand::EndRoll => ctx.restore(),
            RenderCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                ctx_set_stroke_style(ctx, &rgba_css(*color));
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
            }
            RenderCommand::Marker {
                center,
                radius,
                color,
                label,
                ..
            } => {
                ctx_set_fill_style(ctx, &rgba_css(*color));
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU)?;
                ctx.fill();
                if !label.is_empty() {
                    ctx.set_font(LABEL_FONT);
                    ctx_set_stroke_style(ctx, "rgba(0,0,0,0.85)");
                    ctx.set_line_width(3.5);
                    let x = center.x + radius + 4.0;
                    let y = center.y + 4.0;
                    ctx.stroke_text(label, x, y)?;
                    ctx_set_fill_style(ctx, "rgba(255,255,255,0.92)");
                    ctx.fill_text(label, x, y)?;
                }
            }
            RenderCommand::Crosshair {
                center,
                half_size,
                color,
            } => {
                ctx_set_stroke_style(ctx, &rgba_css(*color));
                ctx.set_line_width(1.5);
                ctx.begin_path();
                ctx.move_to(center.x - half_size, center.y);
                ctx.line_to(center.x + half_size, center.y);
                ctx.move_to(center.x, center.y - half_size);
                ctx.line_to(center.x, center.y + half_size);
                ctx.stroke();
            }
            RenderCommand::Text { at, text, color } => {
                ctx.set_font(LABEL_FONT);
                ctx.set_text_align("center");
                ctx_set_fill_style(ctx, &rgba_css(*color));
                ctx.fill_text(text, at.x, at.y)?;
                ctx.set_text_align("start");
            }
        }
    }
    Ok(())
}

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(value),
    );
}

fn ctx_set_stroke_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(value),
    );
}
