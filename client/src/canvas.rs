use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use chrono::Utc;
use gridclaim_shared::config::CELL_OUTLINE_WEIGHT;
use gridclaim_shared::probe::format_probe;
use gridclaim_shared::{CellBounds, GridFrame, ImageBounds, Mode, Point, Session, SurfaceClick};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, PointerEvent,
    WheelEvent,
};

use crate::app::canvas_dimensions;
use crate::colors::{ACCENT, BACKGROUND, rgba_css};
use crate::render_loop::RenderScheduler;
use crate::viewport::Viewport;

/// Pointer travel below this still counts as a click rather than a drag.
const CLICK_SLOP_PX: f64 = 5.0;
const MARKER_RADIUS: f64 = 7.0;

/// Image-space rectangle currently on screen.
#[derive(Debug, Clone, Copy)]
struct VisibleRect {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl VisibleRect {
    fn of(vp: &Viewport, w: f64, h: f64) -> Self {
        let top_left = vp.screen_to_world(0.0, 0.0);
        let bottom_right = vp.screen_to_world(w, h);
        Self {
            left: top_left.x,
            top: top_left.y,
            right: bottom_right.x,
            bottom: bottom_right.y,
        }
    }

    fn overlaps(&self, cell: &CellBounds) -> bool {
        cell.right > self.left
            && cell.left < self.right
            && cell.bottom > self.top
            && cell.top < self.bottom
    }
}

fn screen_rect(vp: &Viewport, bounds: &CellBounds) -> (f64, f64, f64, f64) {
    let (x1, y1) = vp.world_to_screen(bounds.left, bounds.top);
    let (x2, y2) = vp.world_to_screen(bounds.right, bounds.bottom);
    (x1, y1, x2 - x1, y2 - y1)
}

/// Claimed cells filled with their team color, then every visible outline in one stroke.
fn draw_grid(ctx: &CanvasRenderingContext2d, vp: &Viewport, frame: &GridFrame, w: f64, h: f64) {
    let visible = VisibleRect::of(vp, w, h);

    let mut current_fill: Option<&str> = None;
    for cell in frame.claimed().filter(|c| visible.overlaps(&c.bounds)) {
        let Some(fill) = cell.fill.as_ref() else {
            continue;
        };
        if current_fill != Some(fill.css.as_str()) {
            ctx.set_fill_style_str(&fill.css);
            current_fill = Some(fill.css.as_str());
        }
        let (x, y, cw, ch) = screen_rect(vp, &cell.bounds);
        ctx.fill_rect(x, y, cw, ch);
    }

    ctx.begin_path();
    for cell in frame.cells().iter().filter(|c| visible.overlaps(&c.bounds)) {
        let (x, y, cw, ch) = screen_rect(vp, &cell.bounds);
        ctx.rect(x, y, cw, ch);
    }
    ctx.set_line_width(CELL_OUTLINE_WEIGHT);
    ctx.set_stroke_style_str(&rgba_css(0, 0, 0, 1.0));
    ctx.stroke();
}

fn draw_marker(ctx: &CanvasRenderingContext2d, vp: &Viewport, at: Point) {
    let (x, y) = vp.world_to_screen(at.x, at.y);
    ctx.begin_path();
    if ctx.arc(x, y, MARKER_RADIUS, 0.0, TAU).is_err() {
        return;
    }
    ctx.set_fill_style_str(ACCENT);
    ctx.fill();
    ctx.set_line_width(2.0);
    ctx.set_stroke_style_str(&rgba_css(0, 0, 0, 0.85));
    ctx.stroke();

    let label = format!("{}, {}", at.x, at.y);
    ctx.set_font("12px 'JetBrains Mono', monospace");
    ctx.set_line_width(3.0);
    ctx.stroke_text(&label, x + MARKER_RADIUS + 4.0, y + 4.0).ok();
    ctx.set_fill_style_str(ACCENT);
    ctx.fill_text(&label, x + MARKER_RADIUS + 4.0, y + 4.0).ok();
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, e: &MouseEvent) -> (f64, f64) {
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (
                e.client_x() as f64 - rect.left(),
                e.client_y() as f64 - rect.top(),
            )
        })
        .unwrap_or((e.offset_x() as f64, e.offset_y() as f64))
}

/// The map surface: image, grid overlay and lookup marker on one Canvas 2D.
#[component]
pub fn MapCanvas(image: HtmlImageElement, bounds: ImageBounds) -> impl IntoView {
    let session: RwSignal<Session> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Row count only changes when zoom crosses a ladder step.
    let rows = Memo::new(move |_| {
        let zoom = viewport.with(|vp| vp.zoom());
        session.with(|s| s.rows_for_zoom(zoom))
    });
    // Pans leave `rows` unchanged, so the frame is only rebuilt on edits and density changes.
    let frame = Memo::new(move |_| {
        let rows = rows.get();
        session.with(|s| s.grid_visible().then(|| s.render(rows)))
    });

    Effect::new(move || {
        let rows = rows.get();
        web_sys::console::info_1(&format!("grid density: {rows}x{rows}").into());
    });

    let fitted = Rc::new(Cell::new(false));
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let pw = (w * dpr).round() as u32;
        let ph = (h * dpr).round() as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            // Canvas resize resets 2D context state.
            *cached_ctx.borrow_mut() = None;
        }

        if !fitted.get() {
            fitted.set(true);
            viewport.update(|vp| vp.fit_image(bounds, w, h));
            return;
        }

        let ctx = {
            let mut cache = cached_ctx.borrow_mut();
            if cache.is_none() {
                *cache = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            }
            let Some(ctx) = cache.clone() else {
                return;
            };
            ctx
        };
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        let vp = viewport.get_untracked();
        let (ox, oy) = vp.world_to_screen(0.0, 0.0);
        ctx.set_image_smoothing_enabled(vp.scale < 1.0);
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            &image,
            ox,
            oy,
            bounds.width() as f64 * vp.scale,
            bounds.height() as f64 * vp.scale,
        )
        .ok();

        frame.with_untracked(|frame| {
            if let Some(frame) = frame {
                draw_grid(&ctx, &vp, frame, w, h);
            }
        });

        if let Some(marker) = session.with_untracked(|s| s.lookup_marker()) {
            draw_marker(&ctx, &vp, marker);
        }
    });
    let scheduler = Rc::new(scheduler);

    let sched_state = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        frame.track();
        session.with(|s| s.lookup_marker());
        sched_state.mark_dirty();
    });

    let sched_resize = scheduler.clone();
    let _ = window_event_listener(leptos::ev::resize, move |_| sched_resize.mark_dirty());

    // --- Input handlers ---

    let is_dragging = Rc::new(Cell::new(false));
    let drag_start = Rc::new(Cell::new((0.0_f64, 0.0_f64)));
    let last_pos = Rc::new(Cell::new((0.0_f64, 0.0_f64)));
    let pinch_dist = Rc::new(Cell::new(0.0_f64));

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let delta = e.delta_y();
        let x = e.offset_x() as f64;
        let y = e.offset_y() as f64;
        viewport.update(|vp| vp.zoom_at(delta, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start = drag_start.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            let pos = (e.client_x() as f64, e.client_y() as f64);
            drag_start.set(pos);
            last_pos.set(pos);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            if !is_dragging.get() {
                return;
            }
            let (lx, ly) = last_pos.get();
            let dx = e.client_x() as f64 - lx;
            let dy = e.client_y() as f64 - ly;
            last_pos.set((e.client_x() as f64, e.client_y() as f64));
            let (cw, ch) = canvas_dimensions();
            viewport.update(|vp| {
                vp.pan(dx, dy);
                vp.clamp_to_image(bounds, cw, ch);
            });
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |_: PointerEvent| is_dragging.set(false)
    };

    let on_click = {
        let drag_start = drag_start.clone();
        move |e: MouseEvent| {
            let (sx, sy) = drag_start.get();
            let dx = (e.client_x() as f64 - sx).abs();
            let dy = (e.client_y() as f64 - sy).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let (x, y) = local_point(canvas_ref, &e);
            let vp = viewport.get_untracked();
            let at = vp.screen_to_world(x, y);
            let zoom = vp.zoom();
            let outcome = session.try_update(|s| s.click(at, zoom, Utc::now()));
            if let Some(SurfaceClick::Probe(point)) = outcome {
                web_sys::console::info_1(&format!("probe {}", format_probe(point)).into());
            }
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                let new_dist = (dx * dx + dy * dy).sqrt();
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 {
                    let mid_x = (t0.client_x() + t1.client_x()) as f64 / 2.0;
                    let mid_y = (t0.client_y() + t1.client_y()) as f64 / 2.0;
                    let delta = -(new_dist - old_dist) * 2.0;
                    viewport.update(|vp| vp.zoom_at(delta, mid_x, mid_y));
                }

                pinch_dist.set(new_dist);
            }
        }
    };

    let cursor = move || match session.with(|s| s.mode()) {
        Mode::Coords => "crosshair",
        Mode::Select => "pointer",
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none;"
                style:cursor=cursor
            />
        </div>
    }
}
