use gridclaim_shared::{AppConfig, ControlEvent, Session};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::canvas::MapCanvas;
use crate::colors::{BACKGROUND, PANEL_BG, PANEL_BORDER, TEXT, TEXT_MUTED};
use crate::controls::Controls;
use crate::image::{ImageLoad, LoadedImage, failure_text, load_image};
use crate::probe_panel::ProbePanel;
use crate::viewport::Viewport;

/// Keyboard pan step in CSS pixels.
const KEY_PAN_PX: f64 = 80.0;
/// Wheel-equivalent delta for one `+`/`-` press.
const KEY_ZOOM_DELTA: f64 = 120.0;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

/// Last rejected action, shown until the next accepted one.
#[derive(Clone, Copy)]
pub(crate) struct Rejection(pub RwSignal<Option<String>>);

/// Routes control events into the session and applies the outcome to the view.
#[derive(Clone, Copy)]
pub(crate) struct Dispatch {
    session: RwSignal<Session>,
    viewport: RwSignal<Viewport>,
    rejection: RwSignal<Option<String>>,
}

impl Dispatch {
    pub(crate) fn from_context() -> Self {
        let Rejection(rejection) = expect_context();
        Self {
            session: expect_context(),
            viewport: expect_context(),
            rejection,
        }
    }

    pub(crate) fn send(self, event: ControlEvent) {
        let Some(outcome) = self.session.try_update(|s| s.apply(event)) else {
            return;
        };

        match outcome.rejection {
            Some(err) => {
                web_sys::console::warn_1(&format!("rejected: {err}").into());
                self.rejection.set(Some(err.to_string()));
            }
            None => {
                if self.rejection.with_untracked(Option::is_some) {
                    self.rejection.set(None);
                }
            }
        }

        if let Some(point) = outcome.recenter {
            let (w, h) = canvas_dimensions();
            self.viewport.update(|vp| vp.center_on(point, w, h));
        }
    }
}

fn read_config() -> AppConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|doc| doc.get_element_by_id("app"))
        .and_then(|el| el.get_attribute("data-config"));
    let Some(raw) = raw else {
        return AppConfig::default();
    };
    match AppConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            web_sys::console::warn_1(&format!("ignoring data-config: {err}").into());
            AppConfig::default()
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = read_config();
    let load = RwSignal::new(ImageLoad::Loading);
    load_image(&config.image_path, load);
    let config = StoredValue::new(config);

    view! {
        <div style=format!("width: 100%; height: 100%; position: relative; overflow: hidden; background: {BACKGROUND};")>
            {move || match load.get() {
                ImageLoad::Loading => view! {
                    <div style=format!("position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; color: {TEXT_MUTED}; font-family: 'Inter', system-ui, sans-serif;")>
                        "Loading image\u{2026}"
                    </div>
                }
                .into_any(),
                ImageLoad::Ready(image) => view! {
                    <Workspace image=image config=config.get_value() />
                }
                .into_any(),
                ImageLoad::Failed(reason) => view! {
                    <div
                        role="alert"
                        style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; padding: 24px;"
                    >
                        <div style=format!("max-width: 420px; padding: 16px 20px; background: {PANEL_BG}; border: 1px solid {PANEL_BORDER}; border-radius: 6px; color: {TEXT}; font-family: 'Inter', system-ui, sans-serif;")>
                            {failure_text(&reason)}
                        </div>
                    </div>
                }
                .into_any(),
            }}
        </div>
    }
}

/// Map, controls and probe panel over one loaded image.
#[component]
fn Workspace(image: LoadedImage, config: AppConfig) -> impl IntoView {
    let session = RwSignal::new(Session::from_config(image.bounds, &config));
    let viewport = RwSignal::new(Viewport::default());
    provide_context(session);
    provide_context(viewport);
    provide_context(Rejection(RwSignal::new(None)));

    let bounds = image.bounds;
    let _ = window_event_listener(leptos::ev::keydown, move |e: web_sys::KeyboardEvent| {
        let typing = e
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
            .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "SELECT" | "TEXTAREA"));
        if typing {
            return;
        }
        let (cw, ch) = canvas_dimensions();
        match e.key().as_str() {
            "ArrowUp" => {
                e.prevent_default();
                viewport.update(|vp| {
                    vp.pan(0.0, KEY_PAN_PX);
                    vp.clamp_to_image(bounds, cw, ch);
                });
            }
            "ArrowDown" => {
                e.prevent_default();
                viewport.update(|vp| {
                    vp.pan(0.0, -KEY_PAN_PX);
                    vp.clamp_to_image(bounds, cw, ch);
                });
            }
            "ArrowLeft" => {
                e.prevent_default();
                viewport.update(|vp| {
                    vp.pan(KEY_PAN_PX, 0.0);
                    vp.clamp_to_image(bounds, cw, ch);
                });
            }
            "ArrowRight" => {
                e.prevent_default();
                viewport.update(|vp| {
                    vp.pan(-KEY_PAN_PX, 0.0);
                    vp.clamp_to_image(bounds, cw, ch);
                });
            }
            "+" | "=" => {
                e.prevent_default();
                viewport.update(|vp| vp.zoom_at(-KEY_ZOOM_DELTA, cw / 2.0, ch / 2.0));
            }
            "-" => {
                e.prevent_default();
                viewport.update(|vp| vp.zoom_at(KEY_ZOOM_DELTA, cw / 2.0, ch / 2.0));
            }
            _ => {}
        }
    });

    view! {
        <MapCanvas image=image.element bounds=bounds />
        <Controls />
        <ProbePanel />
    }
}
