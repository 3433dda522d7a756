use gridclaim_shared::{ControlEvent, Session};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::{Dispatch, Rejection};
use crate::colors::{ACCENT, PANEL_BG, PANEL_BORDER, TEXT, TEXT_MUTED};

/// Probe history (when toggled on) and the manual `x, y` lookup box.
#[component]
pub fn ProbePanel() -> impl IntoView {
    let session: RwSignal<Session> = expect_context();
    let Rejection(rejection) = expect_context();
    let dispatch = Dispatch::from_context();

    let query = RwSignal::new(String::new());
    let submit = move || dispatch.send(ControlEvent::Lookup(query.get_untracked()));

    let history = move || {
        session.with(|s| {
            s.coords_panel_visible()
                .then(|| s.probes().lines().join("\n"))
        })
    };

    view! {
        <div style=format!("position: absolute; left: 12px; bottom: 12px; z-index: 10; min-width: 220px; padding: 8px 10px; background: {PANEL_BG}; border: 1px solid {PANEL_BORDER}; border-radius: 6px; color: {TEXT}; font-family: 'Inter', system-ui, sans-serif; font-size: 0.8rem;")>
            {move || history().map(|lines| view! {
                <div style=format!("margin-bottom: 8px; padding-bottom: 6px; border-bottom: 1px solid {PANEL_BORDER};")>
                    <strong>"Coordinates"</strong>
                    <div style=format!("margin-top: 4px; white-space: pre; color: {TEXT_MUTED}; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem;")>
                        {lines}
                    </div>
                </div>
            })}
            <div style="display: flex; gap: 6px; align-items: center;">
                <input
                    type="text"
                    placeholder="x, y"
                    style="flex: 1; min-width: 0;"
                    prop:value=move || query.get()
                    on:input=move |e| {
                        if let Some(input) = e
                            .target()
                            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                        {
                            query.set(input.value());
                        }
                    }
                    on:keydown=move |e: web_sys::KeyboardEvent| {
                        if e.key() == "Enter" {
                            submit();
                        }
                    }
                />
                <button on:click=move |_| submit()>"Go"</button>
            </div>
            {move || rejection.get().map(|message| view! {
                <div role="alert" style=format!("margin-top: 6px; color: {ACCENT}; font-size: 0.72rem;")>
                    {message}
                </div>
            })}
        </div>
    }
}
