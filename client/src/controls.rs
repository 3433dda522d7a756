use gridclaim_shared::config::{ALPHA_STEP, MAX_ALPHA, MIN_ALPHA};
use gridclaim_shared::{ControlEvent, ROW_LADDER, Session};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::Dispatch;
use crate::colors::{PANEL_BG, PANEL_BORDER, TEXT, TEXT_MUTED, text_on};
use crate::viewport::Viewport;

const NEW_TEAM_DEFAULT: &str = "New Team";

/// Ask for a team name; `None` when cancelled.
fn prompt_name(message: &str, default: &str) -> Option<String> {
    web_sys::window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

fn input_value(e: &web_sys::Event) -> Option<String> {
    e.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
}

fn ladder_label() -> String {
    ROW_LADDER
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" \u{2192} ")
}

/// Team and mode controls, pinned to the top-right corner.
#[component]
pub fn Controls() -> impl IntoView {
    let session: RwSignal<Session> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();
    let dispatch = Dispatch::from_context();

    let mode = move || session.with(|s| s.mode());
    let rows = Memo::new(move |_| {
        let zoom = viewport.with(|vp| vp.zoom());
        session.with(|s| s.rows_for_zoom(zoom))
    });
    let current_color = move || session.with(|s| s.current_team().color);
    let ladder = ladder_label();

    let team_options = move || {
        session.with(|s| {
            let current = s.current_team_index();
            s.teams()
                .iter()
                .enumerate()
                .map(|(index, team)| {
                    let claimed = s.selections().count_for_team(team.id());
                    view! {
                        <option value=index.to_string() selected={index == current}>
                            {format!("{} ({claimed})", team.name)}
                        </option>
                    }
                })
                .collect_view()
        })
    };

    let on_team_change = move |e: web_sys::Event| {
        let index = e
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
            .and_then(|select| select.value().parse::<usize>().ok());
        if let Some(index) = index {
            dispatch.send(ControlEvent::SelectTeam(index));
        }
    };

    let on_add_team = move |_: web_sys::MouseEvent| {
        if let Some(name) = prompt_name("New team name?", NEW_TEAM_DEFAULT) {
            dispatch.send(ControlEvent::AddTeam { name });
        }
    };

    let on_rename_team = move |_: web_sys::MouseEvent| {
        let current = session.with_untracked(|s| s.current_team().name.clone());
        if let Some(name) = prompt_name("Rename team:", &current) {
            dispatch.send(ControlEvent::RenameTeam { name });
        }
    };

    view! {
        <div style=format!("position: absolute; top: 12px; right: 12px; z-index: 10; min-width: 240px; padding: 10px 12px; background: {PANEL_BG}; border: 1px solid {PANEL_BORDER}; border-radius: 6px; color: {TEXT}; font-family: 'Inter', system-ui, sans-serif; font-size: 0.8rem;")>
            <div style="display: flex; gap: 8px; align-items: flex-end;">
                <div>
                    <strong>"Mode"</strong>
                    <br />
                    <button
                        style="padding: 4px 8px;"
                        on:click=move |_| dispatch.send(ControlEvent::ToggleMode)
                    >
                        {move || format!("Mode: {}", mode().label())}
                    </button>
                </div>
                <div style="margin-left: 6px;">
                    <strong>"Team"</strong>
                    <br />
                    <select
                        style=move || {
                            let color = current_color();
                            format!("width: 140px; background: {}; color: {};", color.to_hex(), text_on(color))
                        }
                        on:change=on_team_change
                    >
                        {team_options}
                    </select>
                </div>
            </div>
            <div style="margin-top: 8px; display: flex; gap: 8px; align-items: center;">
                <label style="display: flex; align-items: center; gap: 6px;">
                    "Color"
                    <input
                        type="color"
                        prop:value=move || current_color().to_hex()
                        on:input=move |e| {
                            if let Some(hex) = input_value(&e) {
                                dispatch.send(ControlEvent::SetTeamColor(hex));
                            }
                        }
                    />
                </label>
                <label style="display: flex; align-items: center; gap: 6px;">
                    "Alpha"
                    <input
                        type="range"
                        min=MIN_ALPHA.to_string()
                        max=MAX_ALPHA.to_string()
                        step=ALPHA_STEP.to_string()
                        prop:value=move || session.with(|s| s.alpha()).to_string()
                        on:input=move |e| {
                            if let Some(alpha) = input_value(&e).and_then(|v| v.parse::<f64>().ok()) {
                                dispatch.send(ControlEvent::SetAlpha(alpha));
                            }
                        }
                    />
                    <span style=format!("color: {TEXT_MUTED}; font-family: 'JetBrains Mono', monospace;")>
                        {move || format!("{:.2}", session.with(|s| s.alpha()))}
                    </span>
                </label>
            </div>
            <div style="margin-top: 8px; display: flex; flex-wrap: wrap; gap: 6px;">
                <button on:click=on_add_team>"+ Team"</button>
                <button on:click=on_rename_team>"Rename"</button>
                <button on:click=move |_| dispatch.send(ControlEvent::ClearTeam)>"Clear Team"</button>
                <button on:click=move |_| dispatch.send(ControlEvent::ClearAll)>"Clear All"</button>
                <button on:click=move |_| dispatch.send(ControlEvent::ToggleGrid)>
                    {move || if session.with(|s| s.grid_visible()) { "Hide Grid" } else { "Show Grid" }}
                </button>
                <button on:click=move |_| dispatch.send(ControlEvent::ToggleCoordsPanel)>
                    {move || if session.with(|s| s.coords_panel_visible()) { "Coords \u{2713}" } else { "Coords" }}
                </button>
            </div>
            <div style=format!("margin-top: 6px; color: {TEXT_MUTED}; font-size: 0.72rem;")>
                {move || format!("Grid density: {ladder} (zoom) \u{00B7} now {0}x{0}", rows.get())}
            </div>
        </div>
    }
}
