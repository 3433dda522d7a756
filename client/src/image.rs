use gridclaim_shared::{GridClaimError, ImageBounds};
use js_sys::Reflect;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

const ONLOAD_HANDLE_KEY: &str = "__gridclaimOnload";
const ONERROR_HANDLE_KEY: &str = "__gridclaimOnerror";

/// The annotated image once decoded, with its pixel extent.
#[derive(Clone)]
pub struct LoadedImage {
    pub element: HtmlImageElement,
    pub bounds: ImageBounds,
}

#[derive(Clone)]
pub enum ImageLoad {
    Loading,
    Ready(LoadedImage),
    Failed(String),
}

/// Start loading `path`; the outcome lands in `state`.
pub fn load_image(path: &str, state: RwSignal<ImageLoad>) {
    state.set(ImageLoad::Loading);
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            state.set(ImageLoad::Failed("could not create an image element".into()));
            return;
        }
    };

    let img_for_load = img.clone();
    let path_for_load = path.to_string();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);

        let img_for_decode = img_for_load.clone();
        let path = path_for_load.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(img_for_decode.decode()).await;
            let width = img_for_decode.natural_width();
            let height = img_for_decode.natural_height();
            match ImageBounds::new(width, height) {
                Ok(bounds) => {
                    web_sys::console::info_1(
                        &format!("loaded {path} ({width}x{height})").into(),
                    );
                    state.set(ImageLoad::Ready(LoadedImage {
                        element: img_for_decode,
                        bounds,
                    }));
                }
                Err(err) => {
                    web_sys::console::warn_1(&format!("{path}: {err}").into());
                    state.set(err.into());
                }
            }
        });
    });

    let img_for_error = img.clone();
    let path_for_error = path.to_string();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        let message = format!("could not load image {path_for_error}");
        web_sys::console::warn_1(&message.as_str().into());
        state.set(ImageLoad::Failed(message));
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(path);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

/// Message shown in place of the workspace when the image cannot be used.
pub fn failure_text(reason: &str) -> String {
    format!("Unable to open the image: {reason}")
}

impl From<GridClaimError> for ImageLoad {
    fn from(err: GridClaimError) -> Self {
        Self::Failed(err.to_string())
    }
}
