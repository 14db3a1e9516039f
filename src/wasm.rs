//! WASM bindings for the browser build.
//!
//! Exposes the slicing engine to the surrounding front-end and provides the
//! archive download trigger. Uses web_sys to interact with browser APIs; the
//! rendering layer itself lives outside this crate.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::constants::ZIP_MIME_TYPE;
use crate::grid::{Axis, GridConfig};
use crate::session::{SlicerSession, export_filename};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"GRIDSLICE engine loaded".into());
}

/// Slice an image into an evenly split rows x cols grid and return the
/// resulting ZIP archive bytes.
///
/// One-call convenience path for hosts that do not drive an interactive
/// session; counts are clamped into the supported range.
#[wasm_bindgen]
pub fn slice_to_archive(
    name: &str,
    data: &[u8],
    rows: usize,
    cols: usize,
) -> Result<Vec<u8>, JsValue> {
    let mut session =
        SlicerSession::from_bytes(name, data).map_err(|e| JsValue::from_str(&e.to_string()))?;
    session.grid = GridConfig::new(rows, cols);
    session.slice().map_err(|e| JsValue::from_str(&e.to_string()))?;
    session.stage_all();
    session
        .export(crate::archive::DosDateTime::now())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Timestamp-suffixed download filename for an export started now.
#[wasm_bindgen]
pub fn archive_filename(prefix: &str) -> String {
    export_filename(prefix, chrono::Local::now().naive_local())
}

/// Move a grid divider from a pointer position, for hosts driving an
/// interactive session. `axis` is "row" or "col"; anything else is ignored.
pub fn drag_divider(
    session: &mut SlicerSession,
    axis: &str,
    index: usize,
    pointer: f64,
    origin: f64,
    extent: f64,
) {
    let axis = match axis {
        "row" => Axis::Row,
        "col" => Axis::Col,
        _ => return,
    };
    session.grid.drag_breakpoint(axis, index, pointer, origin, extent);
}

/// Offer `bytes` to the user as a file download.
///
/// Builds a Blob, wraps it in an object URL and clicks a transient anchor
/// element, the standard browser download dance. The URL is revoked
/// immediately; the click has already captured the blob by then.
#[wasm_bindgen]
pub fn trigger_download(filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
    let array = js_sys::Array::new();
    array.push(&js_sys::Uint8Array::from(bytes));

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(ZIP_MIME_TYPE);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&array, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    web_sys::Url::revoke_object_url(&url)?;
    log::info!("offered download '{}' ({} bytes)", filename, bytes.len());
    Ok(())
}
