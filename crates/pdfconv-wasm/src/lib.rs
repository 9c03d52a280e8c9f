//! WASM bindings for in-browser PDF to text conversion.
//!
//! The page script owns the drop zone, text area and format selector; this
//! crate owns the conversion state behind them and the download action.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use pdfconv_core::input::pick_single;
use pdfconv_core::pdf::{configure_engine, configured_engine, LopdfEngine, PdfExtractEngine};
use pdfconv_core::{
    AbortSignal, BuildInfo, ConvertError, ConverterConfig, EngineKind, ExportBlob, ExportFormat,
    ExportOptions, Extractor, InputError, PdfEngine, PdfInput, Session, SessionState,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Author, build date and version for the page footer.
#[wasm_bindgen]
pub fn build_info() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&BuildInfo::current()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether a dropped or picked file is accepted as a PDF.
#[wasm_bindgen]
pub fn is_pdf_file(name: &str, media_type: &str) -> bool {
    pdfconv_core::input::is_pdf(name, Some(media_type))
}

fn to_js(e: ConvertError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Export rendered for the page script.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportJs {
    filename: String,
    media_type: &'static str,
    text: String,
}

/// Converter class for browser use.
#[wasm_bindgen]
pub struct PdfConverter {
    session: Rc<RefCell<Session>>,
    config: ConverterConfig,
}

#[wasm_bindgen]
impl PdfConverter {
    /// Create a converter, optionally from a JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PdfConverter, JsValue> {
        let config = match config_json {
            Some(json) => ConverterConfig::from_json(&json)
                .map_err(|e| JsValue::from_str(&format!("invalid configuration: {}", e)))?,
            None => ConverterConfig::default(),
        };

        // The engine is process-wide; the first converter decides it.
        match configure_engine(config.extraction.engine) {
            Ok(()) | Err(ConvertError::AlreadyConfigured) => {}
            Err(e) => return Err(to_js(e)),
        }

        Ok(Self {
            session: Rc::new(RefCell::new(Session::new())),
            config,
        })
    }

    /// Extract the text of a picked or dropped file.
    ///
    /// The converter is busy as soon as this returns. Resolves with the
    /// transcript; rejects with a readable message.
    #[wasm_bindgen]
    pub fn extract_file(&self, file: web_sys::File) -> js_sys::Promise {
        let media_type = file.type_();
        if let Err(e) = PdfInput::new(file.name(), Some(&media_type), Vec::new()) {
            return js_sys::Promise::reject(&to_js(e.into()));
        }
        let signal = match self.session.borrow_mut().begin_extraction() {
            Ok(signal) => signal,
            Err(e) => return js_sys::Promise::reject(&to_js(e)),
        };

        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let outcome = match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => {
                    let data = js_sys::Uint8Array::new(&buffer).to_vec();
                    extract(&data, signal).await
                }
                Err(e) => Err(ConvertError::Io(std::io::Error::other(format!(
                    "failed to read file: {:?}",
                    e
                )))),
            };
            settle(&session, outcome)
        })
    }

    /// Extract the text of a drop-zone selection, which must hold exactly one file.
    #[wasm_bindgen]
    pub fn extract_dropped(&self, files: js_sys::Array) -> js_sys::Promise {
        let picked = pick_single(files.iter().collect()).and_then(|value: JsValue| {
            let kind = value.js_typeof().as_string().unwrap_or_default();
            value
                .dyn_into::<web_sys::File>()
                .map_err(|_| InputError::UnsupportedType(kind))
        });

        match picked {
            Ok(file) => self.extract_file(file),
            Err(e) => js_sys::Promise::reject(&to_js(e.into())),
        }
    }

    /// Extract the text of raw PDF bytes.
    ///
    /// The converter is busy as soon as this returns.
    #[wasm_bindgen]
    pub fn extract_bytes(&self, data: Vec<u8>) -> js_sys::Promise {
        let signal = match self.session.borrow_mut().begin_extraction() {
            Ok(signal) => signal,
            Err(e) => return js_sys::Promise::reject(&to_js(e)),
        };

        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let outcome = extract(&data, signal).await;
            settle(&session, outcome)
        })
    }

    /// Abort the running extraction. Returns false when none is running.
    #[wasm_bindgen]
    pub fn cancel(&self) -> bool {
        self.session.borrow().cancel()
    }

    /// Whether an extraction is in flight; the input should be disabled.
    #[wasm_bindgen]
    pub fn is_busy(&self) -> bool {
        self.session.borrow().is_busy()
    }

    /// Session state: "empty", "extracting", "ready" or "failed".
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.session.borrow().state().name().to_string()
    }

    /// Message of the last failed extraction.
    #[wasm_bindgen]
    pub fn error(&self) -> Option<String> {
        self.session.borrow().error().map(str::to_string)
    }

    #[wasm_bindgen]
    pub fn transcript(&self) -> String {
        self.session.borrow().transcript().to_string()
    }

    /// Store text edited by the user.
    #[wasm_bindgen]
    pub fn set_transcript(&self, text: &str) -> Result<(), JsValue> {
        self.session.borrow_mut().set_transcript(text).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn reset(&self) -> Result<(), JsValue> {
        self.session.borrow_mut().reset().map_err(to_js)
    }

    /// Whether the download action should be enabled.
    #[wasm_bindgen]
    pub fn can_export(&self) -> bool {
        let session = self.session.borrow();
        !session.is_busy() && !session.transcript().is_empty()
    }

    /// Render the transcript for a format tag without saving it.
    ///
    /// Returns `undefined` when there is nothing to export.
    #[wasm_bindgen]
    pub fn export(&self, format: &str) -> Result<JsValue, JsValue> {
        let Some(blob) = self.render(format) else {
            return Ok(JsValue::UNDEFINED);
        };

        let output = ExportJs {
            filename: blob.filename,
            media_type: blob.media_type,
            text: String::from_utf8_lossy(&blob.bytes).into_owned(),
        };
        serde_wasm_bindgen::to_value(&output).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Save the transcript as a file. Returns the filename, or `undefined`
    /// when there is nothing to export.
    #[wasm_bindgen]
    pub fn download(&self, format: &str) -> Result<Option<String>, JsValue> {
        let Some(blob) = self.render(format) else {
            return Ok(None);
        };
        save_blob(&blob)?;
        Ok(Some(blob.filename))
    }
}

impl PdfConverter {
    fn render(&self, format: &str) -> Option<ExportBlob> {
        let format = if format.is_empty() {
            self.config.export.format()
        } else {
            ExportFormat::from_tag(format)
        };
        let today = chrono::Local::now().date_naive();
        let options = ExportOptions::from_config(&self.config.export, today);
        self.session.borrow().export(format, &options)
    }
}

/// Extract with the configured engine, giving the page's event loop a turn
/// after each page so a `cancel()` from the UI lands between pages.
async fn extract(data: &[u8], signal: AbortSignal) -> pdfconv_core::Result<String> {
    match configured_engine() {
        EngineKind::Lopdf => run_extractor(LopdfEngine::new(), data, signal).await,
        EngineKind::PdfExtract => run_extractor(PdfExtractEngine::new(), data, signal).await,
    }
}

async fn run_extractor<E: PdfEngine>(
    engine: E,
    data: &[u8],
    signal: AbortSignal,
) -> pdfconv_core::Result<String> {
    Extractor::new(engine)
        .with_signal(signal)
        .with_pause(next_tick)
        .extract(data)
        .await
}

/// Resolve on a zero-delay timeout, after queued UI events have run.
fn next_tick() -> Pin<Box<dyn Future<Output = ()>>> {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window()
            .map(|window| window.set_timeout_with_callback(&resolve).is_ok())
            .unwrap_or(false);
        if !scheduled {
            // No window (worker or test host): settle right away.
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    Box::pin(async move {
        let _ = JsFuture::from(promise).await;
    })
}

/// Record an extraction outcome and turn it into a promise result.
fn settle(
    session: &Rc<RefCell<Session>>,
    outcome: pdfconv_core::Result<String>,
) -> Result<JsValue, JsValue> {
    let mut session = session.borrow_mut();
    session.finish_extraction(outcome);

    match session.state() {
        SessionState::Ready => Ok(JsValue::from_str(session.transcript())),
        SessionState::Failed(message) => {
            web_sys::console::error_1(&JsValue::from_str(&format!("Error processing PDF: {}", message)));
            Err(JsValue::from_str(message))
        }
        _ => Err(to_js(ConvertError::Cancelled)),
    }
}

/// Hand a blob to the browser as a file download.
fn save_blob(blob: &ExportBlob) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(blob.bytes.as_slice()));
    let properties = BlobPropertyBag::new();
    properties.set_type(blob.media_type);
    let js_blob = Blob::new_with_u8_array_sequence_and_options(&parts, &properties)?;

    let url = Url::create_object_url_with_blob(&js_blob)?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("failed to create link"))?;
    anchor.set_href(&url);
    anchor.set_download(&blob.filename);

    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    Url::revoke_object_url(&url)?;

    Ok(())
}
