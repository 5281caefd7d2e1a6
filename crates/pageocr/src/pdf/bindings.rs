use super::error::PdfError;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use pdfium_render::prelude::*;

/// Outcome of the first attempt to bind the system pdfium library.
enum BindingState {
    Uninitialized,
    Available,
    Failed(String),
}

/// Binding is attempted once per process. A failure is remembered so every later document
/// fails fast with the same message instead of probing the library loader again.
static PDFIUM_STATE: Lazy<Mutex<BindingState>> = Lazy::new(|| Mutex::new(BindingState::Uninitialized));

/// Get fresh pdfium bindings, initializing on first use.
pub(crate) fn bind_pdfium() -> Result<Box<dyn PdfiumLibraryBindings>, PdfError> {
    let mut state = PDFIUM_STATE.lock();

    match &*state {
        BindingState::Failed(err) => {
            return Err(PdfError::BindingFailed(format!("initialization previously failed: {}", err)));
        }
        BindingState::Available => {}
        BindingState::Uninitialized => {
            tracing::debug!("Binding system pdfium library");
            match Pdfium::bind_to_system_library() {
                Ok(bindings) => {
                    *state = BindingState::Available;
                    return Ok(bindings);
                }
                Err(e) => {
                    let message = e.to_string();
                    *state = BindingState::Failed(message.clone());
                    return Err(PdfError::BindingFailed(message));
                }
            }
        }
    }

    Pdfium::bind_to_system_library().map_err(|e| PdfError::BindingFailed(e.to_string()))
}
