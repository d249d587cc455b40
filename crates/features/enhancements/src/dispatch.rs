//! Messaging surface: decodes `{action, ...}` requests and answers with structured
//! responses. Nothing here returns an error to the caller; failures become
//! `{success: false, error}`.

use crate::error::OverlayError;
use crate::manager::{CommandOutcome, EnhancementManager};
use serde_json::Value;
use tcard_domain::color::Color;
use tcard_domain::preferences::ColorSlot;
use tcard_domain::protocol::{Request, Response};
use tcard_host::HostView;
use tcard_storage::PreferenceStore;
use tracing::debug;

/// Decodes a raw message. `Ok(None)` means the action is missing or not recognized.
///
/// # Errors
/// [`OverlayError::Protocol`] when a known action carries malformed parameters.
pub fn decode_request(message: Value) -> Result<Option<Request>, OverlayError> {
    let known = message.get("action").and_then(Value::as_str).is_some_and(Request::is_known_action);
    if !known {
        return Ok(None);
    }
    serde_json::from_value(message)
        .map(Some)
        .map_err(|e| OverlayError::Protocol { message: e.to_string().into(), context: None })
}

/// Serves one message against the manager.
pub async fn dispatch<H: HostView, S: PreferenceStore>(
    manager: &mut EnhancementManager<H, S>,
    message: Value,
) -> Response {
    let request = match decode_request(message) {
        Ok(Some(request)) => request,
        Ok(None) => return Response::unknown_action(),
        Err(e) => return Response::failure(e.to_string()),
    };
    debug!(action = request.action(), "Serving request");

    match request {
        Request::GetEnhancements => {
            Response::Enhancements { enhancements: manager.get_all_enhancements() }
        },
        Request::ToggleEnhancement { name, enabled } => {
            respond(manager.set_enhancement_enabled(&name, enabled).await)
        },
        Request::UpdateWeekendColor { color } => {
            update_color(manager, ColorSlot::Weekend, &color).await
        },
        Request::UpdateAlternateRowColor { color } => {
            update_color(manager, ColorSlot::AlternateRow, &color).await
        },
        Request::UpdateRedLineColor { color } => {
            update_color(manager, ColorSlot::BoundaryMarker, &color).await
        },
    }
}

async fn update_color<H: HostView, S: PreferenceStore>(
    manager: &mut EnhancementManager<H, S>,
    slot: ColorSlot,
    color: &str,
) -> Response {
    match color.parse::<Color>() {
        Ok(color) => respond(manager.set_color(slot, color).await),
        Err(e) => Response::failure(OverlayError::from(e).to_string()),
    }
}

fn respond(result: Result<CommandOutcome, OverlayError>) -> Response {
    match result {
        Ok(CommandOutcome { warning: Some(warning), .. }) => {
            Response::ok_with_warning(warning.to_string())
        },
        Ok(_) => Response::ok(),
        Err(e) => Response::failure(e.to_string()),
    }
}
