use crate::routes::{json_response, JsonResponse};
use crate::state::SharedState;

/// `GET /health`
///
/// Reports the same readiness the prediction route checks: 200 once the model
/// and class names are loaded, 503 with the startup error otherwise.
pub fn handle(state: &SharedState) -> JsonResponse {
    let health = state.service.health();
    let status = if state.service.is_ready() { 200 } else { 503 };
    json_response(status, &health)
}
