/// OpenAPI documentation generation.
pub mod documentation;
/// Viewer event construction and broadcasting.
pub mod events;
/// IP geolocation lookups for the visit log.
pub mod geolocation;
/// Health check service.
pub mod health_service;
/// Scoreboard reads and admin writes.
pub mod scoreboard_service;
/// Admin login sessions.
pub mod session_service;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Visitor logging.
pub mod visit_service;
/// Viewer WebSocket connection handling.
pub mod websocket_service;
