use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
/// Messages accepted from viewer WebSocket clients.
#[serde(tag = "type")]
pub enum ViewerInboundMessage {
    /// Ask for a fresh `score_update` with the current document.
    #[serde(rename = "refresh")]
    Refresh,
    #[serde(other)]
    Unknown,
}
