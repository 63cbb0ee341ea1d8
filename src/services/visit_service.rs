use std::net::IpAddr;

use time::{OffsetDateTime, macros::format_description};
use tracing::{info, warn};

use crate::{
    dao::visit_log::VisitRecord,
    error::ServiceError,
    services::geolocation::GeoDetails,
    state::SharedState,
};

const UNKNOWN_USER_AGENT: &str = "Unknown";
const UNKNOWN_SCREEN: &str = "N/A";

/// What is known about a visit before geolocation.
#[derive(Debug, Clone)]
pub struct VisitContext {
    pub event: String,
    pub ip: IpAddr,
    pub user_agent: Option<String>,
    pub screen: Option<String>,
}

impl VisitContext {
    /// A plain page view.
    pub fn page_view(ip: IpAddr, user_agent: Option<String>, screen: Option<String>) -> Self {
        Self {
            event: "Visit".to_string(),
            ip,
            user_agent,
            screen,
        }
    }
}

/// Geolocate the visitor and append the visit to the log.
///
/// A failed lookup degrades to placeholder values; only a failed append is an error.
pub async fn record_visit(
    state: &SharedState,
    context: VisitContext,
) -> Result<VisitRecord, ServiceError> {
    let geo = match state.locator().locate(context.ip).await {
        Ok(details) => details,
        Err(err) => {
            warn!(ip = %context.ip, error = %err, "geolocation failed; logging placeholders");
            GeoDetails::unknown()
        }
    };

    let record = VisitRecord {
        time: timestamp_now(),
        event: context.event,
        user_agent: context
            .user_agent
            .unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string()),
        screen: context.screen.unwrap_or_else(|| UNKNOWN_SCREEN.to_string()),
        ip: context.ip.to_string(),
        location: geo.location,
        lat: geo.lat,
        lon: geo.lon,
        isp: geo.isp,
        timezone: geo.timezone,
    };

    state.visits().append(&record).await?;
    info!(ip = %record.ip, location = %record.location, "visit logged");
    Ok(record)
}

/// Record a visit in the background so the page never waits on the lookup.
pub fn spawn_visit(state: SharedState, context: VisitContext) {
    tokio::spawn(async move {
        if let Err(err) = record_visit(&state, context).await {
            warn!(error = %err, "failed to log visit");
        }
    });
}

/// All parsed visits, oldest first.
pub async fn list_visits(state: &SharedState) -> Vec<VisitRecord> {
    state.visits().read_all().await
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS`, falling back to UTC.
fn timestamp_now() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| "invalid-timestamp".into())
}
