//! Append-only visitor log stored as one `" - "`-delimited line per visit.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::warn;
use utoipa::ToSchema;

use crate::dao::storage::{StorageError, StorageResult};

const DELIMITER: &str = " - ";
/// Labels of the geolocation fields closing every line, in order.
const TAIL_LABELS: [&str; 6] = ["IP:", "Location:", "Lat:", "Lon:", "ISP:", "Timezone:"];

/// A single logged visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub time: String,
    pub event: String,
    pub user_agent: String,
    pub screen: String,
    pub ip: String,
    pub location: String,
    pub lat: String,
    pub lon: String,
    pub isp: String,
    pub timezone: String,
}

impl VisitRecord {
    /// Render the record as a log line without the trailing newline.
    pub fn to_line(&self) -> String {
        [
            sanitize(&self.time),
            sanitize(&self.event),
            sanitize(&self.user_agent),
            sanitize(&self.screen),
            format!("IP: {}", sanitize(&self.ip)),
            format!("Location: {}", sanitize(&self.location)),
            format!("Lat: {}", sanitize(&self.lat)),
            format!("Lon: {}", sanitize(&self.lon)),
            format!("ISP: {}", sanitize(&self.isp)),
            format!("Timezone: {}", sanitize(&self.timezone)),
        ]
        .join(DELIMITER)
    }

    /// Parse one log line, returning `None` when it has fewer than ten fields.
    ///
    /// Labelled fields are located by their labels from the end of the line and the
    /// user agent takes whatever lies between the event and the screen, so values
    /// containing the delimiter stay whole.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);
        let mut tail = [""; TAIL_LABELS.len()];
        for (value, label) in tail.iter_mut().zip(TAIL_LABELS).rev() {
            let marker = format!("{DELIMITER}{label}");
            let at = rest.rfind(&marker)?;
            *value = rest[at + marker.len()..].trim_start();
            rest = &rest[..at];
        }

        let mut head = rest.splitn(3, DELIMITER);
        let time = head.next()?;
        let event = head.next()?;
        let (user_agent, screen) = head.next()?.rsplit_once(DELIMITER)?;
        let [ip, location, lat, lon, isp, timezone] = tail.map(str::to_string);

        Some(Self {
            time: time.to_string(),
            event: event.to_string(),
            user_agent: user_agent.to_string(),
            screen: screen.to_string(),
            ip,
            location,
            lat,
            lon,
            isp,
            timezone,
        })
    }
}

/// Line-oriented visit log backed by a plain text file.
#[derive(Clone)]
pub struct VisitLog {
    path: Arc<PathBuf>,
    append_gate: Arc<Mutex<()>>,
}

impl VisitLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            append_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file on first use.
    pub async fn append(&self, record: &VisitRecord) -> StorageResult<()> {
        let mut line = record.to_line();
        line.push('\n');

        let _guard = self.append_gate.lock().await;
        let path = self.path.as_path();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| StorageError::write(path, source))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| StorageError::write(path, source))?;
        file.flush()
            .await
            .map_err(|source| StorageError::write(path, source))
    }

    /// Read every well-formed record, oldest first. A missing file is an empty log.
    pub async fn read_all(&self) -> Vec<VisitRecord> {
        let path = self.path.as_path();
        match fs::read_to_string(path).await {
            Ok(contents) => contents.lines().filter_map(VisitRecord::parse_line).collect(),
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read visit log");
                Vec::new()
            }
        }
    }
}

/// Keep every record on a single line.
fn sanitize(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
