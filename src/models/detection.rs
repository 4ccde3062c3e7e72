use super::subject::SubjectRef;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Ingestion channel that produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Rfid,
    Face,
    Manual,
}

impl Channel {
    /// Label stored in the record `source` column.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Rfid => "rfid",
            Channel::Face => "face",
            Channel::Manual => "manual",
        }
    }
}

/// "Subject identified at time T", already shifted to school-local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionEvent {
    pub subject: SubjectRef,
    pub detected_at: DateTime<FixedOffset>,
    /// Restricts resolution to this period (manual entry).
    pub period_id: Option<u32>,
    pub channel: Channel,
    /// Scanner or camera name, appended to the channel in `source`.
    pub device: Option<String>,
}

impl DetectionEvent {
    pub fn new(subject: SubjectRef, detected_at: DateTime<FixedOffset>, channel: Channel) -> Self {
        Self {
            subject,
            detected_at,
            period_id: None,
            channel,
            device: None,
        }
    }

    pub fn with_period(mut self, period_id: Option<u32>) -> Self {
        self.period_id = period_id;
        self
    }

    pub fn with_device(mut self, device: &str) -> Self {
        let device = device.trim();
        self.device = (!device.is_empty()).then(|| device.to_string());
        self
    }

    /// Value stored in the record `source` column: `rfid` or `rfid:gate-2`.
    pub fn source_label(&self) -> String {
        match &self.device {
            Some(d) => format!("{}:{}", self.channel.label(), d),
            None => self.channel.label().to_string(),
        }
    }
}
