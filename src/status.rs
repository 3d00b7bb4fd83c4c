use serde::Deserialize;

/// Body of the status endpoint. Every field is optional; unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub health_text: Option<String>,
    #[serde(default)]
    pub replication_text: Option<String>,
    #[serde(default)]
    pub records_text: Option<String>,
    #[serde(default)]
    pub uptime_text: Option<String>,
    #[serde(default)]
    pub instance_text: Option<String>,
}

/// A poll result tagged with the tick that requested it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub seq: u64,
    pub report: StatusReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Health,
    Replication,
    Records,
    Uptime,
    Instance,
}

impl StatusField {
    pub const ALL: [StatusField; 5] = [
        StatusField::Health,
        StatusField::Replication,
        StatusField::Records,
        StatusField::Uptime,
        StatusField::Instance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusField::Health => "Health",
            StatusField::Replication => "Replication",
            StatusField::Records => "Records",
            StatusField::Uptime => "Uptime",
            StatusField::Instance => "Instance",
        }
    }
}

/// Text shown for each status field, as last written by a poll.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    health: String,
    replication: String,
    records: String,
    uptime: String,
    instance: String,
    last_seq: Option<u64>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the fields present in `update`, leaving the rest untouched.
    ///
    /// Returns false and changes nothing when a newer update has already been
    /// applied, so a slow response cannot overwrite a fresher one.
    pub fn apply(&mut self, update: StatusUpdate) -> bool {
        if self.last_seq.is_some_and(|last| update.seq <= last) {
            return false;
        }
        self.last_seq = Some(update.seq);

        let StatusReport {
            health_text,
            replication_text,
            records_text,
            uptime_text,
            instance_text,
        } = update.report;
        let slots = [
            (&mut self.health, health_text),
            (&mut self.replication, replication_text),
            (&mut self.records, records_text),
            (&mut self.uptime, uptime_text),
            (&mut self.instance, instance_text),
        ];
        for (slot, value) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
        true
    }

    pub fn get(&self, field: StatusField) -> &str {
        match field {
            StatusField::Health => &self.health,
            StatusField::Replication => &self.replication,
            StatusField::Records => &self.records,
            StatusField::Uptime => &self.uptime,
            StatusField::Instance => &self.instance,
        }
    }

    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }
}
