//! Alarm names used by the tracker.

use super::record::DownloadId;

/// Repeating alarm that triggers a sweep.
pub const SWEEP_ALARM: &str = "cleanup-downloads";

const REMOVAL_PREFIX: &str = "cleanup-";

/// One-shot alarm that removes a single download record.
pub fn removal_alarm(id: DownloadId) -> String {
    format!("{REMOVAL_PREFIX}{id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    Sweep,
    Remove(DownloadId),
    Unknown,
}

impl AlarmKind {
    pub fn parse(name: &str) -> Self {
        if name == SWEEP_ALARM {
            return AlarmKind::Sweep;
        }
        name.strip_prefix(REMOVAL_PREFIX)
            .and_then(|rest| rest.parse::<DownloadId>().ok())
            .map(AlarmKind::Remove)
            .unwrap_or(AlarmKind::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_alarm_names() {
        assert_eq!(AlarmKind::parse("cleanup-downloads"), AlarmKind::Sweep);
        assert_eq!(AlarmKind::parse(&removal_alarm(17)), AlarmKind::Remove(17));
        assert_eq!(AlarmKind::parse("cleanup-"), AlarmKind::Unknown);
        assert_eq!(AlarmKind::parse("cleanup-x1"), AlarmKind::Unknown);
        assert_eq!(AlarmKind::parse("heartbeat"), AlarmKind::Unknown);
    }
}
