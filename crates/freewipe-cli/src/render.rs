/// Console output: one line per engine event, as text or as JSON.
///
/// JSON lines carry an RFC 3339 `at` timestamp next to the serialized
/// event, so a wrapper process can log or chart a session.
use freewipe_core::engine::progress::{EraseEvent, EraseOutcome};
use freewipe_core::model::size::format_size;
use freewipe_core::platform::VolumeInfo;
use serde_json::{json, Value};
use std::fmt::Write;

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn format_event(&self, event: &EraseEvent) -> String {
        if self.json {
            let value = serde_json::to_value(event)
                .unwrap_or_else(|e| json!({ "event": "error", "message": e.to_string() }));
            stamped(value)
        } else {
            describe_event(event)
        }
    }

    pub fn format_notice(&self, message: &str) -> String {
        if self.json {
            stamped(json!({ "event": "notice", "message": message }))
        } else {
            message.to_owned()
        }
    }

    pub fn event(&self, event: &EraseEvent) {
        println!("{}", self.format_event(event));
    }

    pub fn notice(&self, message: &str) {
        println!("{}", self.format_notice(message));
    }
}

fn stamped(mut value: Value) -> String {
    if let Value::Object(map) = &mut value {
        map.insert(
            "at".into(),
            Value::String(chrono::Local::now().to_rfc3339()),
        );
    }
    value.to_string()
}

/// Plain-text form of an event.
pub fn describe_event(event: &EraseEvent) -> String {
    match event {
        EraseEvent::Progress { percent, message } => format!("[{percent:>3}%] {message}"),
        EraseEvent::FileCreated { file_name, size } => {
            format!("Creating {file_name} ({})", format_size(*size))
        }
        EraseEvent::Complete { outcome } => describe_outcome(*outcome).to_owned(),
        EraseEvent::Error { message } => format!("Error: {message}"),
    }
}

pub fn describe_outcome(outcome: EraseOutcome) -> &'static str {
    match outcome {
        EraseOutcome::Completed => "Done: free space overwritten and filler files removed",
        EraseOutcome::CancelledRetained => "Stopped: filler files kept, wipe again to resume",
        EraseOutcome::CancelledCleaned => "Cancelled: filler files removed",
        EraseOutcome::Purged => "Cleanup finished",
    }
}

/// Fixed-width table of mounted volumes.
pub fn volume_table(volumes: &[VolumeInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28} {:<10} {:<8} {:>12} {:>12} {:>6}",
        "MOUNT", "FS", "KIND", "TOTAL", "FREE", "USED"
    );
    for v in volumes {
        let _ = writeln!(
            out,
            "{:<28} {:<10} {:<8} {:>12} {:>12} {:>5.1}%",
            v.mount_point.display(),
            v.filesystem,
            v.kind.label(),
            v.total_display,
            v.free_display,
            v.usage_percent
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use freewipe_core::platform::VolumeKind;
    use std::path::PathBuf;

    #[test]
    fn text_progress_is_right_aligned() {
        let event = EraseEvent::Progress {
            percent: 7,
            message: "Writing zeros - written: 0.01 GiB".into(),
        };
        assert_eq!(
            Renderer::new(false).format_event(&event),
            "[  7%] Writing zeros - written: 0.01 GiB"
        );
    }

    #[test]
    fn text_file_created_shows_size() {
        let event = EraseEvent::FileCreated {
            file_name: "wipe_3.tmp".into(),
            size: 100 * 1024 * 1024,
        };
        assert_eq!(describe_event(&event), "Creating wipe_3.tmp (100.0 MiB)");
    }

    #[test]
    fn json_lines_are_tagged_and_stamped() {
        let event = EraseEvent::Complete {
            outcome: EraseOutcome::CancelledRetained,
        };
        let line = Renderer::new(true).format_event(&event);
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "complete");
        assert_eq!(value["outcome"], "cancelled_retained");
        assert!(value["at"].as_str().is_some());
    }

    #[test]
    fn json_notice() {
        let line = Renderer::new(true).format_notice("paused");
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "notice");
        assert_eq!(value["message"], "paused");
    }

    #[test]
    fn volume_table_has_header_and_rows() {
        let volumes = vec![VolumeInfo {
            mount_point: PathBuf::from("/"),
            name: "root".into(),
            filesystem: "ext4".into(),
            kind: VolumeKind::Ssd,
            is_removable: false,
            total_bytes: 100,
            free_bytes: 50,
            used_bytes: 50,
            usage_percent: 50.0,
            total_display: "100 B".into(),
            free_display: "50 B".into(),
        }];
        let table = volume_table(&volumes);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("MOUNT"));
        assert!(lines[1].contains("ext4"));
        assert!(lines[1].ends_with("50.0%"));
    }
}
