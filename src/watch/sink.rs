use chrono::Local;
use tokio::sync::mpsc;

use super::events::{WatchEvent, WatchEventKind};
use crate::cli::OutputFormat;
use crate::console::{paint, Tone};

/// Destination for decoded watch notifications.
pub trait EventSink: Send + 'static {
    fn emit(&mut self, event: &WatchEvent);
}

/// Forwards events to an in-process consumer.
impl EventSink for mpsc::UnboundedSender<WatchEvent> {
    fn emit(&mut self, event: &WatchEvent) {
        if self.send(event.clone()).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

/// Prints one line per event on stdout.
pub struct ConsoleSink {
    format: OutputFormat,
    color: bool,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn render(&self, event: &WatchEvent) -> Option<String> {
        match self.format {
            OutputFormat::Text => {
                let time_str = event.timestamp.with_timezone(&Local).format("%H:%M:%S");
                let tone = match event.kind {
                    WatchEventKind::Created => Tone::Success,
                    WatchEventKind::Deleted => Tone::Error,
                    WatchEventKind::RenamedFrom => Tone::Rename,
                    WatchEventKind::RenamedTo => Tone::Plain,
                };
                Some(format!(
                    "[{}] {}",
                    time_str,
                    paint(tone, &event.message(), self.color)
                ))
            }
            OutputFormat::Json => match serde_json::to_string(event) {
                Ok(json) => Some(json),
                Err(err) => {
                    tracing::warn!("Could not serialize watch event: {}", err);
                    None
                }
            },
            OutputFormat::Compact => Some(format!("{} {}", event.kind.code(), event.name)),
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &WatchEvent) {
        if let Some(line) = self.render(event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::DirectoryPath;

    fn event(kind: WatchEventKind) -> WatchEvent {
        let dir: DirectoryPath = serde_json::from_str("\"/watched\"").unwrap();
        WatchEvent::new("test.txt", dir, kind)
    }

    #[test]
    fn test_text_render_includes_message() {
        let sink = ConsoleSink::new(OutputFormat::Text, false);
        let line = sink.render(&event(WatchEventKind::Created)).unwrap();

        assert!(line.starts_with('['));
        assert!(line.ends_with("[+] test.txt gestures a salutation!"));
    }

    #[test]
    fn test_compact_render() {
        let sink = ConsoleSink::new(OutputFormat::Compact, true);
        assert_eq!(sink.render(&event(WatchEventKind::Deleted)).unwrap(), "D test.txt");
    }

    #[test]
    fn test_json_render_is_one_line() {
        let sink = ConsoleSink::new(OutputFormat::Json, true);
        let line = sink.render(&event(WatchEventKind::RenamedTo)).unwrap();

        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "RenamedTo");
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(&event(WatchEventKind::Created));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.name, "test.txt");
    }
}
