//! Renderers for tick snapshots.
//!
//! The core only hands over [`Snapshot`]s; how they are drawn is up to the
//! [`Renderer`]. Two plain renderers ship with the binary: a console status
//! view and JSON lines for piping into other tools.

use std::io::Write;

use crate::core::Result;
use crate::instance::{InstanceSnapshot, Status};
use crate::poller::Snapshot;

/// Consumer of per-tick snapshots.
pub trait Renderer {
    /// Draw one tick.
    fn update(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// One status line per instance.
///
/// ```text
/// [R] orders-api  Alloc: 6.5MB (max: 6.5MB)  PauseNs: 113µs (max: 113µs)
/// [E] localhost:1235 failed: Fetch error: connection refused
/// ```
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_instance(&mut self, instance: &InstanceSnapshot) -> Result<()> {
        let marker = match &instance.status {
            Status::Pending => "[-]",
            Status::Ok => "[R]",
            Status::Restarted => "[R!]",
            Status::Failed(_) => "[E]",
        };

        if let Status::Failed(error) = &instance.status {
            writeln!(self.out, "{marker} {} failed: {error}", instance.name)?;
            return Ok(());
        }

        write!(self.out, "{marker} {}", instance.name)?;
        for metric in &instance.metrics {
            write!(self.out, "  {}: {}", metric.label, metric.value)?;
            if let Some(max) = metric.max.as_ref().filter(|_| metric.available) {
                write!(self.out, " (max: {max})")?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn update(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(self.out, "--- {} ---", snapshot.taken_at.format("%H:%M:%S"))?;
        for instance in &snapshot.instances {
            self.write_instance(instance)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON document per tick.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn update(&mut self, snapshot: &Snapshot) -> Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::MetricSnapshot;
    use crate::metrics::Kind;
    use chrono::{TimeZone, Utc};

    fn metric(label: &str, value: &str, max: Option<&str>) -> MetricSnapshot {
        MetricSnapshot {
            name: format!("memstats.{label}"),
            label: label.to_string(),
            kind: Kind::Memory,
            available: true,
            value: value.to_string(),
            series: vec![1, 2],
            max: max.map(str::to_string),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            taken_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            instances: vec![
                InstanceSnapshot {
                    name: "orders-api".to_string(),
                    address: "http://localhost:1234/debug/vars".to_string(),
                    cmdline: vec!["orders-api".to_string()],
                    status: Status::Ok,
                    metrics: vec![metric("Alloc", "1.0MB", Some("2.0MB"))],
                },
                InstanceSnapshot {
                    name: "billing".to_string(),
                    address: "http://localhost:1235/debug/vars".to_string(),
                    cmdline: Vec::new(),
                    status: Status::Restarted,
                    metrics: vec![metric("Sys", "3.0MB", None)],
                },
                InstanceSnapshot {
                    name: "localhost:1236".to_string(),
                    address: "http://localhost:1236/debug/vars".to_string(),
                    cmdline: Vec::new(),
                    status: Status::Failed("Fetch error: connection refused".to_string()),
                    metrics: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_console_lines() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.update(&snapshot()).unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "--- 03:04:05 ---",
                "[R] orders-api  Alloc: 1.0MB (max: 2.0MB)",
                "[R!] billing  Sys: 3.0MB",
                "[E] localhost:1236 failed: Fetch error: connection refused",
            ]
        );
    }

    #[test]
    fn test_json_lines() {
        let mut renderer = JsonRenderer::new(Vec::new());
        renderer.update(&snapshot()).unwrap();
        renderer.update(&snapshot()).unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        let docs: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["instances"][0]["status"]["state"], "ok");
        assert_eq!(docs[0]["instances"][0]["metrics"][0]["kind"], "memory");
        assert_eq!(docs[0]["instances"][2]["status"]["error"], "Fetch error: connection refused");
        assert_eq!(docs[0]["taken_at"], "2024-01-02T03:04:05Z");
    }
}
