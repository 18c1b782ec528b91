//! Violation counting in generated analysis reports
//!
//! Checkstyle, SpotBugs and detekt all write XML. The gate does not need
//! the schema: one violation is one occurrence of the tool's marker
//! element (`<error>`, `<BugInstance>`).

use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::budget::ToolSpec;
use crate::error::{GateError, Result};

/// Violation count extracted from one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationMeasurement {
    pub tool: String,
    pub count: u32,
    pub report: PathBuf,
}

/// Count elements named `marker` (namespace prefix ignored).
pub fn count_markers(path: &Path, marker: &str) -> Result<u32> {
    let report_error = |source: quick_xml::Error| GateError::Report {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = Reader::from_file(path).map_err(report_error)?;
    let mut buf = Vec::new();
    let mut count: u32 = 0;

    loop {
        match reader.read_event_into(&mut buf).map_err(report_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == marker.as_bytes() => {
                count = count.saturating_add(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(count)
}

/// Measure a tool's report. `None` if the tool wrote no report, which
/// happens when a module has no sources to analyze.
pub fn measure(tool: &ToolSpec) -> Result<Option<ViolationMeasurement>> {
    if !tool.report.is_file() {
        debug!(
            "{} report not found at {}",
            tool.display_name,
            tool.report.display()
        );
        return Ok(None);
    }

    let count = count_markers(&tool.report, &tool.marker)?;
    debug!(
        "{} report {} has {} <{}> elements",
        tool.display_name,
        tool.report.display(),
        count,
        tool.marker
    );

    Ok(Some(ViolationMeasurement {
        tool: tool.key.clone(),
        count,
        report: tool.report.clone(),
    }))
}
