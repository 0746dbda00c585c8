// src/session/summary.rs
//
// End-of-session persistence: the push-up CSV log (appended across runs),
// the per-session skip CSV and the optional per-jump JSONL log.

use super::{PushupSession, SkipSession};
use crate::detection::JumpRecord;
use crate::pipeline::{EndReason, RunReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushupSummary {
    #[serde(rename = "Date-Time")]
    pub date_time: String,
    #[serde(rename = "Correct Pushups")]
    pub correct: u32,
    #[serde(rename = "Bad Pushups")]
    pub bad: u32,
}

impl PushupSummary {
    pub fn new(at: DateTime<Local>, correct: u32, bad: u32) -> Self {
        Self {
            date_time: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            correct,
            bad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkipSummary {
    #[serde(rename = "Total_Jumps")]
    pub total_jumps: u32,
}

/// Appends one row; the header goes in only when the file is new or empty.
pub fn append_pushup_log(path: &Path, summary: &PushupSummary) -> Result<()> {
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open push-up log {}", path.display()))?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(summary)
        .with_context(|| format!("Failed to write push-up log {}", path.display()))?;
    writer.flush()?;

    info!("💾 Results saved to {}", path.display());
    Ok(())
}

/// Creates (or truncates) the per-session skip CSV.
pub fn write_skip_summary(path: &Path, summary: &SkipSummary) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create skip summary {}", path.display()))?;
    writer.serialize(summary)?;
    writer.flush()?;

    info!("💾 Results saved to {}", path.display());
    Ok(())
}

pub fn write_jump_log(path: &Path, jumps: &[JumpRecord]) -> Result<()> {
    use std::io::Write;

    ensure_parent(path)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create jump log {}", path.display()))?;
    for jump in jumps {
        let json_line = serde_json::to_string(jump)?;
        writeln!(file, "{}", json_line)?;
    }
    file.flush()?;

    info!("💾 {} jumps saved to {}", jumps.len(), path.display());
    Ok(())
}

/// Push-up results are only logged for a session that ran its full window.
/// Returns whether a row was appended.
pub fn finish_pushup(
    report: &RunReport,
    session: &PushupSession,
    log_path: &Path,
    at: DateTime<Local>,
) -> Result<bool> {
    if report.end_reason != EndReason::Completed {
        warn!(
            "Session ended early ({:?}), {} not updated",
            report.end_reason,
            log_path.display()
        );
        return Ok(false);
    }
    append_pushup_log(log_path, &session.summary(at))?;
    Ok(true)
}

/// Skip results are saved however the session ended.
pub fn finish_skip(
    report: &RunReport,
    session: &SkipSession,
    paths: &SkipOutputPaths,
    jump_log: bool,
) -> Result<()> {
    if report.end_reason != EndReason::Completed {
        info!(
            "Session ended early ({:?}), saving {} jumps counted so far",
            report.end_reason,
            session.jump_count()
        );
    }
    write_skip_summary(&paths.csv, &session.summary())?;
    if jump_log {
        write_jump_log(&paths.jumps, session.jumps())?;
    }
    Ok(())
}

pub fn session_id(at: DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Files produced by one skip session, all sharing the session id.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipOutputPaths {
    pub video: PathBuf,
    pub csv: PathBuf,
    pub jumps: PathBuf,
}

impl SkipOutputPaths {
    pub fn new(output_dir: &Path, session_id: &str) -> Self {
        Self {
            video: output_dir.join(format!("skip_{}.mp4", session_id)),
            csv: output_dir.join(format!("skip_{}.csv", session_id)),
            jumps: output_dir.join(format!("skip_{}_jumps.jsonl", session_id)),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
