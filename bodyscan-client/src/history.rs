//! Past scans, newest first. Loading is best-effort: an unavailable history
//! never blocks scanning.

use std::cmp::Reverse;
use std::fmt;

use bodyscan_shared::{CameraAnalysis, DailyTargets, ScanRecord};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::{AnalysisClient, ApiError};

pub const DEFAULT_HISTORY_LIMIT: u32 = 8;

#[derive(Debug, Clone)]
pub struct HistoryLoader {
    client: AnalysisClient,
    user_id: String,
    limit: u32,
}

impl HistoryLoader {
    pub fn new(client: AnalysisClient, user_id: impl Into<String>, limit: u32) -> Self {
        Self {
            client,
            user_id: user_id.into(),
            limit,
        }
    }

    /// Fetch up to `limit` records, newest first.
    pub async fn load(&self) -> Result<Vec<ScanRecord>, ApiError> {
        let history = self.client.scan_history(&self.user_id, self.limit).await?;
        let mut scans = history.scans;
        sort_newest_first(&mut scans);
        Ok(scans)
    }

    /// Replace the timeline on success; keep what it had on failure.
    pub async fn refresh(&self, timeline: &mut HistoryTimeline) -> bool {
        match self.load().await {
            Ok(scans) => {
                log::debug!("Loaded {} past scans", scans.len());
                timeline.records = scans;
                true
            }
            Err(e) => {
                log::debug!("Scan history unavailable: {}", e);
                false
            }
        }
    }
}

pub fn scanned_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    // Naive timestamps from the service are UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|at| at.and_utc())
}

pub fn sort_newest_first(records: &mut [ScanRecord]) {
    records.sort_by_key(|r| Reverse(scanned_at(&r.scanned_at)));
}

/// `19 Oct 2026 14:05`, or the raw value when it does not parse.
pub fn format_scanned_at(raw: &str) -> String {
    match scanned_at(raw) {
        Some(at) => at.format("%-d %b %Y %H:%M").to_string(),
        None => raw.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTimeline {
    records: Vec<ScanRecord>,
}

impl HistoryTimeline {
    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&ScanRecord> {
        self.records.first()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Targets<'a>(&'a DailyTargets);

impl fmt::Display for Targets<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cal {}kcal · Pro {}g · Carbs {}g · Fat {}g",
            self.0.calories, self.0.protein_g, self.0.carbs_g, self.0.fats_g
        )
    }
}

impl fmt::Display for HistoryTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return writeln!(f, "No scans yet. Start your first body scan!");
        }

        for (i, record) in self.records.iter().enumerate() {
            write!(f, "● {}", record.category.label())?;
            if i == 0 {
                write!(f, " [LATEST]")?;
            }
            writeln!(f)?;

            write!(
                f,
                "  {} · BMI {} · Confidence {}%",
                format_scanned_at(&record.scanned_at),
                record.bmi,
                record.confidence
            )?;
            if let Some(quality) = record.pose_quality {
                write!(f, " · Pose quality {}%", quality)?;
            }
            writeln!(f)?;

            if let Some(targets) = record
                .nutrition_plan
                .as_ref()
                .and_then(|p| p.daily_targets.as_ref())
            {
                writeln!(f, "  {}", Targets(targets))?;
            }
        }
        Ok(())
    }
}

/// Result card for a scan that was just saved.
pub struct AnalysisCard<'a>(pub &'a CameraAnalysis);

impl fmt::Display for AnalysisCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = &self.0.analysis;
        writeln!(f, "{}", analysis.category.label())?;
        writeln!(
            f,
            "BMI {} · Confidence {}% · Saved at {}",
            analysis.bmi,
            analysis.confidence,
            format_scanned_at(&self.0.scanned_at)
        )?;

        let plan = analysis.nutrition_plan.as_ref();
        if let Some(targets) = plan.and_then(|p| p.daily_targets.as_ref()) {
            writeln!(
                f,
                "{} · Water {:.1}L",
                Targets(targets),
                targets.water_ml / 1000.0
            )?;
        }
        for tip in plan.map(|p| p.recommendations.as_slice()).unwrap_or_default() {
            writeln!(f, "- {}", tip)?;
        }
        Ok(())
    }
}
