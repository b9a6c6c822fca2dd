use std::path::PathBuf;

use anyhow::Context;
use bodyscan_shared::{ActivityLevel, CaptureProfile, Gender, UserProfile};
use clap::{Args, Parser, Subcommand};

use crate::api::DEFAULT_BASE_URL;
use crate::history::DEFAULT_HISTORY_LIMIT;

#[derive(Parser, Debug)]
#[command(name = "bodyscan-client", version, about = "Live body scan with one-shot capture", long_about = None)]
pub struct Cli {
    /// Analysis service base URL
    #[arg(short, long, global = true, default_value = DEFAULT_BASE_URL)]
    pub server: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track a pose until it is held steady, then capture and save it once
    Scan(ScanArgs),
    /// Show past scans, newest first
    History {
        #[arg(long)]
        user_id: String,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(long)]
    pub user_id: String,

    /// Profile JSON from the profile backend; the flags below override it
    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(long)]
    pub height_cm: Option<f64>,

    #[arg(long)]
    pub weight_kg: Option<f64>,

    #[arg(long)]
    pub age: Option<u32>,

    /// male, female or other
    #[arg(long)]
    pub gender: Option<Gender>,

    /// sedentary, light, moderate, active or very_active
    #[arg(long)]
    pub activity_level: Option<ActivityLevel>,

    /// Recorded pose results, one JSON object per line ('-' for stdin)
    #[arg(short, long)]
    pub landmarks: PathBuf,

    /// Replay pacing in frames per second (0 = as fast as possible)
    #[arg(long, default_value_t = 15)]
    pub fps: u32,

    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: u32,
}

impl ScanArgs {
    pub fn user_profile(&self) -> anyhow::Result<UserProfile> {
        let mut profile = match &self.profile {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read profile {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid profile JSON in {}", path.display()))?
            }
            None => UserProfile::default(),
        };

        profile.height = self.height_cm.or(profile.height);
        profile.weight = self.weight_kg.or(profile.weight);
        profile.age = self.age.or(profile.age);
        profile.gender = self.gender.or(profile.gender);
        Ok(profile)
    }

    /// Scanning stays disabled until the profile is complete.
    pub fn capture_profile(&self) -> anyhow::Result<CaptureProfile> {
        let profile = self.user_profile()?;
        match CaptureProfile::from_profile(&self.user_id, &profile, self.activity_level) {
            Some(profile) => Ok(profile),
            None => anyhow::bail!(
                "Complete the profile to enable scanning: height, weight, age and gender are required"
            ),
        }
    }
}
