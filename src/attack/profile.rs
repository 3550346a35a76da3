// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scan profile loading: timeouts, scheduling and per-attack tuning.

use crate::attack::selector::DEFAULT_CONSTRAINED_TYPES;
use crate::error::EngineError;
use crate::types::ExecutionMode;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanProfile {
    pub constrained_types: Vec<String>,
    pub execution: ExecutionMode,
    pub module_timeout_secs: u64,
    pub grace_period_ms: u64,
    pub connect_timeout_ms: u64,
    pub dos: DosSettings,
    pub fuzzing: FuzzSettings,
    pub tar_bomb: TarBombSettings,
}

impl Default for ScanProfile {
    fn default() -> Self {
        Self {
            constrained_types: DEFAULT_CONSTRAINED_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            execution: ExecutionMode::Sequential,
            module_timeout_secs: 300,
            grace_period_ms: 2000,
            connect_timeout_ms: 1500,
            dos: DosSettings::default(),
            fuzzing: FuzzSettings::default(),
            tar_bomb: TarBombSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DosSettings {
    pub threads: usize,
    pub duration_secs: u64,
    pub payload_bytes: usize,
}

impl Default for DosSettings {
    fn default() -> Self {
        Self {
            threads: 16,
            duration_secs: 20,
            payload_bytes: 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzSettings {
    pub test_cases: usize,
    pub max_payload_bytes: usize,
    /// Fixed generator seed for reproducible runs; drawn from the OS when absent
    pub seed: Option<u64>,
}

impl Default for FuzzSettings {
    fn default() -> Self {
        Self {
            test_cases: 500,
            max_payload_bytes: 8192,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TarBombSettings {
    pub bombs: usize,
    pub entries_per_bomb: usize,
    pub entry_size_mb: u64,
}

impl Default for TarBombSettings {
    fn default() -> Self {
        Self {
            bombs: 5,
            entries_per_bomb: 4,
            entry_size_mb: 16,
        }
    }
}

impl ScanProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scan profile {}", path.display()))?;
        let profile: ScanProfile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json scan profile {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml scan profile {}", path.display()))?,
            _ => {
                return Err(anyhow!(
                    "unsupported scan profile extension for {}",
                    path.display()
                ))
            }
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        let checks = [
            (self.module_timeout_secs == 0, "module_timeout_secs must be at least 1"),
            (self.connect_timeout_ms == 0, "connect_timeout_ms must be at least 1"),
            (self.dos.threads == 0, "dos.threads must be at least 1"),
            (self.dos.duration_secs == 0, "dos.duration_secs must be at least 1"),
            (self.fuzzing.test_cases == 0, "fuzzing.test_cases must be at least 1"),
            (
                self.fuzzing.max_payload_bytes == 0,
                "fuzzing.max_payload_bytes must be at least 1",
            ),
            (self.tar_bomb.bombs == 0, "tar_bomb.bombs must be at least 1"),
            (
                self.tar_bomb.entries_per_bomb == 0,
                "tar_bomb.entries_per_bomb must be at least 1",
            ),
            (
                self.tar_bomb.entry_size_mb == 0,
                "tar_bomb.entry_size_mb must be at least 1",
            ),
        ];
        if let Some((_, reason)) = checks.iter().find(|(failed, _)| *failed) {
            return Err(EngineError::InvalidProfile(reason.to_string()));
        }
        if self.module_timeout_secs <= self.dos.duration_secs {
            return Err(EngineError::InvalidProfile(format!(
                "module_timeout_secs ({}) must exceed dos.duration_secs ({}) or the flood always times out",
                self.module_timeout_secs, self.dos.duration_secs
            )));
        }
        Ok(())
    }

    pub fn module_timeout(&self) -> Duration {
        Duration::from_secs(self.module_timeout_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
