// SPDX-License-Identifier: PMPL-1.0-or-later

//! Input fuzzing: feed malformed payloads to every open port and watch for outages.

use crate::attack::probe;
use crate::attack::profile::FuzzSettings;
use crate::attack::{AttackModule, StopSignal};
use crate::types::*;
use anyhow::{anyhow, bail, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Liveness is re-checked after this many cases.
const LIVENESS_INTERVAL: u64 = 50;

const PROTOCOL_VERBS: [&str; 12] = [
    "GET", "POST", "USER", "PASS", "HELO", "EHLO", "RETR", "LIST", "SSH-2.0-", "AUTH", "QUIT",
    "\x16\x03\x01",
];

const FORMAT_TOKENS: [&str; 5] = ["%s", "%n", "%x", "%p", "%99999999d"];

pub struct Fuzzing {
    target: Arc<HoneypotTarget>,
    settings: FuzzSettings,
    connect_timeout: Duration,
}

impl Fuzzing {
    pub fn new(target: Arc<HoneypotTarget>, settings: FuzzSettings, connect_timeout: Duration) -> Self {
        Self {
            target,
            settings,
            connect_timeout,
        }
    }

    fn seed(&self) -> Result<u64> {
        match self.settings.seed {
            Some(seed) => Ok(seed),
            None => {
                let mut buf = [0_u8; 8];
                getrandom::getrandom(&mut buf)
                    .map_err(|err| anyhow!("seeding fuzz case generator: {}", err))?;
                Ok(u64::from_le_bytes(buf))
            }
        }
    }
}

/// Deterministic malformed-input generator (xorshift64*)
pub struct CaseGenerator {
    state: u64,
    max_len: usize,
}

impl CaseGenerator {
    pub fn new(seed: u64, max_len: usize) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
            max_len: max_len.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound.max(1) as u64) as usize
    }

    pub fn next_case(&mut self) -> Vec<u8> {
        let len = 1 + self.below(self.max_len);
        let mut case: Vec<u8> = match self.next_u64() % 5 {
            0 => (0..len).map(|_| self.next_u64() as u8).collect(),
            1 => {
                let mut line = vec![b'A'; len];
                line.extend_from_slice(b"\r\n");
                line
            }
            2 => {
                let mut text = String::new();
                while text.len() < len {
                    text.push_str(FORMAT_TOKENS[self.below(FORMAT_TOKENS.len())]);
                }
                text.into_bytes()
            }
            3 => (0..len)
                .map(|_| [0x00, 0x04, 0x1b, 0x7f, 0xff][self.below(5)])
                .collect(),
            _ => {
                let verb = PROTOCOL_VERBS[self.below(PROTOCOL_VERBS.len())];
                let mut line = verb.as_bytes().to_vec();
                line.push(b' ');
                line.extend((0..len).map(|_| b'!' + (self.next_u64() % 94) as u8));
                line.extend_from_slice(b"\r\n");
                line
            }
        };
        case.truncate(self.max_len + 2);
        case
    }
}

impl AttackModule for Fuzzing {
    fn kind(&self) -> AttackKind {
        AttackKind::Fuzzing
    }

    fn run(&self, stop: &StopSignal) -> Result<AttackResult> {
        let addrs = probe::reachable(&self.target, self.connect_timeout)?;
        let seed = self.seed()?;
        let mut generator = CaseGenerator::new(seed, self.settings.max_payload_bytes);
        let start = Instant::now();
        info!(
            target = %self.target.ip,
            ports = addrs.len(),
            cases = self.settings.test_cases,
            seed,
            "starting fuzzing run"
        );

        let mut executed = 0_u64;
        let mut send_errors = 0_u64;
        let mut down = Vec::new();
        for case_index in 0..self.settings.test_cases {
            if stop.is_raised() {
                bail!("fuzzing interrupted after {} test cases", executed);
            }

            let addr = addrs[case_index % addrs.len()];
            let case = generator.next_case();
            if let Err(err) = probe::send_payload(&addr, &case, self.connect_timeout) {
                debug!(%addr, error = %err, "fuzz case not delivered");
                send_errors += 1;
            }
            executed += 1;

            if executed % LIVENESS_INTERVAL == 0 || case_index + 1 == self.settings.test_cases {
                down = probe::down_ports(&addrs, self.connect_timeout);
                if !down.is_empty() {
                    break;
                }
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        let result = if down.is_empty() {
            AttackResult::new(
                false,
                format!(
                    "Honeypot handled {} test cases without losing availability ({} delivery errors)",
                    executed, send_errors
                ),
                elapsed,
                executed,
            )
        } else {
            AttackResult::new(
                true,
                format!(
                    "Honeypot stopped responding on {} after {} test cases",
                    probe::join_addrs(&down),
                    executed
                ),
                elapsed,
                executed,
            )
        };
        Ok(result)
    }
}
