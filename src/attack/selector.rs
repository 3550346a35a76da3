// SPDX-License-Identifier: PMPL-1.0-or-later

//! Module selection by honeypot type

use crate::attack::profile::ScanProfile;
use crate::attack::{AttackModule, DenialOfService, Fuzzing, TarBomb};
use crate::types::{AttackKind, HoneypotTarget};
use std::sync::Arc;

/// Honeypots too fragile, or without fuzzable/tarable surfaces, for the full battery
pub const DEFAULT_CONSTRAINED_TYPES: [&str; 2] = ["dionaea", "conpot"];

pub struct ModuleSelector<'a> {
    profile: &'a ScanProfile,
}

impl<'a> ModuleSelector<'a> {
    pub fn new(profile: &'a ScanProfile) -> Self {
        Self { profile }
    }

    /// Ordered attack kinds for a honeypot type. Unrecognized types get the full set.
    pub fn kinds(&self, honeypot_type: &str) -> Vec<AttackKind> {
        if self.is_constrained(honeypot_type) {
            vec![AttackKind::DenialOfService]
        } else {
            vec![
                AttackKind::Fuzzing,
                AttackKind::ArchiveBomb,
                AttackKind::DenialOfService,
            ]
        }
    }

    pub fn select(
        &self,
        honeypot_type: &str,
        target: &Arc<HoneypotTarget>,
    ) -> Vec<Arc<dyn AttackModule>> {
        self.kinds(honeypot_type)
            .into_iter()
            .filter_map(|kind| self.build(kind, target))
            .collect()
    }

    fn is_constrained(&self, honeypot_type: &str) -> bool {
        let normalized = honeypot_type.trim().to_lowercase();
        self.profile
            .constrained_types
            .iter()
            .any(|constrained| constrained.trim().eq_ignore_ascii_case(&normalized))
    }

    fn build(
        &self,
        kind: AttackKind,
        target: &Arc<HoneypotTarget>,
    ) -> Option<Arc<dyn AttackModule>> {
        let connect_timeout = self.profile.connect_timeout();
        match kind {
            AttackKind::DenialOfService => Some(Arc::new(DenialOfService::new(
                Arc::clone(target),
                self.profile.dos.clone(),
                connect_timeout,
            ))),
            AttackKind::Fuzzing => Some(Arc::new(Fuzzing::new(
                Arc::clone(target),
                self.profile.fuzzing.clone(),
                connect_timeout,
            ))),
            AttackKind::ArchiveBomb => Some(Arc::new(TarBomb::new(
                Arc::clone(target),
                self.profile.tar_bomb.clone(),
                connect_timeout,
            ))),
            AttackKind::Custom(_) => None,
        }
    }
}
