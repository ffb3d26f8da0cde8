//! End-of-run session reporting.
//!
//! The reporter is a read-only consumer: it summarizes the run from the
//! decision engine's statistics, the visit state snapshot, and the offline
//! cache totals handed in by the caller. Occupancy and per-collaborator
//! numbers are recomputed from those sources on demand, never kept as
//! separate counters.

use crate::decision::DecisionEngine;
use crate::replica::{PolicyAnswer, lookup_shared};
use chrono::{DateTime, Utc};
use gatehouse_core::{EventTypeCounts, SyncStatusCounts, TagId};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

/// Statistics accumulated while the session runs.
///
/// Updated by the decision engine as reads are decided; read once by the
/// session reporter at shutdown.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    time_in_room: HashMap<String, Duration>,
    denied_attempts: HashMap<String, u64>,
    intrusion_attempts: u64,
}

impl SessionStats {
    /// Record a completed stay for a collaborator.
    pub fn record_stay(&mut self, name: &str, stay: Duration) {
        *self
            .time_in_room
            .entry(name.to_string())
            .or_insert(Duration::ZERO) += stay;
    }

    /// Record a denied attempt by a known collaborator.
    pub fn record_denied(&mut self, name: &str) {
        *self.denied_attempts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Record an unrecognized-tag read.
    pub fn record_intrusion(&mut self) {
        self.intrusion_attempts += 1;
    }

    /// Accumulated stay time for a collaborator.
    #[must_use]
    pub fn time_in_room_for(&self, name: &str) -> Duration {
        self.time_in_room.get(name).copied().unwrap_or(Duration::ZERO)
    }

    /// Denied attempts recorded for a collaborator.
    #[must_use]
    pub fn denied_attempts_for(&self, name: &str) -> u64 {
        self.denied_attempts.get(name).copied().unwrap_or(0)
    }

    /// Total unrecognized-tag reads this session.
    #[must_use]
    pub fn intrusion_attempts(&self) -> u64 {
        self.intrusion_attempts
    }
}

/// A tag still present at the end of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentEntry {
    /// The tag.
    pub tag: TagId,

    /// Collaborator name, if the replica still knows the tag.
    pub name: Option<String>,

    /// When the collaborator entered.
    pub entered_at: DateTime<Utc>,
}

/// Human-readable end-of-run summary.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Event totals by type, from the offline cache.
    pub counts: EventTypeCounts,

    /// Event totals by sync status, from the offline cache.
    pub sync: SyncStatusCounts,

    /// Tags still present, with names where known.
    pub present: Vec<PresentEntry>,

    /// Accumulated stay time per collaborator, longest first.
    pub time_in_room: Vec<(String, Duration)>,

    /// Denied attempts per collaborator, most first.
    pub denied_attempts: Vec<(String, u64)>,

    /// Unrecognized-tag reads this session.
    pub intrusion_attempts: u64,
}

impl SessionReport {
    /// Assemble the report from the engine's final state and cache totals.
    #[must_use]
    pub fn build(engine: &DecisionEngine, counts: EventTypeCounts, sync: SyncStatusCounts) -> Self {
        let stats = engine.stats();

        let mut present: Vec<PresentEntry> = engine
            .visits()
            .present()
            .into_iter()
            .map(|(tag, entered_at)| {
                let name = match lookup_shared(engine.replica(), &tag) {
                    PolicyAnswer::Known { name, .. } => Some(name),
                    PolicyAnswer::Unknown => None,
                };
                PresentEntry {
                    tag,
                    name,
                    entered_at,
                }
            })
            .collect();
        present.sort_by(|a, b| a.entered_at.cmp(&b.entered_at));

        let mut time_in_room: Vec<(String, Duration)> = stats
            .time_in_room
            .iter()
            .map(|(name, stay)| (name.clone(), *stay))
            .collect();
        time_in_room.sort_by(|a, b| b.1.cmp(&a.1));

        let mut denied_attempts: Vec<(String, u64)> = stats
            .denied_attempts
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        denied_attempts.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            counts,
            sync,
            present,
            time_in_room,
            denied_attempts,
            intrusion_attempts: stats.intrusion_attempts,
        }
    }

    /// Render the report for the operator console.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "RELATORIO DA SESSAO");
        let _ = writeln!(out, "{}", "=".repeat(60));

        let _ = writeln!(
            out,
            "Eventos: entradas={} presencas={} saidas={} negados={} desconhecidos={}",
            self.counts.entry,
            self.counts.reentry_ack,
            self.counts.exit,
            self.counts.denied,
            self.counts.unknown,
        );
        let _ = writeln!(
            out,
            "Sincronizacao: confirmados={} pendentes={} rejeitados={}",
            self.sync.confirmed, self.sync.pending, self.sync.failed,
        );

        let _ = writeln!(out, "\nTempo de permanencia na sala:");
        if self.time_in_room.is_empty() {
            let _ = writeln!(out, "  (nenhum registro)");
        }
        for (name, stay) in &self.time_in_room {
            let _ = writeln!(out, "  - {}: {}", name, format_duration(*stay));
        }

        let _ = writeln!(out, "\nTentativas de acesso nao autorizado:");
        if self.denied_attempts.is_empty() {
            let _ = writeln!(out, "  (nenhuma)");
        }
        for (name, count) in &self.denied_attempts {
            let _ = writeln!(out, "  - {}: {} tentativa(s)", name, count);
        }

        let _ = writeln!(out, "\nTentativas de invasao: {}", self.intrusion_attempts);

        let _ = writeln!(out, "\nPessoas atualmente na sala: {}", self.present.len());
        for entry in &self.present {
            match &entry.name {
                Some(name) => {
                    let _ = writeln!(out, "  - {} (tag {})", name, entry.tag);
                }
                None => {
                    let _ = writeln!(out, "  - tag {}", entry.tag);
                }
            }
        }

        let _ = writeln!(out, "{}", "=".repeat(60));
        out
    }
}

fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}h {minutes}min {seconds}s")
}
