//! The agent registry.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::RegistryResult;
use crate::models::{AgentEntry, CachedAgent, RegistryStats, UpdateSummary};
use crate::search::SearchFilters;
use crate::store::{self, Snapshot};

#[derive(Default)]
struct State {
    agents: HashMap<String, CachedAgent>,
    last_discovery: Option<DateTime<Utc>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl State {
    fn stats(&self) -> RegistryStats {
        let mut by_format = BTreeMap::new();
        for agent in self.agents.values() {
            *by_format.entry(agent.record.format.to_string()).or_insert(0) += 1;
        }
        RegistryStats {
            total_agents: self.agents.len(),
            by_format,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            last_discovery: self.last_discovery,
        }
    }

    fn snapshot(&self) -> Snapshot {
        let mut agents: Vec<CachedAgent> = self.agents.values().cloned().collect();
        agents.sort_by(|a, b| a.id().cmp(b.id()));
        Snapshot {
            agents,
            last_discovery: self.last_discovery,
            stats: self.stats(),
        }
    }

    /// Evict the least-accessed entries until `max_size` holds.
    ///
    /// Ties go to the least recently accessed, then the smallest id.
    fn evict(&mut self, max_size: usize) -> Vec<String> {
        let excess = self.agents.len().saturating_sub(max_size);
        if excess == 0 {
            return Vec::new();
        }
        let mut candidates: Vec<(u64, DateTime<Utc>, String)> = self
            .agents
            .values()
            .map(|a| (a.access_count, a.last_accessed, a.id().to_string()))
            .collect();
        candidates.sort();

        let evicted: Vec<String> = candidates.into_iter().take(excess).map(|(_, _, id)| id).collect();
        for id in &evicted {
            self.agents.remove(id);
        }
        self.evictions += evicted.len() as u64;
        evicted
    }
}

/// In-memory agent registry mirrored to disk.
///
/// All state sits behind one mutex; `get` mutates access bookkeeping so
/// reads take the lock too.
pub struct AgentRegistry {
    config: RegistryConfig,
    state: Mutex<State>,
}

impl AgentRegistry {
    /// Open a registry, loading the snapshot when persistence is enabled.
    ///
    /// An unreadable or expired snapshot yields an empty registry.
    pub fn open(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let mut state = State::default();

        if config.persist {
            match store::load(&config, Utc::now()) {
                Ok(Some(snapshot)) => {
                    info!(
                        "Loaded {} agents from {}",
                        snapshot.agents.len(),
                        config.cache_path.display()
                    );
                    state.last_discovery = snapshot.last_discovery;
                    state.hits = snapshot.stats.hits;
                    state.misses = snapshot.stats.misses;
                    state.evictions = snapshot.stats.evictions;
                    state.agents = snapshot
                        .agents
                        .into_iter()
                        .map(|a| (a.id().to_string(), a))
                        .collect();
                }
                Ok(None) => {}
                Err(e) => warn!(
                    "Cannot load registry from {}: {}; starting empty",
                    config.cache_path.display(),
                    e
                ),
            }
        }

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    /// A registry that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            config: RegistryConfig::in_memory(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn persist(&self, state: &State) {
        if !self.config.persist {
            return;
        }
        if let Err(e) = store::save(&self.config, &state.snapshot()) {
            warn!(
                "Cannot persist registry to {}: {}",
                self.config.cache_path.display(),
                e
            );
        }
    }

    /// Merge freshly discovered agents, evict, and persist.
    pub fn update(&self, entries: Vec<AgentEntry>) -> UpdateSummary {
        let now = Utc::now();
        let mut state = self.state.lock();
        let mut summary = UpdateSummary::default();

        for entry in entries {
            match state.agents.get_mut(entry.id()) {
                Some(existing) => {
                    if existing.record.source_path != entry.record.source_path {
                        warn!(
                            "Agent {} moved from {} to {}; the id is shared by more than one source",
                            entry.id(),
                            existing.record.source_path.display(),
                            entry.record.source_path.display()
                        );
                        summary.relocated.push(entry.id().to_string());
                    }
                    existing.refresh(entry);
                    summary.updated += 1;
                }
                None => {
                    let agent = CachedAgent::new(entry, now);
                    state.agents.insert(agent.id().to_string(), agent);
                    summary.inserted += 1;
                }
            }
        }
        state.last_discovery = Some(now);

        summary.evicted = state.evict(self.config.max_size);
        if !summary.evicted.is_empty() {
            info!("Evicted {} agents over the size limit", summary.evicted.len());
        }
        debug!(
            "Registry update: {} inserted, {} updated, {} total",
            summary.inserted,
            summary.updated,
            state.agents.len()
        );

        self.persist(&state);
        summary
    }

    /// Fetch an agent, counting the access.
    ///
    /// The access-count sidecar is rewritten on every hit so counts survive
    /// a restart without a full snapshot write.
    pub fn get(&self, id: &str) -> Option<CachedAgent> {
        let mut state = self.state.lock();
        match state.agents.get_mut(id) {
            Some(agent) => {
                agent.touch(Utc::now());
                let found = agent.clone();
                state.hits += 1;
                if self.config.persist {
                    if let Err(e) = store::save_access(&self.config, state.agents.values()) {
                        warn!("Cannot persist access counts: {}", e);
                    }
                }
                Some(found)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Fetch an agent without touching bookkeeping.
    pub fn peek(&self, id: &str) -> Option<CachedAgent> {
        self.state.lock().agents.get(id).cloned()
    }

    pub fn search(&self, filters: &SearchFilters) -> RegistryResult<Vec<CachedAgent>> {
        let compiled = filters.compile()?;
        let matched: Vec<CachedAgent> = {
            let state = self.state.lock();
            state
                .agents
                .values()
                .filter(|a| compiled.matches(a))
                .cloned()
                .collect()
        };
        Ok(compiled.finish(matched))
    }

    pub fn remove_agent(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        let removed = state.agents.remove(id).is_some();
        if removed {
            debug!("Removed agent {}", id);
            self.persist(&state);
        }
        removed
    }

    /// Drop every agent and counter, and delete the cache files.
    pub fn clear_cache(&self) {
        let mut state = self.state.lock();
        *state = State::default();
        if self.config.persist {
            if let Err(e) = store::remove(&self.config) {
                warn!("Cannot remove registry cache files: {}", e);
            }
        }
        info!("Registry cache cleared");
    }

    pub fn stats(&self) -> RegistryStats {
        self.state.lock().stats()
    }

    /// Write the snapshot now, reporting failures.
    pub fn flush(&self) -> RegistryResult<()> {
        if !self.config.persist {
            return Ok(());
        }
        let snapshot = self.state.lock().snapshot();
        store::save(&self.config, &snapshot)
    }

    pub fn len(&self) -> usize {
        self.state.lock().agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().agents.is_empty()
    }
}
