//! Adapter resolution chain
//!
//! An ordered, immutable list of entries queried per target type. The first
//! entry whose predicate matches and whose factory produces an adapter wins;
//! when every entry declines, the caller falls back to its default adapter.

use crate::adapter::{AdapterFactory, AdapterLookup, SharedAdapter};
use std::fmt;
use std::sync::Arc;
use tjson_format::{Result, TargetType};

/// Extra predicate narrowing the types an entry is consulted for
pub type Predicate = Arc<dyn Fn(&TargetType) -> bool + Send + Sync>;

/// One (predicate, factory) pair of the chain
#[derive(Clone)]
pub struct AdapterEntry {
    predicate: Option<Predicate>,
    factory: Arc<dyn AdapterFactory>,
}

impl AdapterEntry {
    /// Entry consulted for every type the factory applies to
    pub fn new(factory: impl AdapterFactory + 'static) -> Self {
        Self {
            predicate: None,
            factory: Arc::new(factory),
        }
    }

    /// Entry from an already shared factory
    pub fn shared(factory: Arc<dyn AdapterFactory>) -> Self {
        Self {
            predicate: None,
            factory,
        }
    }

    /// Restrict the entry to types accepted by `predicate`
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&TargetType) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Name of the factory
    pub fn name(&self) -> &'static str {
        self.factory.name()
    }

    /// True when the entry should be asked to create an adapter for `ty`
    pub fn matches(&self, ty: &TargetType) -> bool {
        self.predicate.as_ref().map_or(true, |predicate| predicate(ty)) && self.factory.applies(ty)
    }
}

impl fmt::Debug for AdapterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterEntry")
            .field("factory", &self.factory.name())
            .field("restricted", &self.predicate.is_some())
            .finish()
    }
}

/// Outcome of running the chain for one type
#[derive(Clone)]
pub enum Resolution {
    /// Entry `index` produced `adapter`
    Matched {
        /// Position of the winning entry
        index: usize,
        /// Name of the winning factory
        factory: &'static str,
        /// The adapter it produced
        adapter: SharedAdapter,
    },
    /// Every entry declined; use the default adapter
    Exhausted,
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Matched { index, factory, .. } => f
                .debug_struct("Matched")
                .field("index", index)
                .field("factory", factory)
                .finish(),
            Resolution::Exhausted => f.write_str("Exhausted"),
        }
    }
}

/// Ordered adapter entries, immutable once built
#[derive(Debug, Clone)]
pub struct ResolutionChain {
    entries: Arc<[AdapterEntry]>,
}

impl ResolutionChain {
    /// Chain consulting `entries` in the given order
    pub fn new(entries: Vec<AdapterEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Entries in resolution order
    pub fn entries(&self) -> &[AdapterEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the chain has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Factory names in resolution order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(AdapterEntry::name).collect()
    }

    /// Try each entry in order for `ty`
    pub fn resolve(&self, ty: &TargetType, lookup: &dyn AdapterLookup) -> Result<Resolution> {
        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.matches(ty) {
                continue;
            }
            match entry.factory.create(ty, lookup)? {
                Some(adapter) => {
                    tracing::debug!(
                        target_type = %ty,
                        factory = entry.name(),
                        index,
                        "resolution chain matched"
                    );
                    return Ok(Resolution::Matched {
                        index,
                        factory: entry.name(),
                        adapter,
                    });
                }
                None => {
                    tracing::trace!(target_type = %ty, factory = entry.name(), "entry declined");
                }
            }
        }
        tracing::trace!(target_type = %ty, "resolution chain exhausted");
        Ok(Resolution::Exhausted)
    }
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<AdapterEntry> for ResolutionChain {
    fn from_iter<I: IntoIterator<Item = AdapterEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
