//! Host engine: adapter resolution, caching and typed entry points

use crate::defaults::default_adapter;
use ahash::AHashMap;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tjson_codec::{
    extension_entries, AdapterEntry, AdapterFactory, AdapterLookup, JsonAdapter, Resolution,
    ResolutionChain, SharedAdapter,
};
use tjson_format::{AnyValue, JsonError, JsonReader, Limits, Reflect, Result, TargetType};

/// Engine-wide encoding options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Write `null` for absent `Option` record fields and null map entries
    /// instead of omitting them
    pub serialize_nulls: bool,
    /// Resolution and parsing limits
    pub limits: Limits,
}

/// Builds an [`Engine`] from an ordered list of adapter factories.
///
/// Entries added with [`add`](Self::add) are consulted in insertion order,
/// followed by entries added with [`add_last`](Self::add_last); types no
/// entry claims use the default adapters.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    entries: Vec<AdapterEntry>,
    last_entries: Vec<AdapterEntry>,
    options: EngineOptions,
}

impl EngineBuilder {
    /// Builder with no entries and default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factory to the chain
    pub fn add(mut self, factory: impl AdapterFactory + 'static) -> Self {
        self.entries.push(AdapterEntry::new(factory));
        self
    }

    /// Append a prepared entry (for example one restricted by a predicate)
    pub fn add_entry(mut self, entry: AdapterEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Append a factory consulted after every [`add`](Self::add) entry
    pub fn add_last(mut self, factory: impl AdapterFactory + 'static) -> Self {
        self.last_entries.push(AdapterEntry::new(factory));
        self
    }

    /// Append the unsigned and wrapper codecs, in that order
    pub fn with_extensions(mut self) -> Self {
        self.entries.extend(extension_entries());
        self
    }

    /// Replace the engine options
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate the options and freeze the chain
    pub fn build(self) -> Result<Engine> {
        self.options.limits.validate()?;
        let chain: ResolutionChain = self
            .entries
            .into_iter()
            .chain(self.last_entries)
            .collect();
        tracing::debug!(entries = ?chain.names(), "built engine");
        Ok(Engine::from_parts(chain, self.options))
    }
}

/// JSON engine that encodes and decodes [`Reflect`] types.
///
/// Resolved adapters are cached per type; an engine is `Send + Sync` and is
/// meant to be built once and shared.
pub struct Engine {
    chain: ResolutionChain,
    options: EngineOptions,
    cache: RwLock<AHashMap<TypeId, SharedAdapter>>,
}

impl Engine {
    fn from_parts(chain: ResolutionChain, options: EngineOptions) -> Self {
        Self {
            chain,
            options,
            cache: RwLock::new(AHashMap::new()),
        }
    }

    /// Start building an engine
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Engine with no extensions: default adapters only
    pub fn standard() -> Self {
        Self::from_parts(ResolutionChain::default(), EngineOptions::default())
    }

    /// Engine with the unsigned codec followed by the wrapper codec
    pub fn with_extensions() -> Self {
        Self::from_parts(
            ResolutionChain::new(extension_entries()),
            EngineOptions::default(),
        )
    }

    /// The resolution chain
    pub fn chain(&self) -> &ResolutionChain {
        &self.chain
    }

    /// The engine options
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Adapter for `ty`: the first chain entry that claims it, or the default.
    ///
    /// Adapters resolved along the way are cached only once the whole
    /// resolution succeeds.
    pub fn adapter_for(&self, ty: &TargetType) -> Result<SharedAdapter> {
        if let Some(adapter) = self.cached(ty) {
            tracing::trace!(target_type = %ty, adapter = adapter.name(), "adapter cache hit");
            return Ok(adapter);
        }

        let in_flight = InFlight::default();
        let adapter = self.resolve(ty, &in_flight, 0)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        for (id, resolved) in in_flight.resolved.into_inner() {
            cache.entry(id).or_insert(resolved);
        }
        Ok(cache.get(&ty.id()).cloned().unwrap_or(adapter))
    }

    /// Typed adapter for `T`
    pub fn adapter<T: Reflect>(&self) -> Result<TypedAdapter<T>> {
        let ty = TargetType::of::<T>();
        let adapter = self.adapter_for(&ty)?;
        Ok(TypedAdapter {
            ty,
            adapter,
            _marker: PhantomData,
        })
    }

    /// Encode `value` as a JSON value
    pub fn to_value<T: Reflect>(&self, value: &T) -> Result<Value> {
        self.adapter::<T>()?.encode(value)
    }

    /// Encode `value` as compact JSON text
    pub fn to_string<T: Reflect>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value(value)?)?)
    }

    /// Encode `value` as compact JSON text into `writer`
    pub fn to_writer<W: Write, T: Reflect>(&self, writer: W, value: &T) -> Result<()> {
        let encoded = self.to_value(value)?;
        serde_json::to_writer(writer, &encoded)?;
        Ok(())
    }

    /// Decode a `T` from a JSON value
    pub fn from_value<T: Reflect>(&self, value: &Value) -> Result<T> {
        self.adapter::<T>()?.decode(value)
    }

    /// Decode a `T` from JSON text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str<T: Reflect>(&self, text: &str) -> Result<T> {
        let value: Value = serde_json::from_str(text)?;
        self.from_value(&value)
    }

    /// Decode a `T` from JSON text read from `reader`
    pub fn from_reader<R: Read, T: Reflect>(&self, reader: R) -> Result<T> {
        let value: Value = serde_json::from_reader(reader)?;
        self.from_value(&value)
    }

    fn cached(&self, ty: &TargetType) -> Option<SharedAdapter> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(&ty.id()).cloned()
    }

    fn resolve(
        &self,
        ty: &TargetType,
        in_flight: &InFlight,
        depth: usize,
    ) -> Result<SharedAdapter> {
        if let Some(adapter) = self.cached(ty) {
            return Ok(adapter);
        }
        if let Some(adapter) = in_flight.resolved.borrow().get(&ty.id()) {
            return Ok(adapter.clone());
        }
        if let Some(deferred) = in_flight.pending.borrow().get(&ty.id()) {
            tracing::trace!(target_type = %ty, "recursive lookup deferred");
            let adapter: SharedAdapter = deferred.clone();
            return Ok(adapter);
        }

        let max_depth = self.options.limits.max_resolution_depth;
        if depth >= max_depth {
            return Err(JsonError::LimitExceeded(format!(
                "resolving {} nested more than {} adapters deep",
                ty, max_depth
            )));
        }

        in_flight
            .pending
            .borrow_mut()
            .insert(ty.id(), Arc::new(DeferredAdapter::new(ty.clone())));
        let nested = Resolver {
            engine: self,
            in_flight,
            depth: depth + 1,
        };
        let adapter = match self.chain.resolve(ty, &nested)? {
            Resolution::Matched { adapter, .. } => adapter,
            Resolution::Exhausted => {
                tracing::debug!(target_type = %ty, kind = ty.kind().label(), "using default adapter");
                default_adapter(ty, &nested, self.options.serialize_nulls)?
            }
        };

        if let Some(deferred) = in_flight.pending.borrow_mut().remove(&ty.id()) {
            deferred.fill(adapter.clone());
        }
        in_flight
            .resolved
            .borrow_mut()
            .insert(ty.id(), adapter.clone());
        Ok(adapter)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Engine")
            .field("chain", &self.chain.names())
            .field("options", &self.options)
            .field("cached_adapters", &cached)
            .finish()
    }
}

/// Adapters produced by one top-level resolution, not yet cached
#[derive(Default)]
struct InFlight {
    /// Types whose resolution has started but not finished
    pending: RefCell<AHashMap<TypeId, Arc<DeferredAdapter>>>,
    resolved: RefCell<AHashMap<TypeId, SharedAdapter>>,
}

/// Lookup handed to factories and default adapters while one resolution
/// is in progress; tracks how deeply delegates are nested
struct Resolver<'e> {
    engine: &'e Engine,
    in_flight: &'e InFlight,
    depth: usize,
}

impl AdapterLookup for Resolver<'_> {
    fn adapter_for(&self, ty: &TargetType) -> Result<SharedAdapter> {
        self.engine.resolve(ty, self.in_flight, self.depth)
    }

    fn limits(&self) -> &Limits {
        &self.engine.options.limits
    }
}

/// Forwards to the adapter of a type that was requested again while its
/// own resolution was running (recursive types).
///
/// Filled once that resolution finishes. The recursive adapters then
/// reference each other and are kept alive for the life of the process.
struct DeferredAdapter {
    ty: TargetType,
    target: OnceLock<SharedAdapter>,
}

impl DeferredAdapter {
    fn new(ty: TargetType) -> Self {
        Self {
            ty,
            target: OnceLock::new(),
        }
    }

    fn fill(&self, adapter: SharedAdapter) {
        if self.target.set(adapter).is_err() {
            tracing::warn!(target_type = %self.ty, "deferred adapter filled twice");
        }
    }

    fn target(&self) -> Result<&SharedAdapter> {
        self.target.get().ok_or_else(|| {
            JsonError::Internal(format!(
                "adapter for {} used before its resolution finished",
                self.ty
            ))
        })
    }
}

impl JsonAdapter for DeferredAdapter {
    fn name(&self) -> &'static str {
        "deferred"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        self.target()?.encode(value)
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        self.target()?.decode(reader)
    }
}

/// Adapter for a statically known type
pub struct TypedAdapter<T> {
    ty: TargetType,
    adapter: SharedAdapter,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> TypedAdapter<T> {
    /// Type the adapter was resolved for
    pub fn target_type(&self) -> &TargetType {
        &self.ty
    }

    /// The type-erased adapter
    pub fn erased(&self) -> &SharedAdapter {
        &self.adapter
    }

    /// Encode `value`
    pub fn encode(&self, value: &T) -> Result<Value> {
        self.adapter.encode(value)
    }

    /// Decode a document rooted at `value`
    pub fn decode(&self, value: &Value) -> Result<T> {
        self.decode_reader(&JsonReader::new(value))
    }

    /// Decode the value under `reader`
    pub fn decode_reader(&self, reader: &JsonReader<'_>) -> Result<T> {
        let decoded = self.adapter.decode(reader)?;
        decoded.downcast::<T>().map(|value| *value).map_err(|_| {
            JsonError::Internal(format!(
                "{} adapter produced a value that is not a {}",
                self.adapter.name(),
                self.ty
            ))
        })
    }
}

impl<T> Clone for TypedAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            adapter: self.adapter.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAdapter")
            .field("type", &self.ty.simple_name())
            .field("adapter", &self.adapter.name())
            .finish()
    }
}
