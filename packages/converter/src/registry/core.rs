//! Converter registry, keeping converters in registration order.

use std::collections::HashSet;

use super::converter::FieldConverter;

/// Registry of field converters.
///
/// Converters run in the order they were registered. Converters can be
/// marked as skipped, or the registry can be narrowed to a set of ids.
pub struct ConverterRegistry {
    converters: Vec<Box<dyn FieldConverter>>,
    skip_ids: HashSet<String>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converters: Vec::new(),
            skip_ids: HashSet::new(),
        }
    }

    /// Register a converter.
    ///
    /// A converter registered under an id that is already taken replaces
    /// the earlier one, keeping its position.
    pub fn register(&mut self, converter: impl FieldConverter + 'static) {
        let converter: Box<dyn FieldConverter> = Box::new(converter);
        match self
            .converters
            .iter_mut()
            .find(|existing| existing.id() == converter.id())
        {
            Some(existing) => *existing = converter,
            None => self.converters.push(converter),
        }
    }

    /// Register every converter from an iterator.
    pub fn register_all<C: FieldConverter + 'static>(&mut self, converters: impl IntoIterator<Item = C>) {
        for converter in converters {
            self.register(converter);
        }
    }

    /// Mark converters as skipped (never run).
    pub fn skip(&mut self, ids: impl IntoIterator<Item = impl Into<String>>) {
        for id in ids {
            self.skip_ids.insert(id.into());
        }
    }

    /// Keep only the converters whose id is in `ids`.
    pub fn retain_only(&mut self, ids: &[String]) {
        self.converters
            .retain(|converter| ids.iter().any(|id| id == converter.id()));
    }

    /// Get a converter by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn FieldConverter> {
        self.converters
            .iter()
            .find(|converter| converter.id() == id)
            .map(|converter| converter.as_ref())
    }

    /// Check if a converter should be skipped.
    #[must_use]
    pub fn should_skip(&self, id: &str) -> bool {
        self.skip_ids.contains(id)
    }

    /// Check if a converter is registered under `id`.
    #[must_use]
    pub fn has_converter(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Converters that will run, in registration order.
    pub fn active(&self) -> impl Iterator<Item = &dyn FieldConverter> {
        self.converters
            .iter()
            .filter(|converter| !self.should_skip(converter.id()))
            .map(|converter| converter.as_ref())
    }

    /// Return all registered ids, in registration order.
    #[must_use]
    pub fn registered_ids(&self) -> Vec<&str> {
        self.converters.iter().map(|converter| converter.id()).collect()
    }

    /// Return set of all skipped ids.
    #[must_use]
    pub fn skipped_ids(&self) -> HashSet<&str> {
        self.skip_ids.iter().map(|s| s.as_str()).collect()
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check whether no converter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
