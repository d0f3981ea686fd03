/*!
 * VisitorRegistry - command name to constructor mapping
 *
 * Built once by the composition root; every extension unit registers its
 * commands explicitly. Entries are never removed or replaced, and once
 * composition is over the registry is only borrowed immutably.
 */

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{RegistryError, RegistryResult, VisitResult};
use crate::visitor::Visitor;

/// Builds a visitor from exactly `arity` argument strings.
pub type VisitorConstructor = Box<dyn Fn(&[String]) -> VisitResult<Box<dyn Visitor>> + Send + Sync>;

pub struct VisitorEntry {
    arity: usize,
    summary: String,
    construct: VisitorConstructor,
}

impl VisitorEntry {
    pub fn new<F>(arity: usize, construct: F) -> Self
    where
        F: Fn(&[String]) -> VisitResult<Box<dyn Visitor>> + Send + Sync + 'static,
    {
        Self {
            arity,
            summary: String::new(),
            construct: Box::new(construct),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The caller guarantees `args.len() == self.arity()`.
    pub fn construct(&self, args: &[String]) -> VisitResult<Box<dyn Visitor>> {
        debug_assert_eq!(args.len(), self.arity);
        (self.construct)(args)
    }
}

impl fmt::Debug for VisitorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorEntry")
            .field("arity", &self.arity)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Listing row for help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorInfo {
    pub name: String,
    pub arity: usize,
    pub summary: String,
}

#[derive(Debug, Default)]
pub struct VisitorRegistry {
    entries: HashMap<String, VisitorEntry>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `construct` under `name`, taking exactly `arity` arguments.
    pub fn register<F>(&mut self, name: &str, arity: usize, construct: F) -> RegistryResult<()>
    where
        F: Fn(&[String]) -> VisitResult<Box<dyn Visitor>> + Send + Sync + 'static,
    {
        self.register_entry(name, VisitorEntry::new(arity, construct))
    }

    pub fn register_entry(&mut self, name: &str, entry: VisitorEntry) -> RegistryResult<()> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::Conflict {
                name: name.to_string(),
            });
        }
        debug!("registered visitor '{}' ({} args)", name, entry.arity());
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VisitorEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered visitors, sorted by name.
    pub fn list(&self) -> Vec<VisitorInfo> {
        let mut infos: Vec<VisitorInfo> = self
            .entries
            .iter()
            .map(|(name, entry)| VisitorInfo {
                name: name.clone(),
                arity: entry.arity(),
                summary: entry.summary().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}
