//! In-memory source registry.
//!
//! Records are appended in walk order and never mutated. Three indexes
//! (kind, contract + name, source file) serve the lookups the rendering
//! layer needs; [`RecordQuery`] combines them for the documenter.

mod record;

pub use record::{DeclarationRecord, MemberDescriptor, ObjectKind};

use std::collections::HashMap;

/// Identity of a declaration for duplicate detection.
///
/// Contract-likes share one global namespace. Members are scoped to their
/// file and contract; overloadable kinds also key on parameter types, so
/// overloads never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScopeKey {
    Global(String),
    Member {
        source_file: String,
        contract: Option<String>,
        kind: ObjectKind,
        name: Option<String>,
        param_types: Option<Vec<String>>,
    },
}

impl ScopeKey {
    fn of(record: &DeclarationRecord) -> Self {
        if record.kind.is_contract_like() {
            ScopeKey::Global(record.name.clone().unwrap_or_default())
        } else {
            ScopeKey::Member {
                source_file: record.source_file.clone(),
                contract: record.enclosing_contract.clone(),
                kind: record.kind,
                name: record.name.clone(),
                param_types: record.param_types.clone(),
            }
        }
    }
}

/// Result of [`SourceRegistry::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// Position of the new record.
    pub id: usize,
    /// Earlier record with the same scope key, if any.
    pub duplicate_of: Option<usize>,
}

/// Composite filter over the registry. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub kind: Option<ObjectKind>,
    /// `Some(None)` selects unnamed records (the fallback function).
    pub name: Option<Option<String>>,
    pub source_file: Option<String>,
    /// `Some(None)` selects records outside any contract.
    pub contract: Option<Option<String>>,
    pub param_types: Option<Vec<String>>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ObjectKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.name = Some(None);
        self
    }

    pub fn in_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn in_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(Some(contract.into()));
        self
    }

    pub fn top_level(mut self) -> Self {
        self.contract = Some(None);
        self
    }

    pub fn param_types(mut self, types: Vec<String>) -> Self {
        self.param_types = Some(types);
        self
    }

    pub fn matches(&self, record: &DeclarationRecord) -> bool {
        self.kind.map_or(true, |k| record.kind == k)
            && self.name.as_ref().map_or(true, |n| &record.name == n)
            && self
                .source_file
                .as_ref()
                .map_or(true, |f| &record.source_file == f)
            && self
                .contract
                .as_ref()
                .map_or(true, |c| &record.enclosing_contract == c)
            && self
                .param_types
                .as_ref()
                .map_or(true, |t| record.param_types.as_ref() == Some(t))
    }
}

/// Append-only store of declaration records.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    records: Vec<DeclarationRecord>,
    by_kind: HashMap<ObjectKind, Vec<usize>>,
    by_contract_and_name: HashMap<(Option<String>, Option<String>), Vec<usize>>,
    by_source_file: HashMap<String, Vec<usize>>,
    scopes: HashMap<ScopeKey, usize>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and update every index.
    ///
    /// The record is always stored; a scope-key collision is only reported
    /// through [`Inserted::duplicate_of`].
    pub fn insert(&mut self, record: DeclarationRecord) -> Inserted {
        let id = self.records.len();

        self.by_kind.entry(record.kind).or_default().push(id);
        self.by_contract_and_name
            .entry((record.enclosing_contract.clone(), record.name.clone()))
            .or_default()
            .push(id);
        self.by_source_file
            .entry(record.source_file.clone())
            .or_default()
            .push(id);

        let duplicate_of = match self.scopes.entry(ScopeKey::of(&record)) {
            std::collections::hash_map::Entry::Occupied(existing) => Some(*existing.get()),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(id);
                None
            }
        };

        self.records.push(record);
        Inserted { id, duplicate_of }
    }

    pub fn get(&self, id: usize) -> Option<&DeclarationRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[DeclarationRecord] {
        &self.records
    }

    fn resolve(&self, ids: Option<&Vec<usize>>) -> Vec<&DeclarationRecord> {
        ids.map(|ids| ids.iter().map(|&id| &self.records[id]).collect())
            .unwrap_or_default()
    }

    pub fn by_kind(&self, kind: ObjectKind) -> Vec<&DeclarationRecord> {
        self.resolve(self.by_kind.get(&kind))
    }

    /// Records named `name` directly inside `contract`; `None` for either
    /// selects top-level or unnamed declarations.
    pub fn by_contract_and_name(
        &self,
        contract: Option<&str>,
        name: Option<&str>,
    ) -> Vec<&DeclarationRecord> {
        let key = (contract.map(str::to_string), name.map(str::to_string));
        self.resolve(self.by_contract_and_name.get(&key))
    }

    pub fn by_source_file(&self, source_file: &str) -> Vec<&DeclarationRecord> {
        self.resolve(self.by_source_file.get(source_file))
    }

    /// Records matching every field set on `query`, in insertion order.
    pub fn select(&self, query: &RecordQuery) -> Vec<&DeclarationRecord> {
        // Narrow through the smallest available index before filtering.
        let candidates = if let Some(file) = &query.source_file {
            self.by_source_file.get(file)
        } else if let Some(kind) = query.kind {
            self.by_kind.get(&kind)
        } else {
            None
        };

        match candidates {
            Some(ids) => ids
                .iter()
                .map(|&id| &self.records[id])
                .filter(|r| query.matches(r))
                .collect(),
            None if query.source_file.is_some() || query.kind.is_some() => Vec::new(),
            None => self.records.iter().filter(|r| query.matches(r)).collect(),
        }
    }

    /// Members declared directly inside `contract`, in source order.
    pub fn members_of(&self, source_file: Option<&str>, contract: &str) -> Vec<&DeclarationRecord> {
        let mut query = RecordQuery::new().in_contract(contract);
        query.source_file = source_file.map(str::to_string);
        self.select(&query)
    }

    /// Drop every record; used when a build starts over.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_kind.clear();
        self.by_contract_and_name.clear();
        self.by_source_file.clear();
        self.scopes.clear();
    }
}
