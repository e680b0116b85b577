//! Target identifiers naming a single registry record.
//!
//! `[file:]Contract.name(type1,type2)` for functions and events,
//! `[file:]Contract.name` for other members and `[file:]Name` for
//! contracts, libraries and interfaces. `Contract.` (empty name) names the
//! fallback function.

use std::fmt;

use crate::registry::{ObjectKind, RecordQuery};
use crate::signature::{split_top_level, Param, LOCATION_KEYWORDS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub file: Option<String>,
    pub contract: Option<String>,
    /// `None` for the fallback function.
    pub name: Option<String>,
    /// Present when the target carries a parenthesized type list.
    pub param_types: Option<Vec<String>>,
}

impl Target {
    pub fn parse(kind: ObjectKind, text: &str) -> Self {
        let (file, path) = match text.rfind(':') {
            Some(idx) => (Some(text[..idx].trim().to_string()), &text[idx + 1..]),
            None => (None, text),
        };
        let file = file.filter(|f| !f.is_empty());

        let (contract, full_name) = match path.find('.') {
            Some(idx) => (path[..idx].trim(), Some(&path[idx + 1..])),
            None => (path.trim(), None),
        };

        let (name, param_types) = match full_name {
            Some(full) => match full.find('(') {
                Some(idx) => {
                    let types = full[idx + 1..].trim();
                    let types = types.strip_suffix(')').unwrap_or(types);
                    let types = split_top_level(types).iter().map(|t| target_type(t)).collect();
                    (full[..idx].trim(), Some(types))
                }
                None => (full.trim(), None),
            },
            None => ("", None),
        };

        let mut contract = (!contract.is_empty()).then(|| contract.to_string());
        let mut name = (!name.is_empty()).then(|| name.to_string());

        // A bare `Name` names a contract-like itself, not a member of it.
        if kind.is_contract_like() && name.is_none() {
            name = contract.take();
        }

        Self {
            file,
            contract,
            name,
            param_types,
        }
    }

    /// Registry query selecting the records this target names.
    pub fn query(&self, kind: ObjectKind) -> RecordQuery {
        let mut query = RecordQuery::new().kind(kind);
        query.name = Some(self.name.clone());
        query.source_file = self.file.clone();
        if let Some(contract) = &self.contract {
            query = query.in_contract(contract.clone());
        }
        if let Some(types) = &self.param_types {
            query = query.param_types(types.clone());
        }
        query
    }
}

/// One parameter type of a target in overload form: a trailing `storage`
/// is kept, `memory` and `calldata` are dropped.
fn target_type(text: &str) -> String {
    let (type_name, location) = match text.rsplit_once(' ') {
        Some((head, last)) if LOCATION_KEYWORDS.contains(&last) => (head, Some(last)),
        _ => (text, None),
    };
    Param::new(type_name, location, None).abi_type()
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        if let Some(contract) = &self.contract {
            write!(f, "{}.", contract)?;
        }
        if let Some(name) = &self.name {
            write!(f, "{}", name)?;
        }
        if let Some(types) = &self.param_types {
            write!(f, "({})", types.join(","))?;
        }
        Ok(())
    }
}
