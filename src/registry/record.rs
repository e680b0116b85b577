//! Record types stored in the source registry.

use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Declaration kinds understood by the walker and the directive matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Contract,
    Library,
    Interface,
    #[serde(rename = "statevar")]
    StateVar,
    Constructor,
    Function,
    Modifier,
    Event,
    Struct,
    Enum,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 10] = [
        ObjectKind::Contract,
        ObjectKind::Library,
        ObjectKind::Interface,
        ObjectKind::StateVar,
        ObjectKind::Constructor,
        ObjectKind::Function,
        ObjectKind::Modifier,
        ObjectKind::Event,
        ObjectKind::Struct,
        ObjectKind::Enum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Contract => "contract",
            ObjectKind::Library => "library",
            ObjectKind::Interface => "interface",
            ObjectKind::StateVar => "statevar",
            ObjectKind::Constructor => "constructor",
            ObjectKind::Function => "function",
            ObjectKind::Modifier => "modifier",
            ObjectKind::Event => "event",
            ObjectKind::Struct => "struct",
            ObjectKind::Enum => "enum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contract" => Some(ObjectKind::Contract),
            "library" => Some(ObjectKind::Library),
            "interface" => Some(ObjectKind::Interface),
            "statevar" => Some(ObjectKind::StateVar),
            "constructor" => Some(ObjectKind::Constructor),
            "function" => Some(ObjectKind::Function),
            "modifier" => Some(ObjectKind::Modifier),
            "event" => Some(ObjectKind::Event),
            "struct" => Some(ObjectKind::Struct),
            "enum" => Some(ObjectKind::Enum),
            _ => None,
        }
    }

    /// Cross-reference role used by the documentation layer.
    pub fn role(&self) -> &'static str {
        match self {
            ObjectKind::Contract => "contract",
            ObjectKind::Library => "lib",
            ObjectKind::Interface => "interface",
            ObjectKind::StateVar => "svar",
            ObjectKind::Constructor => "cons",
            ObjectKind::Function => "func",
            ObjectKind::Modifier => "mod",
            ObjectKind::Event => "event",
            ObjectKind::Struct => "struct",
            ObjectKind::Enum => "enum",
        }
    }

    /// Human label used in generated headings.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::StateVar => "state variable",
            other => other.as_str(),
        }
    }

    /// Contract, library or interface: the only kinds that open a scope.
    pub fn is_contract_like(&self) -> bool {
        matches!(
            self,
            ObjectKind::Contract | ObjectKind::Library | ObjectKind::Interface
        )
    }

    /// Kinds whose overloads are told apart by parameter types.
    pub fn is_overloadable(&self) -> bool {
        matches!(self, ObjectKind::Function | ObjectKind::Event)
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectKind::parse(&s.to_lowercase()).ok_or_else(|| format!("unknown object kind: {}", s))
    }
}

/// One struct field or enum value, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDescriptor {
    /// Normalized field type; `None` for enum values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub name: String,
}

/// A single declaration found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationRecord {
    pub kind: ObjectKind,
    /// Path relative to the lookup root, posix separators.
    pub source_file: String,
    /// Canonical signature string.
    pub signature: String,
    /// The structural parts `signature` was formatted from.
    pub parts: Signature,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_types: Option<Vec<String>>,
    pub enclosing_contract: Option<String>,
    pub documentation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberDescriptor>,
    /// 1-indexed line of the declaration.
    pub line: usize,
}

impl DeclarationRecord {
    /// Build a record from structural parts, deriving the string fields.
    pub fn new(kind: ObjectKind, source_file: &str, parts: Signature, line: usize) -> Self {
        let param_types = if kind.is_overloadable() {
            parts.param_types()
        } else {
            None
        };

        Self {
            kind,
            source_file: source_file.to_string(),
            signature: crate::signature::format_signature(&parts),
            name: parts.name().map(str::to_string),
            value_type: parts.value_type().map(str::to_string),
            param_types,
            parts,
            enclosing_contract: None,
            documentation: String::new(),
            members: Vec::new(),
            line,
        }
    }

    pub fn with_documentation(mut self, documentation: String) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn with_members(mut self, members: Vec<MemberDescriptor>) -> Self {
        self.members = members;
        self
    }

    /// Dotted name used in targets and headings: `Contract.name`.
    pub fn qualified_name(&self) -> String {
        let name = self.name.as_deref().unwrap_or("<fallback>");
        match &self.enclosing_contract {
            Some(contract) => format!("{}.{}", contract, name),
            None => name.to_string(),
        }
    }

    /// Target identifier resolving back to this record.
    ///
    /// Overloadable kinds carry their parameter types:
    /// `Token.transfer(address,uint256)`.
    pub fn target_id(&self) -> String {
        match &self.param_types {
            Some(types) => format!("{}({})", self.qualified_name(), types.join(",")),
            None => self.qualified_name(),
        }
    }

    /// `file:line` provenance for diagnostics.
    pub fn location(&self) -> String {
        format!("{}:{}", self.source_file, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::parse_directive;

    #[test]
    fn test_kind_roundtrip_and_roles() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::StateVar.role(), "svar");
        assert_eq!(ObjectKind::Library.role(), "lib");
        assert_eq!("Function".parse::<ObjectKind>(), Ok(ObjectKind::Function));
        assert!("method".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn test_kind_classes() {
        assert!(ObjectKind::Interface.is_contract_like());
        assert!(!ObjectKind::Struct.is_contract_like());
        assert!(ObjectKind::Event.is_overloadable());
        assert!(!ObjectKind::Modifier.is_overloadable());
    }

    #[test]
    fn test_record_derives_fields() {
        let parts = parse_directive(
            ObjectKind::Function,
            "transfer(address to, uint256 amount) public returns (bool)",
        )
        .unwrap();
        let mut record = DeclarationRecord::new(ObjectKind::Function, "token/Token.sol", parts, 12);
        record.enclosing_contract = Some("Token".to_string());

        assert_eq!(record.name.as_deref(), Some("transfer"));
        assert_eq!(
            record.param_types,
            Some(vec!["address".to_string(), "uint256".to_string()])
        );
        assert_eq!(record.value_type, None);
        assert_eq!(record.target_id(), "Token.transfer(address,uint256)");
        assert_eq!(record.location(), "token/Token.sol:12");
    }

    #[test]
    fn test_modifier_has_no_param_types() {
        let parts = parse_directive(ObjectKind::Modifier, "onlyOwner()").unwrap();
        let record = DeclarationRecord::new(ObjectKind::Modifier, "A.sol", parts, 1);
        assert_eq!(record.param_types, None);
        assert_eq!(record.target_id(), "onlyOwner");
    }
}
