//! Structural signatures of Solidity declarations.
//!
//! A declaration's signature is extracted into a [`Signature`] by one of two
//! matchers and then rendered by the formatter:
//!
//! - `tree`: accessors over tree-sitter declaration nodes (source files)
//! - `directive`: regex matcher over a single header typed by a doc author
//!
//! Both produce the same shapes, so a signature read from source and the
//! same header typed by hand format to identical strings.

mod directive;
mod format;
pub(crate) mod tree;

pub use directive::parse_directive;
pub use format::{format_params, format_signature};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Keywords that may appear in a callable's trailing list but never take arguments.
pub const KEYWORD_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "external",
    "internal",
    "pure",
    "view",
    "payable",
    "anonymous",
    "virtual",
];

/// Location / visibility words allowed between a type and a name.
pub const LOCATION_KEYWORDS: &[&str] = &[
    "public", "private", "internal", "storage", "memory", "calldata", "indexed",
];

/// One entry of a parameter or return list: `type [location] [name]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Param {
    pub fn new(type_name: &str, location: Option<&str>, name: Option<&str>) -> Self {
        Self {
            type_name: normalize_type(type_name),
            location: location.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    /// Type string used to tell overloads apart.
    ///
    /// Storage references keep a ` storage` suffix; every other location
    /// and the parameter name are ignored.
    pub fn abi_type(&self) -> String {
        match self.location.as_deref() {
            Some("storage") => format!("{} storage", self.type_name),
            _ => self.type_name.clone(),
        }
    }
}

/// A trailing modifier of a callable: `view`, `onlyOwner`, `onlyRole(ADMIN)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierInvocation {
    Keyword(String),
    Call { name: String, args: Vec<String> },
}

impl ModifierInvocation {
    pub fn name(&self) -> &str {
        match self {
            ModifierInvocation::Keyword(name) => name,
            ModifierInvocation::Call { name, .. } => name,
        }
    }
}

/// Contract, library, interface, struct or enum header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeLikeParts {
    pub name: String,
    pub bases: Vec<String>,
}

/// State variable header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableParts {
    pub type_name: String,
    pub modifiers: Vec<String>,
    pub name: String,
}

/// Constructor, function, modifier or event header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableParts {
    /// `None` only for the fallback function.
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub modifiers: Vec<ModifierInvocation>,
    pub returns: Option<Vec<Param>>,
}

impl CallableParts {
    /// Ordered overload-relevant parameter types.
    pub fn param_types(&self) -> Vec<String> {
        self.params.iter().map(Param::abi_type).collect()
    }

    /// Whether the trailing list makes this callable visible outside the contract.
    pub fn is_public(&self) -> bool {
        self.modifiers
            .iter()
            .any(|m| matches!(m, ModifierInvocation::Keyword(k) if k == "public" || k == "external"))
    }
}

/// Structural parts of a declaration header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Signature {
    TypeLike(TypeLikeParts),
    Variable(VariableParts),
    Callable(CallableParts),
}

impl Signature {
    pub fn name(&self) -> Option<&str> {
        match self {
            Signature::TypeLike(parts) => Some(&parts.name),
            Signature::Variable(parts) => Some(&parts.name),
            Signature::Callable(parts) => parts.name.as_deref(),
        }
    }

    /// Normalized type of a state variable.
    pub fn value_type(&self) -> Option<&str> {
        match self {
            Signature::Variable(parts) => Some(&parts.type_name),
            _ => None,
        }
    }

    pub fn param_types(&self) -> Option<Vec<String>> {
        match self {
            Signature::Callable(parts) => Some(parts.param_types()),
            _ => None,
        }
    }
}

lazy_static! {
    static ref SPACE_BEFORE_SYMBOL: Regex = Regex::new(r"\s*(\W)").unwrap();
    static ref SPACE_AFTER_SYMBOL: Regex = Regex::new(r"(\W)\s*").unwrap();
    static ref SPACE_BETWEEN_WORDS: Regex = Regex::new(r"(\w)\s+(\w)").unwrap();
}

/// Normalize a Solidity type string.
///
/// Whitespace next to symbols is removed, whitespace between words becomes a
/// single space, and mappings get canonical spacing:
/// `mapping(address=>uint256)` becomes `mapping (address => uint256)`.
pub fn normalize_type(type_str: &str) -> String {
    let type_str = type_str.trim();
    let type_str = SPACE_BEFORE_SYMBOL.replace_all(type_str, "$1");
    let type_str = SPACE_AFTER_SYMBOL.replace_all(&type_str, "$1");
    // Overlapping pairs like `a b c` need a second pass.
    let mut type_str = type_str.into_owned();
    loop {
        let next = SPACE_BETWEEN_WORDS.replace_all(&type_str, "$1 $2").into_owned();
        if next == type_str {
            break;
        }
        type_str = next;
    }
    type_str
        .replace("mapping(", "mapping (")
        .replace("=>", " => ")
}

/// Collapse every whitespace run to a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split an argument list on commas that are not nested in brackets.
pub(crate) fn split_top_level(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for ch in list.chars() {
        match ch {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| collapse_whitespace(&p))
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mapping(address=>uint256)", "mapping (address => uint256)")]
    #[case("mapping (address => uint256)", "mapping (address => uint256)")]
    #[case(
        "mapping(address => mapping(uint => bool))",
        "mapping (address => mapping (uint => bool))"
    )]
    #[case("address  to", "address to")]
    #[case("  uint256 [ ] ", "uint256[]")]
    #[case("address\n   payable", "address payable")]
    #[case("uint256", "uint256")]
    fn test_normalize_type(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_type(input), expected);
    }

    #[test]
    fn test_normalize_type_idempotent() {
        let once = normalize_type("mapping( bytes32=>mapping(address =>  bool ) )");
        assert_eq!(normalize_type(&once), once);
    }

    #[test]
    fn test_abi_type_marks_storage() {
        let param = Param::new("Data", Some("storage"), Some("self"));
        assert_eq!(param.abi_type(), "Data storage");

        let param = Param::new("bytes", Some("memory"), Some("data"));
        assert_eq!(param.abi_type(), "bytes");
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a, f(b, c), [1, 2] ,"),
            vec!["a", "f(b, c)", "[1, 2]"]
        );
        assert!(split_top_level("  ").is_empty());
    }

    #[test]
    fn test_is_public() {
        let parts = CallableParts {
            name: Some("f".to_string()),
            params: vec![],
            modifiers: vec![
                ModifierInvocation::Keyword("external".to_string()),
                ModifierInvocation::Keyword("view".to_string()),
            ],
            returns: None,
        };
        assert!(parts.is_public());

        let parts = CallableParts {
            modifiers: vec![ModifierInvocation::Call {
                name: "public".to_string(),
                args: vec![],
            }],
            ..parts
        };
        assert!(!parts.is_public());
    }
}
