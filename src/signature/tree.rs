//! Structural accessors over tree-sitter Solidity declaration nodes.
//!
//! The grammar has already accepted these nodes, so nothing here validates.
//! Missing pieces (which only happen inside error recovery) make the
//! accessor return `None` and the declaration is skipped.

use tree_sitter::Node;

use super::{
    collapse_whitespace, normalize_type, split_top_level, CallableParts, ModifierInvocation,
    Param, Signature, TypeLikeParts, VariableParts,
};
use crate::analysis::ParsedFile;
use crate::registry::{MemberDescriptor, ObjectKind};

/// Keyword tokens that may appear unnamed in a declaration header.
const HEADER_KEYWORDS: &[&str] = &[
    "public",
    "private",
    "internal",
    "external",
    "pure",
    "view",
    "payable",
    "virtual",
    "override",
    "constant",
    "immutable",
    "anonymous",
];

const PARAM_LOCATIONS: &[&str] = &["memory", "storage", "calldata", "indexed"];

/// Map a grammar node kind to the declaration kind it records as.
pub fn object_kind(node: Node) -> Option<ObjectKind> {
    match node.kind() {
        "contract_declaration" => Some(ObjectKind::Contract),
        "library_declaration" => Some(ObjectKind::Library),
        "interface_declaration" => Some(ObjectKind::Interface),
        "state_variable_declaration" => Some(ObjectKind::StateVar),
        "constructor_definition" => Some(ObjectKind::Constructor),
        "function_definition" | "fallback_receive_definition" => Some(ObjectKind::Function),
        "modifier_definition" => Some(ObjectKind::Modifier),
        "event_definition" => Some(ObjectKind::Event),
        "struct_declaration" => Some(ObjectKind::Struct),
        "enum_declaration" => Some(ObjectKind::Enum),
        _ => None,
    }
}

/// Structural parts of a declaration node of the given kind.
pub fn signature(parsed: &ParsedFile, node: Node, kind: ObjectKind) -> Option<Signature> {
    match kind {
        ObjectKind::Contract | ObjectKind::Library | ObjectKind::Interface => {
            type_like(parsed, node).map(Signature::TypeLike)
        }
        ObjectKind::Struct | ObjectKind::Enum => {
            let name = field_text(parsed, node, "name")?;
            Some(Signature::TypeLike(TypeLikeParts {
                name,
                bases: Vec::new(),
            }))
        }
        ObjectKind::StateVar => variable(parsed, node).map(Signature::Variable),
        ObjectKind::Constructor
        | ObjectKind::Function
        | ObjectKind::Modifier
        | ObjectKind::Event => callable(parsed, node).map(Signature::Callable),
    }
}

/// Ordered struct fields or enum values.
pub fn members(parsed: &ParsedFile, node: Node, kind: ObjectKind) -> Vec<MemberDescriptor> {
    let (body_kind, member_kind) = match kind {
        ObjectKind::Struct => ("struct_body", "struct_member"),
        ObjectKind::Enum => ("enum_body", "enum_value"),
        _ => return Vec::new(),
    };

    // Members sit in a body node; older grammar versions inline them.
    let mut cursor = node.walk();
    let mut candidates = Vec::new();
    for child in node.named_children(&mut cursor) {
        if child.kind() == body_kind {
            let mut body_cursor = child.walk();
            candidates.extend(child.named_children(&mut body_cursor));
        } else {
            candidates.push(child);
        }
    }

    candidates
        .into_iter()
        .filter(|member| member.kind() == member_kind)
        .filter_map(|member| {
            if kind == ObjectKind::Struct {
                let ty = member.child_by_field_name("type")?;
                let name = member.child_by_field_name("name")?;
                Some(MemberDescriptor {
                    type_name: Some(normalize_type(parsed.node_text(ty))),
                    name: parsed.node_text(name).to_string(),
                })
            } else {
                Some(MemberDescriptor {
                    type_name: None,
                    name: parsed.node_text(member).trim().to_string(),
                })
            }
        })
        .collect()
}

fn field_text(parsed: &ParsedFile, node: Node, field: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| parsed.node_text(n).trim().to_string())
        .filter(|s| !s.is_empty())
}

fn type_like(parsed: &ParsedFile, node: Node) -> Option<TypeLikeParts> {
    let name = field_text(parsed, node, "name")?;

    let mut cursor = node.walk();
    let bases = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "inheritance_specifier")
        .filter_map(|spec| {
            let ancestor = spec.child_by_field_name("ancestor").unwrap_or(spec);
            let text = collapse_whitespace(parsed.node_text(ancestor));
            // Constructor arguments are not part of the base name.
            let text = text.split('(').next().unwrap_or("").trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .collect();

    Some(TypeLikeParts { name, bases })
}

fn variable(parsed: &ParsedFile, node: Node) -> Option<VariableParts> {
    let type_node = node.child_by_field_name("type")?;
    let name_node = node.child_by_field_name("name")?;

    let mut modifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.start_byte() < type_node.end_byte() {
            continue;
        }
        if child.start_byte() >= name_node.start_byte() {
            break;
        }
        if child.kind() == "comment" {
            continue;
        }
        modifiers.push(collapse_whitespace(parsed.node_text(child)));
    }

    Some(VariableParts {
        type_name: normalize_type(parsed.node_text(type_node)),
        modifiers,
        name: parsed.node_text(name_node).to_string(),
    })
}

fn param(parsed: &ParsedFile, node: Node) -> Option<Param> {
    let type_node = node.child_by_field_name("type")?;

    let location = node
        .child_by_field_name("location")
        .map(|n| parsed.node_text(n).to_string())
        .or_else(|| {
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .map(|c| parsed.node_text(c))
                .find(|text| PARAM_LOCATIONS.contains(text))
                .map(str::to_string);
            found
        });
    let name = node
        .child_by_field_name("name")
        .map(|n| parsed.node_text(n).to_string());

    Some(Param {
        type_name: normalize_type(parsed.node_text(type_node)),
        location,
        name,
    })
}

fn params_of(parsed: &ParsedFile, node: Node) -> Vec<Param> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| matches!(n.kind(), "parameter" | "event_parameter"))
        .filter_map(|n| param(parsed, n))
        .collect()
}

/// Parse the text of an invocation-like node: `name`, `name(a, b)`.
pub(crate) fn invocation_from_text(text: &str) -> ModifierInvocation {
    match (text.find('('), text.rfind(')')) {
        (Some(open), Some(close)) if close > open => ModifierInvocation::Call {
            name: text[..open].split_whitespace().collect(),
            args: split_top_level(&text[open + 1..close]),
        },
        _ => ModifierInvocation::Keyword(collapse_whitespace(text)),
    }
}

/// Name of a callable node; `None` only for the fallback function.
fn callable_name(parsed: &ParsedFile, node: Node) -> Option<String> {
    match node.kind() {
        "constructor_definition" => Some("constructor".to_string()),
        "fallback_receive_definition" => {
            let mut cursor = node.walk();
            let is_receive = node
                .children(&mut cursor)
                .any(|c| !c.is_named() && parsed.node_text(c) == "receive");
            is_receive.then(|| "receive".to_string())
        }
        _ => field_text(parsed, node, "name"),
    }
}

fn callable(parsed: &ParsedFile, node: Node) -> Option<CallableParts> {
    let name = callable_name(parsed, node);
    if name.is_none() && !matches!(node.kind(), "function_definition" | "fallback_receive_definition") {
        return None;
    }

    let params = params_of(parsed, node);
    let mut modifiers = Vec::new();
    let mut returns = None;

    let name_node = node.child_by_field_name("name");
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if Some(child) == name_node {
            continue;
        }
        match child.kind() {
            "return_type_definition" => returns = Some(params_of(parsed, child)),
            "modifier_invocation" | "override_specifier" => {
                modifiers.push(invocation_from_text(parsed.node_text(child)))
            }
            "visibility" | "state_mutability" | "virtual" | "constant" | "immutable" => {
                modifiers.push(ModifierInvocation::Keyword(collapse_whitespace(
                    parsed.node_text(child),
                )))
            }
            _ if !child.is_named() && HEADER_KEYWORDS.contains(&parsed.node_text(child)) => {
                modifiers.push(ModifierInvocation::Keyword(parsed.node_text(child).to_string()))
            }
            _ => {}
        }
    }

    Some(CallableParts {
        name,
        params,
        modifiers,
        returns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SolidityParser;
    use crate::signature::format_signature;
    use pretty_assertions::assert_eq;

    /// Parse `body` inside a contract and return every member signature.
    fn member_signatures(body: &str) -> Vec<(ObjectKind, String)> {
        let source = format!("contract C {{\n{}\n}}\n", body);
        let parsed = SolidityParser::new().parse("C.sol", source.as_bytes()).unwrap();
        let contract = parsed.tree.root_node().named_child(0).unwrap();
        let body = contract.child_by_field_name("body").unwrap();

        let mut cursor = body.walk();
        let nodes: Vec<_> = body.named_children(&mut cursor).collect();
        nodes
            .into_iter()
            .filter_map(|n| {
                let kind = object_kind(n)?;
                let sig = signature(&parsed, n, kind)?;
                Some((kind, format_signature(&sig)))
            })
            .collect()
    }

    #[test]
    fn test_contract_bases() {
        let source = "contract Token is ERC20(\"T\", \"T\"), Ownable {}";
        let parsed = SolidityParser::new().parse("T.sol", source.as_bytes()).unwrap();
        let node = parsed.tree.root_node().named_child(0).unwrap();
        let kind = object_kind(node).unwrap();
        assert_eq!(kind, ObjectKind::Contract);
        assert_eq!(
            format_signature(&signature(&parsed, node, kind).unwrap()),
            "Token is ERC20, Ownable"
        );
    }

    #[test]
    fn test_function_signature_from_tree() {
        let sigs = member_signatures(
            "function transfer(uint256   a, address b) public view returns (bool) { return true; }",
        );
        assert_eq!(
            sigs,
            vec![(
                ObjectKind::Function,
                "transfer(uint256 a, address b) public view returns (bool)".to_string()
            )]
        );
    }

    #[test]
    fn test_state_variables() {
        let sigs = member_signatures(
            "mapping(address=>uint256) public balances;\nuint256 public constant MAX = 10;\naddress owner;",
        );
        assert_eq!(
            sigs,
            vec![
                (
                    ObjectKind::StateVar,
                    "mapping (address => uint256) public balances".to_string()
                ),
                (ObjectKind::StateVar, "uint256 public constant MAX".to_string()),
                (ObjectKind::StateVar, "address owner".to_string()),
            ]
        );
    }

    #[test]
    fn test_modifier_invocations_and_locations() {
        let sigs = member_signatures(
            "function set(bytes calldata data, string memory label) external onlyRole(ADMIN, msg.sender) {}",
        );
        assert_eq!(
            sigs[0].1,
            "set(bytes calldata data, string memory label) external onlyRole(ADMIN, msg.sender)"
        );
    }

    #[test]
    fn test_special_functions() {
        let sigs = member_signatures(
            "constructor(string memory name) payable {}\nfallback() external payable {}\nreceive() external payable {}",
        );
        assert_eq!(
            sigs,
            vec![
                (ObjectKind::Constructor, "constructor(string memory name) payable".to_string()),
                (ObjectKind::Function, "() external payable".to_string()),
                (ObjectKind::Function, "receive() external payable".to_string()),
            ]
        );
    }

    #[test]
    fn test_events_and_modifiers() {
        let sigs = member_signatures(
            "event Transfer(address indexed from, address indexed to, uint256 value);\nmodifier onlyOwner() { _; }",
        );
        assert_eq!(
            sigs,
            vec![
                (
                    ObjectKind::Event,
                    "Transfer(address indexed from, address indexed to, uint256 value)".to_string()
                ),
                (ObjectKind::Modifier, "onlyOwner()".to_string()),
            ]
        );
    }

    #[test]
    fn test_struct_and_enum_members() {
        let source = "contract C {\n struct Point { uint256 x; mapping(address=>bool) seen; }\n enum Color { Red, Green }\n}";
        let parsed = SolidityParser::new().parse("C.sol", source.as_bytes()).unwrap();
        let contract = parsed.tree.root_node().named_child(0).unwrap();
        let body = contract.child_by_field_name("body").unwrap();
        let mut cursor = body.walk();
        let nodes: Vec<_> = body.named_children(&mut cursor).collect();

        let point = members(&parsed, nodes[0], ObjectKind::Struct);
        assert_eq!(
            point,
            vec![
                MemberDescriptor {
                    type_name: Some("uint256".to_string()),
                    name: "x".to_string()
                },
                MemberDescriptor {
                    type_name: Some("mapping (address => bool)".to_string()),
                    name: "seen".to_string()
                },
            ]
        );

        let color: Vec<_> = members(&parsed, nodes[1], ObjectKind::Enum)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(color, vec!["Red", "Green"]);
    }

    #[test]
    fn test_invocation_from_text() {
        assert_eq!(
            invocation_from_text("override(A, B)"),
            ModifierInvocation::Call {
                name: "override".to_string(),
                args: vec!["A".to_string(), "B".to_string()]
            }
        );
        assert_eq!(
            invocation_from_text("onlyOwner"),
            ModifierInvocation::Keyword("onlyOwner".to_string())
        );
    }
}
