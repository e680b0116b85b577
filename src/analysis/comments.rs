//! Documentation comments attached to declarations.
//!
//! Only `///` (or longer) line comments and `/** ... */` block comments count as
//! documentation. Plain `//` and `/* */` comments are ignored.

use tree_sitter::Node;

use super::ParsedFile;

/// Comment nodes directly preceding `node`, in source order.
///
/// Comments are extras in the tree-sitter grammar, so they appear as
/// siblings before the declaration they document.
pub fn preceding_comments<'a>(parsed: &'a ParsedFile, node: Node) -> Vec<&'a str> {
    let mut comments = Vec::new();
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        if sibling.kind() != "comment" {
            break;
        }
        comments.push(parsed.node_text(sibling));
        current = sibling.prev_sibling();
    }

    comments.reverse();
    comments
}

/// Documentation text for a declaration node.
pub fn documentation_for(parsed: &ParsedFile, node: Node) -> String {
    extract_documentation(&preceding_comments(parsed, node))
}

/// Turn raw comment texts into documentation.
///
/// `///` comments contribute one trimmed line each. `/**` comments are split
/// into lines with their delimiters, leading whitespace and leading `*`
/// removed. Leading and trailing blank lines are dropped.
pub fn extract_documentation(comments: &[&str]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for comment in comments {
        if comment.starts_with("///") {
            // Any run of three or more slashes is the marker.
            lines.push(comment.trim_start_matches('/').trim().to_string());
        } else if is_doc_block(comment) {
            let inner = &comment[3..comment.len() - 2];
            for line in inner.lines() {
                lines.push(line.trim().trim_start_matches('*').trim().to_string());
            }
        }
    }

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

fn is_doc_block(comment: &str) -> bool {
    comment.starts_with("/**") && comment.ends_with("*/") && comment.len() >= 5 && comment != "/**/"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SolidityParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_long_slash_runs() {
        assert_eq!(
            extract_documentation(&["////////////", "//// Four slashes.", "////////////"]),
            "Four slashes."
        );
        assert_eq!(extract_documentation(&["// plain", "/// doc"]), "doc");
    }

    #[test]
    fn test_line_comments() {
        assert_eq!(
            extract_documentation(&["/// line one", "///   line two  "]),
            "line one\nline two"
        );
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(extract_documentation(&["/** \n * hello \n */"]), "hello");
        assert_eq!(
            extract_documentation(&["/**\n * @dev first\n *\n * second\n **/"]),
            "@dev first\n\nsecond"
        );
        assert_eq!(extract_documentation(&["/** inline */"]), "inline");
    }

    #[test]
    fn test_plain_comments_ignored() {
        assert_eq!(extract_documentation(&["// not docs", "/* nope */", "/**/"]), "");
        assert_eq!(extract_documentation(&[]), "");
    }

    #[test]
    fn test_preceding_comments_from_tree() {
        let source = b"contract A {\n    uint256 x;\n    // plain\n    /// Sets x.\n    /// Twice.\n    function set() public {}\n}\n";
        let parsed = SolidityParser::new().parse("A.sol", source).unwrap();
        let root = parsed.tree.root_node();
        let contract = root.named_child(0).unwrap();
        let body = contract.child_by_field_name("body").unwrap();
        let function = body
            .named_children(&mut body.walk())
            .find(|n| n.kind() == "function_definition")
            .unwrap();

        assert_eq!(
            preceding_comments(&parsed, function),
            vec!["// plain", "/// Sets x.", "/// Twice."]
        );
        assert_eq!(documentation_for(&parsed, function), "Sets x.\nTwice.");
    }
}
