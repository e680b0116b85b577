//! reStructuredText generation from registry records.
//!
//! A [`Documenter`] resolves a target against the registry and emits the
//! `.. sol:<kind>::` directive for it, followed by its documentation and,
//! for contracts, libraries and interfaces, by its members.

mod natspec;
mod target;

pub use natspec::{render_natspec, NatSpec};
pub use target::Target;

use std::collections::HashSet;

use crate::diagnostics::Diagnostic;
use crate::registry::{DeclarationRecord, ObjectKind, SourceRegistry};
use crate::signature::Signature;

/// Domain prefix of generated directives.
pub const DOMAIN: &str = "sol";

const CONTENT_INDENT: &str = "   ";

/// Which members of a contract-like get documented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MemberSelection {
    #[default]
    None,
    All,
    /// Names to include; `<fallback>` selects the unnamed function and
    /// `constructor` the constructor.
    Only(Vec<String>),
}

impl MemberSelection {
    /// `None` when the option is absent, `All` when given without names.
    pub fn from_option(option: Option<Vec<String>>) -> Self {
        match option {
            None => MemberSelection::None,
            Some(names) if names.iter().all(|n| n.trim().is_empty()) => MemberSelection::All,
            Some(names) => MemberSelection::Only(
                names
                    .into_iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect(),
            ),
        }
    }
}

/// Options shared by a documenter and every member it documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumenterOptions {
    pub members: MemberSelection,
    pub undoc_members: bool,
    /// Names to skip; `<fallback>`, `constructor` and `<private>` are special.
    pub exclude_members: Vec<String>,
    pub noindex: bool,
}

/// Source name reported for generated lines of `record`.
pub fn source_name(record: &DeclarationRecord) -> String {
    format!(
        "{}:docstring of {} {}",
        record.source_file,
        record.kind,
        record.qualified_name()
    )
}

/// The capabilities a rendering layer needs from a documenter.
pub trait Documenter<'r> {
    /// Find the single record `target` names, warning when there are none
    /// or several.
    fn resolve(&mut self, kind: ObjectKind, target: &str) -> Option<&'r DeclarationRecord>;

    /// Append a line at the current indentation.
    fn add_line(&mut self, line: &str);

    fn indent(&mut self);

    fn dedent(&mut self);

    /// `.. sol:<kind>:: <signature>` plus directive options.
    fn add_directive_header(&mut self, record: &DeclarationRecord);

    /// Documentation of the record, then any extra content from the author.
    fn add_content(&mut self, record: &DeclarationRecord, more_content: &[String]);

    /// Document the members of a contract-like.
    fn document_members(&mut self, record: &'r DeclarationRecord, all_members: bool);

    /// Emit the full entry for an already resolved record.
    fn document(&mut self, record: &'r DeclarationRecord, more_content: &[String], all_members: bool) {
        tracing::debug!(source = %source_name(record), "documenting");

        self.add_line("");
        self.add_directive_header(record);

        self.indent();
        self.add_content(record, more_content);
        if record.kind.is_contract_like() {
            self.add_line("");
            self.document_members(record, all_members);
        }
        self.dedent();
    }

    /// Resolve `target` and document it. Returns whether anything was emitted.
    fn generate(
        &mut self,
        kind: ObjectKind,
        target: &str,
        more_content: &[String],
        all_members: bool,
    ) -> bool {
        match self.resolve(kind, target) {
            Some(record) => {
                self.document(record, more_content, all_members);
                true
            }
            None => false,
        }
    }
}

/// Documenter over an indexed [`SourceRegistry`].
pub struct AutoDocumenter<'r> {
    registry: &'r SourceRegistry,
    options: DocumenterOptions,
    indent: String,
    lines: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> AutoDocumenter<'r> {
    pub fn new(registry: &'r SourceRegistry, options: DocumenterOptions) -> Self {
        Self {
            registry,
            options,
            indent: String::new(),
            lines: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Generated reStructuredText.
    pub fn output(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn is_selected(&self, member: &DeclarationRecord, want_all: bool) -> bool {
        let is_fallback = member.kind == ObjectKind::Function && member.name.is_none();
        let is_constructor = member.kind == ObjectKind::Constructor;

        if !want_all {
            let MemberSelection::Only(names) = &self.options.members else {
                return false;
            };
            let wanted = names.iter().any(|n| match n.as_str() {
                "<fallback>" => is_fallback,
                "constructor" => is_constructor,
                name => member.name.as_deref() == Some(name),
            });
            if !wanted {
                return false;
            }
        }

        let excluded: HashSet<&str> = self.options.exclude_members.iter().map(String::as_str).collect();
        if is_fallback && excluded.contains("<fallback>") {
            return false;
        }
        if is_constructor && excluded.contains("constructor") {
            return false;
        }
        if let Some(name) = member.name.as_deref() {
            if !is_constructor && excluded.contains(name) {
                return false;
            }
        }
        if excluded.contains("<private>") && member.kind == ObjectKind::Function {
            let public = match &member.parts {
                Signature::Callable(parts) => parts.is_public(),
                _ => true,
            };
            if !public {
                return false;
            }
        }

        self.options.undoc_members || !member.documentation.is_empty()
    }
}

impl<'r> Documenter<'r> for AutoDocumenter<'r> {
    fn resolve(&mut self, kind: ObjectKind, target: &str) -> Option<&'r DeclarationRecord> {
        let registry = self.registry;
        let parsed = Target::parse(kind, target);
        let candidates = registry.select(&parsed.query(kind));

        match candidates.as_slice() {
            [] => {
                self.diagnostics.push(Diagnostic::warning(format!(
                    "{} {} could not be found",
                    kind, target
                )));
                None
            }
            [only] => Some(*only),
            [first, ..] => {
                let listing: Vec<String> = candidates
                    .iter()
                    .map(|r| format!("  {} ({})", r.signature, r.location()))
                    .collect();
                self.diagnostics.push(
                    Diagnostic::warning(format!(
                        "multiple candidates for {} {} found:\n{}",
                        kind,
                        target,
                        listing.join("\n")
                    ))
                    .at(&first.source_file, first.line),
                );
                Some(*first)
            }
        }
    }

    fn add_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.indent, line));
        }
    }

    fn indent(&mut self) {
        self.indent.push_str(CONTENT_INDENT);
    }

    fn dedent(&mut self) {
        let len = self.indent.len().saturating_sub(CONTENT_INDENT.len());
        self.indent.truncate(len);
    }

    fn add_directive_header(&mut self, record: &DeclarationRecord) {
        self.add_line(&format!(".. {}:{}:: {}", DOMAIN, record.kind, record.signature));
        if self.options.noindex {
            self.add_line("   :noindex:");
        }
    }

    fn add_content(&mut self, record: &DeclarationRecord, more_content: &[String]) {
        if !record.documentation.is_empty() {
            self.add_line("");
            for line in render_natspec(&record.documentation).lines() {
                self.add_line(line);
            }
        }

        if !record.members.is_empty() {
            self.add_line("");
            for member in &record.members {
                let line = match &member.type_name {
                    Some(type_name) => format!(":member {} {}:", type_name, member.name),
                    None => format!(":member {}:", member.name),
                };
                self.add_line(&line);
            }
        }

        if !more_content.is_empty() {
            self.add_line("");
            for line in more_content {
                self.add_line(line);
            }
        }
    }

    fn document_members(&mut self, record: &'r DeclarationRecord, all_members: bool) {
        let want_all = all_members || self.options.members == MemberSelection::All;
        if !want_all && self.options.members == MemberSelection::None {
            return;
        }
        let Some(contract) = record.name.as_deref() else {
            return;
        };

        let registry = self.registry;
        for member in registry.members_of(Some(record.source_file.as_str()), contract) {
            if !self.is_selected(member, want_all) {
                continue;
            }
            self.document(member, &[], true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::parse_directive;
    use pretty_assertions::assert_eq;

    fn add(
        registry: &mut SourceRegistry,
        kind: ObjectKind,
        contract: Option<&str>,
        header: &str,
        docs: &str,
    ) {
        let parts = parse_directive(kind, header).unwrap();
        let mut record = DeclarationRecord::new(kind, "Wallet.sol", parts, 1)
            .with_documentation(docs.to_string());
        record.enclosing_contract = contract.map(str::to_string);
        registry.insert(record);
    }

    fn wallet() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        let c = Some("Wallet");
        add(&mut registry, ObjectKind::Contract, None, "Wallet is Ownable", "Holds ether.");
        add(&mut registry, ObjectKind::Constructor, c, "(address owner) public", "Sets the owner.");
        add(&mut registry, ObjectKind::Function, c, "() external payable", "Accepts ether.");
        add(
            &mut registry,
            ObjectKind::Function,
            c,
            "withdraw(uint256 amount) public",
            "@param amount - wei to send",
        );
        add(&mut registry, ObjectKind::Function, c, "_check() internal view", "Internal check.");
        add(&mut registry, ObjectKind::StateVar, c, "uint256 public limit", "");
        registry
    }

    fn options(members: MemberSelection) -> DocumenterOptions {
        DocumenterOptions {
            members,
            ..DocumenterOptions::default()
        }
    }

    #[test]
    fn test_generate_member() {
        let registry = wallet();
        let mut doc = AutoDocumenter::new(&registry, DocumenterOptions::default());
        assert!(doc.generate(ObjectKind::Function, "Wallet.withdraw(uint256)", &[], false));
        assert_eq!(
            doc.output(),
            "\n.. sol:function:: withdraw(uint256 amount) public\n\n   :param amount: wei to send\n"
        );
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_generate_contract_with_all_members() {
        let registry = wallet();
        let mut doc = AutoDocumenter::new(
            &registry,
            DocumenterOptions {
                members: MemberSelection::All,
                noindex: true,
                ..DocumenterOptions::default()
            },
        );
        assert!(doc.generate(ObjectKind::Contract, "Wallet.sol:Wallet", &[], false));
        let headers: Vec<&str> = doc
            .lines()
            .iter()
            .map(|l| l.trim())
            .filter(|l| l.starts_with(".. sol:"))
            .collect();
        assert_eq!(
            headers,
            vec![
                ".. sol:contract:: Wallet is Ownable",
                ".. sol:constructor:: constructor(address owner) public",
                ".. sol:function:: () external payable",
                ".. sol:function:: withdraw(uint256 amount) public",
                ".. sol:function:: _check() internal view",
            ]
        );
        assert_eq!(doc.lines()[2], "   :noindex:");
        assert!(doc.lines().contains(&"      :noindex:".to_string()));
    }

    #[test]
    fn test_member_selection_specials() {
        let registry = wallet();
        let mut doc = AutoDocumenter::new(
            &registry,
            DocumenterOptions {
                members: MemberSelection::Only(vec!["<fallback>".into(), "constructor".into()]),
                exclude_members: vec!["constructor".into()],
                ..DocumenterOptions::default()
            },
        );
        doc.generate(ObjectKind::Contract, "Wallet", &[], false);
        let headers: Vec<&str> = doc
            .lines()
            .iter()
            .map(|l| l.trim())
            .filter(|l| l.starts_with(".. sol:"))
            .collect();
        assert_eq!(
            headers,
            vec![".. sol:contract:: Wallet is Ownable", ".. sol:function:: () external payable"]
        );
    }

    #[test]
    fn test_exclude_private_and_undoc() {
        let registry = wallet();
        let mut doc = AutoDocumenter::new(
            &registry,
            DocumenterOptions {
                members: MemberSelection::All,
                undoc_members: true,
                exclude_members: vec!["<private>".into(), "withdraw".into()],
                ..DocumenterOptions::default()
            },
        );
        doc.generate(ObjectKind::Contract, "Wallet", &[], false);
        let output = doc.output();
        assert!(!output.contains("_check"));
        assert!(!output.contains("withdraw"));
        assert!(output.contains(".. sol:statevar:: uint256 public limit"));
    }

    #[test]
    fn test_no_members_without_option() {
        let registry = wallet();
        let mut doc = AutoDocumenter::new(&registry, options(MemberSelection::None));
        doc.generate(
            ObjectKind::Contract,
            "Wallet",
            &["Extra paragraph.".to_string()],
            false,
        );
        assert_eq!(
            doc.output(),
            "\n.. sol:contract:: Wallet is Ownable\n\n   Holds ether.\n\n   Extra paragraph.\n\n"
        );
    }

    #[test]
    fn test_resolve_warnings() {
        let mut registry = wallet();
        add(&mut registry, ObjectKind::Function, Some("Wallet"), "withdraw(uint256 amount) external", "");

        let mut doc = AutoDocumenter::new(&registry, DocumenterOptions::default());
        assert!(!doc.generate(ObjectKind::Event, "Wallet.Missing", &[], false));
        let found = doc.resolve(ObjectKind::Function, "Wallet.withdraw(uint256)");
        assert_eq!(found.map(|r| r.signature.as_str()), Some("withdraw(uint256 amount) public"));

        let messages: Vec<&str> = doc.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("could not be found"));
        assert!(messages[1].starts_with("multiple candidates for function Wallet.withdraw(uint256)"));
    }

    #[test]
    fn test_member_selection_from_option() {
        assert_eq!(MemberSelection::from_option(None), MemberSelection::None);
        assert_eq!(MemberSelection::from_option(Some(vec![])), MemberSelection::All);
        assert_eq!(
            MemberSelection::from_option(Some(vec![" a ".into(), "".into()])),
            MemberSelection::Only(vec!["a".into()])
        );
    }
}
