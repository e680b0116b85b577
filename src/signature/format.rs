//! Canonical rendering of structural signatures.

use std::fmt;

use super::{CallableParts, ModifierInvocation, Param, Signature, TypeLikeParts, VariableParts};

/// Render a signature in canonical form.
///
/// - type-like: `Name` or `Name is A, B`
/// - variable: `type [modifiers] name`
/// - callable: `name(p1, p2) mod1 mod2 returns (r1)`, absent parts omitted
pub fn format_signature(signature: &Signature) -> String {
    match signature {
        Signature::TypeLike(parts) => format_type_like(parts),
        Signature::Variable(parts) => format_variable(parts),
        Signature::Callable(parts) => format_callable(parts),
    }
}

/// Render a parameter list including its parentheses.
pub fn format_params(params: &[Param]) -> String {
    let rendered: Vec<String> = params.iter().map(format_param).collect();
    format!("({})", rendered.join(", "))
}

fn format_param(param: &Param) -> String {
    let mut out = param.type_name.clone();
    if let Some(location) = &param.location {
        out.push(' ');
        out.push_str(location);
    }
    if let Some(name) = &param.name {
        out.push(' ');
        out.push_str(name);
    }
    out
}

fn format_type_like(parts: &TypeLikeParts) -> String {
    if parts.bases.is_empty() {
        parts.name.clone()
    } else {
        format!("{} is {}", parts.name, parts.bases.join(", "))
    }
}

fn format_variable(parts: &VariableParts) -> String {
    let mut words = vec![parts.type_name.as_str()];
    words.extend(parts.modifiers.iter().map(String::as_str));
    words.push(&parts.name);
    words.join(" ")
}

fn format_callable(parts: &CallableParts) -> String {
    let mut out = String::new();
    if let Some(name) = &parts.name {
        out.push_str(name);
    }
    out.push_str(&format_params(&parts.params));

    for modifier in &parts.modifiers {
        out.push(' ');
        out.push_str(&modifier.to_string());
    }

    if let Some(returns) = &parts.returns {
        out.push_str(" returns ");
        out.push_str(&format_params(returns));
    }
    out
}

impl fmt::Display for ModifierInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierInvocation::Keyword(keyword) => write!(f, "{}", keyword),
            ModifierInvocation::Call { name, args } => write!(f, "{}({})", name, args.join(", ")),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_signature(self))
    }
}
