//! Pattern matcher for signatures typed by documentation authors.
//!
//! Directive headers are single lines such as `Token is ERC20, Ownable` or
//! `transfer(address to, uint256 amount) public returns (bool)`. Anything
//! that does not fit the expected shape for its kind is rejected with
//! [`SolidityError::MalformedSignature`].

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    normalize_type, split_top_level, CallableParts, ModifierInvocation, Param, Signature,
    TypeLikeParts, VariableParts, KEYWORD_MODIFIERS, LOCATION_KEYWORDS,
};
use crate::error::{Result, SolidityError};
use crate::registry::ObjectKind;

lazy_static! {
    static ref TYPE_LIKE_RE: Regex =
        Regex::new(r"^\s*(\w+)(?:\s+is\s+(\w+(?:\s*,\s*\w+)*))?\s*$").unwrap();

    static ref PARAM_VAR_RE: Regex = Regex::new(&format!(
        r"^\s*([\w\s\[\]\(\)=>]+?)(?:\s*\b({}))?\s*(\b\w+)?\s*$",
        LOCATION_KEYWORDS.join("|")
    ))
    .unwrap();

    static ref CALLABLE_HEAD_RE: Regex = Regex::new(r"^\s*(\w+)?\s*\(").unwrap();

    static ref WORD_RE: Regex = Regex::new(r"^\w+").unwrap();
}

/// Parse a directive header for the given kind into structural parts.
pub fn parse_directive(kind: ObjectKind, header: &str) -> Result<Signature> {
    match kind {
        ObjectKind::Contract
        | ObjectKind::Library
        | ObjectKind::Interface
        | ObjectKind::Struct
        | ObjectKind::Enum => parse_type_like(kind, header),
        ObjectKind::StateVar => parse_variable(header),
        ObjectKind::Constructor
        | ObjectKind::Function
        | ObjectKind::Modifier
        | ObjectKind::Event => parse_callable(kind, header),
    }
}

fn parse_type_like(kind: ObjectKind, header: &str) -> Result<Signature> {
    let caps = TYPE_LIKE_RE
        .captures(header)
        .ok_or_else(|| SolidityError::malformed(kind, header, "expected `Name [is A, B]`"))?;

    let name = caps[1].to_string();
    let bases = caps
        .get(2)
        .map(|m| m.as_str().split(',').map(|p| p.trim().to_string()).collect())
        .unwrap_or_default();

    Ok(Signature::TypeLike(TypeLikeParts { name, bases }))
}

fn parse_variable(header: &str) -> Result<Signature> {
    let kind = ObjectKind::StateVar;
    let caps = PARAM_VAR_RE
        .captures(header)
        .ok_or_else(|| SolidityError::malformed(kind, header, "expected `type [modifier] name`"))?;

    let name = caps
        .get(3)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SolidityError::malformed(kind, header, "missing variable name"))?;

    Ok(Signature::Variable(VariableParts {
        type_name: normalize_type(&caps[1]),
        modifiers: caps.get(2).map(|m| m.as_str().to_string()).into_iter().collect(),
        name,
    }))
}

fn parse_param(kind: ObjectKind, header: &str, text: &str) -> Result<Param> {
    let caps = PARAM_VAR_RE.captures(text).ok_or_else(|| {
        SolidityError::malformed(kind, header, format!("unrecognized parameter {:?}", text.trim()))
    })?;

    Ok(Param::new(
        &caps[1],
        caps.get(2).map(|m| m.as_str()),
        caps.get(3).map(|m| m.as_str()),
    ))
}

fn parse_param_list(kind: ObjectKind, header: &str, list: &str) -> Result<Vec<Param>> {
    split_top_level(list)
        .iter()
        .map(|text| parse_param(kind, header, text))
        .collect()
}

/// Find the group closing the `(` at `open`; returns its contents and the index after `)`.
fn balanced_group(text: &str, open: usize) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + idx;
                    return Some((&text[open + 1..close], close + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_callable(kind: ObjectKind, header: &str) -> Result<Signature> {
    let head = CALLABLE_HEAD_RE
        .captures(header)
        .ok_or_else(|| SolidityError::malformed(kind, header, "expected `name(params) ...`"))?;

    let name = head.get(1).map(|m| m.as_str().to_string());
    let open = head.get(0).map(|m| m.end() - 1).unwrap_or(0);
    let (arglist, mut pos) = balanced_group(header, open)
        .ok_or_else(|| SolidityError::malformed(kind, header, "unbalanced parentheses"))?;

    let name = match (name, kind) {
        (Some(name), _) => Some(name),
        (None, ObjectKind::Function) => {
            if !arglist.trim().is_empty() {
                return Err(SolidityError::malformed(
                    kind,
                    header,
                    "the fallback function takes no parameters",
                ));
            }
            None
        }
        (None, ObjectKind::Constructor) => Some("constructor".to_string()),
        (None, _) => {
            return Err(SolidityError::malformed(kind, header, "missing name"));
        }
    };

    let params = parse_param_list(kind, header, arglist)?;

    let tail = &header[pos..];
    if kind == ObjectKind::Modifier && !tail.trim().is_empty() {
        return Err(SolidityError::malformed(
            kind,
            header,
            "modifiers cannot carry modifiers",
        ));
    }

    let mut modifiers = Vec::new();
    let mut returns = None;

    loop {
        pos += header[pos..].len() - header[pos..].trim_start().len();
        if pos >= header.len() {
            break;
        }

        let word = WORD_RE.find(&header[pos..]).ok_or_else(|| {
            SolidityError::malformed(kind, header, format!("unexpected {:?}", &header[pos..]))
        })?;
        let modname = word.as_str().to_string();
        pos += word.end();

        let skipped = header[pos..].len() - header[pos..].trim_start().len();
        let args = if header[pos + skipped..].starts_with('(') {
            let (inner, end) = balanced_group(header, pos + skipped)
                .ok_or_else(|| SolidityError::malformed(kind, header, "unbalanced parentheses"))?;
            pos = end;
            Some(inner)
        } else {
            None
        };

        if modname == "returns" {
            let list = args.ok_or_else(|| {
                SolidityError::malformed(kind, header, "`returns` needs a parameter list")
            })?;
            if returns.is_some() {
                return Err(SolidityError::malformed(kind, header, "duplicate `returns`"));
            }
            returns = Some(parse_param_list(kind, header, list)?);
        } else if KEYWORD_MODIFIERS.contains(&modname.as_str()) {
            if args.is_some() {
                return Err(SolidityError::malformed(
                    kind,
                    header,
                    format!("`{}` takes no arguments", modname),
                ));
            }
            modifiers.push(ModifierInvocation::Keyword(modname));
        } else {
            modifiers.push(match args {
                Some(list) => ModifierInvocation::Call {
                    name: modname,
                    args: split_top_level(list),
                },
                None => ModifierInvocation::Keyword(modname),
            });
        }
    }

    Ok(Signature::Callable(CallableParts {
        name,
        params,
        modifiers,
        returns,
    }))
}
