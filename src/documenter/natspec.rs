//! NatSpec tags rendered as reStructuredText field lists.
//!
//! ```text
//! Transfers tokens.            Checks the balance.
//! @dev Checks the balance.     Transfers tokens.
//! @param to - recipient   =>
//! @return true on success      :param to: recipient
//!                              :return: true on success
//! ```

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A tag starts at `@word` at the beginning of the text or after whitespace.
    static ref TAG_RE: Regex = Regex::new(r"(?:^|\s)@(\w+)\s").unwrap();
}

/// Documentation split into body text and field-list lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NatSpec {
    pub body: Vec<String>,
    pub fields: Vec<String>,
}

impl NatSpec {
    pub fn parse(doc: &str) -> Self {
        let mut natspec = NatSpec::default();

        let tags: Vec<(usize, usize, String)> = TAG_RE
            .captures_iter(doc)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                // Span of the tag itself, starting at `@`.
                Some((name.start() - 1, whole.end(), name.as_str().to_string()))
            })
            .collect();

        let leading = match tags.first() {
            Some((start, _, _)) => &doc[..*start],
            None => doc,
        };

        for (idx, (_, payload_start, tag)) in tags.iter().enumerate() {
            let payload_end = tags.get(idx + 1).map(|t| t.0).unwrap_or(doc.len());
            let payload = &doc[*payload_start..payload_end];
            natspec.push_tag(tag, payload);
        }

        // Untagged text follows the `@dev` text.
        natspec.push_body(leading);

        natspec
    }

    fn push_body(&mut self, text: &str) {
        for line in text.trim().lines() {
            // Field-list lines written by hand pass straight through.
            if line.starts_with(':') {
                self.fields.push(line.to_string());
            } else {
                self.body.push(line.to_string());
            }
        }
    }

    fn push_tag(&mut self, tag: &str, payload: &str) {
        match tag {
            "dev" => self.push_body(payload),
            "param" => {
                let payload = payload.trim_start();
                let split = payload.find(char::is_whitespace).unwrap_or(payload.len());
                let (name, docs) = payload.split_at(split);
                self.fields
                    .push(format!(":param {}: {}", name, prep_payload(docs)));
            }
            "return" => match serde_json::from_str::<serde_json::Value>(payload) {
                Ok(serde_json::Value::Object(returns)) => {
                    for (name, docs) in returns {
                        let docs = match docs {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        self.fields
                            .push(format!(":return {}: {}", name, prep_payload(&docs)));
                    }
                }
                _ => self
                    .fields
                    .push(format!(":return: {}", prep_payload(payload))),
            },
            other => self
                .fields
                .push(format!(":{}: {}", other, prep_payload(payload))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.fields.is_empty()
    }

    /// Body and fields as lines, separated by one blank line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.body.clone();
        if !self.body.is_empty() && !self.fields.is_empty() {
            lines.push(String::new());
        }
        lines.extend(self.fields.iter().cloned());
        lines
    }
}

/// Single-line payloads lose a leading `-`; further lines are indented
/// under the field.
fn prep_payload(docs: &str) -> String {
    let mut lines: Vec<&str> = docs.trim().lines().collect();
    if lines.len() == 1 {
        let line = lines[0];
        lines[0] = line.strip_prefix('-').unwrap_or(line).trim_start();
    }
    lines.join("\n   ")
}

/// Render documentation text as reStructuredText.
pub fn render_natspec(doc: &str) -> String {
    NatSpec::parse(doc).lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_body() {
        assert_eq!(render_natspec("Sets the owner.\nOnly once."), "Sets the owner.\nOnly once.");
        assert!(NatSpec::parse("").is_empty());
    }

    #[test]
    fn test_tags() {
        let doc = "Moves tokens.\n@dev Emits Transfer.\n@param to - the recipient\n@param amount how much\n@return true on success";
        assert_eq!(
            render_natspec(doc),
            "Emits Transfer.\nMoves tokens.\n\n:param to: the recipient\n:param amount: how much\n:return: true on success"
        );
    }

    #[test]
    fn test_dev_text_precedes_untagged_text() {
        let natspec = NatSpec::parse("Summary line.\n@dev First detail.\n@dev Second detail.");
        assert_eq!(
            natspec.body,
            vec!["First detail.", "Second detail.", "Summary line."]
        );
        assert!(natspec.fields.is_empty());
    }

    #[test]
    fn test_json_returns_keep_order() {
        let doc = "@return {\"zeta\": \"last letter\", \"alpha\": \"first letter\"}";
        assert_eq!(
            NatSpec::parse(doc).fields,
            vec![":return zeta: last letter", ":return alpha: first letter"]
        );
    }

    #[test]
    fn test_multiline_payload_is_indented() {
        let doc = "@notice first line\nsecond line";
        assert_eq!(NatSpec::parse(doc).fields, vec![":notice: first line\n   second line"]);
    }

    #[test]
    fn test_inline_at_sign_stays_in_payload() {
        let doc = "@author alice@example.com";
        assert_eq!(NatSpec::parse(doc).fields, vec![":author: alice@example.com"]);
    }
}
