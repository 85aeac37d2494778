//! Log redaction.
//!
//! Patient answers never go into log calls, but identifiers and free text
//! can still slip through formatted errors. Every formatted log line passes
//! through [`sanitize`] before reaching the sink:
//! - Session and report identifiers (UUID format)
//! - E-mail addresses and phone numbers
//! - Long hex strings (digests, tokens)
//!
//! Input longer than `MEDICHAT_SANITIZE_MAX_BYTES` (default 16 KiB) is
//! truncated before scanning.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static RULES: OnceLock<RedactionRules> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct RedactionRules {
    any: RegexSet,
    rules: Vec<Rule>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("MEDICHAT_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn rules() -> &'static RedactionRules {
    RULES.get_or_init(|| {
        // Order matters: UUIDs before the generic hex rule.
        let table: [(&str, &'static str); 5] = [
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[SESSION]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[EMAIL]",
            ),
            (
                r"\b(?:\+?\d{1,3}[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
                "[PHONE]",
            ),
            (
                r"(?i)\b(?:token|secret|password|api[_-]?key)\b\s*[:=]\s*\S{8,}",
                "[SECRET]",
            ),
            (r"\b[0-9a-fA-F]{32,}\b", "[HEX]"),
        ];

        let any = RegexSet::new(table.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = table
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        RedactionRules { any, rules }
    })
}

/// Redact identifiers and contact details from a log line.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let rules = rules();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    let matched: Vec<usize> = rules.any.matches(prefix).into_iter().collect();
    for idx in matched {
        let rule = &rules.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// `MakeWriter` wrapper that redacts each formatted line before writing it.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_complete_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let clean = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(clean.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline in sight is flushed in one piece.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let clean = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(clean.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.write_complete_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.write_complete_lines()?;
        if !self.buffer.is_empty() {
            let clean = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(clean.as_bytes())?;
            self.buffer.clear();
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_session_ids_are_redacted() {
        let out = sanitize("Opened session 550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(out, "Opened session [SESSION]");
    }

    #[test]
    fn test_contact_details_are_redacted() {
        let out = sanitize("user jane.doe@example.org called from 555-123-4567");
        assert!(out.contains("[EMAIL]"));
        assert!(out.contains("[PHONE]"));
        assert!(!out.contains("example.org"));
    }

    #[test]
    fn test_digests_are_redacted() {
        let out = sanitize(
            "hash ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad ok",
        );
        assert_eq!(out, "hash [HEX] ok");
    }

    #[test]
    fn test_clinical_text_is_untouched() {
        let line = "Analysis complete: tier=HOME CARE disease=Fungal infection step=duration";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let out = sanitize_with_limit("ééééé", 3);
        assert!(out.starts_with('é'));
        assert!(out.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_redacts_lines() {
        let mut writer = SanitizingWriter {
            inner: Vec::new(),
            buffer: Vec::new(),
        };
        writer
            .write_all(b"token=abcdef123456789\nplain\n")
            .expect("Should write");
        writer.flush().expect("Should flush");
        let text = String::from_utf8(writer.inner.clone()).expect("Should be UTF-8");
        assert_eq!(text, "[SECRET]\nplain\n");
    }
}
