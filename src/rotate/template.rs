//! Destination path templates
//!
//! A template is a path containing chrono strftime specifiers, e.g.
//! `/var/log/app/access.log.%Y%m%d%H%M%S`. Rendering it with the current time
//! names the rotated copy; turning each specifier into a wildcard finds the
//! copies left behind by earlier runs.

use chrono::format::{Item, Parsed, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("destination template is empty")]
    Empty,

    #[error("destination template '{0}' contains an invalid format specifier")]
    InvalidSpecifier(String),

    #[error("destination template '{0}' could not be rendered")]
    Render(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTemplate {
    raw: String,
}

impl DestinationTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        if raw.is_empty() {
            return Err(TemplateError::Empty);
        }
        if StrftimeItems::new(raw).any(|item| matches!(item, Item::Error)) {
            return Err(TemplateError::InvalidSpecifier(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path of the rotated copy for `now`.
    pub fn render<Tz>(&self, now: &DateTime<Tz>) -> Result<PathBuf, TemplateError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::with_capacity(self.raw.len() + 16);
        write!(out, "{}", now.format_with_items(StrftimeItems::new(&self.raw)))
            .map_err(|_| TemplateError::Render(self.raw.clone()))?;
        Ok(PathBuf::from(out))
    }

    /// Glob matching every rendering of this template followed by `suffix`.
    pub fn glob_pattern(&self, suffix: &str) -> String {
        let mut pattern = String::new();
        let mut literal = String::new();
        let mut chars = self.raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.peek() {
                Some('%') => {
                    chars.next();
                    literal.push('%');
                }
                Some(_) => {
                    // Skip padding/precision modifiers such as `%-d`, `%.3f`, `%:z`.
                    while let Some(m) = chars.next() {
                        if m.is_ascii_alphabetic() {
                            break;
                        }
                    }
                    pattern.push_str(&glob::Pattern::escape(&literal));
                    literal.clear();
                    if !pattern.ends_with('*') {
                        pattern.push('*');
                    }
                }
                None => literal.push('%'),
            }
        }

        literal.push_str(suffix);
        pattern.push_str(&glob::Pattern::escape(&literal));
        pattern
    }

    /// Whether `candidate` is a rendering of this template followed by `suffix`.
    pub fn matches(&self, candidate: &str, suffix: &str) -> bool {
        let format = format!("{}{}", self.raw, suffix.replace('%', "%%"));
        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, candidate, StrftimeItems::new(&format)).is_ok()
    }
}

impl fmt::Display for DestinationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_with_time() {
        let template = DestinationTemplate::parse("/var/log/app.log.%Y%m%d-%H%M%S").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            template.render(&now).unwrap(),
            PathBuf::from("/var/log/app.log.20240309-070501")
        );
    }

    #[test]
    fn test_rejects_invalid_templates() {
        assert_eq!(DestinationTemplate::parse(""), Err(TemplateError::Empty));
        assert!(matches!(
            DestinationTemplate::parse("/var/log/app.%Q"),
            Err(TemplateError::InvalidSpecifier(_))
        ));
    }

    #[test]
    fn test_glob_pattern_replaces_specifiers() {
        let template = DestinationTemplate::parse("/var/log/app.log.%Y%m%d-%H%M%S").unwrap();
        assert_eq!(template.glob_pattern(""), "/var/log/app.log.*-*");
        assert_eq!(template.glob_pattern(".gz"), "/var/log/app.log.*-*.gz");
    }

    #[test]
    fn test_glob_pattern_handles_modifiers_and_escapes() {
        let template = DestinationTemplate::parse("/logs/[a]/app.%-d.%.3f%%").unwrap();
        assert_eq!(template.glob_pattern(""), "/logs/[[]a[]]/app.*.*%");
    }

    #[test]
    fn test_matches_only_renderings() {
        let template = DestinationTemplate::parse("/var/log/app.log.%Y%m%d").unwrap();
        assert!(template.matches("/var/log/app.log.20240309", ""));
        assert!(template.matches("/var/log/app.log.20240309.gz", ".gz"));
        assert!(!template.matches("/var/log/app.log.backup", ""));
        assert!(!template.matches("/var/log/app.log.20240309", ".gz"));
        assert!(!template.matches("/var/log/app.log.20240309.gz", ""));
    }

    #[test]
    fn test_rendering_matches_its_own_template() {
        let template = DestinationTemplate::parse("/tmp/x/app.%Y%m%d%H%M%S%f").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap();
        let rendered = template.render(&now).unwrap();
        assert!(template.matches(rendered.to_str().unwrap(), ""));
    }
}
