//! Rule-based email and phone detection near the top of a resume.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Document, NerTag};

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
const PHONE_PATTERN: &str =
    r"\+?\d{1,4}[- ]?\(?\d{2,4}\)?[- ]?\d{2,4}[- ]?\d{2,4}|\d{2,4}-?\d{2,4}-?\d{2,4}";

/// Default number of first-page lines scanned for contact details.
pub const DEFAULT_SCAN_LINES: usize = 15;

/// Contact strings found in a document header.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContactMatches {
    pub emails: HashSet<String>,
    pub phones: HashSet<String>,
}

impl ContactMatches {
    /// Tag forced on a word with this text, if any; email wins over phone.
    pub fn tag_for(&self, text: &str) -> Option<NerTag> {
        if self.emails.contains(text) {
            Some(NerTag::Email)
        } else if self.phones.contains(text) {
            Some(NerTag::Phone)
        } else {
            None
        }
    }

    /// Check if nothing was found.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty()
    }
}

/// Finds emails and phone numbers in the first lines of the first page.
#[derive(Debug, Clone)]
pub struct ContactDetector {
    email: Regex,
    phone: Regex,
    scan_lines: usize,
}

impl ContactDetector {
    /// Create a detector scanning `scan_lines` lines.
    pub fn new(scan_lines: usize) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Config(format!("invalid pattern: {}", e)))
        };
        Ok(Self {
            email: compile(EMAIL_PATTERN)?,
            phone: compile(PHONE_PATTERN)?,
            scan_lines,
        })
    }

    /// Number of lines scanned.
    pub fn scan_lines(&self) -> usize {
        self.scan_lines
    }

    /// Emails in a piece of text.
    pub fn emails_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.email.find_iter(text).map(|m| m.as_str())
    }

    /// Phone numbers in a piece of text.
    pub fn phones_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.phone.find_iter(text).map(|m| m.as_str())
    }

    /// Scan the document header.
    ///
    /// A phone match spanning several words also yields its digit-bearing
    /// pieces, so `+84 912 345 678` marks each of its words.
    pub fn scan(&self, doc: &Document) -> ContactMatches {
        let mut found = ContactMatches::default();
        let Some(first) = doc.pages.first() else {
            return found;
        };

        for line in first.lines().iter().take(self.scan_lines) {
            for email in self.emails_in(&line.text) {
                found.emails.insert(email.to_string());
            }
            for phone in self.phones_in(&line.text) {
                found.phones.insert(phone.to_string());
                if phone.contains(char::is_whitespace) {
                    found.phones.extend(
                        phone
                            .split_whitespace()
                            .filter(|p| p.chars().any(|c| c.is_ascii_digit()))
                            .map(str::to_string),
                    );
                }
            }
        }

        if !found.is_empty() {
            log::debug!(
                "Contact scan: {} emails, {} phone fragments",
                found.emails.len(),
                found.phones.len()
            );
        }
        found
    }
}
