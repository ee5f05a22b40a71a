//! Email addresses and Nigerian phone numbers in page text

use crate::extract::text::visible_text;
use crate::extract::types::ContactInfo;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

lazy_static! {
    // local@domain.tld
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();

    // +234 or a leading 0, then 7/8/9 and nine more digits
    static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+234|0)[789][0-9]{9}").unwrap();
}

/// Extracts contact details from the page's visible text
pub fn extract_contacts(document: &Html) -> ContactInfo {
    contacts_in_text(&visible_text(document))
}

/// Scans plain text for emails and phone numbers, deduplicated
pub fn contacts_in_text(text: &str) -> ContactInfo {
    ContactInfo {
        emails: EMAIL_REGEX
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        phones: PHONE_REGEX
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}
