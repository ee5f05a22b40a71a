//! Flat CSV exports of documents and articles

use crate::extract::{DocumentKind, ExtractedArticle, ExtractedDocument};
use std::io::{self, Write};

const SEP: char = ',';

pub const DOCUMENT_COLUMNS: &[&str] = &["title", "url", "context", "type", "extracted_at"];
pub const ARTICLE_COLUMNS: &[&str] = &["title", "url", "date", "summary", "extracted_at"];

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single CSV row, quoting fields as needed
pub fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{}", SEP)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

fn kind_label(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "pdf",
        DocumentKind::DiseaseReport => "disease_report",
    }
}

/// Writes documents with a header line
pub fn write_documents<W: Write>(w: &mut W, documents: &[ExtractedDocument]) -> io::Result<()> {
    write_row(w, DOCUMENT_COLUMNS)?;
    for doc in documents {
        write_row(
            w,
            &[
                doc.title.as_str(),
                doc.url.as_str(),
                doc.context.as_str(),
                kind_label(doc.kind),
                doc.extracted_at.to_rfc3339().as_str(),
            ],
        )?;
    }
    Ok(())
}

/// Writes articles with a header line; missing values become empty fields
pub fn write_articles<W: Write>(w: &mut W, articles: &[ExtractedArticle]) -> io::Result<()> {
    write_row(w, ARTICLE_COLUMNS)?;
    for article in articles {
        write_row(
            w,
            &[
                article.title.as_str(),
                article.url.as_deref().unwrap_or(""),
                article.date.as_deref().unwrap_or(""),
                article.summary.as_str(),
                article.extracted_at.to_rfc3339().as_str(),
            ],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_row() {
        let out = render(|w| write_row(w, &["a", "b", "c"]));
        assert_eq!(out, "a,b,c\n");
    }

    #[test]
    fn test_quotes_and_separators_are_escaped() {
        let out = render(|w| write_row(w, &["Lagos, Kano", "say \"hi\"", "two\nlines"]));
        assert_eq!(out, "\"Lagos, Kano\",\"say \"\"hi\"\"\",\"two\nlines\"\n");
    }

    #[test]
    fn test_documents_export() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let docs = vec![ExtractedDocument {
            title: "Weekly Sitrep".to_string(),
            url: "https://ncdc.gov.ng/sitrep.pdf".to_string(),
            context: String::new(),
            kind: DocumentKind::DiseaseReport,
            extracted_at: at,
        }];
        let out = render(|w| write_documents(w, &docs));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "title,url,context,type,extracted_at");
        assert_eq!(
            lines[1],
            "Weekly Sitrep,https://ncdc.gov.ng/sitrep.pdf,,disease_report,2024-05-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_articles_export_missing_fields() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let articles = vec![ExtractedArticle {
            title: "Polio campaign launched".to_string(),
            url: None,
            date: None,
            summary: "Polio campaign launched in Kano".to_string(),
            extracted_at: at,
        }];
        let out = render(|w| write_articles(w, &articles));
        assert_eq!(
            out.lines().nth(1),
            Some("Polio campaign launched,,,Polio campaign launched in Kano,2024-05-01T12:00:00+00:00")
        );
    }
}
