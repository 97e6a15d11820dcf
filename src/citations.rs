use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::MAX_CITATIONS;
use crate::models::UploadedFile;

lazy_static! {
    // Labeled legal units ("Cláusula 3.2") or short codes ("AB-12"),
    // matched case-insensitively.
    static ref CITATION_REGEX: Regex = Regex::new(
        r"(?i)(?:Cláusula|Artículo|Sección|Punto|Anexo)\s+\d+(?:\.\d+)*|[A-Z]+-\d+"
    )
    .unwrap();
}

/// Scans a response for citation-like tokens. Runs only when documents were
/// attached to the request; without context there is nothing to cite.
pub fn extract_citations(text: &str, attachments: &[UploadedFile]) -> Vec<String> {
    if attachments.is_empty() {
        return Vec::new();
    }

    let mut citations: Vec<String> = Vec::new();
    for m in CITATION_REGEX.find_iter(text) {
        let candidate = m.as_str().trim().to_string();
        if !citations.contains(&candidate) {
            citations.push(candidate);
            if citations.len() == MAX_CITATIONS {
                return citations;
            }
        }
    }

    // No clause-level match: fall back to file names mentioned verbatim,
    // in attachment order.
    if citations.is_empty() {
        for file in attachments {
            if text.contains(&file.name) && !citations.contains(&file.name) {
                citations.push(file.name.clone());
                if citations.len() == MAX_CITATIONS {
                    break;
                }
            }
        }
    }

    citations
}
