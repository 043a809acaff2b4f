//! Best-effort section carving of completion text.
//!
//! Completion output is free text that was merely *asked* to follow a
//! numbered outline, so marker scanning can never be load-bearing: when the
//! expected markers are absent the whole text is kept under a single raw
//! field. This function does not fail.

/// Result of carving. `sections` holds `(label, content)` pairs in document
/// order for every marker that was found; `raw` always holds the full text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSections {
    pub sections: Vec<(String, String)>,
    pub raw: String,
}

impl ReportSections {
    /// True when at least one marker was located.
    pub fn is_structured(&self) -> bool {
        !self.sections.is_empty()
    }

    pub fn section(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(found, _)| found == label)
            .map(|(_, content)| content.as_str())
    }
}

/// Scans `text` for each marker substring and carves the content between
/// consecutive markers. Markers that do not occur are skipped; overlapping or
/// out-of-order markers are handled by sorting on position.
pub fn carve_sections(text: &str, markers: &[&str]) -> ReportSections {
    let mut found: Vec<(usize, &str)> = markers
        .iter()
        .filter_map(|marker| text.find(marker).map(|position| (position, *marker)))
        .collect();
    found.sort_by_key(|(position, _)| *position);

    let mut sections = Vec::with_capacity(found.len());
    for (index, (position, marker)) in found.iter().enumerate() {
        let content_start = position + marker.len();
        let content_end = found.get(index + 1).map_or(text.len(), |(next, _)| *next);
        let content = text[content_start..content_end]
            .trim_start_matches([':', '-'])
            .trim()
            .to_string();
        sections.push((marker.to_string(), content));
    }

    ReportSections { sections, raw: text.to_string() }
}
