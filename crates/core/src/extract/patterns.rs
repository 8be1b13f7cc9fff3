use regex::Regex;

/// Manufacturers recognised in phrases like "for Otis Elevator".
pub const KNOWN_BRANDS: [&str; 5] = ["Otis", "Schindler", "Kone", "ThyssenKrupp", "Mitsubishi"];

/// Ordered patterns for a single field. The first pattern whose capture group
/// holds a non-blank value wins.
#[derive(Clone, Debug, Default)]
pub struct FieldRule {
    patterns: Vec<Regex>,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the bold markdown form `**Label:** value` followed by the plain
    /// `Label: value` form.
    pub fn labeled(self, label: &str) -> Self {
        let label = regex::escape(label);
        self.pattern(&format!(r"(?i)\*\*{label}:\*\*\s*([^\n]+)"))
            .pattern(&format!(r"(?i){label}:\s*([^\n]+)"))
    }

    /// Appends a pattern; capture group 1 carries the value. Panics on an
    /// invalid pattern.
    pub fn pattern(mut self, pattern: &str) -> Self {
        let compiled = Regex::new(pattern).expect("field pattern must compile");
        self.patterns.push(compiled);
        self
    }

    pub fn find(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            let value = pattern.captures(text)?.get(1)?.as_str().trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    }
}

pub fn brand_phrase_pattern() -> String {
    format!(r"(?i)for\s+({})\s+Elevator", KNOWN_BRANDS.join("|"))
}
