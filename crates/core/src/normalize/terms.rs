use crate::domain::quote::DEFAULT_TERMS;

const TERMS_HEADING: &str = "terms and conditions";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bullet,
    Numbered,
}

/// Collects the list following a "Terms and Conditions" heading.
///
/// Prose between the heading and the list is skipped. The list is the first
/// run of consecutive bullet (`-`, `•`) or numbered (`1.`) lines; the run ends
/// at a blank line or a line of the other kind. Without a heading or a list,
/// the default terms are returned.
pub fn extract_terms(text: &str) -> Vec<String> {
    let found = find_terms(text);
    if found.is_empty() {
        tracing::debug!(event_name = "quote.terms.defaulted", "no terms list found in reply");
        return default_terms();
    }
    found
}

pub fn default_terms() -> Vec<String> {
    DEFAULT_TERMS.iter().map(|term| term.to_string()).collect()
}

fn find_terms(text: &str) -> Vec<String> {
    let lines =
        text.lines().skip_while(|line| !line.to_lowercase().contains(TERMS_HEADING)).skip(1);

    let mut terms = Vec::new();
    let mut run_marker = None;

    for line in lines {
        match (list_item(line), run_marker) {
            (Some((marker, item)), None) => {
                run_marker = Some(marker);
                terms.push(item.to_string());
            }
            (Some((marker, item)), Some(current)) if marker == current => {
                terms.push(item.to_string());
            }
            (_, Some(_)) => break,
            (None, None) => {}
        }
    }

    terms
}

fn list_item(line: &str) -> Option<(Marker, &str)> {
    let line = line.trim();
    if is_rule(line) {
        return None;
    }

    let bullet = line.strip_prefix('-').or_else(|| line.strip_prefix('•'));
    let (marker, rest) = if let Some(rest) = bullet {
        (Marker::Bullet, rest)
    } else {
        let digits = line.find(|ch: char| !ch.is_ascii_digit())?;
        let rest = line[digits..].strip_prefix('.').filter(|_| digits > 0)?;
        (Marker::Numbered, rest)
    };

    let item = rest.trim();
    (!item.is_empty()).then_some((marker, item))
}

/// Markdown horizontal rules (`---`) and table separators are not bullets.
fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|ch| matches!(ch, '-' | '|' | ':' | ' '))
}

#[cfg(test)]
mod tests {
    use super::extract_terms;
    use crate::domain::quote::DEFAULT_TERMS;

    #[test]
    fn numbered_terms_have_markers_stripped() {
        let terms = extract_terms(
            "### Terms and Conditions\n1. Valid for 30 days\n2. Payment due on completion",
        );

        assert_eq!(terms, vec!["Valid for 30 days", "Payment due on completion"]);
    }

    #[test]
    fn bullet_terms_after_intro_prose() {
        let terms = extract_terms(
            "**Terms and Conditions:**\nPlease note:\n- 50% deposit required\n• Parts warranty 1 year\n\nThank you!",
        );

        assert_eq!(terms, vec!["50% deposit required", "Parts warranty 1 year"]);
    }

    #[test]
    fn run_stops_at_a_line_of_another_kind() {
        let terms = extract_terms("Terms and Conditions\n- First\n- Second\n3. Stray numbered");
        assert_eq!(terms, vec!["First", "Second"]);
    }

    #[test]
    fn horizontal_rule_is_not_a_bullet() {
        let terms = extract_terms("Terms and Conditions\n---\n1. Only term\n");
        assert_eq!(terms, vec!["Only term"]);
    }

    #[test]
    fn missing_section_returns_default_terms_verbatim() {
        let terms = extract_terms("- a bullet without heading\n1. numbered without heading");
        assert_eq!(terms, DEFAULT_TERMS.to_vec());
    }

    #[test]
    fn heading_without_list_returns_default_terms() {
        let terms = extract_terms("Terms and Conditions apply as per contract.");
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0], "This quote is valid for 30 days from the date issued.");
    }

    #[test]
    fn numbers_without_dot_are_not_list_items() {
        let terms = extract_terms("Terms and Conditions\n2024 pricing applies\n1. Real term");
        assert_eq!(terms, vec!["Real term"]);
    }
}
