use std::sync::LazyLock;

use regex::Regex;

use crate::domain::currency::Currency;

static RE_PARENTHESIZED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(([A-Z]{3})\)").expect("currency code pattern must compile")
});

static RE_KNOWN_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(PKR|EUR|GBP|USD)\b").expect("currency token pattern must compile")
});

/// Infers the quote currency.
///
/// A code in parentheses such as `(EUR)` wins over a bare token such as `GBP`,
/// which wins over a `$` sign. Whatever is found first decides; codes without
/// a dedicated symbol, and text with no currency hint at all, resolve to USD.
pub fn detect_currency(text: &str) -> Currency {
    let code = RE_PARENTHESIZED_CODE
        .captures(text)
        .or_else(|| RE_KNOWN_CODE.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str());

    match code {
        Some(code) => Currency::from_code(code),
        None => Currency::Usd,
    }
}
