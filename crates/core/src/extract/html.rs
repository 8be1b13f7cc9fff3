use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Class name the front end uses when it has to show a reply verbatim.
pub const FALLBACK_MARKER: &str = "quote-text-fallback";

static RE_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)quote-text-fallback">(.*)</div>"#).expect("wrapper pattern must compile")
});

static RE_LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?\s*>").expect("line break pattern must compile")
});

/// Applied in order, each over the previous output, so `&amp;lt;` ends up
/// as `<` just like the front end renders it.
static ENTITIES: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    let entity = |pattern: &str| Regex::new(pattern).expect("entity pattern must compile");
    [
        (entity(r"(?i)&nbsp;"), " "),
        (entity(r"(?i)&amp;"), "&"),
        (entity(r"(?i)&lt;"), "<"),
        (entity(r"(?i)&gt;"), ">"),
    ]
});

/// Strips the HTML fallback wrapper from a reply, if present.
///
/// Line breaks become newlines and the handful of entities the wrapper emits
/// are decoded. Text without the marker, or with a marker but no capturable
/// body, is returned untouched.
pub fn unwrap_fallback(text: &str) -> Cow<'_, str> {
    if !text.contains(FALLBACK_MARKER) {
        return Cow::Borrowed(text);
    }

    let Some(body) = RE_WRAPPER
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .filter(|body| !body.is_empty())
    else {
        return Cow::Borrowed(text);
    };

    let decoded = ENTITIES.iter().fold(
        RE_LINE_BREAK.replace_all(body, "\n").into_owned(),
        |text, (pattern, replacement)| pattern.replace_all(&text, *replacement).into_owned(),
    );

    Cow::Owned(decoded.trim().to_string())
}
