use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static RE_LEGAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Ltda\.|Ltda|EIRELI|S/A|SA|Limited|Ltd)\b").unwrap()
});
static RE_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// ASCII-folded business name without legal-entity suffixes or punctuation.
///
/// `"Farmácia São João Ltda."` becomes `"Farmacia Sao Joao"`.
pub fn normalize_name(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let without_suffix = RE_LEGAL_SUFFIX.replace_all(&ascii, "");
    let without_punct = RE_PUNCTUATION.replace_all(&without_suffix, "");
    RE_WHITESPACE
        .replace_all(&without_punct, " ")
        .trim()
        .to_string()
}
