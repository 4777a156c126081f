//! Language tag normalization.
//!
//! Tags are open strings. Engines may report full names ("english") while
//! clients send ISO codes, so both are folded into lowercase codes here.

const NAMED: &[(&str, &str)] = &[
    ("english", "en"),
    ("korean", "ko"),
    ("japanese", "ja"),
    ("chinese", "zh"),
    ("spanish", "es"),
    ("french", "fr"),
    ("german", "de"),
    ("russian", "ru"),
    ("portuguese", "pt"),
    ("italian", "it"),
    ("vietnamese", "vi"),
    ("thai", "th"),
    ("arabic", "ar"),
    ("dutch", "nl"),
    ("turkish", "tr"),
    ("indonesian", "id"),
    ("hindi", "hi"),
    ("polish", "pl"),
    ("ukrainian", "uk"),
];

/// Fold a language tag into a lowercase code, or `None` if it is not one.
///
/// Accepts `xx`, `xxx`, `xx-yy` style codes and the full names above.
pub fn normalize_language(tag: &str) -> Option<String> {
    let tag = tag.trim().to_ascii_lowercase();

    if let Some((_, code)) = NAMED.iter().find(|(name, _)| *name == tag) {
        return Some((*code).to_string());
    }

    let mut parts = tag.splitn(2, ['-', '_']);
    let primary = parts.next().unwrap_or_default();
    let primary_ok = (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase());
    let region_ok = parts
        .next()
        .map_or(true, |r| (2..=4).contains(&r.len()) && r.chars().all(|c| c.is_ascii_alphanumeric()));

    (primary_ok && region_ok).then(|| tag.replace('_', "-"))
}

/// English name of a language code, for prompts. Unknown codes are returned as-is.
pub fn display_name(code: &str) -> String {
    let primary = code.split('-').next().unwrap_or(code);
    NAMED
        .iter()
        .find(|(_, c)| *c == primary)
        .map(|(name, _)| {
            let mut chars = name.chars();
            chars
                .next()
                .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        })
        .unwrap_or_else(|| code.to_string())
}

/// Normalize `tag`, falling back to `primary` when it is not recognizable.
pub fn language_or(tag: Option<&str>, primary: &str) -> String {
    tag.and_then(normalize_language)
        .unwrap_or_else(|| primary.to_string())
}

/// Language reported by a transcription engine.
///
/// Unlike client tags, an unrecognized engine language is kept as its own
/// lowercase tag so it still counts as foreign; only a blank tag means
/// `primary`.
pub fn engine_language(tag: &str, primary: &str) -> String {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return primary.to_string();
    }
    normalize_language(trimmed).unwrap_or_else(|| trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through_lowercased() {
        assert_eq!(normalize_language("EN").as_deref(), Some("en"));
        assert_eq!(normalize_language(" ko ").as_deref(), Some("ko"));
        assert_eq!(normalize_language("yue").as_deref(), Some("yue"));
        assert_eq!(normalize_language("pt_BR").as_deref(), Some("pt-br"));
    }

    #[test]
    fn test_full_names_map_to_codes() {
        assert_eq!(normalize_language("English").as_deref(), Some("en"));
        assert_eq!(normalize_language("korean").as_deref(), Some("ko"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(normalize_language(""), None);
        assert_eq!(normalize_language("k"), None);
        assert_eq!(normalize_language("klingon-language"), None);
        assert_eq!(normalize_language("e1"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("ko"), "Korean");
        assert_eq!(display_name("pt-br"), "Portuguese");
        assert_eq!(display_name("xx"), "xx");
    }

    #[test]
    fn test_language_or_defaults_to_primary() {
        assert_eq!(language_or(None, "ko"), "ko");
        assert_eq!(language_or(Some("??"), "ko"), "ko");
        assert_eq!(language_or(Some("ja"), "ko"), "ja");
    }

    #[test]
    fn test_engine_language_keeps_unlisted_names_foreign() {
        assert_eq!(engine_language("Vietnamese", "ko"), "vi");
        assert_eq!(engine_language("Klingon Language", "ko"), "klingon language");
        assert_eq!(engine_language("  ", "ko"), "ko");
        assert_eq!(engine_language("korean", "ko"), "ko");
    }
}
