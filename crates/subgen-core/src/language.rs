//! Supported target languages for translation.

/// Language codes the façade accepts, paired with English names.
///
/// Translation prompts use the full name; the table doubles as the
/// validation set for the `target_lang` form field.
pub const SUPPORTED_LANGUAGES: [(&str, &str); 16] = [
    ("en", "English"),
    ("vi", "Vietnamese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("pt", "Portuguese"),
    ("it", "Italian"),
    ("ru", "Russian"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("hi", "Hindi"),
    ("ar", "Arabic"),
    ("nl", "Dutch"),
];

/// Resolve a language code (or an exact English name) to the language name.
///
/// Returns `None` for unknown input, which the façade turns into a 400.
pub fn language_from_code(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, name)| *c == code || *name == code)
        .map(|(_, name)| *name)
}
