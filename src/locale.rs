//! Locale validation and normalization.
//!
//! A locale arrives as the `locale` query parameter in one of two shapes:
//! a bare language code (`en`) or a language-region pair (`en-US`). Bare
//! codes are expanded to a full identifier so documents only ever need to be
//! keyed by the long form.

use {
    crate::{Error, Result},
    regex::Regex,
    serde::Serialize,
    std::{fmt, sync::LazyLock},
};

/// The locale every document is expected to carry.
pub const DEFAULT_LOCALE: &str = "en-US";

static LOCALE_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").unwrap());

/// Region picked for a bare language code. Codes not listed here use their
/// own upper-cased code as region (`nl` becomes `nl-NL`).
const DEFAULT_REGIONS: [(&str, &str); 9] = [
    ("en", "en-US"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("de", "de-DE"),
    ("it", "it-IT"),
    ("pt", "pt-BR"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("zh", "zh-CN"),
];

pub const INVALID_LOCALE_MESSAGE: &str =
    "Invalid locale format. Expected format: xx or xx-XX (e.g., en or en-US)";

///
/// A validated, normalized locale such as `en-US`.
///
/// The only way to get one is [`Locale::parse`], so holding a `Locale` means
/// the value has the `xx-XX` shape.
///
/// ```rust
/// use folio_content::Locale;
///
/// assert_eq!(Locale::parse(Some("pt")).unwrap().as_str(), "pt-BR");
/// assert_eq!(Locale::parse(Some("nl")).unwrap().as_str(), "nl-NL");
/// assert_eq!(Locale::parse(Some("en-GB")).unwrap().as_str(), "en-GB");
/// assert!(Locale::parse(Some("EN")).is_err());
/// assert!(Locale::parse(None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    ///
    /// Validates and normalizes a raw `locale` parameter.
    ///
    /// Absent or empty input fails with `MissingParameter`. Anything not
    /// shaped like `xx` or `xx-XX` fails with `InvalidFormat`. The input is
    /// not trimmed or case-folded.
    ///
    pub fn parse(raw: Option<&str>) -> Result<Locale> {
        let raw = match raw {
            Some(value) if !value.is_empty() => value,
            _ => return Err(Error::missing_parameter("locale")),
        };

        if !LOCALE_REGEXP.is_match(raw) {
            return Err(Error::invalid_format(INVALID_LOCALE_MESSAGE));
        }

        if raw.len() == 2 {
            return Ok(Locale(expand_language(raw)));
        }

        Ok(Locale(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `en-US` locale.
    pub fn default_locale() -> Locale {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

fn expand_language(language: &str) -> String {
    DEFAULT_REGIONS
        .iter()
        .find(|(code, _)| *code == language)
        .map(|(_, locale)| locale.to_string())
        .unwrap_or_else(|| format!("{language}-{}", language.to_uppercase()))
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
