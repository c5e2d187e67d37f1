//! Language catalog and language pairs

use serde::{Deserialize, Serialize};

use crate::conversation::Side;
use crate::{Error, Result};

/// Flag shown for codes outside the catalog
pub const UNKNOWN_FLAG: &str = "🌐";

/// A language offered for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// BCP-47 primary language subtag (e.g. "hi")
    pub code: &'static str,
    /// English display name
    pub name: &'static str,
    /// Flag emoji
    pub flag: &'static str,
    /// Region the language is chiefly associated with
    pub region: &'static str,
}

const fn lang(
    code: &'static str,
    name: &'static str,
    flag: &'static str,
    region: &'static str,
) -> Language {
    Language {
        code,
        name,
        flag,
        region,
    }
}

/// All supported languages, developing-country languages first
pub const LANGUAGES: &[Language] = &[
    lang("hi", "Hindi", "🇮🇳", "India"),
    lang("bn", "Bengali", "🇧🇩", "Bangladesh/India"),
    lang("ur", "Urdu", "🇵🇰", "Pakistan"),
    lang("ar", "Arabic", "🇸🇦", "Middle East/Africa"),
    lang("sw", "Swahili", "🇰🇪", "East Africa"),
    lang("ha", "Hausa", "🇳🇬", "West Africa"),
    lang("yo", "Yoruba", "🇳🇬", "Nigeria"),
    lang("ig", "Igbo", "🇳🇬", "Nigeria"),
    lang("am", "Amharic", "🇪🇹", "Ethiopia"),
    lang("pt", "Portuguese", "🇧🇷", "Brazil/Africa"),
    lang("es", "Spanish", "🇲🇽", "Latin America"),
    lang("id", "Indonesian", "🇮🇩", "Indonesia"),
    lang("ms", "Malay", "🇲🇾", "Malaysia"),
    lang("tl", "Filipino", "🇵🇭", "Philippines"),
    lang("th", "Thai", "🇹🇭", "Thailand"),
    lang("vi", "Vietnamese", "🇻🇳", "Vietnam"),
    lang("tr", "Turkish", "🇹🇷", "Turkey"),
    lang("fa", "Persian", "🇮🇷", "Iran"),
    lang("zu", "Zulu", "🇿🇦", "South Africa"),
    lang("xh", "Xhosa", "🇿🇦", "South Africa"),
    lang("af", "Afrikaans", "🇿🇦", "South Africa"),
    lang("my", "Myanmar", "🇲🇲", "Myanmar"),
    lang("km", "Khmer", "🇰🇭", "Cambodia"),
    lang("ne", "Nepali", "🇳🇵", "Nepal"),
    lang("si", "Sinhala", "🇱🇰", "Sri Lanka"),
    lang("en", "English", "🇺🇸", "International"),
    lang("fr", "French", "🇫🇷", "International"),
    lang("zh", "Chinese", "🇨🇳", "China"),
];

/// Look up a language by code (case-insensitive)
#[must_use]
pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(code.trim()))
}

/// Display name for a code, falling back to the code itself
#[must_use]
pub fn name(code: &str) -> &str {
    find(code).map_or(code, |l| l.name)
}

/// Flag for a code, falling back to a globe
#[must_use]
pub fn flag(code: &str) -> &'static str {
    find(code).map_or(UNKNOWN_FLAG, |l| l.flag)
}

/// The two languages of a conversation
///
/// The codes are independent; nothing here forces `from != to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Language of the FROM side
    pub from: String,
    /// Language of the TO side
    pub to: String,
}

impl LanguagePair {
    /// Create a pair from two codes
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Exchange the two languages
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Language spoken by `side`
    #[must_use]
    pub fn language_for(&self, side: Side) -> &str {
        match side {
            Side::From => &self.from,
            Side::To => &self.to,
        }
    }

    /// Check whether both sides share a language
    #[must_use]
    pub fn is_same_language(&self) -> bool {
        self.from.eq_ignore_ascii_case(&self.to)
    }

    /// Ensure both codes are in the catalog
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLanguage` for the first code not in the catalog
    pub fn validate(&self) -> Result<()> {
        for code in [&self.from, &self.to] {
            if find(code).is_none() {
                return Err(Error::UnknownLanguage(code.clone()));
            }
        }
        Ok(())
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new("en", "hi")
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", name(&self.from), name(&self.to))
    }
}
