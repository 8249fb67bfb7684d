//! Language detection.

/// Best-guess language of a text snippet.
///
/// Returns `None` when the language cannot be determined. Implementations
/// must return promptly; detection runs once per candidate, inline.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<String>;
}

/// Statistical detector backed by `whatlang`.
///
/// Reports ISO 639-1 codes (`"et"`, `"en"`) so results compare directly with
/// the language prefix of input file names; languages without a two-letter
/// code are reported with their ISO 639-3 code.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = whatlang::detect(text)?;
        let code = info.lang().code();
        Some(to_iso639_1(code).unwrap_or(code).to_string())
    }
}

/// Map a whatlang (ISO 639-3) code to ISO 639-1.
fn to_iso639_1(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" => "nb",
        "ori" => "or",
        "pan" => "pa",
        "pes" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "zul" => "zu",
        _ => return None,
    };
    Some(mapped)
}

/// Drop characters that are not printable.
///
/// Keeps ordinary spaces; removes control characters, line/paragraph
/// separators, other whitespace (tabs, newlines) and invisible format
/// characters, which otherwise trip up detection on scraped metadata.
pub fn strip_non_printable(text: &str) -> String {
    text.chars().filter(|c| is_printable(*c)).collect()
}

fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{FEFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_non_printable() {
        assert_eq!(strip_non_printable("tere\npäevast\t!"), "terepäevast!");
        assert_eq!(strip_non_printable("a\u{200B}b\u{0007} c"), "ab c");
        assert_eq!(strip_non_printable("plain text"), "plain text");
    }

    #[test]
    fn test_iso_mapping() {
        assert_eq!(to_iso639_1("est"), Some("et"));
        assert_eq!(to_iso639_1("eng"), Some("en"));
        assert_eq!(to_iso639_1("xyz"), None);
    }

    #[test]
    fn test_whatlang_detector() {
        let detector = WhatlangDetector;
        assert_eq!(
            detector
                .detect("The quick brown fox jumps over the lazy dog while the children are watching from the window")
                .as_deref(),
            Some("en")
        );
        assert_eq!(
            detector
                .detect("Привет, как у тебя дела? Я сегодня весь день работал дома и очень устал от этого")
                .as_deref(),
            Some("ru")
        );
        assert_eq!(detector.detect(""), None);
    }
}
