//! Translation lookup and plural-form selection.

use std::collections::HashMap;

use serde_json::Value;

/// Locale whose rule applies when a locale has no rule of its own
pub const DEFAULT_LOCALE: &str = "en-US";

/// Translation lookup service
pub trait Translator: Send + Sync {
    /// Translate `key` for `lang`, substituting `args` into the message
    fn tr(&self, lang: &str, key: &str, args: &[String]) -> String;
}

/// In-memory message catalog keyed by locale then message key
///
/// Messages use `%s` / `%d` placeholders filled from the arguments in order.
/// Unknown locales fall back to [`DEFAULT_LOCALE`], unknown keys render as the key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{ "en-US": { "key": "message" } }` document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let messages = serde_json::from_str(json)?;
        Ok(Self { messages })
    }

    pub fn insert(&mut self, lang: &str, key: &str, message: &str) {
        self.messages
            .entry(lang.to_string())
            .or_default()
            .insert(key.to_string(), message.to_string());
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LOCALE).and_then(|m| m.get(key)))
            .map(String::as_str)
    }
}

impl Translator for Catalog {
    fn tr(&self, lang: &str, key: &str, args: &[String]) -> String {
        match self.lookup(lang, key) {
            Some(message) => substitute(message, args),
            None => key.to_string(),
        }
    }
}

fn substitute(message: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(message.len());
    let mut args = args.iter();
    let mut rest = message;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        match tail.chars().next() {
            Some('s') | Some('d') => {
                if let Some(arg) = args.next() {
                    out.push_str(arg);
                }
                rest = &tail[1..];
            }
            Some('%') => {
                out.push('%');
                rest = &tail[1..];
            }
            _ => {
                out.push('%');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Locale-specific mapping from a count to plural form 0 (singular) or 1
pub type PluralRule = fn(i64) -> usize;

fn rule_one(cnt: i64) -> usize {
    if cnt == 1 {
        0
    } else {
        1
    }
}

fn rule_baltic_slavic(cnt: i64) -> usize {
    if cnt % 10 == 1 && cnt % 100 != 11 {
        0
    } else {
        1
    }
}

fn rule_single_form(_cnt: i64) -> usize {
    0
}

fn rule_french(cnt: i64) -> usize {
    if cnt > -2 && cnt < 2 {
        0
    } else {
        1
    }
}

const PLURAL_RULES: &[(&str, PluralRule)] = &[
    ("en-US", rule_one),
    ("lv-LV", rule_baltic_slavic),
    ("ru-RU", rule_baltic_slavic),
    ("zh-CN", rule_single_form),
    ("zh-HK", rule_single_form),
    ("zh-TW", rule_single_form),
    ("fr-FR", rule_french),
];

/// Plural rule for `locale`, falling back to the default locale's rule
pub fn plural_rule(locale: &str) -> PluralRule {
    PLURAL_RULES
        .iter()
        .find(|(tag, _)| *tag == locale)
        .or_else(|| PLURAL_RULES.iter().find(|(tag, _)| *tag == DEFAULT_LOCALE))
        .map(|(_, rule)| *rule)
        .unwrap_or(rule_one)
}

/// Pick the translation key for `count`: `key_one` for form 0, otherwise `key_n`
pub fn plural_form_key<'a>(locale: &str, count: i64, key_one: &'a str, key_n: &'a str) -> &'a str {
    if plural_rule(locale)(count) == 0 {
        key_one
    } else {
        key_n
    }
}

/// [`plural_form_key`] over a template value; non-integer counts select `key_n`
pub fn plural_form_key_value<'a>(
    locale: &str,
    count: &Value,
    key_one: &'a str,
    key_n: &'a str,
) -> &'a str {
    match count.as_i64() {
        Some(c) => plural_form_key(locale, c, key_one, key_n),
        None => key_n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_russian_rule() {
        assert_eq!(plural_form_key("ru-RU", 1, "one", "many"), "one");
        assert_eq!(plural_form_key("ru-RU", 21, "one", "many"), "one");
        assert_eq!(plural_form_key("ru-RU", 101, "one", "many"), "one");
        assert_eq!(plural_form_key("ru-RU", 11, "one", "many"), "many");
        assert_eq!(plural_form_key("ru-RU", 111, "one", "many"), "many");
        assert_eq!(plural_form_key("ru-RU", 2, "one", "many"), "many");
    }

    #[test]
    fn test_latvian_matches_russian() {
        for n in -200..200 {
            assert_eq!(
                plural_form_key("lv-LV", n, "one", "many"),
                plural_form_key("ru-RU", n, "one", "many")
            );
        }
    }

    #[test]
    fn test_chinese_single_form() {
        for locale in ["zh-CN", "zh-HK", "zh-TW"] {
            for n in [-5, 0, 1, 2, 11, 1000, i64::MAX] {
                assert_eq!(plural_form_key(locale, n, "one", "many"), "one");
            }
        }
    }

    #[test]
    fn test_french_rule() {
        assert_eq!(plural_form_key("fr-FR", -1, "one", "many"), "one");
        assert_eq!(plural_form_key("fr-FR", 0, "one", "many"), "one");
        assert_eq!(plural_form_key("fr-FR", 1, "one", "many"), "one");
        assert_eq!(plural_form_key("fr-FR", 2, "one", "many"), "many");
        assert_eq!(plural_form_key("fr-FR", -2, "one", "many"), "many");
    }

    #[test]
    fn test_unknown_locale_uses_english() {
        assert_eq!(plural_form_key("de-DE", 1, "one", "many"), "one");
        assert_eq!(plural_form_key("de-DE", 0, "one", "many"), "many");
        assert_eq!(plural_form_key("", 21, "one", "many"), "many");
    }

    #[test]
    fn test_non_integer_count_selects_plural() {
        assert_eq!(plural_form_key_value("en-US", &json!(1), "one", "many"), "one");
        assert_eq!(plural_form_key_value("en-US", &json!(1.0), "one", "many"), "many");
        assert_eq!(plural_form_key_value("en-US", &json!("1"), "one", "many"), "many");
    }

    #[test]
    fn test_catalog_lookup_and_fallback() {
        let catalog = Catalog::from_json(
            r#"{"en-US": {"tool.ago": "%s ago", "tool.now": "now"},
                "fr-FR": {"tool.ago": "il y a %s"}}"#,
        )
        .unwrap();

        assert_eq!(catalog.tr("fr-FR", "tool.ago", &["3 jours".to_string()]), "il y a 3 jours");
        assert_eq!(catalog.tr("fr-FR", "tool.now", &[]), "now");
        assert_eq!(catalog.tr("en-US", "missing.key", &[]), "missing.key");
    }

    #[test]
    fn test_substitute_placeholders() {
        assert_eq!(substitute("%d of %s (100%%)", &["1".into(), "2".into()]), "1 of 2 (100%)");
        assert_eq!(substitute("50% off", &[]), "50% off");
    }
}
