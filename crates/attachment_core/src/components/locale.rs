//! Locale manager and translator stand-ins.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// One configured language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleStructure {
    /// Full locale tag, e.g. `en-US`.
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    NoLocales,
    UnknownLanguage(String),
}

impl Display for LocaleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLocales => write!(f, "at least one locale must be configured"),
            Self::UnknownLanguage(lang) => write!(f, "unknown language: {lang}"),
        }
    }
}

impl Error for LocaleError {}

/// Available languages and the current selection.
#[derive(Debug)]
pub struct LocalesManager {
    locales: BTreeMap<String, LocaleStructure>,
    default_language: String,
    current_language: RefCell<String>,
}

impl LocalesManager {
    /// Creates a manager. Without an explicit default, the first language in
    /// sorted order is used.
    pub fn new(
        locales: BTreeMap<String, LocaleStructure>,
        default_language: Option<&str>,
    ) -> Result<Self, LocaleError> {
        let default_language = match default_language {
            Some(lang) if locales.contains_key(lang) => lang.to_string(),
            Some(lang) => return Err(LocaleError::UnknownLanguage(lang.to_string())),
            None => locales.keys().next().cloned().ok_or(LocaleError::NoLocales)?,
        };
        Ok(Self {
            locales,
            current_language: RefCell::new(default_language.clone()),
            default_language,
        })
    }

    pub fn available_languages(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }

    pub fn locale(&self, lang: &str) -> Option<&LocaleStructure> {
        self.locales.get(lang)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn current_language(&self) -> String {
        self.current_language.borrow().clone()
    }

    pub fn set_current_language(&self, lang: &str) -> Result<(), LocaleError> {
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::UnknownLanguage(lang.to_string()));
        }
        *self.current_language.borrow_mut() = lang.to_string();
        Ok(())
    }
}

/// Catalog-backed translator.
///
/// Lookup order: current language, default language, then the key itself.
#[derive(Debug)]
pub struct Translator {
    manager: Rc<LocalesManager>,
    catalogs: RefCell<BTreeMap<String, BTreeMap<String, String>>>,
}

impl Translator {
    pub fn new(manager: Rc<LocalesManager>) -> Self {
        Self {
            manager,
            catalogs: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn manager(&self) -> &LocalesManager {
        &self.manager
    }

    pub fn add_resource(&self, lang: &str, key: impl Into<String>, message: impl Into<String>) {
        self.catalogs
            .borrow_mut()
            .entry(lang.to_string())
            .or_default()
            .insert(key.into(), message.into());
    }

    pub fn translate(&self, key: &str) -> String {
        self.translate_in(key, &self.manager.current_language())
    }

    pub fn translate_in(&self, key: &str, lang: &str) -> String {
        let catalogs = self.catalogs.borrow();
        [lang, self.manager.default_language()]
            .iter()
            .find_map(|lang| catalogs.get(*lang).and_then(|catalog| catalog.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{LocaleError, LocaleStructure, LocalesManager, Translator};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn manager() -> Rc<LocalesManager> {
        let mut locales = BTreeMap::new();
        for (lang, locale) in [("en", "en-US"), ("fr", "fr-CA")] {
            locales.insert(
                lang.to_string(),
                LocaleStructure {
                    locale: locale.to_string(),
                },
            );
        }
        Rc::new(LocalesManager::new(locales, Some("en")).expect("valid locales"))
    }

    #[test]
    fn translates_with_default_language_fallback() {
        let translator = Translator::new(manager());
        translator.add_resource("en", "gallery", "Gallery");
        translator.add_resource("fr", "image", "Image FR");

        translator
            .manager()
            .set_current_language("fr")
            .expect("fr is configured");
        assert_eq!(translator.translate("image"), "Image FR");
        assert_eq!(translator.translate("gallery"), "Gallery");
        assert_eq!(translator.translate("unknown.key"), "unknown.key");
    }

    #[test]
    fn rejects_unknown_languages() {
        let manager = manager();
        assert_eq!(
            manager.set_current_language("de"),
            Err(LocaleError::UnknownLanguage("de".to_string()))
        );
        assert!(matches!(
            LocalesManager::new(BTreeMap::new(), None),
            Err(LocaleError::NoLocales)
        ));
    }
}
