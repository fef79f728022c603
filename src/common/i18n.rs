// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário. Chaves "planas": "error.no_availability".
const CATALOGUES: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

#[derive(Clone, Debug)]
pub struct I18nStore {
    catalogues: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogues = HashMap::new();
        for (lang, raw) in CATALOGUES {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Catálogo '{}' inválido: {}", lang, e))?;
            catalogues.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogues: Arc::new(catalogues) })
    }

    /// Traduz `key` para `lang`, caindo para inglês e, por último, para a própria chave.
    /// Parâmetros substituem `{nome}` na mensagem.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{name}}}"), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogues.get(lang)?.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_parameters() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate("en", "error.no_availability", &[("roomType", "Deluxe".into())]);
        assert!(msg.contains("Deluxe"));
        assert!(!msg.contains("{roomType}"));
    }

    #[test]
    fn falls_back_to_english_then_to_key() {
        let store = I18nStore::load().unwrap();
        let en = store.translate("en", "error.folio_settled", &[]);
        assert_eq!(store.translate("de", "error.folio_settled", &[]), en);
        assert_eq!(store.translate("pt", "error.does_not_exist", &[]), "error.does_not_exist");
    }

    #[test]
    fn every_english_key_exists_in_portuguese() {
        let store = I18nStore::load().unwrap();
        let en = &store.catalogues["en"];
        let pt = &store.catalogues["pt"];
        for key in en.keys() {
            assert!(pt.contains_key(key), "chave sem tradução: {key}");
        }
    }
}
