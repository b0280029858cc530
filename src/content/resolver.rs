use {
    super::TranslatedDocument,
    crate::{DEFAULT_LOCALE, Locale},
    serde_json::Value,
    thiserror::Error,
};

/// Why a document could not serve a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// `translations` is absent or empty.
    #[error("Document has no translations")]
    NoData,
    /// Neither the requested locale nor any fallback is present.
    #[error("No translation found for locale '{0}'")]
    TranslationNotFound(String),
}

/// Which step of the fallback chain produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStep {
    Requested,
    DocumentDefault,
    Global,
}

/// A resolved payload and the locale key it was found under.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub payload: &'a Value,
    pub served_locale: &'a str,
    pub step: FallbackStep,
}

impl Resolution<'_> {
    pub fn is_fallback(&self) -> bool {
        self.step != FallbackStep::Requested
    }
}

///
/// Picks the payload for `locale` from the first translation map.
///
/// Lookup order: the requested locale, the document's `defaultLanguage`,
/// then `en-US`. Keys are compared exactly and a `null` payload counts as
/// absent. The document is never modified.
///
/// ```rust
/// use folio_content::{Locale, TranslatedDocument, resolve};
/// use serde_json::json;
///
/// let doc: TranslatedDocument = serde_json::from_value(json!({
///     "defaultLanguage": "en-US",
///     "translations": [{ "en-US": "Hello", "fr-FR": "Bonjour" }]
/// })).unwrap();
///
/// let fr = Locale::parse(Some("fr")).unwrap();
/// assert_eq!(resolve(&doc, &fr).unwrap().payload, &json!("Bonjour"));
///
/// let de = Locale::parse(Some("de")).unwrap();
/// let fallback = resolve(&doc, &de).unwrap();
/// assert_eq!(fallback.served_locale, "en-US");
/// assert!(fallback.is_fallback());
/// ```
pub fn resolve<'a>(
    document: &'a TranslatedDocument,
    locale: &Locale,
) -> Result<Resolution<'a>, ResolveError> {
    let translations = document
        .primary_translations()
        .ok_or(ResolveError::NoData)?;

    let chain = [
        (locale.as_str(), FallbackStep::Requested),
        (document.default_language.as_str(), FallbackStep::DocumentDefault),
        (DEFAULT_LOCALE, FallbackStep::Global),
    ];

    chain
        .into_iter()
        .find_map(|(key, step)| {
            translations
                .get_key_value(key)
                .filter(|(_, payload)| !payload.is_null())
                .map(|(served, payload)| Resolution {
                    payload,
                    served_locale: served.as_str(),
                    step,
                })
        })
        .ok_or_else(|| ResolveError::TranslationNotFound(locale.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, json};

    fn doc(default_language: &str, translations: Value) -> TranslatedDocument {
        serde_json::from_value(json!({
            "defaultLanguage": default_language,
            "translations": translations,
        }))
        .unwrap()
    }

    fn locale(raw: &str) -> Locale {
        Locale::parse(Some(raw)).unwrap()
    }

    #[test]
    fn test_requested_locale_wins() {
        let d = doc("en-US", json!([{ "en-US": { "t": "Hi" }, "es-ES": { "t": "Hola" } }]));
        let es = locale("es");
        let r = resolve(&d, &es).unwrap();
        assert_eq!(r.payload, &json!({ "t": "Hola" }));
        assert_eq!(r.served_locale, "es-ES");
        assert!(!r.is_fallback());
    }

    #[test]
    fn test_falls_back_to_document_default() {
        let d = doc("fr-FR", json!([{ "en-US": "Hi", "fr-FR": "Salut" }]));
        let ja = locale("ja");
        let r = resolve(&d, &ja).unwrap();
        assert_eq!(r.payload, &json!("Salut"));
        assert_eq!(r.step, FallbackStep::DocumentDefault);
    }

    #[test]
    fn test_falls_back_to_global_default() {
        let d = doc("fr-FR", json!([{ "en-US": "Hi" }]));
        let ja = locale("ja");
        let r = resolve(&d, &ja).unwrap();
        assert_eq!(r.payload, &json!("Hi"));
        assert_eq!(r.served_locale, "en-US");
        assert_eq!(r.step, FallbackStep::Global);
    }

    #[test]
    fn test_chain_exhausted() {
        let d = doc("fr-FR", json!([{ "de-DE": "Hallo" }]));
        let ja = locale("ja");
        assert_eq!(
            resolve(&d, &ja).unwrap_err(),
            ResolveError::TranslationNotFound("ja-JP".into())
        );
    }

    #[test]
    fn test_empty_translations_is_no_data() {
        let d = doc("en-US", json!([]));
        assert_eq!(resolve(&d, &locale("en")).unwrap_err(), ResolveError::NoData);
    }

    #[test]
    fn test_only_first_translation_map_is_read() {
        let d = doc("en-US", json!([{ "en-US": "first" }, { "es-ES": "second" }]));
        let r = resolve(&d, &locale("es")).unwrap();
        assert_eq!(r.payload, &json!("first"));
    }

    #[test]
    fn test_null_payload_falls_back() {
        let d = doc("en-US", json!([{ "es-ES": null, "en-US": "Hi" }]));
        let r = resolve(&d, &locale("es")).unwrap();
        assert_eq!(r.payload, &json!("Hi"));
        assert_eq!(r.served_locale, "en-US");
        assert_eq!(r.step, FallbackStep::DocumentDefault);
    }

    #[test]
    fn test_null_default_falls_back_to_global() {
        let d = doc("fr-FR", json!([{ "fr-FR": null, "en-US": "Hi" }]));
        let r = resolve(&d, &locale("fr")).unwrap();
        assert_eq!(r.step, FallbackStep::Global);
    }

    #[test]
    fn test_only_null_payloads_is_not_found() {
        let d = doc("en-US", json!([{ "es-ES": null, "en-US": null }]));
        assert_eq!(
            resolve(&d, &locale("es")).unwrap_err(),
            ResolveError::TranslationNotFound("es-ES".into())
        );
    }

    prop_compose! {
        fn arb_locale()(raw in "[a-e]{2}(-[A-C]{2})?") -> Locale {
            Locale::parse(Some(&raw)).unwrap()
        }
    }

    prop_compose! {
        fn arb_document()(
            default_language in "[a-e]{2}-[A-C]{2}",
            keys in prop::collection::vec("[a-e]{2}-[A-C]{2}|en-US", 0..6),
        ) -> TranslatedDocument {
            let map: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), json!({ "locale": k })))
                .collect();
            doc(&default_language, json!([map]))
        }
    }

    proptest! {
        /// Whenever the requested key exists, it is served
        #[test]
        fn requested_key_is_preferred(d in arb_document(), l in arb_locale()) {
            if let Some(expected) = d.translations[0].get(l.as_str()) {
                let r = resolve(&d, &l).unwrap();
                prop_assert_eq!(r.payload, expected);
                prop_assert_eq!(r.step, FallbackStep::Requested);
            }
        }

        /// Resolution is deterministic and only fails when no chain key exists
        #[test]
        fn fails_only_when_chain_is_exhausted(d in arb_document(), l in arb_locale()) {
            let map = &d.translations[0];
            let any_present = [l.as_str(), d.default_language.as_str(), DEFAULT_LOCALE]
                .iter()
                .any(|k| map.contains_key(*k));

            let first = resolve(&d, &l);
            prop_assert_eq!(first.is_ok(), any_present);
            prop_assert_eq!(first, resolve(&d, &l));
        }

        /// The served payload always sits under the reported key
        #[test]
        fn served_locale_matches_payload(d in arb_document(), l in arb_locale()) {
            if let Ok(r) = resolve(&d, &l) {
                prop_assert_eq!(d.translations[0].get(r.served_locale), Some(r.payload));
            }
        }
    }
}
