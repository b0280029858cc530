use {
    super::Section,
    crate::{DEFAULT_LOCALE, Error, Result},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

///
/// A translated content document as stored.
///
/// `translations[0]` maps locale identifiers to arbitrary JSON payloads.
/// Later elements are kept but never read.
///
/// ```json
/// {
///   "defaultLanguage": "en-US",
///   "translations": [{ "en-US": { "title": "Hi" }, "fr-FR": { "title": "Salut" } }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedDocument {
    #[serde(default = "TranslatedDocument::default_language")]
    pub default_language: String,

    #[serde(default)]
    pub translations: Vec<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
}

impl TranslatedDocument {
    fn default_language() -> String {
        DEFAULT_LOCALE.into()
    }

    ///
    /// Reads a stored document.
    ///
    /// A document that is not an object, or whose `translations` is not a
    /// list of objects, is a data integrity error.
    ///
    pub fn from_value(section: Section, value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::data_integrity(format!("{} document is malformed: {e}", section.label()))
        })
    }

    /// The locale-to-payload map every lookup goes through.
    pub fn primary_translations(&self) -> Option<&Map<String, Value>> {
        self.translations.first()
    }
}

///
/// Checks the documents of a collection section before they are served.
///
/// Every document must be an object carrying the section's item array.
///
pub fn validate_collection(section: Section, documents: &[Value]) -> Result<()> {
    let Some(key) = section.items_key() else {
        return Err(Error::internal(format!(
            "{} is not a collection section",
            section.label()
        )));
    };

    for (index, document) in documents.iter().enumerate() {
        if !document.get(key).is_some_and(Value::is_array) {
            return Err(Error::data_integrity(format!(
                "{} document #{index} is missing its '{key}' array",
                section.label()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_default_language_defaults_to_en_us() {
        let doc =
            TranslatedDocument::from_value(Section::About, json!({ "translations": [{}] })).unwrap();
        assert_eq!(doc.default_language, "en-US");
    }

    #[test]
    fn test_absent_translations_is_empty() {
        let doc = TranslatedDocument::from_value(Section::About, json!({})).unwrap();
        assert!(doc.primary_translations().is_none());
    }

    #[test]
    fn test_timestamps_are_carried() {
        let doc = TranslatedDocument::from_value(
            Section::Intro,
            json!({
                "defaultLanguage": "fr-FR",
                "translations": [{ "fr-FR": "Bonjour" }],
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-02-01T00:00:00Z"
            }),
        )
        .unwrap();
        assert_eq!(doc.default_language, "fr-FR");
        assert_eq!(doc.created_at, Some(json!("2024-01-01T00:00:00Z")));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["updatedAt"], "2024-02-01T00:00:00Z");
    }

    #[test]
    fn test_malformed_document_is_data_integrity() {
        for value in [
            json!("not an object"),
            json!({ "translations": "nope" }),
            json!({ "translations": [1, 2] }),
        ] {
            let err = TranslatedDocument::from_value(Section::About, value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DataIntegrity);
        }
    }

    #[test]
    fn test_validate_collection() {
        let ok = [json!({ "socials": [] }), json!({ "socials": [{ "name": "gh" }] })];
        assert!(validate_collection(Section::Social, &ok).is_ok());

        let bad = [json!({ "socials": [] }), json!({ "icons": [] })];
        let err = validate_collection(Section::Social, &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
        assert!(err.to_string().contains("#1"));

        let not_array = [json!({ "icons": "x" })];
        assert!(validate_collection(Section::Icon, &not_array).is_err());
    }

    #[test]
    fn test_validate_collection_rejects_translated_section() {
        let err = validate_collection(Section::About, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
