//! Seed files for the document store.
//!
//! A seed directory holds one `<slug>.json` file per section (`about.json`,
//! `social.json`, ...). Each file contains either a single document or an
//! array of documents. Sections without a file are left untouched.
//!
//! Everything is read and validated before the first write, so a bad file
//! never leaves the store half seeded.

use {
    crate::{ContentKind, Error, PgContentStore, Result, Section, TranslatedDocument},
    crate::{utils::rfc3339_now, validate_collection},
    serde_json::Value,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// Seed directory used when none is given.
pub const DEFAULT_SEED_DIR: &str = "data";

/// The validated documents of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedFile {
    pub section: Section,
    pub path: PathBuf,
    pub documents: Vec<Value>,
}

///
/// Reads and validates every section file found in `dir`.
///
/// Fails when the directory holds no section file at all.
///
pub fn load_seed_dir(dir: impl AsRef<Path>) -> Result<Vec<SeedFile>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::io(format!(
            "Seed directory {} does not exist",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for section in Section::ALL {
        let path = dir.join(format!("{}.json", section.slug()));
        if !path.is_file() {
            tracing::debug!(section = %section, path = %path.display(), "No seed file");
            continue;
        }
        files.push(load_seed_file(section, path)?);
    }

    if files.is_empty() {
        return Err(Error::config(format!(
            "No seed files found in {}",
            dir.display()
        )));
    }
    Ok(files)
}

/// Reads, validates and timestamps the documents of one section file.
pub fn load_seed_file(section: Section, path: PathBuf) -> Result<SeedFile> {
    let text = fs::read_to_string(&path)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        Error::data_integrity(format!("{} is not valid JSON: {e}", path.display()))
    })?;

    let mut documents = match value {
        Value::Array(documents) => documents,
        document @ Value::Object(_) => vec![document],
        _ => {
            return Err(Error::data_integrity(format!(
                "{} must hold a document or an array of documents",
                path.display()
            )));
        }
    };

    validate_documents(section, &documents)
        .map_err(|e| Error::new(e.kind(), format!("{}: {e}", path.display())))?;

    let now = rfc3339_now();
    for document in &mut documents {
        stamp(document, &now);
    }

    Ok(SeedFile {
        section,
        path,
        documents,
    })
}

///
/// Checks documents against the shape their section is served with.
///
/// Translated documents need at least one translation. Collection documents
/// need their item array.
///
pub fn validate_documents(section: Section, documents: &[Value]) -> Result<()> {
    match section.kind() {
        ContentKind::Translated => {
            for (index, document) in documents.iter().enumerate() {
                let parsed = TranslatedDocument::from_value(section, document.clone())?;
                if parsed.primary_translations().is_none_or(|map| map.is_empty()) {
                    return Err(Error::data_integrity(format!(
                        "{} document #{index}: At least one translation is required",
                        section.label()
                    )));
                }
            }
            Ok(())
        }
        ContentKind::Collection => validate_collection(section, documents),
    }
}

/// Sets `createdAt` / `updatedAt` when the document does not carry them.
fn stamp(document: &mut Value, now: &str) {
    if let Some(object) = document.as_object_mut() {
        for key in ["createdAt", "updatedAt"] {
            object
                .entry(key)
                .or_insert_with(|| Value::String(now.to_string()));
        }
    }
}

///
/// Replaces each seeded section's collection, one transaction per section.
///
/// Returns the total number of inserted documents.
///
pub async fn seed_store(store: &PgContentStore, files: &[SeedFile]) -> Result<usize> {
    store.ensure_schema().await?;

    let mut total = 0;
    for file in files {
        let inserted = store
            .replace_collection(file.section.collection(), &file.documents)
            .await?;
        tracing::info!(
            section = %file.section,
            collection = file.section.collection(),
            inserted,
            "Seeded collection"
        );
        total += inserted;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_load_seed_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "about.json",
            &json!([{ "defaultLanguage": "en-US", "translations": [{ "en-US": { "name": "Me" } }] }]),
        );
        write(dir.path(), "social.json", &json!({ "socials": [{ "name": "github" }] }));
        write(dir.path(), "unrelated.json", &json!({}));

        let files = load_seed_dir(dir.path()).unwrap();
        let sections: Vec<_> = files.iter().map(|f| f.section).collect();
        assert_eq!(sections, vec![Section::About, Section::Social]);
        assert_eq!(files[1].documents.len(), 1);
    }

    #[test]
    fn test_documents_are_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "icon.json",
            &json!({ "icons": [], "createdAt": "2020-01-01T00:00:00Z" }),
        );

        let file = load_seed_file(Section::Icon, dir.path().join("icon.json")).unwrap();
        let document = &file.documents[0];
        assert_eq!(document["createdAt"], "2020-01-01T00:00:00Z");
        assert!(document["updatedAt"].is_string());
    }

    #[test]
    fn test_rejects_translated_without_translations() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "intro.json", &json!({ "defaultLanguage": "en-US", "translations": [] }));

        let err = load_seed_dir(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
        assert!(err.to_string().contains("intro.json"));
        assert!(err.to_string().contains("At least one translation is required"));
    }

    #[test]
    fn test_rejects_empty_first_translation_map() {
        let result = validate_documents(Section::Footer, &[json!({ "translations": [{}] })]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_collection_without_items() {
        let result = validate_documents(Section::Social, &[json!({ "links": [] })]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_rejects_scalar_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.json"), "42").unwrap();
        let err = load_seed_file(Section::About, dir.path().join("about.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.json"), "{ nope").unwrap();
        assert!(load_seed_dir(dir.path()).is_err());
    }

    #[test]
    fn test_empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load_seed_dir(dir.path()).unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        assert_eq!(
            load_seed_dir("/definitely/not/here").unwrap_err().kind(),
            ErrorKind::Io
        );
    }
}
