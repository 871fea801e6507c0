//! The wrap library — which wraps exist and what their schemas say.
//!
//! The index is loaded once at startup from
//! `{url}/{name}/index.json` (a JSON array of wrap names), followed by one
//! `{url}/{name}/{wrap}.json` descriptor per entry. Schemas are only fetched
//! when a wrap is learned, then cached for the rest of the session.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::{debug, info, warn};
use wrapwright_config::LibraryConfig;
use wrapwright_core::error::RegistryError;
use wrapwright_core::wrap::WrapDescriptor;

use crate::locator::Locator;

const INDEX_FILE: &str = "index.json";

pub struct WrapLibrary {
    url: String,
    name: String,
    client: reqwest::Client,
    wraps: RwLock<BTreeMap<String, WrapDescriptor>>,
    schemas: RwLock<HashMap<String, String>>,
}

impl WrapLibrary {
    /// Create a library reader. Nothing is fetched until [`load_index`](Self::load_index).
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            client: reqwest::Client::new(),
            wraps: RwLock::new(BTreeMap::new()),
            schemas: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &LibraryConfig) -> Self {
        Self::new(config.url.clone(), config.name.clone())
    }

    /// A library whose index is already known.
    pub fn with_wraps(wraps: impl IntoIterator<Item = WrapDescriptor>) -> Self {
        let library = Self::new("", "");
        library.replace_index(wraps.into_iter().map(|w| (w.name.clone(), w)).collect());
        library
    }

    /// Where the index is read from, for display.
    pub fn location(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.name)
    }

    /// Fetch the index and every descriptor it lists.
    ///
    /// Descriptors that fail to load are skipped with a warning; a missing or
    /// unparsable index fails the whole load.
    pub async fn load_index(&self) -> Result<BTreeMap<String, WrapDescriptor>, RegistryError> {
        let unavailable = |reason: String| RegistryError::Unavailable {
            url: self.location(),
            reason,
        };

        let base = Locator::parse(&self.url)
            .and_then(|url| url.join(&self.name))
            .map_err(|e| unavailable(e.to_string()))?;
        let index_text = base
            .join(INDEX_FILE)
            .map_err(|e| unavailable(e.to_string()))?
            .fetch_text(&self.client)
            .await
            .map_err(unavailable)?;
        let names: Vec<String> = serde_json::from_str(&index_text)
            .map_err(|e| unavailable(format!("invalid {INDEX_FILE}: {e}")))?;

        let mut wraps = BTreeMap::new();
        for wrap_name in names {
            match self.load_descriptor(&base, &wrap_name).await {
                Ok(descriptor) => {
                    debug!(wrap = %descriptor.name, "Loaded wrap descriptor");
                    wraps.insert(descriptor.name.clone(), descriptor);
                }
                Err(reason) => warn!(wrap = %wrap_name, %reason, "Skipping wrap"),
            }
        }

        info!(count = wraps.len(), library = %self.location(), "Loaded wrap library");
        self.replace_index(wraps.clone());
        Ok(wraps)
    }

    async fn load_descriptor(
        &self,
        base: &Locator,
        wrap_name: &str,
    ) -> Result<WrapDescriptor, String> {
        let locator = base
            .join(&format!("{wrap_name}.json"))
            .map_err(|e| e.to_string())?;
        let text = locator.fetch_text(&self.client).await?;
        serde_json::from_str(&text).map_err(|e| format!("invalid descriptor: {e}"))
    }

    fn replace_index(&self, wraps: BTreeMap<String, WrapDescriptor>) {
        match self.wraps.write() {
            Ok(mut guard) => *guard = wraps,
            Err(poisoned) => *poisoned.into_inner() = wraps,
        }
    }

    /// Look up a wrap by name.
    pub fn get(&self, name: &str) -> Result<WrapDescriptor, RegistryError> {
        let wraps = self.wraps.read().unwrap_or_else(|p| p.into_inner());
        wraps
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCapability(name.to_string()))
    }

    /// All known wraps, ordered by name.
    pub fn descriptors(&self) -> Vec<WrapDescriptor> {
        let wraps = self.wraps.read().unwrap_or_else(|p| p.into_inner());
        wraps.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.wraps.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a known wrap's schema text. Cached after the first success.
    pub async fn resolve_schema(&self, name: &str) -> Result<String, RegistryError> {
        let cached = self
            .schemas
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
            .cloned();
        if let Some(schema) = cached {
            return Ok(schema);
        }

        let descriptor = self.get(name)?;
        let fetch_failed = |reason: String| RegistryError::SchemaFetchFailed {
            name: name.to_string(),
            reason,
        };

        let locator =
            Locator::parse(&descriptor.schema_locator).map_err(|e| fetch_failed(e.to_string()))?;
        let schema = locator
            .fetch_text(&self.client)
            .await
            .map_err(fetch_failed)?;

        debug!(wrap = %name, bytes = schema.len(), locator = %locator, "Fetched wrap schema");
        self.schemas
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(name.to_string(), schema.clone());
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn descriptor(name: &str, abi: &str) -> WrapDescriptor {
        WrapDescriptor {
            name: name.into(),
            description: format!("The {name} wrap"),
            schema_locator: abi.into(),
            repo_locator: None,
            uri: None,
        }
    }

    fn write_library(root: &Path, names: &[&str]) {
        let lib = root.join("wraps");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("index.json"), serde_json::to_string(names).unwrap()).unwrap();
        for name in names {
            let schema = lib.join(format!("{name}.graphql"));
            std::fs::write(&schema, format!("type {name} {{}}")).unwrap();
            let d = descriptor(name, &format!("file://{}", schema.display()));
            std::fs::write(
                lib.join(format!("{name}.json")),
                serde_json::to_string(&d).unwrap(),
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn load_index_from_file_library() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path(), &["fs", "http"]);

        let library = WrapLibrary::new(format!("file://{}", dir.path().display()), "wraps");
        let index = library.load_index().await.unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.contains_key("fs"));
        assert_eq!(library.get("http").unwrap().description, "The http wrap");
    }

    #[tokio::test]
    async fn broken_descriptor_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path(), &["fs"]);
        let lib = dir.path().join("wraps");
        std::fs::write(lib.join("index.json"), r#"["fs", "ghost"]"#).unwrap();

        let library = WrapLibrary::new(format!("file://{}", dir.path().display()), "wraps");
        let index = library.load_index().await.unwrap();
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["fs"]);
    }

    #[tokio::test]
    async fn missing_index_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let library = WrapLibrary::new(format!("file://{}", dir.path().display()), "wraps");
        let err = library.load_index().await.unwrap_err();
        assert!(matches!(err, RegistryError::Unavailable { .. }));
        assert!(library.is_empty());
    }

    #[tokio::test]
    async fn malformed_library_url_is_unavailable() {
        let library = WrapLibrary::new("not a url", "wraps");
        let err = library.load_index().await.unwrap_err();
        assert!(matches!(err, RegistryError::Unavailable { .. }), "{err:?}");
    }

    #[test]
    fn unknown_wrap_is_reported() {
        let library = WrapLibrary::with_wraps([descriptor("fs", "file:///x")]);
        assert!(matches!(
            library.get("ens"),
            Err(RegistryError::UnknownCapability(name)) if name == "ens"
        ));
    }

    #[tokio::test]
    async fn resolve_schema_reads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("fs.graphql");
        std::fs::write(&schema, "type Module { ls: [String!]! }").unwrap();

        let library =
            WrapLibrary::with_wraps([descriptor("fs", &format!("file://{}", schema.display()))]);
        assert_eq!(
            library.resolve_schema("fs").await.unwrap(),
            "type Module { ls: [String!]! }"
        );

        // Served from cache once learned
        std::fs::remove_file(&schema).unwrap();
        assert!(library.resolve_schema("fs").await.is_ok());
    }

    #[tokio::test]
    async fn unreadable_schema_fails() {
        let library = WrapLibrary::with_wraps([descriptor("fs", "file:///nonexistent/fs.graphql")]);
        assert!(matches!(
            library.resolve_schema("fs").await,
            Err(RegistryError::SchemaFetchFailed { .. })
        ));
    }

    #[test]
    fn descriptors_are_sorted_by_name() {
        let library = WrapLibrary::with_wraps([
            descriptor("zeta", "file:///z"),
            descriptor("alpha", "file:///a"),
        ]);
        let names: Vec<_> = library.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
