use std::collections::HashMap;

use tower_lsp::lsp_types::Url;

#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Url,
    pub version: i32,
    pub text: String,
    /// Bumped on every event that schedules an analysis.
    pub generation: u64,
}

impl DocumentState {
    pub fn new(uri: Url, version: i32, text: String, generation: u64) -> Self {
        Self {
            uri,
            version,
            text,
            generation,
        }
    }
}

pub fn file_name_for(uri: &Url) -> String {
    match uri.to_file_path() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(()) => uri.path().to_string(),
    }
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Url, DocumentState>,
    last_generation: u64,
}

impl DocumentStore {
    /// Stores `text` for `uri` and returns the generation the pending
    /// analysis must still hold when it publishes.
    pub fn schedule_analysis(&mut self, uri: Url, version: i32, text: String) -> u64 {
        self.last_generation += 1;
        let generation = self.last_generation;
        self.documents.insert(
            uri.clone(),
            DocumentState::new(uri, version, text, generation),
        );
        generation
    }

    /// Replaces the stored text without scheduling anything.
    pub fn update_text(&mut self, uri: &Url, version: i32, text: String) {
        match self.documents.get_mut(uri) {
            Some(doc) => {
                doc.version = version;
                doc.text = text;
            }
            None => {
                self.documents.insert(
                    uri.clone(),
                    DocumentState::new(uri.clone(), version, text, 0),
                );
            }
        }
    }

    pub fn close_document(&mut self, uri: &Url) -> Option<DocumentState> {
        self.documents.remove(uri)
    }

    pub fn get_document(&self, uri: &Url) -> Option<&DocumentState> {
        self.documents.get(uri)
    }

    pub fn is_current(&self, uri: &Url, generation: u64) -> bool {
        self.documents
            .get(uri)
            .is_some_and(|doc| doc.generation == generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file://{path}")).expect("uri")
    }

    #[test]
    fn later_schedule_supersedes_earlier_generation() {
        let mut store = DocumentStore::default();
        let target = uri("/tmp/zlib-1.2.11.eb");

        let first = store.schedule_analysis(target.clone(), 1, "name = 'zlib'".to_string());
        let second = store.schedule_analysis(target.clone(), 2, "name = 'zlib2'".to_string());

        assert!(!store.is_current(&target, first));
        assert!(store.is_current(&target, second));
        assert_eq!(store.get_document(&target).map(|doc| doc.version), Some(2));
    }

    #[test]
    fn text_updates_keep_generation() {
        let mut store = DocumentStore::default();
        let target = uri("/tmp/zlib-1.2.11.eb");

        let generation = store.schedule_analysis(target.clone(), 1, "a = 1".to_string());
        store.update_text(&target, 2, "a = 2".to_string());

        assert!(store.is_current(&target, generation));
        assert_eq!(
            store.get_document(&target).map(|doc| doc.text.as_str()),
            Some("a = 2")
        );
    }

    #[test]
    fn closed_documents_are_never_current() {
        let mut store = DocumentStore::default();
        let target = uri("/tmp/zlib-1.2.11.eb");

        let generation = store.schedule_analysis(target.clone(), 1, String::new());
        assert!(store.close_document(&target).is_some());

        assert!(!store.is_current(&target, generation));
        assert!(store.get_document(&target).is_none());
    }

    #[test]
    fn file_name_prefers_filesystem_path() {
        assert_eq!(file_name_for(&uri("/tmp/x/zlib-1.2.11.eb")), "/tmp/x/zlib-1.2.11.eb");
        let untitled = Url::parse("untitled:Untitled-1").expect("uri");
        assert_eq!(file_name_for(&untitled), "Untitled-1");
    }
}
