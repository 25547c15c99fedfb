//! Tantivy-based employee search.
//!
//! Indexes names, PINs and contact numbers so a profile can be found by any
//! of them with field boosting.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Profile, CONTACT_PLACEHOLDER};

const BOOST_FULL_NAME: f32 = 10.0;
const BOOST_PIN: f32 = 8.0;
const BOOST_PHONES: f32 = 4.0;
const BOOST_OFFICE_NUMBER: f32 = 2.0;

/// Search result with profile and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub profile_id: String,
    pub score: f32,
}

struct SearchFields {
    profile_id: Field,
    full_name: Field,
    pin: Field,
    phones: Field,
    office_number: Field,
}

/// Tantivy search index for profiles.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Open the profile index under `index_path`, creating it on first start.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        // Indexed as a raw term so a profile's document can be replaced.
        let profile_id = schema_builder.add_text_field("profile_id", STRING | STORED);
        let full_name = schema_builder.add_text_field("full_name", TEXT);
        let pin = schema_builder.add_text_field("pin", TEXT);
        let phones = schema_builder.add_text_field("phones", TEXT);
        let office_number = schema_builder.add_text_field("office_number", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            profile_id,
            full_name,
            pin,
            phones,
            office_number,
        };

        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000)
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Replace the whole index with `profiles`.
    pub async fn rebuild(&self, profiles: &[Profile]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for profile in profiles {
            writer.add_document(self.create_document(profile))?;
        }
        writer.commit()?;
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} profiles", profiles.len());
        Ok(())
    }

    /// Index or re-index a single profile.
    pub async fn index_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.profile_id, &profile.id);
        writer.delete_term(term);
        writer.add_document(self.create_document(profile))?;
        writer.commit()?;

        self.reader.reload()?;
        Ok(())
    }

    /// Search for profiles matching the query.
    ///
    /// Malformed query syntax is tolerated; whatever parses is searched.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if offset >= num_docs {
            return Ok(Vec::new());
        }
        let fetch = limit.saturating_add(offset).min(num_docs);

        let field_queries = [
            (self.fields.full_name, BOOST_FULL_NAME),
            (self.fields.pin, BOOST_PIN),
            (self.fields.phones, BOOST_PHONES),
            (self.fields.office_number, BOOST_OFFICE_NUMBER),
        ];

        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();
        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            let (field_query, _errors) = field_parser.parse_query_lenient(query_str);
            subqueries.push((Occur::Should, Box::new(BoostQuery::new(field_query, boost))));
        }
        let combined_query = BooleanQuery::new(subqueries);

        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(fetch))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let profile_id = doc.get_first(self.fields.profile_id)?.as_str()?.to_string();
                Some(SearchResult { profile_id, score })
            })
            .collect();

        Ok(results)
    }

    fn create_document(&self, profile: &Profile) -> TantivyDocument {
        let phones: Vec<&str> = [
            &profile.phone_number_work,
            &profile.phone_number_mobile,
            &profile.phone_number_government,
        ]
        .into_iter()
        .filter_map(|p| searchable(p.as_deref()))
        .collect();

        doc!(
            self.fields.profile_id => profile.id.clone(),
            self.fields.full_name => profile.full_name(),
            self.fields.pin => profile.pin.clone(),
            self.fields.phones => phones.join(" "),
            self.fields.office_number => searchable(profile.office_number.as_deref())
                .unwrap_or_default()
                .to_string()
        )
    }
}

fn searchable(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != CONTACT_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileStatus;
    use tempfile::TempDir;

    fn create_test_profile(id: &str, first: &str, last: &str, pin: &str) -> Profile {
        Profile {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            patronymic: None,
            pin: pin.to_string(),
            birth_date: None,
            gender: None,
            position_id: None,
            position_title: None,
            office_id: None,
            office_name: None,
            email: None,
            phone_number_work: Some("-".to_string()),
            phone_number_mobile: Some("0555123456".to_string()),
            phone_number_government: None,
            office_number: Some("214".to_string()),
            photo_path: None,
            bio: None,
            status: ProfileStatus::Active,
            is_inspector: false,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_search_by_name_and_pin() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let profiles = vec![
            create_test_profile("1", "Айгуль", "Асанова", "10101199912345"),
            create_test_profile("2", "Бакыт", "Жумаев", "20202198800001"),
        ];
        index.rebuild(&profiles).await.unwrap();

        let results = index.search("асанова", 10, 0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].profile_id, "1");

        let results = index.search("20202198800001", 10, 0).unwrap();
        assert_eq!(results[0].profile_id, "2");
    }

    #[tokio::test]
    async fn test_reindex_replaces_document() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let mut profile = create_test_profile("1", "Айгуль", "Асанова", "10101199912345");
        index.rebuild(&[profile.clone()]).await.unwrap();

        profile.last_name = "Токтосунова".to_string();
        index.index_profile(&profile).await.unwrap();

        assert!(index.search("асанова", 10, 0).unwrap().is_empty());
        assert_eq!(index.search("токтосунова", 10, 0).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_empty_and_malformed_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index
            .rebuild(&[create_test_profile("1", "Айгуль", "Асанова", "10101199912345")])
            .await
            .unwrap();

        assert!(index.search("", 10, 0).unwrap().is_empty());
        assert!(index.search("асанова:(", 10, 0).is_ok());
    }

    #[tokio::test]
    async fn test_search_zero_limit_and_huge_offset() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index
            .rebuild(&[create_test_profile("1", "Айгуль", "Асанова", "10101199912345")])
            .await
            .unwrap();

        assert!(index.search("асанова", 0, 0).unwrap().is_empty());
        assert!(index.search("асанова", 20, usize::MAX).unwrap().is_empty());
        assert_eq!(index.search("асанова", 20, 0).unwrap().len(), 1);
    }
}
