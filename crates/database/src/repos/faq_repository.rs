//! Repository for knowledge base (FAQ) data access.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::entities::{CreateFaqRequest, FaqEntry, FaqFilter, UpdateFaqRequest};
use crate::types::{now_timestamp, DatabaseError, DatabaseResult};

const FAQ_COLUMNS: &str = "id, category, question, answer, keywords, created_at, updated_at";

/// Repository for FAQ database operations
#[derive(Clone)]
pub struct FaqRepository {
    pool: SqlitePool,
}

impl FaqRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every entry in insertion order. This is the candidate set for answer matching.
    pub async fn all(&self) -> DatabaseResult<Vec<FaqEntry>> {
        let entries = sqlx::query_as::<_, FaqEntry>(&format!(
            "SELECT {FAQ_COLUMNS} FROM knowledge_base ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries grouped by category, optionally narrowed by category and a free-text term.
    pub async fn list(&self, filter: &FaqFilter) -> DatabaseResult<Vec<FaqEntry>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {FAQ_COLUMNS} FROM knowledge_base WHERE 1 = 1"
        ));

        if let Some(category) = non_blank(filter.category.as_deref()) {
            query.push(" AND category = ").push_bind(category.to_string());
        }

        if let Some(term) = non_blank(filter.search.as_deref()) {
            let pattern = like_pattern(term);
            query
                .push(" AND (lower(category) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(question) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(answer) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(COALESCE(keywords, '')) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        query.push(" ORDER BY category ASC, id ASC");

        let entries = query
            .build_query_as::<FaqEntry>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = entries.len(), "listed knowledge base entries");
        Ok(entries)
    }

    pub async fn find(&self, id: i64) -> DatabaseResult<Option<FaqEntry>> {
        let entry = sqlx::query_as::<_, FaqEntry>(&format!(
            "SELECT {FAQ_COLUMNS} FROM knowledge_base WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_question(&self, question: &str) -> DatabaseResult<Option<FaqEntry>> {
        let entry = sqlx::query_as::<_, FaqEntry>(&format!(
            "SELECT {FAQ_COLUMNS} FROM knowledge_base WHERE question = ? ORDER BY id ASC LIMIT 1"
        ))
        .bind(question)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn create(&self, request: &CreateFaqRequest) -> DatabaseResult<FaqEntry> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO knowledge_base (category, question, answer, keywords, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.category)
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.keywords.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, category = %request.category, "created knowledge base entry");

        Ok(FaqEntry {
            id,
            category: request.category.clone(),
            question: request.question.clone(),
            answer: request.answer.clone(),
            keywords: request.keywords.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update. Fields left as `None` keep their stored value.
    pub async fn update(&self, id: i64, request: &UpdateFaqRequest) -> DatabaseResult<FaqEntry> {
        let mut entry = self
            .find(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("knowledge base entry {id}")))?;

        if let Some(category) = &request.category {
            entry.category = category.clone();
        }
        if let Some(question) = &request.question {
            entry.question = question.clone();
        }
        if let Some(answer) = &request.answer {
            entry.answer = answer.clone();
        }
        if let Some(keywords) = &request.keywords {
            entry.keywords = keywords.clone();
        }
        entry.updated_at = now_timestamp();

        sqlx::query(
            r#"
            UPDATE knowledge_base
            SET category = ?, question = ?, answer = ?, keywords = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.category)
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(entry.keywords.as_deref())
        .bind(&entry.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        info!(id, "updated knowledge base entry");
        Ok(entry)
    }

    pub async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM knowledge_base WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("knowledge base entry {id}")));
        }

        info!(id, "deleted knowledge base entry");
        Ok(())
    }

    /// Insert the entry, or overwrite the existing entry with the same question.
    pub async fn upsert_by_question(&self, request: &CreateFaqRequest) -> DatabaseResult<FaqEntry> {
        match self.find_by_question(&request.question).await? {
            Some(existing) => {
                let update = UpdateFaqRequest {
                    category: Some(request.category.clone()),
                    question: None,
                    answer: Some(request.answer.clone()),
                    keywords: Some(request.keywords.clone()),
                };
                self.update(existing.id, &update).await
            }
            None => self.create(request).await,
        }
    }

    /// Distinct non-empty categories in alphabetical order.
    pub async fn categories(&self) -> DatabaseResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category FROM knowledge_base
            WHERE category IS NOT NULL AND trim(category) != ''
            ORDER BY category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// `%term%` pattern with LIKE wildcards escaped, for comparison against `lower(column)`.
///
/// Only ASCII is folded: SQLite's `lower()` and `LIKE` leave other letters untouched.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.to_ascii_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    fn request(category: &str, question: &str, keywords: Option<&str>) -> CreateFaqRequest {
        CreateFaqRequest {
            category: category.to_string(),
            question: question.to_string(),
            answer: format!("Answer to {question}"),
            keywords: keywords.map(str::to_string),
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Fees"), "%fees%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern("ÉCOLE"), "%École%");
    }

    #[tokio::test]
    async fn search_folds_ascii_case_only() {
        let (pool, _dir) = test_pool().await;
        let repo = FaqRepository::new(pool);
        repo.create(&request("Faculties", "Where is the École of Business?", None))
            .await
            .unwrap();

        let search = |term: &'static str| {
            let repo = repo.clone();
            async move {
                repo.list(&FaqFilter {
                    category: None,
                    search: Some(term.into()),
                })
                .await
                .unwrap()
                .len()
            }
        };

        assert_eq!(search("ÉCOLE").await, 1);
        assert_eq!(search("École").await, 1);
        assert_eq!(search("BUSINESS").await, 1);
        // Non-ASCII letters are compared exactly.
        assert_eq!(search("école").await, 0);
    }

    #[tokio::test]
    async fn create_find_update_delete_round_trip() {
        let (pool, _dir) = test_pool().await;
        let repo = FaqRepository::new(pool);

        let created = repo
            .create(&request("Fees", "What are the fees?", Some("fees, tuition")))
            .await
            .unwrap();
        let found = repo.find(created.id).await.unwrap().expect("entry exists");
        assert_eq!(found, created);

        let updated = repo
            .update(
                created.id,
                &UpdateFaqRequest {
                    answer: Some("Updated".into()),
                    keywords: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.answer, "Updated");
        assert_eq!(updated.question, "What are the fees?");
        assert!(updated.keywords.is_none());

        repo.delete(created.id).await.unwrap();
        assert!(repo.find(created.id).await.unwrap().is_none());
        assert!(repo.delete(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_missing_entry_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let repo = FaqRepository::new(pool);

        let error = repo
            .update(404, &UpdateFaqRequest::default())
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn list_filters_by_category_and_search_term() {
        let (pool, _dir) = test_pool().await;
        let repo = FaqRepository::new(pool);

        repo.create(&request("Fees", "How do I pay tuition?", Some("payment")))
            .await
            .unwrap();
        repo.create(&request("Admissions", "How do I apply?", Some("apply")))
            .await
            .unwrap();
        repo.create(&request("Support", "How do I reset my password?", None))
            .await
            .unwrap();

        let all = repo.list(&FaqFilter::default()).await.unwrap();
        let categories: Vec<_> = all.iter().map(|faq| faq.category.as_str()).collect();
        assert_eq!(categories, vec!["Admissions", "Fees", "Support"]);

        let fees = repo
            .list(&FaqFilter {
                category: Some("Fees".into()),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(fees.len(), 1);

        let search = repo
            .list(&FaqFilter {
                category: None,
                search: Some("PAYMENT".into()),
            })
            .await
            .unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].category, "Fees");

        assert_eq!(repo.categories().await.unwrap(), vec!["Admissions", "Fees", "Support"]);
        assert_eq!(repo.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upsert_by_question_overwrites_existing_entry() {
        let (pool, _dir) = test_pool().await;
        let repo = FaqRepository::new(pool);

        let first = repo
            .upsert_by_question(&request("General", "Where is GSU located?", None))
            .await
            .unwrap();
        let mut changed = request("Campus", "Where is GSU located?", Some("campus"));
        changed.answer = "Gwanda and Filabusi.".into();
        let second = repo.upsert_by_question(&changed).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.category, "Campus");
        assert_eq!(second.answer, "Gwanda and Filabusi.");
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }
}
