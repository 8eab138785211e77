use smartassist_database::{CreateFaqRequest, FaqEntry, FaqFilter, FaqRepository, UpdateFaqRequest};
use sqlx::SqlitePool;

use crate::error::FieldErrors;
use crate::services::ServiceError;

/// Raw create payload. Every field is optional so missing fields surface as 422s.
#[derive(Debug, Clone, Default)]
pub struct FaqDraft {
    pub category: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub keywords: Option<String>,
}

pub async fn list(pool: &SqlitePool, filter: &FaqFilter) -> Result<Vec<FaqEntry>, ServiceError> {
    let repo = FaqRepository::new(pool.clone());
    Ok(repo.list(filter).await?)
}

pub async fn categories(pool: &SqlitePool) -> Result<Vec<String>, ServiceError> {
    Ok(FaqRepository::new(pool.clone()).categories().await?)
}

pub async fn find(pool: &SqlitePool, id: i64) -> Result<FaqEntry, ServiceError> {
    FaqRepository::new(pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("FAQ not found."))
}

pub async fn create(pool: &SqlitePool, draft: FaqDraft) -> Result<FaqEntry, ServiceError> {
    let mut errors = FieldErrors::default();
    let category = errors.require("category", draft.category.as_deref());
    let question = errors.require("question", draft.question.as_deref());
    let answer = errors.require("answer", draft.answer.as_deref());

    let (Some(category), Some(question), Some(answer)) = (category, question, answer) else {
        return Err(errors.into());
    };

    let request = CreateFaqRequest {
        category,
        question,
        answer,
        keywords: clean_keywords(draft.keywords),
    };
    Ok(FaqRepository::new(pool.clone()).create(&request).await?)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    changes: UpdateFaqRequest,
) -> Result<FaqEntry, ServiceError> {
    let mut errors = FieldErrors::default();
    let request = UpdateFaqRequest {
        category: present(&mut errors, "category", changes.category),
        question: present(&mut errors, "question", changes.question),
        answer: present(&mut errors, "answer", changes.answer),
        keywords: changes.keywords.map(clean_keywords),
    };
    if !errors.is_empty() {
        return Err(errors.into());
    }

    FaqRepository::new(pool.clone())
        .update(id, &request)
        .await
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::NotFound(_) => ServiceError::not_found("FAQ not found."),
            other => other,
        })
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ServiceError> {
    FaqRepository::new(pool.clone())
        .delete(id)
        .await
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::NotFound(_) => ServiceError::not_found("FAQ not found."),
            other => other,
        })
}

/// A field sent in an update must not be blank.
fn present(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    value.and_then(|value| errors.require(field, Some(&value)))
}

fn clean_keywords(keywords: Option<String>) -> Option<String> {
    keywords
        .map(|keywords| keywords.trim().to_string())
        .filter(|keywords| !keywords.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keywords_are_cleared() {
        assert_eq!(clean_keywords(Some("   ".into())), None);
        assert_eq!(clean_keywords(None), None);
        assert_eq!(clean_keywords(Some(" fees, tuition ".into())), Some("fees, tuition".into()));
    }

    #[test]
    fn present_ignores_absent_fields_and_rejects_blank_ones() {
        let mut errors = FieldErrors::default();
        assert_eq!(present(&mut errors, "answer", None), None);
        assert!(errors.is_empty());

        assert_eq!(present(&mut errors, "answer", Some(" ".into())), None);
        assert!(!errors.is_empty());
    }
}
