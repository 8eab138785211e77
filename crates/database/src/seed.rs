//! Sample knowledge base content for fresh installations.

use sqlx::SqlitePool;
use tracing::info;

use crate::entities::CreateFaqRequest;
use crate::repos::FaqRepository;
use crate::types::DatabaseResult;

const SAMPLE_FAQS: &[(&str, &str, &str, &str)] = &[
    (
        "Admissions",
        "How do I apply for a programme at GSU?",
        "You can apply online through our portal at apply.gsu.ac.zw or download the application form and submit it to the Admissions Office.",
        "apply, admission, application",
    ),
    (
        "Fees",
        "What are the current tuition fees?",
        "Fees vary by programme. Please visit our website gsu.ac.zw/fees for the latest fee schedule.",
        "fees, tuition, payment",
    ),
    (
        "Support",
        "How do I contact ICTS support?",
        "You can contact ICTS via email at support@gsu.ac.zw or visit our office at the Main Campus, Computing Lab 1.",
        "icts, tech, help, support",
    ),
    (
        "General",
        "Where is GSU located?",
        "Gwanda State University has campuses in Gwanda (Main) and Filabusi.",
        "location, address, campus",
    ),
];

pub fn sample_faqs() -> Vec<CreateFaqRequest> {
    SAMPLE_FAQS
        .iter()
        .map(|(category, question, answer, keywords)| CreateFaqRequest {
            category: category.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            keywords: Some(keywords.to_string()),
        })
        .collect()
}

/// Upsert the sample FAQs keyed by question. Safe to run repeatedly.
pub async fn seed_knowledge_base(pool: &SqlitePool) -> DatabaseResult<usize> {
    let repo = FaqRepository::new(pool.clone());
    let faqs = sample_faqs();

    for faq in &faqs {
        repo.upsert_by_question(faq).await?;
    }

    info!(count = faqs.len(), "seeded knowledge base");
    Ok(faqs.len())
}
