//! FAQ knowledge snapshots.
//!
//! The tenant's FAQ entries are paged out of the store and serialized to a
//! JSON array injected into the prompt. Soft-fails to an empty snapshot:
//! missing knowledge degrades the answer, it does not block it.

use frontdesk_core::model::ClientId;
use frontdesk_store::Store;
use serde::Serialize;
use tracing::warn;

/// Page size per store read.
const PAGE_SIZE: usize = 200;

/// Ceiling on pages fetched, bounding prompt growth for large tenants.
const MAX_PAGES: usize = 5;

#[derive(Serialize)]
struct KbEntry {
    question: String,
    answer: String,
}

/// Serialize the tenant's FAQ knowledge to a compact JSON array.
///
/// Entries missing a question or answer are dropped. Returns an empty
/// string when nothing usable exists or the store fails.
pub async fn knowledge_snapshot(store: &dyn Store, client_id: &ClientId) -> String {
    let mut entries: Vec<KbEntry> = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let (page, next) = match store.page_faqs(client_id, PAGE_SIZE, cursor.as_deref()).await {
            Ok(r) => r,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "FAQ snapshot failed");
                return String::new();
            }
        };
        entries.extend(
            page.into_iter()
                .filter(|e| !e.question.is_empty() && !e.answer.is_empty())
                .map(|e| KbEntry {
                    question: e.question,
                    answer: e.answer,
                }),
        );
        cursor = next;
        if cursor.is_none() {
            break;
        }
    }

    if entries.is_empty() {
        return String::new();
    }
    serde_json::to_string(&entries).unwrap_or_default()
}
