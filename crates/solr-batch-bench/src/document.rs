use serde::Serialize;
use uuid::Uuid;

/// One synthetic document. The id is the 1-based ordinal of the document
/// within the trial, the payload is an opaque UUID.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Builds the next batch of a trial: `batch_size` documents, or fewer when
/// fewer than `batch_size` remain before `total_docs` is reached.
pub fn synthesize_batch(batch_size: u32, total_docs: u64, already_submitted: u64) -> Vec<Document> {
    let remaining = total_docs.saturating_sub(already_submitted);
    let count = remaining.min(u64::from(batch_size));
    (0..count)
        .map(|offset| Document {
            id: (already_submitted + offset + 1).to_string(),
            text: Uuid::new_v4().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn short_last_batch() {
        assert_eq!(synthesize_batch(3, 10, 0).len(), 3);
        assert_eq!(synthesize_batch(3, 10, 9).len(), 1);
        assert_eq!(synthesize_batch(3, 6, 3).len(), 3);
        assert!(synthesize_batch(3, 10, 10).is_empty());
    }

    #[test]
    fn ids_are_sequential_and_unique() {
        let mut ids = HashSet::new();
        let mut submitted = 0;
        while submitted < 10 {
            let batch = synthesize_batch(4, 10, submitted);
            submitted += batch.len() as u64;
            for doc in batch {
                assert!(ids.insert(doc.id));
            }
        }
        let expected: HashSet<String> = (1..=10u64).map(|id| id.to_string()).collect();
        assert_eq!(ids, expected);
    }
}
