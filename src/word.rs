use serde::{Deserialize, Serialize};

/// Study status a learner can attach to a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordTag {
    Skip,
    Easy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordItem {
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<WordTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_count: Option<u32>,
}

impl WordItem {
    /// Fresh record as produced by the parser: no tag, zero recalls.
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            tag: None,
            correct_count: Some(0),
        }
    }

    /// Words tagged `skip` or `easy` are left out of study sessions.
    pub fn is_retired(&self) -> bool {
        self.tag.is_some()
    }

    pub fn progress(&self) -> WordProgressPayload {
        WordProgressPayload {
            word: self.word.clone(),
            correct_count: self.correct_count.unwrap_or(0),
        }
    }
}

/// Snapshot of a word's recall count, reported back after a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgressPayload {
    pub word: String,
    pub correct_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_item_serializes_without_tag() {
        let item = WordItem::new("cat", "animal");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "word": "cat", "meaning": "animal", "correctCount": 0 })
        );
    }

    #[test]
    fn tag_serializes_lowercase() {
        let mut item = WordItem::new("cat", "animal");
        item.tag = Some(WordTag::Easy);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""tag":"easy""#));
    }

    #[test]
    fn deserializes_record_without_optional_fields() {
        let item: WordItem = serde_json::from_str(r#"{"word":"dog","meaning":"pet"}"#).unwrap();
        assert_eq!(item.tag, None);
        assert_eq!(item.correct_count, None);
        assert!(!item.is_retired());
    }

    #[test]
    fn progress_defaults_missing_count_to_zero() {
        let item = WordItem {
            word: "dog".to_string(),
            meaning: "pet".to_string(),
            tag: Some(WordTag::Skip),
            correct_count: None,
        };
        assert_eq!(
            item.progress(),
            WordProgressPayload {
                word: "dog".to_string(),
                correct_count: 0,
            }
        );
        assert!(item.is_retired());
    }
}
