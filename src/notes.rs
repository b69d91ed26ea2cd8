use crate::enrichment;
use crate::errors::{AppError, AppResult};
use crate::models::{ExampleStrategy, LinkEntry, NoteRecord, VocabularyEntry};

impl NoteRecord {
    pub fn prepend_vocabulary(&mut self, entry: VocabularyEntry) {
        self.vocabulary.insert(0, entry);
    }

    pub fn select_meaning(
        &mut self,
        entry_index: usize,
        meaning_index: usize,
        strategy: ExampleStrategy,
    ) -> AppResult<&VocabularyEntry> {
        let total = self.vocabulary.len();
        let entry = self
            .vocabulary
            .get_mut(entry_index)
            .ok_or_else(|| out_of_range("vocabulary entry", entry_index, total))?;
        enrichment::select_meaning(entry, meaning_index, strategy)?;
        Ok(entry)
    }

    pub fn remove_vocabulary(&mut self, entry_index: usize) -> AppResult<VocabularyEntry> {
        if entry_index >= self.vocabulary.len() {
            return Err(out_of_range("vocabulary entry", entry_index, self.vocabulary.len()));
        }
        Ok(self.vocabulary.remove(entry_index))
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    pub fn prepend_link(&mut self, link: LinkEntry) -> AppResult<()> {
        if link.url.trim().is_empty() {
            return Err(AppError::InvalidInput("Link URL cannot be empty".to_string()));
        }
        self.link.insert(0, link);
        Ok(())
    }

    /// Every vocabulary entry needs a word and every link a URL.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(index) = self.vocabulary.iter().position(|entry| entry.vocab.trim().is_empty()) {
            return Err(AppError::InvalidInput(format!("Vocabulary entry {} has no word", index)));
        }
        if let Some(index) = self.link.iter().position(|link| link.url.trim().is_empty()) {
            return Err(AppError::InvalidInput(format!("Link {} has no URL", index)));
        }
        Ok(())
    }

    pub fn remove_link(&mut self, link_index: usize) -> AppResult<LinkEntry> {
        if link_index >= self.link.len() {
            return Err(out_of_range("link", link_index, self.link.len()));
        }
        Ok(self.link.remove(link_index))
    }
}

fn out_of_range(what: &str, index: usize, len: usize) -> AppError {
    AppError::InvalidInput(format!("No {} at index {} ({} present)", what, index, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Meaning, Sense};

    fn word(vocab: &str) -> VocabularyEntry {
        VocabularyEntry {
            vocab: vocab.to_string(),
            ..VocabularyEntry::default()
        }
    }

    #[test]
    fn vocabulary_is_newest_first() {
        let mut record = NoteRecord::default();
        record.prepend_vocabulary(word("first"));
        record.prepend_vocabulary(word("second"));
        let order: Vec<_> = record.vocabulary.iter().map(|entry| entry.vocab.as_str()).collect();
        assert_eq!(order, vec!["second", "first"]);
    }

    #[test]
    fn blank_words_and_urls_fail_validation() {
        let mut record = NoteRecord::default();
        record.prepend_vocabulary(word("kept"));
        assert!(record.validate().is_ok());
        record.prepend_vocabulary(word(" "));
        assert!(matches!(record.validate(), Err(AppError::InvalidInput(_))));

        let record = NoteRecord {
            link: vec![LinkEntry {
                url: String::new(),
                description: Some("orphan".to_string()),
            }],
            ..NoteRecord::default()
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn removing_out_of_range_is_rejected() {
        let mut record = NoteRecord::default();
        record.prepend_vocabulary(word("only"));
        assert!(record.remove_vocabulary(3).is_err());
        assert_eq!(record.remove_vocabulary(0).expect("remove").vocab, "only");
        assert!(record.vocabulary.is_empty());
        assert!(record.remove_link(0).is_err());
    }

    #[test]
    fn text_can_be_set_and_cleared() {
        let mut record = NoteRecord::default();
        record.set_text("met the reading group");
        assert_eq!(record.text, "met the reading group");
        record.clear_text();
        assert!(record.is_empty());
    }

    #[test]
    fn links_require_a_url() {
        let mut record = NoteRecord::default();
        assert!(record
            .prepend_link(LinkEntry {
                url: "  ".to_string(),
                description: None,
            })
            .is_err());
        record
            .prepend_link(LinkEntry {
                url: "https://a.example".to_string(),
                description: None,
            })
            .expect("first link");
        record
            .prepend_link(LinkEntry {
                url: "https://b.example".to_string(),
                description: Some("second".to_string()),
            })
            .expect("second link");
        assert_eq!(record.link[0].url, "https://b.example");
        assert_eq!(record.remove_link(1).expect("remove").url, "https://a.example");
    }

    #[test]
    fn selecting_meaning_only_touches_target_entry() {
        let mut record = NoteRecord::default();
        record.prepend_vocabulary(word("untouched"));
        let mut target = word("bank");
        target.meanings = vec![
            Meaning {
                part_of_speech: "noun".to_string(),
                definitions: vec![Sense {
                    definition: "land beside a river".to_string(),
                    example: None,
                }],
            },
            Meaning {
                part_of_speech: "verb".to_string(),
                definitions: vec![Sense {
                    definition: "deposit money".to_string(),
                    example: Some("I bank with them".to_string()),
                }],
            },
        ];
        record.prepend_vocabulary(target);
        record.set_text("keep me");

        let selected = record
            .select_meaning(0, 1, ExampleStrategy::UpToThree)
            .expect("select")
            .clone();
        assert_eq!(selected.part_of_speech, "verb");
        assert_eq!(selected.definitions, vec!["deposit money"]);
        assert_eq!(record.vocabulary[1], word("untouched"));
        assert_eq!(record.text, "keep me");
        assert!(record.select_meaning(5, 0, ExampleStrategy::UpToThree).is_err());
    }
}
