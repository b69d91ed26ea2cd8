use crate::errors::{AppError, AppResult};
use crate::lookup::DictionaryEntry;
use crate::models::{ExampleStrategy, Meaning, VocabularyEntry};

pub fn build_vocabulary_entry(
    word: &str,
    entries: &[DictionaryEntry],
    strategy: ExampleStrategy,
) -> AppResult<VocabularyEntry> {
    let word = word.trim();
    if word.is_empty() {
        return Err(AppError::InvalidInput("Word cannot be empty".to_string()));
    }
    let Some(entry) = entries.first() else {
        return Err(AppError::Enrichment(format!("No dictionary entries for '{}'", word)));
    };
    let Some(first) = entry.meanings.first() else {
        return Err(AppError::Enrichment(format!("Dictionary entry for '{}' has no meanings", word)));
    };

    Ok(VocabularyEntry {
        vocab: word.to_string(),
        part_of_speech: first.part_of_speech.clone(),
        pronunciation: resolve_pronunciation(entry),
        audio: entry
            .phonetics
            .first()
            .and_then(|phonetic| phonetic.audio.clone())
            .filter(|audio| !audio.is_empty()),
        definitions: definitions_of(first),
        examples: collect_examples(&entry.meanings, strategy.cap()),
        meanings: entry.meanings.clone(),
        selected_meaning: 0,
    })
}

pub fn select_meaning(
    entry: &mut VocabularyEntry,
    meaning_index: usize,
    strategy: ExampleStrategy,
) -> AppResult<()> {
    let Some(meaning) = entry.meanings.get(meaning_index) else {
        return Err(AppError::InvalidInput(format!(
            "'{}' has no meaning at index {} ({} available)",
            entry.vocab,
            meaning_index,
            entry.meanings.len()
        )));
    };

    let part_of_speech = meaning.part_of_speech.clone();
    let definitions = definitions_of(meaning);
    let examples = collect_examples(std::slice::from_ref(meaning), strategy.cap());

    entry.part_of_speech = part_of_speech;
    entry.definitions = definitions;
    entry.examples = examples;
    entry.selected_meaning = meaning_index;
    Ok(())
}

fn definitions_of(meaning: &Meaning) -> Vec<String> {
    meaning
        .definitions
        .iter()
        .map(|sense| sense.definition.clone())
        .collect()
}

pub fn collect_examples(meanings: &[Meaning], cap: usize) -> Vec<String> {
    meanings
        .iter()
        .flat_map(|meaning| meaning.definitions.iter())
        .filter_map(|sense| sense.example.as_deref())
        .filter(|example| !example.trim().is_empty())
        .take(cap)
        .map(ToString::to_string)
        .collect()
}

fn resolve_pronunciation(entry: &DictionaryEntry) -> String {
    if let Some(phonetic) = entry.phonetic.as_deref().filter(|text| !text.is_empty()) {
        return phonetic.to_string();
    }
    entry
        .phonetics
        .iter()
        .filter_map(|phonetic| phonetic.text.as_deref())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}
