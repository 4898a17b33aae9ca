//! Fixed phrase templates ("Yo quiero ___").
//!
//! A template matches when its prefix ids are the tail of the sentence; its
//! fills are offered as slot completions.

use std::collections::HashMap;

use serde::Serialize;

use crate::vocabulary::Word;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub prefix_word_ids: &'static [&'static str],
    pub slot_hint: &'static str,
    pub suggested_fill_ids: &'static [&'static str],
}

const PLACES: &[&str] = &["bano", "recreo", "cocina_lugar", "sala"];

static TEMPLATES: [PhraseTemplate; 6] = [
    PhraseTemplate {
        id: "yo_quiero",
        label: "Yo quiero ___",
        prefix_word_ids: &["yo", "quiero"],
        slot_hint: "comida, jugar, ir...",
        suggested_fill_ids: &["comer", "beber", "jugar", "dormir", "ir", "agua", "comida"],
    },
    PhraseTemplate {
        id: "necesito",
        label: "Necesito ___",
        prefix_word_ids: &["necesito"],
        slot_hint: "ayuda, baño, agua...",
        suggested_fill_ids: &["ayudar", "bano", "agua", "comida", "medicina"],
    },
    PhraseTemplate {
        id: "donde_esta",
        label: "¿Dónde está ___?",
        prefix_word_ids: &["donde_pregunta"],
        slot_hint: "mamá, baño, comida...",
        suggested_fill_ids: &["mama", "papa", "bano", "comida", "juguete", "amigo"],
    },
    PhraseTemplate {
        id: "me_duele",
        label: "Me duele ___",
        prefix_word_ids: &["me_duele"],
        slot_hint: "cabeza, estómago...",
        suggested_fill_ids: &["cabeza", "estomago", "mano", "pie"],
    },
    PhraseTemplate {
        id: "puedo_ir",
        label: "¿Puedo ir ___?",
        prefix_word_ids: &["puedo", "ir"],
        slot_hint: "baño, recreo...",
        suggested_fill_ids: PLACES,
    },
    PhraseTemplate {
        id: "quiero_ir",
        label: "Quiero ir ___",
        prefix_word_ids: &["quiero", "ir"],
        slot_hint: "casa, escuela...",
        suggested_fill_ids: PLACES,
    },
];

/// The built-in phrase templates.
pub fn default_templates() -> &'static [PhraseTemplate] {
    &TEMPLATES
}

impl PhraseTemplate {
    /// True when the template's prefix is the tail of the sentence.
    pub fn matches(&self, sentence: &[Word]) -> bool {
        let prefix = self.prefix_word_ids;
        if prefix.is_empty() || prefix.len() > sentence.len() {
            return false;
        }
        sentence[sentence.len() - prefix.len()..]
            .iter()
            .zip(prefix)
            .all(|(word, id)| word.id == *id)
    }

    /// Resolve the fill ids against the vocabulary, skipping unknown ids.
    pub fn resolve_fills(&self, vocabulary: &[Word]) -> Vec<Word> {
        let by_id: HashMap<&str, &Word> = vocabulary.iter().map(|w| (w.id.as_str(), w)).collect();
        self.suggested_fill_ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|w| (*w).clone()))
            .collect()
    }
}

/// Templates whose prefix ends the sentence, in table order.
pub fn matching_templates(sentence: &[Word]) -> Vec<&'static PhraseTemplate> {
    TEMPLATES.iter().filter(|t| t.matches(sentence)).collect()
}
