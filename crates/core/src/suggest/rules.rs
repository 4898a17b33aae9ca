//! Deterministic grammar-aware rule engine.
//!
//! Maps the tail of the sentence to candidate next words using a static rule
//! table. Works offline and never fails; it is the fallback for every remote
//! failure mode.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::templates::{self, PhraseTemplate};
use crate::vocabulary::{Word, WordCategory};

/// Ids suggested when no word in the sentence yields a useful rule.
pub const GENERIC_FALLBACK_IDS: [&str; 8] =
    ["yo", "quiero", "comer", "ir", "agua", "si", "no", "por_favor"];

/// What a rule reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RuleTrigger {
    /// A specific word id.
    Word(String),
    /// Any word of a category.
    Category(WordCategory),
}

/// A single suggestion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRule {
    pub trigger: RuleTrigger,
    /// Suggested ids, in priority order.
    pub suggested_word_ids: Vec<String>,
}

impl SuggestionRule {
    pub fn for_word(word_id: &str, suggested: &[&str]) -> Self {
        Self {
            trigger: RuleTrigger::Word(word_id.to_string()),
            suggested_word_ids: suggested.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn for_category(category: WordCategory, suggested: &[&str]) -> Self {
        Self {
            trigger: RuleTrigger::Category(category),
            suggested_word_ids: suggested.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The default rule table.
pub fn default_rules() -> Vec<SuggestionRule> {
    const WANT: &[&str] = &["comer", "beber", "jugar", "dormir", "ir", "agua", "comida"];
    const NEED: &[&str] = &["ayudar", "bano", "agua", "comida", "medicina", "ir"];
    const HAVE: &[&str] = &["hambre", "sed", "frio_emocion", "calor"];
    const CAN: &[&str] = &["ir", "jugar", "comer", "beber", "hablar", "ver"];
    const LIKE: &[&str] = &["comer", "jugar", "musica", "comida", "pelota"];

    let mut rules = vec![
        // Pronouns -> correctly conjugated verbs
        SuggestionRule::for_word("yo", &["quiero", "necesito", "tengo", "puedo", "me_gusta"]),
        SuggestionRule::for_word("tu", &["quieres", "necesitas", "tienes", "puedes", "te_gusta"]),
        SuggestionRule::for_word("el", &["quiere", "necesita", "tiene", "puede", "le_gusta"]),
        SuggestionRule::for_word("ella", &["quiere", "necesita", "tiene", "puede", "le_gusta"]),
        SuggestionRule::for_word(
            "nosotros",
            &["queremos", "necesitamos", "tenemos", "podemos", "nos_gusta"],
        ),
        SuggestionRule::for_word(
            "ellos",
            &["quieren", "necesitan", "tienen", "pueden", "les_gusta"],
        ),
    ];

    // Conjugated verbs -> objects/actions
    for id in ["quiero", "quieres", "quiere", "queremos", "quieren"] {
        rules.push(SuggestionRule::for_word(id, WANT));
    }
    for id in ["necesito", "necesitas", "necesita", "necesitamos", "necesitan"] {
        rules.push(SuggestionRule::for_word(id, NEED));
    }
    rules.push(SuggestionRule::for_word(
        "tengo",
        &["hambre", "sed", "frio_emocion", "calor", "me_duele"],
    ));
    for id in ["tienes", "tiene", "tenemos", "tienen"] {
        rules.push(SuggestionRule::for_word(id, HAVE));
    }
    for id in ["puedo", "puedes", "puede", "podemos", "pueden"] {
        rules.push(SuggestionRule::for_word(id, CAN));
    }
    for id in ["me_gusta", "te_gusta", "le_gusta", "nos_gusta", "les_gusta"] {
        rules.push(SuggestionRule::for_word(id, LIKE));
    }

    // Question words
    rules.extend([
        SuggestionRule::for_word("donde_pregunta", &["mama", "papa", "bano", "comida", "juguete"]),
        SuggestionRule::for_word("que_pregunta", &["quiero", "comer", "comida", "jugar"]),
        SuggestionRule::for_word("cuando_pregunta", &["comer", "jugar", "ir", "dormir"]),
        SuggestionRule::for_word("por_que", &["no", "si", "triste", "enojado"]),
    ]);

    // Category fallbacks
    rules.extend([
        SuggestionRule::for_category(
            WordCategory::Verbos,
            &["agua", "comida", "bano", "mama", "papa", "amigo"],
        ),
        SuggestionRule::for_category(
            WordCategory::Emociones,
            &["ayudar", "mama", "papa", "por_favor"],
        ),
    ]);

    rules
}

/// Rule engine over an immutable rule table.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<SuggestionRule>,
    fallback_ids: Vec<String>,
    /// First rule per word id.
    word_rules: HashMap<String, usize>,
    /// First rule per category, indexed by `WordCategory::index`.
    category_rules: [Option<usize>; WordCategory::COUNT],
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleEngine {
    /// Create an engine over the given rules. When several rules share a
    /// trigger, the first one wins.
    pub fn new(rules: Vec<SuggestionRule>) -> Self {
        let mut word_rules = HashMap::new();
        let mut category_rules = [None; WordCategory::COUNT];

        for (i, rule) in rules.iter().enumerate() {
            match &rule.trigger {
                RuleTrigger::Word(id) => {
                    word_rules.entry(id.clone()).or_insert(i);
                }
                RuleTrigger::Category(category) => {
                    category_rules[category.index()].get_or_insert(i);
                }
            }
        }

        Self {
            rules,
            fallback_ids: GENERIC_FALLBACK_IDS.iter().map(|s| s.to_string()).collect(),
            word_rules,
            category_rules,
        }
    }

    pub fn rules(&self) -> &[SuggestionRule] {
        &self.rules
    }

    /// The rule that applies to a word: its specific rule, else its category rule.
    pub fn rule_for(&self, word: &Word) -> Option<&SuggestionRule> {
        self.word_rules
            .get(&word.id)
            .or_else(|| self.category_rules[word.category.index()].as_ref())
            .map(|&i| &self.rules[i])
    }

    /// Phrase templates completed by the tail of the sentence.
    pub fn matching_templates(&self, sentence: &[Word]) -> Vec<&'static PhraseTemplate> {
        templates::matching_templates(sentence)
    }

    /// Suggest next words for the sentence.
    ///
    /// Scans from the last word backward and returns the first rule that still
    /// yields unused, known words. Falls back to the generic list; an empty
    /// sentence gets nothing.
    pub fn suggest(&self, sentence: &[Word], vocabulary: &[Word]) -> Vec<Word> {
        if sentence.is_empty() {
            return Vec::new();
        }

        let by_id: HashMap<&str, &Word> = vocabulary.iter().map(|w| (w.id.as_str(), w)).collect();
        let used: HashSet<&str> = sentence.iter().map(|w| w.id.as_str()).collect();

        for word in sentence.iter().rev() {
            let Some(rule) = self.rule_for(word) else {
                continue;
            };
            let resolved = resolve_unused(&rule.suggested_word_ids, &by_id, &used);
            if !resolved.is_empty() {
                return resolved;
            }
        }

        resolve_unused(&self.fallback_ids, &by_id, &used)
    }
}

fn resolve_unused(
    ids: &[String],
    by_id: &HashMap<&str, &Word>,
    used: &HashSet<&str>,
) -> Vec<Word> {
    ids.iter()
        .filter(|id| !used.contains(id.as_str()))
        .filter_map(|id| by_id.get(id.as_str()).map(|w| (*w).clone()))
        .collect()
}
