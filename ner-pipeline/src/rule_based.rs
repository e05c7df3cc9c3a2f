//! # Tagger por Regras — Gazetteers e Padrões Regex
//!
//! Implementação concreta de [`EntityTagger`] usada pela linha de comando:
//!
//! 1. **Gazetteer**: nomes conhecidos, cada um com seu tipo OntoNotes,
//!    casados sobre tokens (sem diferenciar maiúsculas) com preferência
//!    pelo nome mais longo.
//! 2. **Regex**: valores monetários, percentuais, datas, ordinais e
//!    cardinais, aplicados apenas ao que o gazetteer não cobriu.
//!
//! ## Formato do gazetteer
//!
//! ```json
//! { "PERSON": ["Marie Curie"], "GPE": ["Warsaw", "Paris"] }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{Error, Result};
use crate::mention::{EntityMention, EntityType};
use crate::tagger::EntityTagger;
use crate::tokenizer::{tokenize, Token};

/// Listas de nomes conhecidos, indexadas pelo primeiro token (lowercase).
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    /// primeiro token → [(tokens do nome, tipo)], do nome mais longo ao mais curto
    entries: HashMap<String, Vec<(Vec<String>, EntityType)>>,
    len: usize,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona um nome; nomes vazios ou repetidos são ignorados.
    pub fn add(&mut self, name: &str, ty: EntityType) {
        let parts: Vec<String> = tokenize(name).into_iter().map(|t| t.text.to_lowercase()).collect();
        let Some(first) = parts.first().cloned() else {
            return;
        };
        let bucket = self.entries.entry(first).or_default();
        if bucket.iter().any(|(p, _)| *p == parts) {
            return;
        }
        bucket.push((parts, ty));
        bucket.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self.len += 1;
    }

    /// Carrega um gazetteer JSON `{rótulo: [nome, ...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let raw: HashMap<String, Vec<String>> = serde_json::from_reader(BufReader::new(file))?;
        Self::from_map(raw)
    }

    /// Monta o gazetteer a partir de `{rótulo: [nome, ...]}`.
    ///
    /// Um rótulo fora do vocabulário OntoNotes é erro.
    pub fn from_map(raw: HashMap<String, Vec<String>>) -> Result<Self> {
        let mut gazetteer = Self::new();
        for (label, names) in raw {
            let ty = EntityType::from_label(&label)
                .ok_or_else(|| Error::tagger(format!("unknown entity label {label:?} in gazetteer")))?;
            for name in names {
                gazetteer.add(&name, ty);
            }
        }
        Ok(gazetteer)
    }

    /// Quantidade de nomes distintos.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nome mais longo que começa no token `i`: (quantidade de tokens, tipo).
    fn longest_match(&self, lowered: &[String], i: usize) -> Option<(usize, EntityType)> {
        let bucket = self.entries.get(&lowered[i])?;
        bucket
            .iter()
            .find(|(parts, _)| lowered[i..].starts_with(parts))
            .map(|(parts, ty)| (parts.len(), *ty))
    }
}

/// Padrões numéricos/temporais, em ordem de prioridade.
fn patterns() -> &'static [(Regex, EntityType)] {
    static PATTERNS: OnceLock<Vec<(Regex, EntityType)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December";
        let date = format!(
            r"\b(?:{MONTHS})\s+\d{{1,2}}(?:,\s*\d{{4}})?\b|\b(?:{MONTHS})\s+\d{{4}}\b|\b(?:1[5-9]|20)\d{{2}}\b"
        );
        [
            (r"\$\s?\d[\d,]*(?:\.\d+)?(?:\s(?:million|billion|trillion))?", EntityType::Money),
            (r"\b\d+(?:\.\d+)?(?:\s?%|\s(?:percent|per cent))", EntityType::Percent),
            (date.as_str(), EntityType::Date),
            (r"\b\d+(?:st|nd|rd|th)\b", EntityType::Ordinal),
            (r"\b\d[\d,]*(?:\.\d+)?\b", EntityType::Cardinal),
        ]
        .into_iter()
        .map(|(p, ty)| (Regex::new(p).expect("valid entity pattern"), ty))
        .collect()
    })
}

/// Tagger baseado em gazetteer + regex.
///
/// O gazetteer é imutável e fica atrás de um `Arc`, então construir um
/// tagger por worker é barato.
#[derive(Debug, Clone)]
pub struct RuleTagger {
    gazetteer: Arc<Gazetteer>,
}

impl RuleTagger {
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self { gazetteer }
    }

    fn gazetteer_spans(&self, text: &str, tokens: &[Token]) -> Vec<EntityMention> {
        let lowered: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
        let mut spans = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match self.gazetteer.longest_match(&lowered, i) {
                Some((len, ty)) => {
                    let (start, end) = (tokens[i].start, tokens[i + len - 1].end);
                    spans.push(EntityMention::typed(char_slice(text, start, end), start, end, ty));
                    i += len;
                }
                None => i += 1,
            }
        }
        spans
    }
}

impl EntityTagger for RuleTagger {
    fn tag(&mut self, text: &str) -> Result<Vec<EntityMention>> {
        let tokens = tokenize(text);
        let mut mentions = self.gazetteer_spans(text, &tokens);

        for (pattern, ty) in patterns() {
            for m in pattern.find_iter(text) {
                let start = text[..m.start()].chars().count();
                let end = start + m.as_str().chars().count();
                let overlaps = mentions.iter().any(|e| start < e.end && e.start < end);
                if !overlaps {
                    mentions.push(EntityMention::typed(m.as_str(), start, end, *ty));
                }
            }
        }

        mentions.sort_by_key(|m| m.start);
        Ok(mentions)
    }
}

/// Recorta `text` pelos offsets de caractere `[start, end)`.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> RuleTagger {
        let mut gaz = Gazetteer::new();
        gaz.add("Marie Curie", EntityType::Person);
        gaz.add("Marie", EntityType::Person);
        gaz.add("Warsaw", EntityType::Gpe);
        gaz.add("University of Paris", EntityType::Org);
        RuleTagger::new(Arc::new(gaz))
    }

    #[test]
    fn test_longest_gazetteer_match_wins() {
        let ents = tagger().tag("Marie Curie was born in Warsaw").unwrap();
        assert_eq!(
            ents,
            vec![
                EntityMention::new("Marie Curie", 0, 11, "PERSON"),
                EntityMention::new("Warsaw", 24, 30, "GPE"),
            ]
        );
    }

    #[test]
    fn test_gazetteer_is_case_insensitive_but_keeps_surface_text() {
        let ents = tagger().tag("She taught at the university of paris.").unwrap();
        assert_eq!(ents.len(), 1);
        assert_eq!(ents[0].text, "university of paris");
        assert_eq!(ents[0].label, "ORG");
    }

    #[test]
    fn test_numeric_and_temporal_rules() {
        let ents = tagger()
            .tag("In 1903 she won 2 prizes worth $15,000 on December 10, 1911.")
            .unwrap();
        let labels: Vec<(&str, &str)> = ents.iter().map(|e| (e.text.as_str(), e.label.as_str())).collect();
        assert_eq!(
            labels,
            vec![
                ("1903", "DATE"),
                ("2", "CARDINAL"),
                ("$15,000", "MONEY"),
                ("December 10, 1911", "DATE"),
            ]
        );
    }

    #[test]
    fn test_char_offsets_with_accents() {
        let ents = tagger().tag("Após 1900, Warsaw").unwrap();
        let warsaw = ents.iter().find(|e| e.label == "GPE").unwrap();
        assert_eq!((warsaw.start, warsaw.end), (11, 17));
    }

    #[test]
    fn test_unknown_gazetteer_label_is_rejected() {
        let raw = HashMap::from([("PER".to_string(), vec!["Lula".to_string()])]);
        assert!(matches!(Gazetteer::from_map(raw), Err(Error::Tagger(_))));
    }
}
