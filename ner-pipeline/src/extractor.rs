//! # Extração de Menções por Casamento Literal
//!
//! Encontra, numa sentença, ocorrências literais (sem diferenciar maiúsculas)
//! de rótulos candidatos: títulos dos documentos do contexto e, opcionalmente,
//! textos de entidades já marcadas no contexto.
//!
//! ## Algoritmo
//!
//! 1. Cada título perde o sufixo parentético de desambiguação
//!    (`"Paris (France)"` → `"Paris"`) e vira candidato `TITLE`.
//! 2. Cada texto do [`ContextPool`], com o mesmo corte de sufixo, vira
//!    candidato `CONTEXT`.
//! 3. Para cada candidato, na ordem acima, procura-se **apenas a primeira**
//!    ocorrência na sentença. Títulos emitem o texto do candidato; entidades
//!    de contexto emitem o trecho exato da sentença.
//!
//! Não há resolução de sobreposição nem deduplicação: dois candidatos podem
//! gerar menções sobrepostas ou repetidas. Candidatos ausentes não geram nada.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::mention::{EntityMention, Provenance};

/// Remove um sufixo parentético final: `"Mercury (planet)"` → `"Mercury"`.
pub fn strip_disambiguation(label: &str) -> Cow<'_, str> {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX
        .get_or_init(|| Regex::new(r" \(.*?\)$").expect("valid suffix pattern"))
        .replace(label, "")
}

/// Textos de entidades do contexto usados como candidatos da pergunta.
///
/// A ordem de iteração é a lexicográfica.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPool {
    texts: BTreeSet<String>,
}

impl ContextPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coleta os textos das menções de tipos alinhados; menções de
    /// proveniência (`TITLE`, `CONTEXT`) e tipos numéricos ficam de fora.
    pub fn from_context<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a [Vec<EntityMention>]>,
    {
        let texts = documents
            .into_iter()
            .flatten()
            .flatten()
            .filter(|m| m.is_aligned_type())
            .map(|m| m.text.clone())
            .collect();
        Self { texts }
    }

    pub fn insert(&mut self, text: impl Into<String>) {
        self.texts.insert(text.into());
    }

    /// Quantidade de textos distintos.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Textos em ordem lexicográfica.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().map(String::as_str)
    }
}

/// Casador literal de títulos e entidades de contexto.
///
/// Não guarda estado: a mesma instância serve para qualquer número de
/// sentenças e casos.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionExtractor;

impl MentionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Procura títulos (e entidades de contexto, se houver) em `sentence`.
    ///
    /// Retorna as menções `TITLE` primeiro e depois as `CONTEXT`, cada uma
    /// com offsets de caractere em `sentence`.
    pub fn find<S: AsRef<str>>(
        &self,
        sentence: &str,
        titles: &[S],
        context: Option<&ContextPool>,
    ) -> Vec<EntityMention> {
        if titles.is_empty() && context.map_or(true, ContextPool::is_empty) {
            return Vec::new();
        }
        let haystack: Vec<char> = sentence.chars().collect();
        let mut matched = Vec::new();

        for title in titles {
            let candidate = strip_disambiguation(title.as_ref());
            if let Some((start, end)) = find_ignore_case(&haystack, &candidate) {
                matched.push(EntityMention::literal(candidate.into_owned(), start, end, Provenance::Title));
            }
        }

        for text in context.into_iter().flat_map(|pool| pool.iter()) {
            let candidate = strip_disambiguation(text);
            if let Some((start, end)) = find_ignore_case(&haystack, &candidate) {
                let surface: String = haystack[start..end].iter().collect();
                matched.push(EntityMention::literal(surface, start, end, Provenance::Context));
            }
        }

        matched
    }
}

/// Primeira ocorrência de `needle` em `haystack`, comparando caractere a
/// caractere em minúsculas. Retorna offsets de caractere `[início, fim)`.
fn find_ignore_case(haystack: &[char], needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| {
            window
                .iter()
                .zip(&needle)
                .all(|(h, n)| h.to_lowercase().eq(n.to_lowercase()))
        })
        .map(|start| (start, start + needle.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::EntityType;

    #[test]
    fn test_strip_disambiguation() {
        assert_eq!(strip_disambiguation("Paris (France)"), "Paris");
        assert_eq!(strip_disambiguation("Paris"), "Paris");
        assert_eq!(strip_disambiguation("(Paris) Texas"), "(Paris) Texas");
        assert_eq!(strip_disambiguation("Mercury (planet) (astronomy)"), "Mercury");
    }

    #[test]
    fn test_title_match_strips_suffix_and_keeps_candidate_text() {
        let found = MentionExtractor::new().find("Paris is the capital.", &["Paris (France)"], None);
        assert_eq!(found, vec![EntityMention::new("Paris", 0, 5, "TITLE")]);
    }

    #[test]
    fn test_case_insensitive_and_first_occurrence_only() {
        let found = MentionExtractor::new().find("the BEATLES met the beatles", &["The Beatles"], None);
        assert_eq!(found, vec![EntityMention::new("The Beatles", 0, 11, "TITLE")]);
    }

    #[test]
    fn test_no_candidates_found() {
        let pool = {
            let mut p = ContextPool::new();
            p.insert("Warsaw");
            p
        };
        let found = MentionExtractor::new().find("Nothing relevant here", &["Marie Curie"], Some(&pool));
        assert!(found.is_empty());
    }

    #[test]
    fn test_context_match_uses_sentence_surface_text() {
        let mut pool = ContextPool::new();
        pool.insert("Warsaw");
        let found = MentionExtractor::new().find("Born in WARSAW?", &[] as &[&str], Some(&pool));
        assert_eq!(found, vec![EntityMention::new("WARSAW", 8, 14, "CONTEXT")]);
    }

    #[test]
    fn test_titles_before_context_and_overlaps_kept() {
        let mut pool = ContextPool::new();
        pool.insert("Marie Curie");
        pool.insert("Curie");
        let found = MentionExtractor::new().find(
            "Where was Marie Curie born?",
            &["Marie Curie (scientist)"],
            Some(&pool),
        );
        assert_eq!(
            found,
            vec![
                EntityMention::new("Marie Curie", 10, 21, "TITLE"),
                EntityMention::new("Curie", 16, 21, "CONTEXT"),
                EntityMention::new("Marie Curie", 10, 21, "CONTEXT"),
            ]
        );
    }

    #[test]
    fn test_offsets_are_characters() {
        let found = MentionExtractor::new().find("Em São Paulo", &["são paulo"], None);
        assert_eq!(found, vec![EntityMention::new("são paulo", 3, 12, "TITLE")]);
    }

    #[test]
    fn test_empty_candidate_is_skipped() {
        let found = MentionExtractor::new().find("anything", &[""], None);
        assert!(found.is_empty());
    }

    #[test]
    fn test_no_titles_and_empty_pool() {
        let pool = ContextPool::new();
        assert!(pool.is_empty());
        let found = MentionExtractor::new().find("Warsaw", &[] as &[&str], Some(&pool));
        assert!(found.is_empty());
    }

    #[test]
    fn test_pool_keeps_only_aligned_types() {
        let docs = vec![vec![vec![
            EntityMention::typed("Marie Curie", 0, 11, EntityType::Person),
            EntityMention::typed("1867", 20, 24, EntityType::Date),
            EntityMention::literal("Warsaw", 30, 36, Provenance::Title),
        ]]];
        let pool = ContextPool::from_context(docs.iter().map(Vec::as_slice));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.iter().collect::<Vec<_>>(), vec!["Marie Curie"]);
    }
}
