//! # Alinhamento de Entidades Pergunta ↔ Contexto
//!
//! Para cada caso do dataset produz um índice de menções:
//!
//! - **Contexto**: para cada documento, as entidades pré-computadas de cada
//!   sentença, filtradas pela lista de tipos alinhados, seguidas das menções
//!   literais de **todos** os títulos do caso.
//! - **Pergunta**: entidades do tagger sobre a pergunta inteira, seguidas das
//!   menções literais de títulos e de entidades do contexto.
//!
//! As duas partes são concatenadas sem deduplicação.
//!
//! O processamento é sequencial; a única chamada externa é o tagger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{NerIndex, QuestionCase};
use crate::error::{Error, Result};
use crate::extractor::{ContextPool, MentionExtractor};
use crate::mention::EntityMention;
use crate::tagger::EntityTagger;

/// Menções de um caso alinhado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedCase {
    pub question: Vec<EntityMention>,
    /// (título, menções por sentença), na ordem do contexto do caso.
    pub context: Vec<(String, Vec<Vec<EntityMention>>)>,
}

/// Saída do alinhamento: guid → caso alinhado.
pub type Alignment = BTreeMap<String, AlignedCase>;

/// Alinhador sequencial de perguntas.
///
/// Dono do tagger usado nas perguntas; o NER do contexto vem pronto.
pub struct QuestionAligner<T> {
    /// Tagger aplicado à pergunta inteira, sem divisão em sentenças.
    tagger: T,
    extractor: MentionExtractor,
}

impl<T: EntityTagger> QuestionAligner<T> {
    /// Cria o alinhador com o tagger das perguntas.
    pub fn new(tagger: T) -> Self {
        Self {
            tagger,
            extractor: MentionExtractor::new(),
        }
    }

    /// Alinha todos os casos. Um guid repetido sobrescreve o anterior.
    pub fn align(&mut self, cases: &[QuestionCase], ner: &NerIndex) -> Result<Alignment> {
        let mut out = Alignment::new();
        for case in cases {
            let aligned = self.align_case(case, ner)?;
            out.insert(case.guid.clone(), aligned);
        }
        Ok(out)
    }

    /// Alinha um único caso: contexto primeiro, depois a pergunta.
    ///
    /// Falha se um título do contexto não está em `ner` ou se o número de
    /// sentenças difere.
    pub fn align_case(&mut self, case: &QuestionCase, ner: &NerIndex) -> Result<AlignedCase> {
        let titles = case.titles();
        let context = self.align_context(case, &titles, ner)?;

        let pool = ContextPool::from_context(context.iter().map(|(_, sents)| sents.as_slice()));
        let mut question = self.tagger.tag(&case.question)?;
        question.extend(self.extractor.find(&case.question, &titles, Some(&pool)));

        debug!(
            guid = %case.guid,
            question = question.len(),
            documents = context.len(),
            pool = pool.len(),
            "aligned case"
        );
        Ok(AlignedCase { question, context })
    }

    fn align_context(
        &self,
        case: &QuestionCase,
        titles: &[&str],
        ner: &NerIndex,
    ) -> Result<Vec<(String, Vec<Vec<EntityMention>>)>> {
        let mut context = Vec::with_capacity(case.context.len());
        for (title, sentences) in &case.context {
            let doc = ner.get(title).ok_or_else(|| Error::MissingTitle {
                guid: case.guid.clone(),
                title: title.clone(),
            })?;
            if doc.text_ner.len() != sentences.len() {
                return Err(Error::SentenceCountMismatch {
                    guid: case.guid.clone(),
                    title: title.clone(),
                    sentences: sentences.len(),
                    tagged: doc.text_ner.len(),
                });
            }

            let per_sentence = sentences
                .iter()
                .zip(&doc.text_ner)
                .map(|(sentence, tagged)| {
                    let mut mentions: Vec<EntityMention> =
                        tagged.iter().filter(|m| m.is_aligned_type()).cloned().collect();
                    mentions.extend(self.extractor.find(sentence, titles, None));
                    mentions
                })
                .collect();
            context.push((title.clone(), per_sentence));
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dataset::DocumentNer;
    use crate::mention::EntityType;
    use crate::rule_based::{Gazetteer, RuleTagger};

    fn tagger() -> RuleTagger {
        let mut gaz = Gazetteer::new();
        gaz.add("Marie Curie", EntityType::Person);
        gaz.add("Warsaw", EntityType::Gpe);
        RuleTagger::new(Arc::new(gaz))
    }

    fn curie_case() -> QuestionCase {
        QuestionCase {
            guid: "q1".into(),
            question: "Where was Marie Curie born?".into(),
            context: vec![(
                "Marie Curie (scientist)".into(),
                vec!["Marie Curie was born in Warsaw".into()],
            )],
        }
    }

    fn curie_ner() -> NerIndex {
        NerIndex::from([(
            "Marie Curie (scientist)".to_string(),
            DocumentNer {
                text_ner: vec![vec![
                    EntityMention::typed("Marie Curie", 0, 11, EntityType::Person),
                    EntityMention::typed("1867", 12, 16, EntityType::Date),
                    EntityMention::typed("Warsaw", 24, 30, EntityType::Gpe),
                ]],
            },
        )])
    }

    #[test]
    fn test_context_filters_types_and_appends_titles() {
        let mut aligner = QuestionAligner::new(tagger());
        let aligned = aligner.align_case(&curie_case(), &curie_ner()).unwrap();

        assert_eq!(aligned.context.len(), 1);
        let (title, sentences) = &aligned.context[0];
        assert_eq!(title, "Marie Curie (scientist)");
        assert_eq!(
            sentences[0],
            vec![
                EntityMention::new("Marie Curie", 0, 11, "PERSON"),
                EntityMention::new("Warsaw", 24, 30, "GPE"),
                EntityMention::new("Marie Curie", 0, 11, "TITLE"),
            ]
        );
    }

    #[test]
    fn test_question_tagger_then_literal_matches() {
        let mut aligner = QuestionAligner::new(tagger());
        let aligned = aligner.align_case(&curie_case(), &curie_ner()).unwrap();
        assert_eq!(
            aligned.question,
            vec![
                EntityMention::new("Marie Curie", 10, 21, "PERSON"),
                EntityMention::new("Marie Curie", 10, 21, "TITLE"),
                EntityMention::new("Marie Curie", 10, 21, "CONTEXT"),
            ]
        );
    }

    #[test]
    fn test_date_filtered_person_kept() {
        let case = QuestionCase {
            guid: "q2".into(),
            question: "Who?".into(),
            context: vec![("Doc".into(), vec!["Ada was born in 1815".into()])],
        };
        let ner = NerIndex::from([(
            "Doc".to_string(),
            DocumentNer {
                text_ner: vec![vec![
                    EntityMention::typed("Ada", 0, 3, EntityType::Person),
                    EntityMention::typed("1815", 16, 20, EntityType::Date),
                ]],
            },
        )]);
        let aligned = QuestionAligner::new(tagger()).align_case(&case, &ner).unwrap();
        assert_eq!(aligned.context[0].1, vec![vec![EntityMention::new("Ada", 0, 3, "PERSON")]]);
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let err = QuestionAligner::new(tagger())
            .align(&[curie_case()], &NerIndex::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingTitle { ref guid, .. } if guid == "q1"));
    }

    #[test]
    fn test_sentence_count_mismatch_is_fatal() {
        let mut ner = curie_ner();
        ner.get_mut("Marie Curie (scientist)").unwrap().text_ner.push(vec![]);
        let err = QuestionAligner::new(tagger())
            .align(&[curie_case()], &ner)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SentenceCountMismatch { sentences: 1, tagged: 2, .. }
        ));
    }

    #[test]
    fn test_output_shape() {
        let alignment = QuestionAligner::new(tagger())
            .align(&[curie_case()], &curie_ner())
            .unwrap();
        let json = serde_json::to_value(&alignment).unwrap();
        assert_eq!(
            json["q1"]["context"][0][1][0][2],
            serde_json::json!(["Marie Curie", 0, 11, "TITLE"])
        );
        assert_eq!(json["q1"]["question"][0], serde_json::json!(["Marie Curie", 10, 21, "PERSON"]));
    }
}
