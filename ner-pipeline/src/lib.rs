//! # ner-pipeline — Banco de Documentos com NER e Alinhamento de Entidades
//!
//! Pipeline em dois estágios sobre um corpus enciclopédico:
//!
//! 1.  **Ingestão** ([`pipeline`]): lotes bzip2 de documentos JSON são lidos em
//!     paralelo ([`corpus`]), filtrados ([`filter`]), marcados sentença a
//!     sentença por um [`EntityTagger`] ([`tagger`], [`rule_based`]) e gravados
//!     por um escritor único num banco SQLite ([`store`]) com ids em NFD.
//! 2.  **Alinhamento** ([`aligner`]): para cada pergunta de um dataset
//!     ([`dataset`]), as entidades pré-computadas do contexto são filtradas por
//!     tipo e enriquecidas com casamentos literais de títulos e de entidades
//!     do contexto ([`extractor`]).
//!
//! Toda menção é uma tupla `[texto, início, fim, rótulo]` com offsets em
//! caracteres ([`mention`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use ner_pipeline::{EntityTagger, EntityType, Gazetteer, MentionExtractor, RuleTagger};
//!
//! // 1. Tagger por regras com um gazetteer mínimo
//! let mut gazetteer = Gazetteer::new();
//! gazetteer.add("Marie Curie", EntityType::Person);
//! let mut tagger = RuleTagger::new(Arc::new(gazetteer));
//!
//! // 2. Entidades tipadas da sentença
//! let sentence = "Where was Marie Curie born?";
//! let typed = tagger.tag(sentence).unwrap();
//! assert_eq!(typed[0].label, "PERSON");
//!
//! // 3. Casamento literal de títulos do contexto
//! let literal = MentionExtractor::new().find(sentence, &["Marie Curie (scientist)"], None);
//! assert_eq!((literal[0].start, literal[0].end), (10, 21));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador da ingestão (workers + escritor único).
//! - [`store`]: tabela `documents` em SQLite.
//! - [`aligner`]: alinhamento pergunta ↔ contexto.
//! - [`extractor`]: casamento literal de títulos e entidades.

pub mod aligner;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod mention;
pub mod pipeline;
pub mod rule_based;
pub mod store;
pub mod tagger;
pub mod tokenizer;

pub use aligner::{AlignedCase, Alignment, QuestionAligner};
pub use corpus::{CorpusReader, RawDocument};
pub use dataset::{DocumentNer, NerIndex, QuestionCase};
pub use error::{Error, Result};
pub use extractor::{ContextPool, MentionExtractor};
pub use filter::{FilterConstructor, FilterRegistry, RecordFilter};
pub use mention::{EntityMention, EntityType, Provenance};
pub use pipeline::{IngestConfig, IngestEvent, Ingestor};
pub use rule_based::{Gazetteer, RuleTagger};
pub use store::{DocumentStore, StoredDocument};
pub use tagger::{EntityTagger, TaggerFactory};
