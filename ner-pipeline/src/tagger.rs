//! # Tagger de Entidades
//!
//! O tagger é uma caixa-preta: recebe um texto e devolve as menções
//! encontradas, em ordem, com offsets em caracteres e um rótulo de tipo.
//! Deve ser determinístico para a mesma entrada.
//!
//! Cada worker da ingestão constrói **a sua própria** instância através de
//! uma [`TaggerFactory`], uma única vez, na sua inicialização. Não há tagger
//! global compartilhado.

use crate::error::Result;
use crate::mention::EntityMention;

/// Reconhecedor de entidades nomeadas.
pub trait EntityTagger {
    /// Marca as entidades de `text`.
    fn tag(&mut self, text: &str) -> Result<Vec<EntityMention>>;

    /// Marca cada sentença independentemente, preservando a ordem.
    fn tag_sentences(&mut self, sentences: &[String]) -> Result<Vec<Vec<EntityMention>>> {
        sentences.iter().map(|s| self.tag(s)).collect()
    }
}

impl<T: EntityTagger + ?Sized> EntityTagger for Box<T> {
    fn tag(&mut self, text: &str) -> Result<Vec<EntityMention>> {
        (**self).tag(text)
    }
}

impl<T: EntityTagger + ?Sized> EntityTagger for &mut T {
    fn tag(&mut self, text: &str) -> Result<Vec<EntityMention>> {
        (**self).tag(text)
    }
}

/// Constrói um tagger por worker.
///
/// Qualquer closure `Fn() -> Result<T>` que seja `Send + Sync` serve.
pub trait TaggerFactory: Send + Sync {
    type Tagger: EntityTagger;

    fn build(&self) -> Result<Self::Tagger>;
}

impl<F, T> TaggerFactory for F
where
    F: Fn() -> Result<T> + Send + Sync,
    T: EntityTagger,
{
    type Tagger = T;

    fn build(&self) -> Result<T> {
        self()
    }
}
