//! # Menções de Entidade e Vocabulário de Tipos
//!
//! Uma **menção** é um trecho localizado e rotulado de texto:
//! `(texto, início, fim, rótulo)`, com offsets em **caracteres** (não bytes)
//! relativos à sentença de onde foi extraída.
//!
//! ## Rótulos
//!
//! O rótulo é um tipo semântico do vocabulário OntoNotes (produzido pelo tagger)
//! ou um marcador de proveniência (produzido por casamento literal):
//!
//! | Rótulo   | Origem                                      |
//! |----------|---------------------------------------------|
//! | PERSON…  | Tagger de entidades (vocabulário fixo)      |
//! | TITLE    | Casamento literal contra títulos do contexto|
//! | CONTEXT  | Casamento literal contra entidades do contexto |
//!
//! ## Serialização
//!
//! Menções são serializadas como tupla JSON `["Marie Curie", 0, 11, "PERSON"]`,
//! o mesmo formato do NER pré-computado e da saída do alinhamento.

use serde::{Deserialize, Serialize};

/// Tipos de entidade do vocabulário OntoNotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    /// Pessoas, reais ou fictícias.
    Person,
    /// Nacionalidades, grupos religiosos ou políticos.
    Norp,
    /// Instalações: prédios, aeroportos, pontes.
    Fac,
    Org,
    /// Entidades geopolíticas: países, cidades, estados.
    Gpe,
    /// Locais não geopolíticos: montanhas, rios.
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl EntityType {
    /// Todos os tipos, na ordem canônica.
    pub const ALL: [EntityType; 18] = [
        EntityType::Person,
        EntityType::Norp,
        EntityType::Fac,
        EntityType::Org,
        EntityType::Gpe,
        EntityType::Loc,
        EntityType::Product,
        EntityType::Event,
        EntityType::WorkOfArt,
        EntityType::Law,
        EntityType::Language,
        EntityType::Date,
        EntityType::Time,
        EntityType::Percent,
        EntityType::Money,
        EntityType::Quantity,
        EntityType::Ordinal,
        EntityType::Cardinal,
    ];

    /// Nome do tipo como aparece nos rótulos (ex: "WORK_OF_ART")
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Norp => "NORP",
            EntityType::Fac => "FAC",
            EntityType::Org => "ORG",
            EntityType::Gpe => "GPE",
            EntityType::Loc => "LOC",
            EntityType::Product => "PRODUCT",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
            EntityType::Law => "LAW",
            EntityType::Language => "LANGUAGE",
            EntityType::Date => "DATE",
            EntityType::Time => "TIME",
            EntityType::Percent => "PERCENT",
            EntityType::Money => "MONEY",
            EntityType::Quantity => "QUANTITY",
            EntityType::Ordinal => "ORDINAL",
            EntityType::Cardinal => "CARDINAL",
        }
    }

    /// Tenta parsear a partir do rótulo (ex: "GPE" → Some(Gpe))
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == s)
    }

    /// Verifica se o tipo pertence à lista de tipos mantidos no alinhamento.
    ///
    /// Tipos numéricos e temporais (datas, horas, percentuais, valores,
    /// quantidades, ordinais e cardinais) ficam de fora.
    pub fn is_aligned(&self) -> bool {
        !matches!(
            self,
            EntityType::Date
                | EntityType::Time
                | EntityType::Percent
                | EntityType::Money
                | EntityType::Quantity
                | EntityType::Ordinal
                | EntityType::Cardinal
        )
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Como uma menção foi obtida por casamento literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Casou com o título de um documento do contexto.
    Title,
    /// Casou com o texto de uma entidade já marcada no contexto.
    Context,
}

impl Provenance {
    /// Rótulo gravado na menção ("TITLE" ou "CONTEXT").
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Title => "TITLE",
            Provenance::Context => "CONTEXT",
        }
    }
}

/// Classificação de um rótulo: tipo semântico ou proveniência.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    Typed(EntityType),
    Literal(Provenance),
    /// Rótulo fora do vocabulário conhecido (tagger externo).
    Unknown,
}

/// Uma menção de entidade localizada numa sentença.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "MentionTuple", into = "MentionTuple")]
pub struct EntityMention {
    /// Texto da menção (ex: "Marie Curie")
    pub text: String,
    /// Offset de caractere inicial (inclusivo)
    pub start: usize,
    /// Offset de caractere final (exclusivo)
    pub end: usize,
    /// Tipo semântico ("PERSON") ou proveniência ("TITLE", "CONTEXT")
    pub label: String,
}

type MentionTuple = (String, usize, usize, String);

impl From<MentionTuple> for EntityMention {
    fn from((text, start, end, label): MentionTuple) -> Self {
        Self { text, start, end, label }
    }
}

impl From<EntityMention> for MentionTuple {
    fn from(m: EntityMention) -> Self {
        (m.text, m.start, m.end, m.label)
    }
}

impl EntityMention {
    /// Cria uma menção com um rótulo arbitrário.
    pub fn new(text: impl Into<String>, start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            label: label.into(),
        }
    }

    /// Menção produzida pelo tagger com um tipo conhecido.
    pub fn typed(text: impl Into<String>, start: usize, end: usize, ty: EntityType) -> Self {
        Self::new(text, start, end, ty.name())
    }

    /// Menção produzida por casamento literal.
    pub fn literal(text: impl Into<String>, start: usize, end: usize, provenance: Provenance) -> Self {
        Self::new(text, start, end, provenance.label())
    }

    /// Classifica o rótulo: tipo conhecido, proveniência ou desconhecido.
    pub fn kind(&self) -> MentionKind {
        if let Some(ty) = EntityType::from_label(&self.label) {
            return MentionKind::Typed(ty);
        }
        match self.label.as_str() {
            "TITLE" => MentionKind::Literal(Provenance::Title),
            "CONTEXT" => MentionKind::Literal(Provenance::Context),
            _ => MentionKind::Unknown,
        }
    }

    /// `true` se o rótulo é um tipo semântico da lista de alinhamento.
    pub fn is_aligned_type(&self) -> bool {
        matches!(self.kind(), MentionKind::Typed(ty) if ty.is_aligned())
    }
}
