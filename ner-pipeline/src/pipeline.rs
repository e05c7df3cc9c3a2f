//! # Pipeline de Ingestão — Workers Paralelos com Escritor Único
//!
//! Lê os lotes do corpus, aplica o filtro de registros, marca as entidades de
//! cada sentença de `text` e grava tudo no banco de documentos.
//!
//! ## Arquitetura
//!
//! ```text
//!   CorpusReader ──► fila de lotes ──► worker 1..N ──► fila de resultados ──► DocumentStore
//!                                     (filtro+tagger)                        (thread chamadora)
//! ```
//!
//! - Cada worker constrói **o seu** filtro e **o seu** tagger uma única vez.
//! - Um lote é processado inteiro antes de ser enviado; as linhas de um lote
//!   são inseridas juntas e na ordem do arquivo.
//! - A ordem entre lotes é a ordem de conclusão.
//! - Só a thread chamadora escreve no banco.
//!
//! O progresso é emitido como [`IngestEvent`]s por um canal `mpsc`, no mesmo
//! espírito dos eventos do pipeline de NER: telemetria, nunca controle.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::corpus::{read_batch, CorpusReader};
use crate::error::{Error, Result};
use crate::filter::{FilterConstructor, FilterRegistry, RecordFilter};
use crate::store::{DocumentStore, StoredDocument};
use crate::tagger::{EntityTagger, TaggerFactory};

/// Parâmetros de uma execução de ingestão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Arquivo ou diretório com os lotes.
    pub root: PathBuf,
    /// Banco SQLite a criar; não pode existir.
    pub destination: PathBuf,
    /// Nome de um filtro registrado; `None` mantém todos os registros.
    #[serde(default)]
    pub filter: Option<String>,
    /// Tamanho do pool; `None` usa o paralelismo disponível.
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Eventos de progresso da ingestão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IngestEvent {
    /// Lotes enumerados; o trabalho vai começar.
    Started { batches: usize },
    /// Um lote foi gravado no banco.
    BatchCommitted {
        path: PathBuf,
        documents: usize,
        /// Contador monotônico de documentos gravados até agora.
        total_documents: usize,
    },
    /// Transação confirmada.
    Finished { total_documents: usize },
}

/// Resultado de um worker: um lote pronto ou uma falha.
type BatchResult = Result<(PathBuf, Vec<StoredDocument>)>;

/// Orquestrador da ingestão.
///
/// Configurado por builders e executado com [`Ingestor::run`]. Uma mesma
/// instância pode rodar várias vezes, sempre contra destinos novos.
pub struct Ingestor<F> {
    /// Fábrica chamada uma vez por worker.
    tagger_factory: F,
    /// Construtor do filtro de registros; `None` mantém tudo.
    filter: Option<FilterConstructor>,
    /// Tamanho do pool (>= 1).
    workers: usize,
    /// Canal opcional de eventos de progresso.
    events: Option<mpsc::Sender<IngestEvent>>,
}

impl<F: TaggerFactory> Ingestor<F> {
    /// Cria o orquestrador sem filtro, sem eventos e com um worker por núcleo.
    pub fn new(tagger_factory: F) -> Self {
        Self {
            tagger_factory,
            filter: None,
            workers: default_workers(),
            events: None,
        }
    }

    /// Monta o orquestrador a partir da configuração, resolvendo o filtro.
    pub fn from_config(config: &IngestConfig, registry: &FilterRegistry, tagger_factory: F) -> Result<Self> {
        let filter = registry.resolve(config.filter.as_deref())?;
        let mut ingestor = Self::new(tagger_factory).with_filter(filter);
        if let Some(n) = config.workers {
            ingestor = ingestor.with_workers(n);
        }
        Ok(ingestor)
    }

    /// Define o filtro aplicado a cada registro antes do tagging.
    pub fn with_filter(mut self, filter: FilterConstructor) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Define o tamanho do pool; zero vira um.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Envia [`IngestEvent`]s para `events` durante a execução.
    ///
    /// O canal fecha quando o orquestrador é descartado.
    pub fn with_events(mut self, events: mpsc::Sender<IngestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Executa a ingestão e retorna o número de documentos gravados.
    ///
    /// Falha antes de qualquer trabalho se `destination` já existe ou se
    /// `root` é inválido. Qualquer erro de lote aborta a execução inteira.
    pub fn run(&self, root: &Path, destination: &Path) -> Result<usize> {
        if destination.exists() {
            return Err(Error::DestinationExists(destination.to_path_buf()));
        }
        let reader = CorpusReader::new(root)?;

        info!("Reading into database...");
        let mut store = DocumentStore::create(destination)?;

        let files: Vec<PathBuf> = reader.files().collect::<Result<_>>()?;
        info!(
            root = %reader.root().display(),
            batches = files.len(),
            workers = self.workers,
            "enumerated corpus"
        );
        self.emit(IngestEvent::Started { batches: files.len() });

        let count = self.dispatch(files, &mut store)?;

        info!("Read {} docs.", count);
        info!("Committing...");
        store.commit()?;
        self.emit(IngestEvent::Finished { total_documents: count });
        Ok(count)
    }

    /// Distribui os lotes entre os workers e grava os resultados à medida
    /// que chegam.
    fn dispatch(&self, files: Vec<PathBuf>, store: &mut DocumentStore) -> Result<usize> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("ingest-{i}"))
            .build()
            .map_err(|e| Error::Worker(e.to_string()))?;

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<PathBuf>();
        for file in files {
            // o receptor ainda está vivo aqui
            let _ = job_tx.send(file);
        }
        drop(job_tx);

        let (result_tx, result_rx) = crossbeam_channel::bounded::<BatchResult>(self.workers);
        let factory = &self.tagger_factory;
        let filter = self.filter;

        // Um retorno antecipado solta `result_rx`; os workers veem o envio
        // falhar e param.
        pool.in_place_scope(move |scope| {
            for _ in 0..self.workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move |_| run_worker(factory, filter, jobs, results));
            }
            drop(result_tx);
            drop(job_rx);

            let mut count = 0;
            for result in result_rx {
                let (path, docs) = result?;
                store.insert_batch(&docs).map_err(|e| e.in_batch(&path))?;
                count += docs.len();
                debug!(batch = %path.display(), documents = docs.len(), total = count, "batch committed");
                self.emit(IngestEvent::BatchCommitted {
                    path,
                    documents: docs.len(),
                    total_documents: count,
                });
            }
            Ok(count)
        })
    }

    fn emit(&self, event: IngestEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Execução completa a partir da configuração.
///
/// O filtro é resolvido antes de qualquer trabalho. Se `events` for dado, o
/// canal fecha ao final, com sucesso ou erro.
pub fn store_contents<F: TaggerFactory>(
    config: &IngestConfig,
    registry: &FilterRegistry,
    tagger_factory: F,
    events: Option<mpsc::Sender<IngestEvent>>,
) -> Result<usize> {
    let mut ingestor = Ingestor::from_config(config, registry, tagger_factory)?;
    if let Some(tx) = events {
        ingestor = ingestor.with_events(tx);
    }
    ingestor.run(&config.root, &config.destination)
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Laço de um worker: constrói filtro e tagger, processa lotes até a fila
/// esvaziar ou o escritor desistir.
fn run_worker<F: TaggerFactory>(
    factory: &F,
    filter: Option<FilterConstructor>,
    jobs: Receiver<PathBuf>,
    results: Sender<BatchResult>,
) {
    let filter = filter.map(|build| build());
    let mut tagger = match factory.build() {
        Ok(t) => t,
        Err(e) => {
            let _ = results.send(Err(e));
            return;
        }
    };

    for path in jobs.iter() {
        let outcome = process_batch(&path, filter.as_deref(), &mut tagger)
            .map(|docs| (path.clone(), docs))
            .map_err(|e| e.in_batch(&path));
        let failed = outcome.is_err();
        if results.send(outcome).is_err() || failed {
            return;
        }
    }
}

/// Decodifica, filtra e marca um lote inteiro.
///
/// Nada do lote chega ao banco se qualquer documento falhar.
pub fn process_batch<T: EntityTagger>(
    path: &Path,
    filter: Option<&dyn RecordFilter>,
    tagger: &mut T,
) -> Result<Vec<StoredDocument>> {
    let mut rows = Vec::new();
    for doc in read_batch(path)? {
        let doc = match filter {
            Some(f) => match f.preprocess(doc) {
                Some(doc) => doc,
                None => continue,
            },
            None => doc,
        };
        doc.check_aligned()?;
        let text_ner = tagger.tag_sentences(&doc.text)?;
        rows.push(StoredDocument::from_raw(doc, text_ner));
    }
    Ok(rows)
}
