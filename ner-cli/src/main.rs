//! Linha de comando do pipeline: constrói o banco de documentos, exporta o
//! NER por título e alinha entidades de um dataset de perguntas.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ner_pipeline::{
    dataset, pipeline, DocumentStore, FilterRegistry, Gazetteer, IngestConfig, IngestEvent,
    QuestionAligner, RuleTagger,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ner-pipeline", version)]
#[command(about = "Banco de documentos com NER e alinhamento de entidades pergunta/contexto")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lê o corpus bzip2 e grava o banco SQLite com NER por sentença
    BuildDb {
        /// Arquivo ou diretório com os lotes
        data_path: PathBuf,
        /// Banco a criar (não pode existir)
        save_path: PathBuf,
        /// Filtro de registros registrado
        #[arg(long)]
        filter: Option<String>,
        /// Número de workers (padrão: paralelismo disponível)
        #[arg(long)]
        num_workers: Option<usize>,
        /// Gazetteer JSON `{rótulo: [nome, ...]}`
        #[arg(long)]
        gazetteer: Option<PathBuf>,
    },
    /// Exporta `{título: {"text_ner": ...}}` de um banco existente
    ExportNer { db: PathBuf, output: PathBuf },
    /// Alinha as entidades das perguntas com as do contexto
    Align {
        dataset: PathBuf,
        ner: PathBuf,
        output: PathBuf,
        #[arg(long)]
        gazetteer: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::BuildDb {
            data_path,
            save_path,
            filter,
            num_workers,
            gazetteer,
        } => {
            let config = IngestConfig {
                root: data_path,
                destination: save_path,
                filter,
                workers: num_workers,
            };
            build_db(&config, gazetteer.as_deref())
        }
        Command::ExportNer { db, output } => export_ner(&db, &output),
        Command::Align {
            dataset,
            ner,
            output,
            gazetteer,
        } => align(&dataset, &ner, &output, gazetteer.as_deref()),
    }
}

fn load_gazetteer(path: Option<&Path>) -> Result<Arc<Gazetteer>> {
    let gazetteer = match path {
        Some(p) => Gazetteer::load(p).with_context(|| format!("loading gazetteer {}", p.display()))?,
        None => Gazetteer::new(),
    };
    info!(entries = gazetteer.len(), "gazetteer ready");
    Ok(Arc::new(gazetteer))
}

fn build_db(config: &IngestConfig, gazetteer: Option<&Path>) -> Result<()> {
    let registry = FilterRegistry::with_builtins();
    if let Some(name) = config.filter.as_deref() {
        if registry.resolve(Some(name)).is_err() {
            let known: Vec<&str> = registry.names().collect();
            bail!("unknown filter {name:?}; available: {}", known.join(", "));
        }
    }

    let gazetteer = load_gazetteer(gazetteer)?;
    let factory = move || -> ner_pipeline::Result<RuleTagger> { Ok(RuleTagger::new(Arc::clone(&gazetteer))) };

    let (tx, rx) = mpsc::channel();
    let progress = thread::spawn(move || report_progress(rx));
    // o canal fecha quando `store_contents` retorna
    let outcome = pipeline::store_contents(config, &registry, factory, Some(tx));
    let _ = progress.join();

    let count = outcome.with_context(|| format!("building {}", config.destination.display()))?;
    info!(documents = count, "done");
    Ok(())
}

fn report_progress(rx: mpsc::Receiver<IngestEvent>) {
    let mut bar: Option<ProgressBar> = None;
    for event in rx {
        match event {
            IngestEvent::Started { batches } => {
                let pb = ProgressBar::new(batches as u64);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                bar = Some(pb);
            }
            IngestEvent::BatchCommitted { total_documents, .. } => {
                if let Some(pb) = &bar {
                    pb.inc(1);
                    pb.set_message(format!("{total_documents} docs"));
                }
            }
            IngestEvent::Finished { total_documents } => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message(format!("{total_documents} docs"));
                }
            }
        }
    }
    if let Some(pb) = bar {
        pb.abandon();
    }
}

fn export_ner(db: &Path, output: &Path) -> Result<()> {
    let store = DocumentStore::open(db).with_context(|| format!("opening {}", db.display()))?;
    let ner = store.export_ner()?;
    dataset::write_json(output, &ner).with_context(|| format!("writing {}", output.display()))?;
    info!(titles = ner.len(), "exported NER to {}", output.display());
    Ok(())
}

fn align(dataset_path: &Path, ner_path: &Path, output: &Path, gazetteer: Option<&Path>) -> Result<()> {
    let cases = dataset::load_cases(dataset_path)
        .with_context(|| format!("reading dataset {}", dataset_path.display()))?;
    let ner = dataset::load_ner(ner_path).with_context(|| format!("reading NER {}", ner_path.display()))?;
    info!(cases = cases.len(), titles = ner.len(), "loaded inputs");

    let tagger = RuleTagger::new(load_gazetteer(gazetteer)?);
    let alignment = QuestionAligner::new(tagger).align(&cases, &ner)?;

    dataset::write_json(output, &alignment).with_context(|| format!("writing {}", output.display()))?;
    info!(cases = alignment.len(), "wrote {}", output.display());
    Ok(())
}
