use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manual_qa::application::{IngestReport, IngestionService};
use manual_qa::domain::DomainError;
use manual_qa::infrastructure::config::IndexBackend;
use manual_qa::infrastructure::{build_vector_store, Config, IndexLock, PdfLoader, TextEmbedding};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ingest=info,manual_qa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::load()?;
    let chunking = config.chunking_config()?;

    // Ingestion is the sole writer; a lock beside the file-backed index
    // keeps a second run from racing writes into the same store.
    let _lock = match config.index.backend {
        IndexBackend::File => Some(IndexLock::acquire(&config.index.path)?),
        IndexBackend::Qdrant => None,
    };

    let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
    let vector_store = build_vector_store(&config.index, config.embedding.dimension).await?;
    let loader = PdfLoader::new(&config.ingestion);

    let service = IngestionService::new(
        loader,
        embedding,
        vector_store,
        chunking,
        config.embedding.batch_size,
    );

    match service.ingest_all().await {
        Ok(report) => {
            log_report(&report);
            Ok(())
        }
        Err(DomainError::SetupRequired(msg)) => {
            info!("{msg}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn log_report(report: &IngestReport) {
    for domain in &report.domains {
        info!(domain = %domain.domain, documents = domain.documents.len(), "domain ingested");
        for doc in &domain.documents {
            info!(
                document = %doc.document,
                pages = doc.pages,
                chunks = doc.chunks,
                "document indexed"
            );
        }
    }

    for skipped in &report.skipped {
        warn!(path = %skipped.path, reason = %skipped.reason, "file skipped");
    }

    info!(
        documents = report.total_documents,
        chunks = report.total_chunks,
        skipped = report.skipped.len(),
        "ingestion summary"
    );
}
