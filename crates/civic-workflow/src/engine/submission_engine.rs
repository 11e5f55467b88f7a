// Archivo: submission_engine.rs
// Propósito: punto de entrada de los envíos. Valida el borrador, ejecuta su
// árbol con `FlowEngine` y traduce el resultado a `SubmissionOutcome`.
use crate::config::SubmissionConfig;
use crate::errors::{Result, WorkflowError};
use crate::flows::{InstitutionFlow, PublicationFlow, SpecialistFlow, SubmissionFlow, SupportGroupFlow};
use crate::outcome::{FailureStage, SubmissionOutcome};
use civic_domain::{InstitutionDraft, PublicationDraft, SpecialistDraft, SupportGroupDraft, Validate};
use civic_persistence::PostgrestStore;
use flow::{FlowEngine, ListingCache, TableStore};
use std::sync::Arc;

/// Motor de envíos sobre un almacén compartido.
///
/// Mantiene además la caché de listados: cada envío exitoso invalida la
/// tabla raíz afectada para que el listado se vuelva a leer.
pub struct SubmissionEngine<S>
    where S: TableStore + ?Sized + 'static
{
    flow: FlowEngine<S>,
    cache: Arc<ListingCache>,
    config: SubmissionConfig,
}

impl SubmissionEngine<PostgrestStore> {
    /// Cliente PostgREST y opciones leídos del entorno (`.env` incluido).
    pub fn from_env() -> Result<Self> {
        let store = civic_persistence::new_from_env()?;
        let config = SubmissionConfig::from_env()?;
        Ok(Self::new(Arc::new(store), config))
    }
}

impl<S> SubmissionEngine<S> where S: TableStore + ?Sized + 'static
{
    pub fn new(store: Arc<S>, config: SubmissionConfig) -> Self {
        let flow = FlowEngine::new(store, config.engine_config());
        Self { flow,
               cache: Arc::new(ListingCache::new()),
               config }
    }

    pub fn store(&self) -> &Arc<S> {
        self.flow.store()
    }

    pub fn cache(&self) -> &Arc<ListingCache> {
        &self.cache
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Fuerza una nueva lectura de los listados de `table`.
    pub fn invalidate(&self, table: &str) {
        self.cache.invalidate(table);
    }

    /// Envío genérico: validación local y, si pasa, ejecución del árbol.
    pub async fn submit<F>(&self, draft: &F::Draft) -> SubmissionOutcome
        where F: SubmissionFlow
    {
        let kind = F::kind(draft);
        if let Err(e) = draft.ensure_valid() {
            log::warn!("{}: formulario inválido, no se envía: {}", kind, e);
            return SubmissionOutcome::Failed { kind,
                                               stage: FailureStage::Validation,
                                               error: WorkflowError::from(e),
                                               root_id: None,
                                               rolled_back: false };
        }

        let tree = F::build(draft);
        let root_table = tree.table.clone();
        log::info!("{}: enviando {} filas a partir de {}", kind, tree.count(), root_table);
        match self.flow.execute(tree).await {
            Ok(report) => {
                self.cache.invalidate(&root_table);
                SubmissionOutcome::Succeeded { kind,
                                               submission_id: report.submission_id,
                                               root_id: report.root_id,
                                               created: report.created }
            }
            Err(abort) => {
                log::error!("{}: envío {} fallido ({} filas creadas, raíz {:?}): {}",
                            kind,
                            abort.submission_id,
                            abort.created,
                            abort.root_id,
                            abort.error);
                if abort.root_id.is_some() {
                    // la raíz existe (o existió): el listado ya no es fiable
                    self.cache.invalidate(&root_table);
                }
                SubmissionOutcome::Failed { kind,
                                            stage: FailureStage::Remote,
                                            error: WorkflowError::from(abort.error),
                                            root_id: abort.root_id,
                                            rolled_back: abort.rolled_back }
            }
        }
    }

    pub async fn submit_institution(&self, draft: &InstitutionDraft) -> SubmissionOutcome {
        self.submit::<InstitutionFlow>(draft).await
    }

    pub async fn submit_specialist(&self, draft: &SpecialistDraft) -> SubmissionOutcome {
        self.submit::<SpecialistFlow>(draft).await
    }

    pub async fn submit_publication(&self, draft: &PublicationDraft) -> SubmissionOutcome {
        self.submit::<PublicationFlow>(draft).await
    }

    pub async fn submit_support_group(&self, draft: &SupportGroupDraft) -> SubmissionOutcome {
        self.submit::<SupportGroupFlow>(draft).await
    }
}
