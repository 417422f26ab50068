//! Scout core: search data model, input validation and the pure polling state machine.
mod derive;
mod effect;
mod model;
mod msg;
mod state;
mod update;
mod validate;
mod view_model;

pub use derive::{derive_job, derive_state, DerivedState, DerivedStatus};
pub use effect::Effect;
pub use model::{
    CompanyDetails, EnrichmentFormat, EnrichmentOption, EnrichmentSpec, ItemProperties, ItemsPage,
    JobId, PersonDetails, PublicationDetails, ResultItem, RunProgress, RunStatus, SearchJob,
    SearchRun, WebsetStatus,
};
pub use msg::Msg;
pub use state::{Phase, PollSettings, PollState, PollToken, Progress, DEFAULT_POLL_INTERVAL};
pub use update::{update, RUN_CANCELED_MESSAGE, RUN_FAILED_MESSAGE};
pub use validate::{
    validate_job_id, PageRequest, SearchRequest, ValidationError, ITEMS_PAGE_SIZE,
    MAX_CRITERIA, MAX_ENRICHMENTS, MAX_RESULT_COUNT,
};
pub use view_model::PollView;
