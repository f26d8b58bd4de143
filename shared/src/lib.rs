#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod attachments;
pub mod capabilities;
pub mod catalog;
pub mod config;
pub mod event;
pub mod form;
pub mod model;
pub mod resolver;
pub mod submission;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::attachments::{PreviewHandle, Rejection};
use crate::catalog::CatalogKind;
use crate::config::ConfigError;
use crate::form::{Field, PriorArea, UserType};
use crate::model::Notice;
use crate::submission::SubmitError;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::Model;

pub const BRANCHES_FAILED_MESSAGE: &str =
    "No se pudo cargar la lista de filiales. Intente nuevamente.";
pub const ACADEMIC_UNITS_FAILED_MESSAGE: &str =
    "No se pudieron cargar las escuelas profesionales.";
pub const DEPARTMENTS_FAILED_MESSAGE: &str = "No se pudieron cargar las áreas.";
pub const MODALITIES_FAILED_MESSAGE: &str = "No se pudieron cargar las modalidades.";

#[must_use]
pub const fn catalog_failure_message(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::AcademicUnits => ACADEMIC_UNITS_FAILED_MESSAGE,
        CatalogKind::Departments => DEPARTMENTS_FAILED_MESSAGE,
        CatalogKind::Modalities => MODALITIES_FAILED_MESSAGE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Transport failure or a reply the service marked as unsuccessful.
    Service,
    Validation,
    MissingCaseNumber,
    Attachment,
    Configuration,
    InvalidState,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Service => "SERVICE_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::MissingCaseNumber => "MISSING_CASE_NUMBER",
            Self::Attachment => "ATTACHMENT_REJECTED",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Service | Self::MissingCaseNumber => ErrorSeverity::Transient,
            Self::Validation | Self::Attachment | Self::InvalidState => ErrorSeverity::Permanent,
            Self::Configuration => ErrorSeverity::Fatal,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Service | Self::MissingCaseNumber)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Service
            | ErrorKind::Validation
            | ErrorKind::MissingCaseNumber
            | ErrorKind::Attachment => self.message.clone(),
            ErrorKind::Configuration => {
                "La configuración de la aplicación no es válida. Contacte al administrador.".into()
            }
            ErrorKind::InvalidState => {
                "Ocurrió un error inesperado. Recargue la página e intente nuevamente.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        let kind = match e {
            SubmitError::MissingCaseNumber => ErrorKind::MissingCaseNumber,
            SubmitError::AlreadySubmitting => ErrorKind::InvalidState,
            SubmitError::Invalid(_)
            | SubmitError::MissingBranch
            | SubmitError::InvalidSelection { .. } => ErrorKind::Validation,
        };
        let error = Self::new(kind, e.user_message()).with_internal(e.to_string());
        match &e {
            SubmitError::Invalid(errors) => {
                error.with_context("invalid_fields", errors.fields.len().to_string())
            }
            SubmitError::InvalidSelection { field, .. } => error.with_context("field", field.key()),
            _ => error,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::new(ErrorKind::Configuration, e.to_string())
    }
}

impl From<&Rejection> for AppError {
    fn from(e: &Rejection) -> Self {
        Self::new(ErrorKind::Attachment, e.user_message()).with_internal(e.to_string())
    }
}

/// Human readable size, e.g. `"2.5 MB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{bytes} B")
    }
}

// ============================================================================
// View model
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListView {
    pub options: Vec<OptionView>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> From<&catalog::LoaderState<T>> for ListView
where
    for<'a> &'a T: Into<OptionView>,
{
    fn from(state: &catalog::LoaderState<T>) -> Self {
        Self {
            options: state.items.iter().map(Into::into).collect(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}

impl From<&catalog::Branch> for OptionView {
    fn from(branch: &catalog::Branch) -> Self {
        Self {
            value: branch.legal_entity_code.clone(),
            label: branch.display_name.clone(),
        }
    }
}

impl From<&catalog::CatalogItem> for OptionView {
    fn from(item: &catalog::CatalogItem) -> Self {
        Self {
            value: item.code.clone(),
            label: item.label.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldView {
    pub key: String,
    pub value: String,
    pub enabled: bool,
    pub required: bool,
    /// Only set once the control has been touched.
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorAreaView {
    pub key: String,
    pub label: String,
    pub code: u8,
    pub checked: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentView {
    pub index: usize,
    pub file_name: String,
    pub byte_size: u64,
    pub size_label: String,
    pub preview: PreviewHandle,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub branches: ListView,
    pub selected_branch: Option<String>,
    pub academic_units: ListView,
    pub departments: ListView,
    pub modalities: ListView,

    pub case_code: Option<String>,
    pub case_loading: bool,

    pub fields: Vec<FieldView>,
    pub user_types: Vec<OptionView>,
    pub has_attorney: bool,
    pub prior_areas: Vec<PriorAreaView>,
    pub prior_areas_error: Option<String>,

    pub attachments: Vec<AttachmentView>,
    pub attachment_messages: Vec<String>,
    pub can_add_files: bool,

    pub submitting: bool,
    pub can_submit: bool,

    pub notice: Option<Notice>,
    pub error: Option<UserFacingError>,
}

impl ViewModel {
    #[must_use]
    pub fn field(&self, field: Field) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.key == field.key())
    }
}

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::api::{
        ack_reply, item_reply, list_reply, AcademicUnitDto, AcademicUnitsRequest, ApiReply,
        BranchDto, CaseNumberDto, CaseNumberRequest, DepartmentDto, DepartmentsRequest, Envelope,
        ModalityDto,
    };
    use crate::attachments::AddOutcome;
    use crate::catalog::{prepare_branches, prepare_items, Branch, CatalogItem, LoaderState};
    use crate::form::{FieldError, FormChange, FormState};
    use crate::submission::{
        build_registration, failure_message, success_message, GENERIC_FAILURE_MESSAGE,
    };

    #[derive(Default)]
    pub struct App;

    impl App {
        fn request_branches(model: &mut Model, caps: &Capabilities) {
            model.branches.begin();
            match model.config.endpoint_url(&model.config.endpoints.branches) {
                Ok(url) => caps
                    .http
                    .get(url)
                    .expect_json::<Envelope<BranchDto>>()
                    .send(|result| Event::BranchesLoaded(list_reply(result))),
                Err(e) => Self::finish_branches(model, ApiReply::failure(e.to_string())),
            }
        }

        fn finish_branches(model: &mut Model, reply: ApiReply<Vec<BranchDto>>) {
            match reply {
                ApiReply::Success(dtos) => {
                    let branches = prepare_branches(dtos.into_iter().map(Branch::from).collect());
                    info!(count = branches.len(), "branch directory loaded");
                    model.branches.succeed(branches);
                }
                ApiReply::Failure { reason, .. } => {
                    warn!(%reason, "branch directory failed to load");
                    model.branches.fail(BRANCHES_FAILED_MESSAGE);
                }
            }
        }

        fn request_modalities(model: &mut Model, caps: &Capabilities) {
            model.modalities.begin();
            match model.config.endpoint_url(&model.config.endpoints.modalities) {
                Ok(url) => caps
                    .http
                    .get(url)
                    .expect_json::<Envelope<ModalityDto>>()
                    .send(|result| Event::ModalitiesLoaded(list_reply(result))),
                Err(e) => Self::finish_catalog(
                    &mut model.modalities,
                    CatalogKind::Modalities,
                    ApiReply::failure(e.to_string()),
                ),
            }
        }

        fn finish_catalog(
            state: &mut LoaderState<CatalogItem>,
            kind: CatalogKind,
            reply: ApiReply<Vec<CatalogItem>>,
        ) {
            match reply {
                ApiReply::Success(items) => {
                    let items = prepare_items(items);
                    debug!(catalog = kind.as_str(), count = items.len(), "catalog loaded");
                    state.succeed(items);
                }
                ApiReply::Failure { reason, .. } => {
                    warn!(catalog = kind.as_str(), %reason, "catalog failed to load");
                    state.fail(catalog_failure_message(kind));
                }
            }
        }

        /// Clears everything scoped to the previous branch, then starts the
        /// branch-scoped loaders and the case-number request.
        fn select_branch(model: &mut Model, caps: &Capabilities, code: Option<String>) {
            let generation = model.advance_generation();
            model.clear_branch_scope();
            model.form.clear_value(Field::AcademicUnit);
            model.form.clear_value(Field::Area);

            let code = code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
            let Some(code) = code else {
                model.form.clear_value(Field::Branch);
                debug!("branch selection cleared");
                return;
            };

            let Some(branch) = model
                .branches
                .items
                .iter()
                .find(|b| b.legal_entity_code == code)
                .cloned()
            else {
                warn!(branch = %code, "selected branch is not in the directory");
                model.form.clear_value(Field::Branch);
                return;
            };

            info!(
                branch = %branch.legal_entity_code,
                establishment = %branch.establishment_id,
                generation = generation.0,
                "branch selected"
            );
            model.form.set_value_silently(Field::Branch, &code);
            model.selected_branch = Some(branch.clone());

            Self::request_case_number(model, caps, &branch, generation);
            Self::request_academic_units(model, caps, &branch, generation);
            Self::request_departments(model, caps, &branch, generation);
        }

        fn request_case_number(
            model: &mut Model,
            caps: &Capabilities,
            branch: &Branch,
            generation: event::Generation,
        ) {
            model.case_loading = true;
            let body = CaseNumberRequest {
                cperjuridica: branch.legal_entity_code.clone(),
            };
            let request = model
                .config
                .endpoint_url(&model.config.endpoints.case_number)
                .map_err(|e| e.to_string())
                .and_then(|url| caps.http.post(url).body_json(&body).map_err(|e| e.to_string()));

            match request {
                Ok(request) => request.expect_json::<Envelope<CaseNumberDto>>().send(
                    move |result| Event::CaseNumberResolved {
                        generation,
                        reply: item_reply(result),
                    },
                ),
                Err(reason) => {
                    model.case_loading = false;
                    model.case_record =
                        Some(model.resolver.resolve(branch, ApiReply::failure(reason)));
                }
            }
        }

        fn request_academic_units(
            model: &mut Model,
            caps: &Capabilities,
            branch: &Branch,
            generation: event::Generation,
        ) {
            model.academic_units.begin();
            let body = AcademicUnitsRequest {
                cperjuridica: branch.legal_entity_code.clone(),
            };
            let request = model
                .config
                .endpoint_url(&model.config.endpoints.academic_units)
                .map_err(|e| e.to_string())
                .and_then(|url| caps.http.post(url).body_json(&body).map_err(|e| e.to_string()));

            match request {
                Ok(request) => request.expect_json::<Envelope<AcademicUnitDto>>().send(
                    move |result| Event::AcademicUnitsLoaded {
                        generation,
                        reply: list_reply(result),
                    },
                ),
                Err(reason) => Self::finish_catalog(
                    &mut model.academic_units,
                    CatalogKind::AcademicUnits,
                    ApiReply::failure(reason),
                ),
            }
        }

        fn request_departments(
            model: &mut Model,
            caps: &Capabilities,
            branch: &Branch,
            generation: event::Generation,
        ) {
            model.departments.begin();
            let body = DepartmentsRequest {
                estabid: branch.establishment_id.clone(),
            };
            let request = model
                .config
                .endpoint_url(&model.config.endpoints.departments)
                .map_err(|e| e.to_string())
                .and_then(|url| caps.http.post(url).body_json(&body).map_err(|e| e.to_string()));

            match request {
                Ok(request) => request.expect_json::<Envelope<DepartmentDto>>().send(
                    move |result| Event::DepartmentsLoaded {
                        generation,
                        reply: list_reply(result),
                    },
                ),
                Err(reason) => Self::finish_catalog(
                    &mut model.departments,
                    CatalogKind::Departments,
                    ApiReply::failure(reason),
                ),
            }
        }

        fn add_files(
            model: &mut Model,
            caps: &Capabilities,
            candidates: Vec<attachments::FileCandidate>,
        ) {
            let reports = model.attachments.add(candidates, &model.config.attachments);
            model.attachment_messages.clear();

            for report in reports {
                match report.outcome {
                    AddOutcome::Accepted(handle) => caps.preview.create(handle, report.raw_ref),
                    AddOutcome::Rejected(rejection) => {
                        let error = AppError::from(&rejection)
                            .with_context("file", report.file_name.clone());
                        model.attachment_messages.push(error.user_facing_message());
                    }
                }
            }
        }

        fn release_all(model: &mut Model, caps: &Capabilities) {
            for handle in model.attachments.clear() {
                caps.preview.release(handle);
            }
            model.attachment_messages.clear();
        }

        fn submit(model: &mut Model, caps: &Capabilities) {
            if model.submitting {
                debug!(error = %SubmitError::AlreadySubmitting, "submit ignored");
                return;
            }
            model.clear_messages();

            let payload = match build_registration(
                &model.form,
                model.case_record.as_ref(),
                model.selected_branch.as_ref(),
                &model.attachments,
            ) {
                Ok(payload) => payload,
                Err(error) => {
                    if matches!(error, SubmitError::Invalid(_)) {
                        model.form.mark_all_touched();
                    }
                    warn!(%error, "submission blocked");
                    model.set_error(error.into());
                    return;
                }
            };

            let request = model
                .config
                .endpoint_url(&model.config.endpoints.register_case)
                .map_err(|e| e.to_string())
                .and_then(|url| {
                    caps.http
                        .post(url)
                        .body_json(&payload)
                        .map_err(|e| e.to_string())
                });

            match request {
                Ok(request) => {
                    info!(
                        case_code = %payload.codigo_expediente,
                        attachments = payload.archivos.len(),
                        "submitting registration"
                    );
                    let submission = model.begin_submission(payload.codigo_expediente.clone());
                    request
                        .expect_json::<Envelope<serde_json::Value>>()
                        .send(move |result| Event::SubmitResponse {
                            submission,
                            reply: ack_reply(result),
                        });
                }
                Err(reason) => {
                    warn!(%reason, "registration request could not be built");
                    model.set_error(
                        AppError::new(ErrorKind::Service, GENERIC_FAILURE_MESSAGE)
                            .with_internal(reason),
                    );
                }
            }
        }

        /// Back to a blank form. Loaded branches, modalities and the local
        /// case counters survive.
        fn reset(model: &mut Model, caps: &Capabilities) {
            if model.submitting {
                info!(
                    submission = model.submission_generation.0,
                    "registration in flight abandoned by reset"
                );
            }
            model.abandon_submission();
            Self::release_all(model, caps);
            model.form = FormState::new();
            model.advance_generation();
            model.clear_branch_scope();
            model.clear_messages();
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(
                event = event.name(),
                user_initiated = event.is_user_initiated(),
                "update"
            );

            match event {
                Event::Noop => return,

                Event::AppStarted => {
                    Self::request_branches(model, caps);
                    Self::request_modalities(model, caps);
                }

                Event::Configure(config) => match config.validate() {
                    Ok(()) => {
                        info!(base_url = %config.api_base_url, "configuration applied");
                        model.config = *config;
                    }
                    Err(e) => {
                        warn!(error = %e, "configuration rejected");
                        model.set_error(e.into());
                    }
                },

                Event::BranchesRequested => Self::request_branches(model, caps),

                Event::BranchesLoaded(reply) => Self::finish_branches(model, reply),

                Event::ModalitiesLoaded(reply) => Self::finish_catalog(
                    &mut model.modalities,
                    CatalogKind::Modalities,
                    reply.map(|dtos| dtos.into_iter().map(CatalogItem::from).collect()),
                ),

                Event::BranchSelected { legal_entity_code } => {
                    Self::select_branch(model, caps, legal_entity_code);
                }

                Event::AcademicUnitsLoaded { generation, reply } => {
                    if !model.is_current(generation) {
                        debug!(generation = generation.0, "stale academic units dropped");
                        return;
                    }
                    Self::finish_catalog(
                        &mut model.academic_units,
                        CatalogKind::AcademicUnits,
                        reply.map(|dtos| dtos.into_iter().map(CatalogItem::from).collect()),
                    );
                }

                Event::DepartmentsLoaded { generation, reply } => {
                    if !model.is_current(generation) {
                        debug!(generation = generation.0, "stale departments dropped");
                        return;
                    }
                    Self::finish_catalog(
                        &mut model.departments,
                        CatalogKind::Departments,
                        reply.map(|dtos| dtos.into_iter().map(CatalogItem::from).collect()),
                    );
                }

                Event::CaseNumberResolved { generation, reply } => {
                    if !model.is_current(generation) {
                        debug!(generation = generation.0, "stale case number dropped");
                        return;
                    }
                    model.case_loading = false;
                    let Some(branch) = model.selected_branch.clone() else {
                        return;
                    };
                    model.case_record = Some(model.resolver.resolve(&branch, reply));
                }

                Event::FieldEdited { field, value } => {
                    if field == Field::Branch {
                        Self::select_branch(model, caps, Some(value));
                    } else {
                        model.form.apply_mut(&FormChange::Edit { field, value });
                    }
                }

                Event::FieldTouched { field } => model.form.apply_mut(&FormChange::Touch(field)),

                Event::AttorneyToggled { present } => {
                    model.form.apply_mut(&FormChange::Attorney(present));
                }

                Event::PriorAreaToggled { area, checked } => {
                    model.form.apply_mut(&FormChange::PriorArea { area, checked });
                }

                Event::FilesSelected(candidates) => Self::add_files(model, caps, candidates),

                Event::FileRemoved { index } => match model.attachments.remove(index) {
                    Some(handle) => caps.preview.release(handle),
                    None => warn!(index, "no attachment at index"),
                },

                Event::FilesCleared => Self::release_all(model, caps),

                Event::SubmitRequested => Self::submit(model, caps),

                Event::SubmitResponse { submission, reply } => {
                    if !model.submitting || submission != model.submission_generation {
                        debug!(submission = submission.0, "stale registration reply dropped");
                        return;
                    }
                    model.submitting = false;
                    let case_code = model.submitted_case_code.take().unwrap_or_default();
                    match reply {
                        ApiReply::Success(ack) => {
                            info!(
                                case_code = %case_code,
                                server_message = ack.message.as_deref().unwrap_or_default(),
                                "registration accepted"
                            );
                            Self::reset(model, caps);
                            model.notice = Some(Notice::success(success_message(&case_code)));
                        }
                        ApiReply::Failure {
                            reason,
                            server_message,
                        } => {
                            warn!(%reason, "registration failed");
                            model.set_error(
                                AppError::new(
                                    ErrorKind::Service,
                                    failure_message(server_message.as_deref()),
                                )
                                .with_internal(reason),
                            );
                        }
                    }
                }

                Event::ResetRequested => Self::reset(model, caps),

                Event::DismissNotice => model.clear_messages(),
            }

            caps.render.render();
        }

        fn view(&self, model: &Model) -> ViewModel {
            let form = &model.form;

            let fields = Field::ALL
                .into_iter()
                .map(|field| {
                    let control = form.control(field);
                    FieldView {
                        key: field.key().to_string(),
                        value: control.value.clone(),
                        enabled: control.enabled,
                        required: control.required,
                        error: control
                            .touched
                            .then(|| form.field_error(field))
                            .flatten()
                            .map(FieldError::user_message),
                    }
                })
                .collect();

            // The group shares the touched flag of its free-text control.
            let prior_areas_error = form
                .control(Field::OtherAreaText)
                .touched
                .then(|| form.group_error())
                .flatten()
                .map(|e| e.user_message().to_string());

            let case_usable = model.case_record.as_ref().is_some_and(|c| c.is_usable());

            ViewModel {
                branches: ListView::from(&model.branches),
                selected_branch: model
                    .selected_branch
                    .as_ref()
                    .map(|b| b.legal_entity_code.clone()),
                academic_units: ListView::from(&model.academic_units),
                departments: ListView::from(&model.departments),
                modalities: ListView::from(&model.modalities),

                case_code: model.case_record.as_ref().map(|c| c.display_code.clone()),
                case_loading: model.case_loading,

                fields,
                user_types: UserType::KNOWN
                    .into_iter()
                    .map(|t| OptionView {
                        value: t.0.to_string(),
                        label: t.label().to_string(),
                    })
                    .collect(),
                has_attorney: form.has_attorney(),
                prior_areas: PriorArea::ALL
                    .into_iter()
                    .map(|area| PriorAreaView {
                        key: area.key().to_string(),
                        label: area.label().to_string(),
                        code: area.code(),
                        checked: form.is_checked(area),
                    })
                    .collect(),
                prior_areas_error,

                attachments: model
                    .attachments
                    .items()
                    .iter()
                    .enumerate()
                    .map(|(index, a)| AttachmentView {
                        index,
                        file_name: a.file_name.clone(),
                        byte_size: a.byte_size,
                        size_label: format_size(a.byte_size),
                        preview: a.preview,
                    })
                    .collect(),
                attachment_messages: model.attachment_messages.clone(),
                can_add_files: model.attachments.len() < model.config.attachments.max_files,

                submitting: model.submitting,
                can_submit: !model.submitting && case_usable,

                notice: model.notice.clone(),
                error: model.active_error.as_ref().map(UserFacingError::from),
            }
        }
    }
}
