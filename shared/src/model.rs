use serde::{Deserialize, Serialize};

use crate::attachments::AttachmentSet;
use crate::catalog::{Branch, CatalogItem, LoaderState};
use crate::config::AppConfig;
use crate::event::Generation;
use crate::form::FormState;
use crate::resolver::{CaseNumberResolver, CaseRecord};
use crate::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// One-shot message for the user; cleared by `DismissNotice` or replaced by
/// the next one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Core state. Not `Clone`: the attachment set owns preview handles that
/// must be released exactly once.
#[derive(Debug, Default)]
pub struct Model {
    pub config: AppConfig,

    pub branches: LoaderState<Branch>,
    pub selected_branch: Option<Branch>,
    pub academic_units: LoaderState<CatalogItem>,
    pub departments: LoaderState<CatalogItem>,
    pub modalities: LoaderState<CatalogItem>,

    pub case_record: Option<CaseRecord>,
    pub case_loading: bool,
    pub resolver: CaseNumberResolver,

    /// Bumped on every branch change and on reset.
    pub selection_generation: Generation,

    pub form: FormState,
    pub attachments: AttachmentSet,
    /// Rejection messages from the latest file selection.
    pub attachment_messages: Vec<String>,

    pub submitting: bool,
    /// Bumped on every submission and on reset; tags the registration reply.
    pub submission_generation: Generation,
    /// Case code of the registration in flight.
    pub submitted_case_code: Option<String>,
    pub notice: Option<Notice>,
    pub active_error: Option<AppError>,
}

impl Model {
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.selection_generation
    }

    pub fn advance_generation(&mut self) -> Generation {
        self.selection_generation = self.selection_generation.next();
        self.selection_generation
    }

    pub fn begin_submission(&mut self, case_code: String) -> Generation {
        self.submission_generation = self.submission_generation.next();
        self.submitting = true;
        self.submitted_case_code = Some(case_code);
        self.submission_generation
    }

    /// Forgets the registration in flight; its reply will be dropped.
    pub fn abandon_submission(&mut self) {
        self.submission_generation = self.submission_generation.next();
        self.submitting = false;
        self.submitted_case_code = None;
    }

    /// Drops everything scoped to the selected branch.
    pub fn clear_branch_scope(&mut self) {
        self.selected_branch = None;
        self.academic_units.clear();
        self.departments.clear();
        self.case_record = None;
        self.case_loading = false;
    }

    pub fn set_error(&mut self, error: AppError) {
        self.notice = Some(Notice::error(error.user_facing_message()));
        self.active_error = Some(error);
    }

    pub fn clear_messages(&mut self) {
        self.notice = None;
        self.active_error = None;
    }
}
