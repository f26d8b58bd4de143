use serde::{Deserialize, Serialize};

use crate::api::{
    AcademicUnitDto, ApiReply, BranchDto, CaseNumberDto, DepartmentDto, ModalityDto,
    RegistrationAck,
};
use crate::attachments::FileCandidate;
use crate::config::AppConfig;
use crate::form::{Field, PriorArea};

/// Identifies the branch selection (or submission) a request was issued
/// for. Replies carrying an older generation are dropped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum Event {
    #[default]
    Noop,

    AppStarted,
    Configure(Box<AppConfig>),

    // Branch directory & reference data
    BranchesRequested,
    BranchesLoaded(ApiReply<Vec<BranchDto>>),
    ModalitiesLoaded(ApiReply<Vec<ModalityDto>>),
    BranchSelected {
        legal_entity_code: Option<String>,
    },
    AcademicUnitsLoaded {
        generation: Generation,
        reply: ApiReply<Vec<AcademicUnitDto>>,
    },
    DepartmentsLoaded {
        generation: Generation,
        reply: ApiReply<Vec<DepartmentDto>>,
    },
    CaseNumberResolved {
        generation: Generation,
        reply: ApiReply<CaseNumberDto>,
    },

    // Form
    FieldEdited {
        field: Field,
        value: String,
    },
    FieldTouched {
        field: Field,
    },
    AttorneyToggled {
        present: bool,
    },
    PriorAreaToggled {
        area: PriorArea,
        checked: bool,
    },

    // Attachments
    FilesSelected(Vec<FileCandidate>),
    FileRemoved {
        index: usize,
    },
    FilesCleared,

    // Submission
    SubmitRequested,
    SubmitResponse {
        submission: Generation,
        reply: ApiReply<RegistrationAck>,
    },
    ResetRequested,

    DismissNotice,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::BranchesRequested => "branches_requested",
            Self::BranchesLoaded(_) => "branches_loaded",
            Self::ModalitiesLoaded(_) => "modalities_loaded",
            Self::BranchSelected { .. } => "branch_selected",
            Self::AcademicUnitsLoaded { .. } => "academic_units_loaded",
            Self::DepartmentsLoaded { .. } => "departments_loaded",
            Self::CaseNumberResolved { .. } => "case_number_resolved",
            Self::FieldEdited { .. } => "field_edited",
            Self::FieldTouched { .. } => "field_touched",
            Self::AttorneyToggled { .. } => "attorney_toggled",
            Self::PriorAreaToggled { .. } => "prior_area_toggled",
            Self::FilesSelected(_) => "files_selected",
            Self::FileRemoved { .. } => "file_removed",
            Self::FilesCleared => "files_cleared",
            Self::SubmitRequested => "submit_requested",
            Self::SubmitResponse { .. } => "submit_response",
            Self::ResetRequested => "reset_requested",
            Self::DismissNotice => "dismiss_notice",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::BranchesRequested
                | Self::BranchSelected { .. }
                | Self::FieldEdited { .. }
                | Self::FieldTouched { .. }
                | Self::AttorneyToggled { .. }
                | Self::PriorAreaToggled { .. }
                | Self::FilesSelected(_)
                | Self::FileRemoved { .. }
                | Self::FilesCleared
                | Self::SubmitRequested
                | Self::ResetRequested
                | Self::DismissNotice
        )
    }
}
