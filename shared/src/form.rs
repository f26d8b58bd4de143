//! Form state and the rule engine that keeps dependent fields consistent.
//!
//! Rules run as an explicit transition `(state, change) -> state`. A rule
//! writes dependent controls directly and never routes those writes back
//! through [`FormState::apply_mut`], so a rule can not trigger another rule.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OTHER_TEXT_MIN_LEN: usize = 3;
pub const STATEMENT_MIN_LEN: usize = 50;
pub const REQUEST_MIN_LEN: usize = 20;

static DOCUMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{8}|[A-Za-z0-9\-]{6,20})$").expect("static regex"));

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{9}$").expect("static regex"));

// Same shape as the WHATWG e-mail check used by browser form validation.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$"#,
    )
    .expect("static regex")
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Branch,
    FirstNames,
    LastNames,
    Document,
    Address,
    Phone,
    Email,
    UserType,
    AcademicUnit,
    Modality,
    Area,
    AttorneyLastNames,
    AttorneyFirstNames,
    AttorneyEmail,
    OtherAreaText,
    Statement,
    Request,
}

impl Field {
    pub const ALL: [Self; 17] = [
        Self::Branch,
        Self::FirstNames,
        Self::LastNames,
        Self::Document,
        Self::Address,
        Self::Phone,
        Self::Email,
        Self::UserType,
        Self::AcademicUnit,
        Self::Modality,
        Self::Area,
        Self::AttorneyLastNames,
        Self::AttorneyFirstNames,
        Self::AttorneyEmail,
        Self::OtherAreaText,
        Self::Statement,
        Self::Request,
    ];

    /// Control name used by the UI layer.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Branch => "filial",
            Self::FirstNames => "nombres",
            Self::LastNames => "apellidos",
            Self::Document => "dni",
            Self::Address => "domicilio",
            Self::Phone => "telefono",
            Self::Email => "correo",
            Self::UserType => "tipoUsuario",
            Self::AcademicUnit => "escuelaProfesional",
            Self::Modality => "modalidad",
            Self::Area => "area",
            Self::AttorneyLastNames => "apellidosApoderado",
            Self::AttorneyFirstNames => "nombresApoderado",
            Self::AttorneyEmail => "correoApoderado",
            Self::OtherAreaText => "textoOtros",
            Self::Statement => "expone",
            Self::Request => "solicita",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    const fn validator(self) -> Validator {
        match self {
            Self::Document => Validator::Pattern(Pattern::Document),
            Self::Phone => Validator::Pattern(Pattern::Phone),
            Self::Email | Self::AttorneyEmail => Validator::Email,
            Self::OtherAreaText => Validator::MinLength(OTHER_TEXT_MIN_LEN),
            Self::Statement => Validator::MinLength(STATEMENT_MIN_LEN),
            Self::Request => Validator::MinLength(REQUEST_MIN_LEN),
            _ => Validator::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Document,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validator {
    None,
    Pattern(Pattern),
    Email,
    MinLength(usize),
}

/// Submitter role; the numeric codes are the ones the registry expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserType(pub u16);

impl UserType {
    pub const FACULTY: Self = Self(12);
    pub const STUDENT: Self = Self(13);
    pub const ADMINISTRATIVE: Self = Self(21);

    pub const KNOWN: [Self; 3] = [Self::STUDENT, Self::FACULTY, Self::ADMINISTRATIVE];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok().map(Self)
    }

    #[must_use]
    pub const fn is_administrative(self) -> bool {
        self.0 == Self::ADMINISTRATIVE.0
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            12 => "Docente",
            13 => "Estudiante",
            21 => "Administrativo",
            _ => "Otro",
        }
    }
}

/// Offices the submitter may have contacted before filing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorArea {
    SchoolDirection,
    AcademicSecretary,
    AcademicRecords,
    Treasury,
    StudentWelfare,
    BranchDirection,
    Other,
}

impl PriorArea {
    pub const ALL: [Self; 7] = [
        Self::SchoolDirection,
        Self::AcademicSecretary,
        Self::AcademicRecords,
        Self::Treasury,
        Self::StudentWelfare,
        Self::BranchDirection,
        Self::Other,
    ];

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::SchoolDirection => 1,
            Self::AcademicSecretary => 2,
            Self::AcademicRecords => 3,
            Self::Treasury => 4,
            Self::StudentWelfare => 5,
            Self::BranchDirection => 6,
            Self::Other => 7,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SchoolDirection => "direccionEscuela",
            Self::AcademicSecretary => "secretariaAcademica",
            Self::AcademicRecords => "registrosAcademicos",
            Self::Treasury => "tesoreria",
            Self::StudentWelfare => "bienestarUniversitario",
            Self::BranchDirection => "direccionFilial",
            Self::Other => "otro",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SchoolDirection => "Dirección de Escuela",
            Self::AcademicSecretary => "Secretaría Académica",
            Self::AcademicRecords => "Registros Académicos",
            Self::Treasury => "Tesorería",
            Self::StudentWelfare => "Bienestar Universitario",
            Self::BranchDirection => "Dirección de Filial",
            Self::Other => "Otro",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldControl {
    pub value: String,
    pub enabled: bool,
    pub required: bool,
    pub touched: bool,
}

impl FieldControl {
    const fn new(required: bool) -> Self {
        Self {
            value: String::new(),
            enabled: true,
            required,
            touched: false,
        }
    }

    fn switch_on(&mut self, required: bool) {
        self.enabled = true;
        self.required = required;
    }

    fn switch_off(&mut self) {
        self.value.clear();
        self.enabled = false;
        self.required = false;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FormChange {
    Edit { field: Field, value: String },
    Attorney(bool),
    PriorArea { area: PriorArea, checked: bool },
    Touch(Field),
}

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldError {
    #[error("required")]
    Required,
    #[error("invalid format")]
    Pattern,
    #[error("invalid e-mail")]
    Email,
    #[error("must have at least {min} characters (has {actual})")]
    MinLength { min: usize, actual: usize },
}

impl FieldError {
    #[must_use]
    pub fn user_message(self) -> String {
        match self {
            Self::Required => "Este campo es obligatorio.".into(),
            Self::Pattern => "El formato no es válido.".into(),
            Self::Email => "Ingrese un correo electrónico válido.".into(),
            Self::MinLength { min, actual } => {
                format!("Debe tener al menos {min} caracteres (actualmente {actual}).")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupError {
    #[error("ningunaSeleccionada")]
    NoneSelected,
    #[error("otroSinEspecificar")]
    OtherNotSpecified,
}

impl GroupError {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoneSelected => "ningunaSeleccionada",
            Self::OtherNotSpecified => "otroSinEspecificar",
        }
    }

    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::NoneSelected => "Seleccione al menos un área a la que acudió previamente.",
            Self::OtherNotSpecified => "Especifique el área (mínimo 3 caracteres).",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: BTreeMap<Field, FieldError>,
    pub group: Option<GroupError>,
}

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.group.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormState {
    controls: BTreeMap<Field, FieldControl>,
    has_attorney: bool,
    prior_areas: BTreeSet<PriorArea>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        let controls = Field::ALL
            .into_iter()
            .map(|field| (field, FieldControl::new(true)))
            .collect();

        let mut state = Self {
            controls,
            has_attorney: false,
            prior_areas: BTreeSet::new(),
        };
        state.apply_user_type_rule();
        state.apply_attorney_rule();
        state.apply_other_area_rule();
        state
    }

    /// A deserialized state may lack controls; those read as an empty,
    /// optional control, the same one `control_mut` would insert.
    #[must_use]
    pub fn control(&self, field: Field) -> &FieldControl {
        static ABSENT: FieldControl = FieldControl::new(false);
        self.controls.get(&field).unwrap_or(&ABSENT)
    }

    fn control_mut(&mut self, field: Field) -> &mut FieldControl {
        self.controls
            .entry(field)
            .or_insert_with(|| FieldControl::new(false))
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        &self.control(field).value
    }

    #[must_use]
    pub const fn has_attorney(&self) -> bool {
        self.has_attorney
    }

    #[must_use]
    pub fn is_checked(&self, area: PriorArea) -> bool {
        self.prior_areas.contains(&area)
    }

    pub fn checked_areas(&self) -> impl Iterator<Item = PriorArea> + '_ {
        self.prior_areas.iter().copied()
    }

    #[must_use]
    pub fn user_type(&self) -> Option<UserType> {
        UserType::parse(self.value(Field::UserType))
    }

    #[must_use]
    pub fn apply(mut self, change: &FormChange) -> Self {
        self.apply_mut(change);
        self
    }

    pub fn apply_mut(&mut self, change: &FormChange) {
        match change {
            FormChange::Edit { field, value } => {
                let control = self.control_mut(*field);
                if !control.enabled {
                    return;
                }
                control.value.clone_from(value);
                if *field == Field::UserType {
                    self.apply_user_type_rule();
                }
            }
            FormChange::Attorney(present) => {
                self.has_attorney = *present;
                self.apply_attorney_rule();
            }
            FormChange::PriorArea { area, checked } => {
                if *checked {
                    self.prior_areas.insert(*area);
                } else {
                    self.prior_areas.remove(area);
                }
                if *area == PriorArea::Other {
                    self.apply_other_area_rule();
                }
            }
            FormChange::Touch(field) => self.control_mut(*field).touched = true,
        }
    }

    /// Administrative staff report against an area; everybody else against
    /// an academic unit and modality.
    pub fn apply_user_type_rule(&mut self) {
        let administrative = self.user_type().is_some_and(UserType::is_administrative);

        if administrative {
            self.control_mut(Field::Area).switch_on(true);
            self.control_mut(Field::AcademicUnit).switch_off();
            self.control_mut(Field::Modality).switch_off();
        } else {
            self.control_mut(Field::AcademicUnit).switch_on(true);
            self.control_mut(Field::Modality).switch_on(true);
            self.control_mut(Field::Area).switch_off();
        }
    }

    pub fn apply_attorney_rule(&mut self) {
        for field in [
            Field::AttorneyLastNames,
            Field::AttorneyFirstNames,
            Field::AttorneyEmail,
        ] {
            if self.has_attorney {
                self.control_mut(field).switch_on(true);
            } else {
                self.control_mut(field).switch_off();
            }
        }
    }

    pub fn apply_other_area_rule(&mut self) {
        if self.prior_areas.contains(&PriorArea::Other) {
            self.control_mut(Field::OtherAreaText).switch_on(true);
        } else {
            self.control_mut(Field::OtherAreaText).switch_off();
        }
    }

    /// Clears a field without running its rule, for branch changes.
    pub(crate) fn clear_value(&mut self, field: Field) {
        self.control_mut(field).value.clear();
    }

    pub(crate) fn set_value_silently(&mut self, field: Field, value: &str) {
        self.control_mut(field).value = value.to_string();
    }

    pub fn mark_all_touched(&mut self) {
        for control in self.controls.values_mut() {
            control.touched = true;
        }
    }

    #[must_use]
    pub fn field_error(&self, field: Field) -> Option<FieldError> {
        let control = self.control(field);
        if !control.enabled {
            return None;
        }

        let value = control.value.trim();
        if value.is_empty() {
            return control.required.then_some(FieldError::Required);
        }

        match field.validator() {
            Validator::None => None,
            Validator::Pattern(Pattern::Document) => {
                (!DOCUMENT_PATTERN.is_match(value)).then_some(FieldError::Pattern)
            }
            Validator::Pattern(Pattern::Phone) => {
                (!PHONE_PATTERN.is_match(value)).then_some(FieldError::Pattern)
            }
            Validator::Email => (!EMAIL_PATTERN.is_match(value)).then_some(FieldError::Email),
            Validator::MinLength(min) => {
                let actual = value.chars().count();
                (actual < min).then_some(FieldError::MinLength { min, actual })
            }
        }
    }

    #[must_use]
    pub fn group_error(&self) -> Option<GroupError> {
        if self.prior_areas.is_empty() {
            return Some(GroupError::NoneSelected);
        }
        if self.prior_areas.contains(&PriorArea::Other)
            && self.value(Field::OtherAreaText).trim().chars().count() < OTHER_TEXT_MIN_LEN
        {
            return Some(GroupError::OtherNotSpecified);
        }
        None
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let errors = FormErrors {
            fields: Field::ALL
                .into_iter()
                .filter_map(|field| self.field_error(field).map(|e| (field, e)))
                .collect(),
            group: self.group_error(),
        };

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Comma-joined area codes in ascending order, e.g. `"1,3,7"`.
    #[must_use]
    pub fn area_codes(&self) -> String {
        self.prior_areas
            .iter()
            .map(|area| area.code().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
