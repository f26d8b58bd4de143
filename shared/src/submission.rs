use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{AttachmentRef, RegisterCaseRequest};
use crate::attachments::AttachmentSet;
use crate::catalog::Branch;
use crate::form::{Field, FormErrors, FormState};
use crate::resolver::CaseRecord;

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Ocurrió un error al enviar el formulario. Intente nuevamente.";
pub const VALIDATION_MESSAGE: &str = "Por favor, complete todos los campos requeridos.";
pub const MISSING_CASE_MESSAGE: &str =
    "No se ha generado el número de expediente. Seleccione nuevamente la filial.";

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error("form has validation errors")]
    Invalid(FormErrors),

    #[error("no case number has been resolved")]
    MissingCaseNumber,

    #[error("no branch is selected")]
    MissingBranch,

    #[error("selected value for '{}' is not a numeric code: {value}", .field.key())]
    InvalidSelection { field: Field, value: String },
}

impl SubmitError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadySubmitting => "El formulario ya se está enviando.",
            Self::Invalid(_) | Self::MissingBranch | Self::InvalidSelection { .. } => {
                VALIDATION_MESSAGE
            }
            Self::MissingCaseNumber => MISSING_CASE_MESSAGE,
        }
    }
}

fn numeric_selection(form: &FormState, field: Field) -> Result<Option<i64>, SubmitError> {
    let control = form.control(field);
    if !control.enabled {
        return Ok(None);
    }
    let value = control.value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| SubmitError::InvalidSelection {
            field,
            value: value.to_string(),
        })
}

fn text(form: &FormState, field: Field) -> String {
    form.value(field).trim().to_string()
}

/// Checks preconditions and assembles the registration payload.
pub fn build_registration(
    form: &FormState,
    case: Option<&CaseRecord>,
    branch: Option<&Branch>,
    attachments: &AttachmentSet,
) -> Result<RegisterCaseRequest, SubmitError> {
    form.validate().map_err(SubmitError::Invalid)?;

    let case = case
        .filter(|c| c.is_usable())
        .ok_or(SubmitError::MissingCaseNumber)?;
    let branch = branch.ok_or(SubmitError::MissingBranch)?;

    let tipo_usuario = form
        .user_type()
        .ok_or_else(|| SubmitError::InvalidSelection {
            field: Field::UserType,
            value: form.value(Field::UserType).to_string(),
        })?
        .0;

    let has_attorney = form.has_attorney();

    Ok(RegisterCaseRequest {
        id_expediente: case.numeric_id,
        codigo_expediente: case.display_code.clone(),
        tipo_usuario,
        c_per_juridica: branch.legal_entity_code.clone(),
        c_per_apellido: branch.display_name.clone(),
        estab_id: branch.establishment_id.clone(),
        correo_filial: case.contact_email.clone(),
        nombres: text(form, Field::FirstNames),
        apellidos: text(form, Field::LastNames),
        dni: text(form, Field::Document),
        n_uni_org_codigo: numeric_selection(form, Field::AcademicUnit)?,
        n_modalidad: numeric_selection(form, Field::Modality)?,
        domicilio: text(form, Field::Address),
        telefono: text(form, Field::Phone),
        correo: text(form, Field::Email),
        existe_apo: has_attorney,
        apellidos_apo: text(form, Field::AttorneyLastNames),
        nombres_apo: text(form, Field::AttorneyFirstNames),
        correo_apo: text(form, Field::AttorneyEmail),
        id_departamento: numeric_selection(form, Field::Area)?,
        opciones: form.area_codes(),
        texto_otros: text(form, Field::OtherAreaText),
        descripcion: text(form, Field::Statement),
        solicita: text(form, Field::Request),
        archivos: attachments
            .items()
            .iter()
            .map(|a| AttachmentRef {
                nombre: a.file_name.clone(),
                tamano_bytes: a.byte_size,
                referencia: a.raw_ref.clone(),
            })
            .collect(),
    })
}

/// Message shown after a failed registration.
#[must_use]
pub fn failure_message(server_message: Option<&str>) -> String {
    server_message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map_or_else(|| GENERIC_FAILURE_MESSAGE.to_string(), str::to_string)
}

#[must_use]
pub fn success_message(case_code: &str) -> String {
    format!("Su expediente {case_code} fue registrado correctamente.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::FileCandidate;
    use crate::config::AttachmentLimits;
    use crate::form::{FormChange, PriorArea};
    use crate::resolver::CaseNumberResolver;

    fn branch() -> Branch {
        Branch {
            legal_entity_code: "0001".into(),
            display_name: "Lima Norte".into(),
            establishment_id: "LNO".into(),
        }
    }

    fn valid_form(user_type: &str) -> FormState {
        let mut form = FormState::new();
        for (field, value) in [
            (Field::Branch, "0001"),
            (Field::FirstNames, " Luis "),
            (Field::LastNames, "Torres"),
            (Field::Document, "87654321"),
            (Field::Address, "Jr. Puno 450"),
            (Field::Phone, "912345678"),
            (Field::Email, "luis@example.edu.pe"),
            (Field::UserType, user_type),
            (Field::AcademicUnit, "15"),
            (Field::Modality, "2"),
            (Field::Area, "33"),
            (
                Field::Statement,
                "El docente no registró mis notas del curso en el sistema académico.",
            ),
            (Field::Request, "Solicito la corrección de mis notas."),
        ] {
            form.apply_mut(&FormChange::Edit {
                field,
                value: value.into(),
            });
        }
        for area in [PriorArea::Other, PriorArea::SchoolDirection] {
            form.apply_mut(&FormChange::PriorArea { area, checked: true });
        }
        form.apply_mut(&FormChange::Edit {
            field: Field::OtherAreaText,
            value: "Biblioteca".into(),
        });
        form
    }

    #[test]
    fn builds_academic_payload() {
        let case = CaseNumberResolver::new().fallback("LNO");
        let mut attachments = AttachmentSet::new();
        attachments.add(
            vec![FileCandidate {
                name: "boleta.pdf".into(),
                size_bytes: 2048,
                raw_ref: "blob:1".into(),
            }],
            &AttachmentLimits::default(),
        );

        let payload =
            build_registration(&valid_form("13"), Some(&case), Some(&branch()), &attachments)
                .unwrap();

        assert_eq!(payload.codigo_expediente, "EXPE-LNO-0001");
        assert_eq!(payload.tipo_usuario, 13);
        assert_eq!(payload.nombres, "Luis");
        assert_eq!(payload.n_uni_org_codigo, Some(15));
        assert_eq!(payload.n_modalidad, Some(2));
        assert_eq!(payload.id_departamento, None);
        assert_eq!(payload.opciones, "1,7");
        assert_eq!(payload.texto_otros, "Biblioteca");
        assert!(!payload.existe_apo);
        assert_eq!(payload.archivos.len(), 1);
        assert_eq!(payload.archivos[0].referencia, "blob:1");
    }

    #[test]
    fn administrative_payload_uses_area() {
        let case = CaseNumberResolver::new().fallback("LNO");
        let mut form = valid_form("21");
        form.apply_mut(&FormChange::Edit {
            field: Field::Area,
            value: "33".into(),
        });
        let payload =
            build_registration(&form, Some(&case), Some(&branch()), &AttachmentSet::new()).unwrap();
        assert_eq!(payload.id_departamento, Some(33));
        assert_eq!(payload.n_uni_org_codigo, None);
        assert_eq!(payload.n_modalidad, None);
    }

    #[test]
    fn missing_case_number_is_distinct() {
        let result =
            build_registration(&valid_form("13"), None, Some(&branch()), &AttachmentSet::new());
        assert_eq!(result, Err(SubmitError::MissingCaseNumber));
        assert_eq!(
            SubmitError::MissingCaseNumber.user_message(),
            MISSING_CASE_MESSAGE
        );
    }

    #[test]
    fn invalid_form_reported_first() {
        let result = build_registration(&FormState::new(), None, None, &AttachmentSet::new());
        assert!(matches!(result, Err(SubmitError::Invalid(_))));
    }

    #[test]
    fn non_numeric_selection_rejected() {
        let case = CaseNumberResolver::new().fallback("LNO");
        let mut form = valid_form("13");
        form.apply_mut(&FormChange::Edit {
            field: Field::Modality,
            value: "presencial".into(),
        });
        let result = build_registration(&form, Some(&case), Some(&branch()), &AttachmentSet::new());
        assert!(matches!(
            result,
            Err(SubmitError::InvalidSelection {
                field: Field::Modality,
                ..
            })
        ));
    }

    #[test]
    fn failure_message_prefers_server_text() {
        assert_eq!(failure_message(Some(" DNI observado ")), "DNI observado");
        assert_eq!(failure_message(Some("  ")), GENERIC_FAILURE_MESSAGE);
        assert_eq!(failure_message(None), GENERIC_FAILURE_MESSAGE);
    }
}
