//! Wire contracts of the Defensoría web service and the tagged reply type the
//! rest of the core works with.
//!
//! Every endpoint wraps its payload in an envelope carrying `isSuccess` plus
//! either `lstItem` (lists) or `item` (single records). A missing or false
//! `isSuccess`, a missing payload and a transport error all collapse into
//! [`ApiReply::Failure`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{Branch, CatalogItem};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ApiReply<T> {
    Success(T),
    Failure {
        /// Diagnostic reason, for logs.
        reason: String,
        /// Message supplied by the server, safe to show to the user.
        server_message: Option<String>,
    },
}

impl<T> ApiReply<T> {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
            server_message: None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiReply<U> {
        match self {
            Self::Success(value) => ApiReply::Success(f(value)),
            Self::Failure {
                reason,
                server_message,
            } => ApiReply::Failure {
                reason,
                server_message,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub is_success: Option<bool>,
    pub lst_item: Option<Vec<T>>,
    pub item: Option<T>,
    #[serde(alias = "mensaje")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn server_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    fn soft_failure<U>(&self, reason: &str) -> ApiReply<U> {
        ApiReply::Failure {
            reason: reason.to_string(),
            server_message: self.server_message(),
        }
    }

    pub fn into_list(self) -> ApiReply<Vec<T>> {
        if self.is_success != Some(true) {
            return self.soft_failure("isSuccess is not true");
        }
        match self.lst_item {
            Some(items) => ApiReply::Success(items),
            None => ApiReply::failure("response has no lstItem"),
        }
    }

    pub fn into_item(self) -> ApiReply<T> {
        if self.is_success != Some(true) {
            return self.soft_failure("isSuccess is not true");
        }
        let message = self.server_message();
        match self.item {
            Some(item) => ApiReply::Success(item),
            None => ApiReply::Failure {
                reason: "response has no item".into(),
                server_message: message,
            },
        }
    }

    /// For endpoints where the item is informative only.
    pub fn into_ack(self) -> ApiReply<RegistrationAck> {
        if self.is_success != Some(true) {
            return self.soft_failure("isSuccess is not true");
        }
        ApiReply::Success(RegistrationAck {
            message: self.server_message(),
        })
    }
}

/// Non-2xx replies arrive as `HttpError::Http`; the service still puts its
/// envelope (and `mensaje`) in the body.
fn transport_failure<U>(error: &crux_http::HttpError) -> ApiReply<U> {
    let server_message = match error {
        crux_http::HttpError::Http {
            body: Some(body), ..
        } => serde_json::from_slice::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.server_message()),
        _ => None,
    };
    ApiReply::Failure {
        reason: format!("transport error: {error}"),
        server_message,
    }
}

pub(crate) fn list_reply<T>(
    result: crux_http::Result<crux_http::Response<Envelope<T>>>,
) -> ApiReply<Vec<T>> {
    match result {
        Ok(mut response) => match response.take_body() {
            Some(envelope) => envelope.into_list(),
            None => ApiReply::failure("empty response body"),
        },
        Err(e) => transport_failure(&e),
    }
}

pub(crate) fn item_reply<T>(
    result: crux_http::Result<crux_http::Response<Envelope<T>>>,
) -> ApiReply<T> {
    match result {
        Ok(mut response) => match response.take_body() {
            Some(envelope) => envelope.into_item(),
            None => ApiReply::failure("empty response body"),
        },
        Err(e) => transport_failure(&e),
    }
}

pub(crate) fn ack_reply(
    result: crux_http::Result<crux_http::Response<Envelope<serde_json::Value>>>,
) -> ApiReply<RegistrationAck> {
    match result {
        Ok(mut response) => match response.take_body() {
            Some(envelope) => envelope.into_ack(),
            None => ApiReply::failure("empty response body"),
        },
        Err(e) => transport_failure(&e),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationAck {
    pub message: Option<String>,
}

// --- Flexible scalars: the service is not consistent about string vs number ---

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn code_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text.trim().to_string(),
        Some(Scalar::Integer(n)) => n.to_string(),
        #[allow(clippy::cast_possible_truncation)]
        Some(Scalar::Float(f)) if f.fract() == 0.0 => (f as i64).to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

fn number_from_any<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text.trim().parse().ok(),
        Some(Scalar::Integer(n)) => u64::try_from(n).ok(),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Scalar::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Some(f as u64),
        Some(Scalar::Float(_)) | None => None,
    })
}

// --- Response DTOs ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchDto {
    #[serde(rename = "cPerJuridica", default, deserialize_with = "code_from_any")]
    pub legal_entity_code: String,
    #[serde(rename = "cPerApellido", default)]
    pub display_name: Option<String>,
    #[serde(rename = "pS_ESTABID", alias = "estabid", default, deserialize_with = "code_from_any")]
    pub establishment_id: String,
}

impl From<BranchDto> for Branch {
    fn from(dto: BranchDto) -> Self {
        Self {
            legal_entity_code: dto.legal_entity_code,
            display_name: dto.display_name.unwrap_or_default().trim().to_string(),
            establishment_id: dto.establishment_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcademicUnitDto {
    #[serde(rename = "nuniorgcodigo", default, deserialize_with = "code_from_any")]
    pub code: String,
    #[serde(rename = "cuniorgnombre", default)]
    pub name: Option<String>,
}

impl From<AcademicUnitDto> for CatalogItem {
    fn from(dto: AcademicUnitDto) -> Self {
        Self::new(dto.code, dto.name.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartmentDto {
    #[serde(
        rename = "idDepartamento",
        alias = "nIdDepartamento",
        default,
        deserialize_with = "code_from_any"
    )]
    pub code: String,
    #[serde(rename = "descripcion", alias = "cDepartamento", default)]
    pub name: Option<String>,
}

impl From<DepartmentDto> for CatalogItem {
    fn from(dto: DepartmentDto) -> Self {
        Self::new(dto.code, dto.name.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModalityDto {
    #[serde(rename = "nIntCodigo", default, deserialize_with = "code_from_any")]
    pub code: String,
    #[serde(rename = "cIntDescripcion", default)]
    pub description: Option<String>,
}

impl From<ModalityDto> for CatalogItem {
    fn from(dto: ModalityDto) -> Self {
        Self::new(dto.code, dto.description.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CaseNumberDto {
    #[serde(default, deserialize_with = "number_from_any")]
    pub nro_expediente: Option<u64>,
    #[serde(default)]
    pub codigo_expediente: Option<String>,
    #[serde(default)]
    pub correo_expediente: Option<String>,
}

// --- Request bodies ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseNumberRequest {
    pub cperjuridica: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcademicUnitsRequest {
    pub cperjuridica: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartmentsRequest {
    pub estabid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub nombre: String,
    pub tamano_bytes: u64,
    /// Shell-side reference to the raw file.
    pub referencia: String,
}

/// Canonical JSON registration contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCaseRequest {
    pub id_expediente: u64,
    pub codigo_expediente: String,
    pub tipo_usuario: u16,
    pub c_per_juridica: String,
    pub c_per_apellido: String,
    pub estab_id: String,
    pub correo_filial: String,
    pub nombres: String,
    pub apellidos: String,
    pub dni: String,
    pub n_uni_org_codigo: Option<i64>,
    pub n_modalidad: Option<i64>,
    pub domicilio: String,
    pub telefono: String,
    pub correo: String,
    pub existe_apo: bool,
    pub apellidos_apo: String,
    pub nombres_apo: String,
    pub correo_apo: String,
    pub id_departamento: Option<i64>,
    pub opciones: String,
    pub texto_otros: String,
    pub descripcion: String,
    pub solicita: String,
    pub archivos: Vec<AttachmentRef>,
}
