use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AttachmentLimits;

/// A file offered by the shell's picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    /// Opaque shell-side reference to the raw file.
    pub raw_ref: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreviewHandle(pub u64);

/// Not `Clone`: the preview handle inside must leave the set exactly once.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub byte_size: u64,
    pub preview: PreviewHandle,
    pub raw_ref: String,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rejection {
    #[error("file has no name")]
    EmptyName,

    #[error("'{name}' ({size} bytes) is already attached")]
    Duplicate { name: String, size: u64 },

    #[error("attachment limit of {max} files reached")]
    LimitReached { max: usize },

    #[error("file is {size} bytes, maximum is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("extension '{extension}' is not allowed")]
    ExtensionNotAllowed { extension: String },
}

impl Rejection {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyName => "El archivo no tiene nombre.".into(),
            Self::Duplicate { name, .. } => format!("El archivo \"{name}\" ya fue adjuntado."),
            Self::LimitReached { max } => format!("Solo puede adjuntar hasta {max} archivos."),
            Self::TooLarge { max, .. } => {
                format!(
                    "El archivo supera el tamaño máximo de {}.",
                    crate::format_size(*max)
                )
            }
            Self::ExtensionNotAllowed { extension } if extension.is_empty() => {
                "El archivo no tiene una extensión permitida.".into()
            }
            Self::ExtensionNotAllowed { extension } => {
                format!("La extensión .{extension} no está permitida.")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted(PreviewHandle),
    Rejected(Rejection),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddReport {
    pub file_name: String,
    pub raw_ref: String,
    pub outcome: AddOutcome,
}

/// Extension after the last `.`, lower-cased; empty if there is none.
#[must_use]
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct AttachmentSet {
    items: Vec<Attachment>,
    next_handle: u64,
}

impl AttachmentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[Attachment] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check(&self, candidate: &FileCandidate, limits: &AttachmentLimits) -> Result<(), Rejection> {
        if candidate.name.trim().is_empty() {
            return Err(Rejection::EmptyName);
        }

        if self
            .items
            .iter()
            .any(|a| a.file_name == candidate.name && a.byte_size == candidate.size_bytes)
        {
            return Err(Rejection::Duplicate {
                name: candidate.name.clone(),
                size: candidate.size_bytes,
            });
        }

        if self.items.len() >= limits.max_files {
            return Err(Rejection::LimitReached {
                max: limits.max_files,
            });
        }

        if candidate.size_bytes > limits.max_file_bytes {
            return Err(Rejection::TooLarge {
                size: candidate.size_bytes,
                max: limits.max_file_bytes,
            });
        }

        let extension = extension_of(&candidate.name);
        if !limits.allows_extension(&extension) {
            return Err(Rejection::ExtensionNotAllowed { extension });
        }

        Ok(())
    }

    /// Validates each candidate in order; a rejection never stops the batch.
    pub fn add(&mut self, candidates: Vec<FileCandidate>, limits: &AttachmentLimits) -> Vec<AddReport> {
        candidates
            .into_iter()
            .map(|candidate| {
                let outcome = match self.check(&candidate, limits) {
                    Ok(()) => {
                        self.next_handle += 1;
                        let preview = PreviewHandle(self.next_handle);
                        debug!(file = %candidate.name, handle = preview.0, "attachment accepted");
                        self.items.push(Attachment {
                            file_name: candidate.name.clone(),
                            byte_size: candidate.size_bytes,
                            preview,
                            raw_ref: candidate.raw_ref.clone(),
                        });
                        AddOutcome::Accepted(preview)
                    }
                    Err(rejection) => {
                        warn!(file = %candidate.name, %rejection, "attachment rejected");
                        AddOutcome::Rejected(rejection)
                    }
                };
                AddReport {
                    file_name: candidate.name,
                    raw_ref: candidate.raw_ref,
                    outcome,
                }
            })
            .collect()
    }

    /// Removes the attachment at `index`, handing back its preview handle
    /// for release.
    pub fn remove(&mut self, index: usize) -> Option<PreviewHandle> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        Some(removed.preview)
    }

    /// Empties the set, handing back every preview handle for release.
    pub fn clear(&mut self) -> Vec<PreviewHandle> {
        self.items.drain(..).map(|a| a.preview).collect()
    }
}
