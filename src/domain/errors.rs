use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    /// Los bytes recibidos no forman una imagen legible.
    #[error("Imagen no decodificable: {0}")]
    Decode(String),
    /// Fallo en detección, telemetría o evaluación de reglas.
    #[error("Error de análisis: {0}")]
    Analysis(String),
}

impl DomainError {
    /// Reclasifica cualquier error como fallo de análisis conservando el mensaje original.
    pub fn into_analysis(self) -> Self {
        match self {
            DomainError::Analysis(_) => self,
            other => DomainError::Analysis(other.to_string()),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
