//! Error types and handling for the `clima` application

use thiserror::Error;

/// Main error type for the `clima` application
#[derive(Error, Debug)]
pub enum ClimaError {
    /// An upstream service answered with a non-success HTTP status
    #[error("{service} returned HTTP {status}")]
    Upstream { service: String, status: u16 },

    /// An upstream service answered successfully but the body lacks expected fields
    #[error("Malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Spreadsheet serialization errors
    #[error("Export error: {message}")]
    Export { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ClimaError {
    pub fn upstream<S: Into<String>>(service: S, status: u16) -> Self {
        Self::Upstream {
            service: service.into(),
            status,
        }
    }

    pub fn malformed<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::MalformedResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// HTTP status of an upstream failure, if that is what this is
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClimaError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimaError::Upstream { service, status } => {
                format!("O serviço {service} respondeu com o código {status}.")
            }
            ClimaError::MalformedResponse { service, .. } => {
                format!("O serviço {service} devolveu uma resposta inesperada.")
            }
            ClimaError::Network { .. } => {
                "Não foi possível conectar aos serviços externos. Verifique sua conexão."
                    .to_string()
            }
            ClimaError::Validation { message } => format!("Entrada inválida: {message}"),
            ClimaError::Config { .. } => {
                "Erro de configuração. Verifique o arquivo de configuração.".to_string()
            }
            ClimaError::Export { .. } => "Falha ao gerar a planilha.".to_string(),
            ClimaError::Io { .. } => "Falha de leitura ou escrita de arquivo.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClimaError {
    fn from(err: reqwest::Error) -> Self {
        ClimaError::network(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ClimaError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ClimaError::export(err.to_string())
    }
}
