use thiserror::Error;

/// Fatal errors the solver can report. Convergence shortfalls are
/// deliberately not a variant here: the driver logs those as warnings and
/// continues with the best-effort pressure field it has.
#[derive(Debug, Error)]
pub enum CfdError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("domain error: {0}")]
    Domain(String),

    #[error("distributed communication failure: {0}")]
    Distributed(String),

    #[error("device backend error: {0}")]
    Device(String),
}

pub type CfdResult<T> = Result<T, CfdError>;
