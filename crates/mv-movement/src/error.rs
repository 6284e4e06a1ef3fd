use mv_core::{CoreError, UnitId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovementError {
    #[error("no movement controller for {0}")]
    UnknownUnit(UnitId),

    #[error("{0} already has a movement controller")]
    DuplicateUnit(UnitId),

    #[error("{0} is not present in the unit registry")]
    UnitMissing(UnitId),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type MovementResult<T> = Result<T, MovementError>;
