use mv_core::CoreError;
use mv_host::HostError;
use mv_movement::MovementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("run() needs a bounded config (total_ticks > 0); use run_ticks instead")]
    Unbounded,

    #[error("unit ids exhausted")]
    UnitIdsExhausted,

    #[error("movement error: {0}")]
    Movement(#[from] MovementError),

    #[error("host peer error: {0}")]
    Host(#[from] HostError),
}

pub type SimResult<T> = Result<T, SimError>;
