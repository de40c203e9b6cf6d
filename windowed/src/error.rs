use crate::EngineState;

/// Rejected configuration. Returned before any engine state exists.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no item renderer was supplied")]
    MissingRenderer,
    #[error("no surface was supplied")]
    MissingSurface,
    #[error("item_height must be greater than zero")]
    ZeroItemHeight,
    #[error("estimated_item_height must be greater than zero")]
    ZeroEstimatedHeight,
    #[error("buffer_size {value} exceeds the maximum of {max}")]
    InvalidBufferSize { value: usize, max: usize },
    #[error("relayout_threshold must be a finite, non-negative ratio")]
    InvalidRelayoutThreshold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("engine is already attached (state: {0:?})")]
    AlreadyAttached(EngineState),
    #[error("engine is not attached yet")]
    NotAttached,
    #[error("engine has been destroyed")]
    Destroyed,
}
