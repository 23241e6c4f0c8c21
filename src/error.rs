use crate::{bus::BusError, config::ConfigError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
