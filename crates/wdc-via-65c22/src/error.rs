use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViaError>;

/// Errors from host-side helpers. Emulation itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViaError {
    #[error("register select {0:#04X} is out of range (0x0-0xF)")]
    InvalidRegister(u8),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(&'static str),
}
