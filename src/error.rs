use thiserror::Error;

/// Failure taxonomy for the moderation and library pipeline.
///
/// Every variant is caught at the boundary where it occurs and converted
/// into a visible conversation message or an inline notice. Only
/// `PolicyViolation` carries cross-request memory (the violation counter).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("İstekler arasında en az 1,5 saniye beklemelisiniz.")]
    RateLimited,

    #[error("Güvenlik ihlali: {0}")]
    PolicyViolation(String),

    #[error("Kütüphane kapasitesi dolu ({0} öğe). Yeni kayıt eklenemez.")]
    CapacityExceeded(usize),

    #[error("{0}")]
    FormatError(String),

    #[error("Kütüphane kaydedilemedi: {0}")]
    PersistenceError(String),

    #[error("{0}")]
    RemoteError(String),
}

impl AppError {
    /// True when the failure should count against the violation budget.
    pub fn is_violation(&self) -> bool {
        matches!(self, AppError::PolicyViolation(_))
    }
}
