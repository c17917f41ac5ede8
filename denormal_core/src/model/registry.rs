use crate::error::DenormalError;
use crate::model::Model;

/// Resolves models by their dotted name.
///
/// Passed explicitly to whatever needs to look models up; there is no
/// process-wide registry.
pub trait ModelRegistry {
    /// Fails with [`DenormalError::ModelNotFound`] for an unknown name
    fn get_model(&self, name: &str) -> Result<&Model, DenormalError>;
}
