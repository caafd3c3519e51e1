use serde::{Deserialize, Serialize};

/// Mapper options recognized by the tree builders. Loading and validating
/// user configuration is the host's concern; only the resolved values
/// arrive here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// When the guarded source path is null and the target member is
    /// nullable, assign null to the target.
    pub allow_null_property_assignment: bool,
    /// When the guarded source path is null and no null assignment applies,
    /// raise a mismatch condition instead of silently skipping.
    pub throw_on_property_mapping_null_mismatch: bool,
}

impl MapperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_null_property_assignment(mut self, value: bool) -> Self {
        self.allow_null_property_assignment = value;
        self
    }

    pub fn with_throw_on_property_mapping_null_mismatch(mut self, value: bool) -> Self {
        self.throw_on_property_mapping_null_mismatch = value;
        self
    }
}
