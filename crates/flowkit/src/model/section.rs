//! Canvas section bands.

use flowkit_core::config::{SectionConfig, SectionStyle};

/// A full-width horizontal band; immutable after construction.
#[derive(Debug)]
pub struct Section {
    config: SectionConfig,
}

impl Section {
    pub(crate) fn new(config: SectionConfig) -> Self {
        Self { config }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn label(&self) -> Option<&str> {
        self.config.label.as_deref()
    }

    pub fn y(&self) -> f64 {
        self.config.y
    }

    pub fn height(&self) -> f64 {
        self.config.height
    }

    pub fn style(&self) -> &SectionStyle {
        &self.config.style
    }
}
