use crate::error::RegistryError;
use crate::instance::{Activation, ViewerInstance};

/// Page-level set of viewers, in registration order.
///
/// The page holds one registry and forwards its resize notifications here;
/// each instance decides for itself whether it reacts.
#[derive(Default)]
pub struct ViewerRegistry {
    viewers: Vec<ViewerInstance>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, viewer: ViewerInstance) -> Result<(), RegistryError> {
        if self.get(viewer.name().as_str()).is_some() {
            return Err(RegistryError::DuplicateViewer(viewer.name().to_string()));
        }
        log::debug!("registered viewer {} ({})", viewer.name(), viewer.asset_path());
        self.viewers.push(viewer);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ViewerInstance> {
        self.viewers.iter().find(|v| v.name().as_str() == name)
    }

    pub fn activate(&self, name: &str) -> Result<Activation, RegistryError> {
        self.get(name)
            .map(ViewerInstance::activate)
            .ok_or_else(|| RegistryError::UnknownViewer(name.to_string()))
    }

    /// Fans a resize out to every instance. Returns how many re-rendered.
    pub fn notify_resize(&self) -> usize {
        self.viewers.iter().filter(|v| v.handle_resize()).count()
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewerInstance> {
        self.viewers.iter()
    }
}
