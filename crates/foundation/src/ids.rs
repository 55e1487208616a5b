use std::fmt;

/// Name of a viewer instance.
///
/// The name doubles as the prefix of the page widgets the instance binds to
/// (`{name}-canvas`, `{name}-fullscreen`, `{name}-bar`, `{name}-loader`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerName(String);

impl ViewerName {
    /// Returns `None` for empty or whitespace-only names.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn canvas_id(&self) -> String {
        format!("{}-canvas", self.0)
    }

    pub fn fullscreen_id(&self) -> String {
        format!("{}-fullscreen", self.0)
    }

    pub fn bar_id(&self) -> String {
        format!("{}-bar", self.0)
    }

    pub fn loader_id(&self) -> String {
        format!("{}-loader", self.0)
    }
}

impl fmt::Display for ViewerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ViewerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::ViewerName;

    #[test]
    fn widget_ids_follow_name_prefix() {
        let name = ViewerName::new("cave").unwrap();
        assert_eq!(name.canvas_id(), "cave-canvas");
        assert_eq!(name.fullscreen_id(), "cave-fullscreen");
        assert_eq!(name.bar_id(), "cave-bar");
        assert_eq!(name.loader_id(), "cave-loader");
    }

    #[test]
    fn rejects_blank_names() {
        assert!(ViewerName::new("").is_none());
        assert!(ViewerName::new("  ").is_none());
    }
}
