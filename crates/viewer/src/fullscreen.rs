use crate::error::HostError;
use crate::host::CanvasSurface;

/// Vendor variants of the element fullscreen request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FullscreenVariant {
    Standard,
    Moz,
    Webkit,
    Ms,
}

impl FullscreenVariant {
    /// Probe order: standard API first, then the prefixed ones.
    pub const FALLBACK_ORDER: [FullscreenVariant; 4] = [
        FullscreenVariant::Standard,
        FullscreenVariant::Moz,
        FullscreenVariant::Webkit,
        FullscreenVariant::Ms,
    ];

    /// Name of the element method implementing this variant.
    pub fn method_name(self) -> &'static str {
        match self {
            FullscreenVariant::Standard => "requestFullscreen",
            FullscreenVariant::Moz => "mozRequestFullScreen",
            FullscreenVariant::Webkit => "webkitRequestFullscreen",
            FullscreenVariant::Ms => "msRequestFullscreen",
        }
    }
}

/// Requests fullscreen using the first variant the surface supports.
///
/// `Ok(None)` means no variant is available, which callers treat as a no-op.
pub fn request_fullscreen(
    surface: &dyn CanvasSurface,
) -> Result<Option<FullscreenVariant>, HostError> {
    let Some(variant) = FullscreenVariant::FALLBACK_ORDER
        .into_iter()
        .find(|&v| surface.supports_fullscreen(v))
    else {
        return Ok(None);
    };
    surface.request_fullscreen(variant)?;
    Ok(Some(variant))
}

#[cfg(test)]
mod tests {
    use super::{FullscreenVariant, request_fullscreen};
    use crate::testing::FakeCanvas;

    #[test]
    fn prefers_standard_variant() {
        let canvas = FakeCanvas::with_fullscreen(&FullscreenVariant::FALLBACK_ORDER);
        assert_eq!(
            request_fullscreen(&canvas),
            Ok(Some(FullscreenVariant::Standard))
        );
        assert_eq!(canvas.fullscreen_requests(), vec![FullscreenVariant::Standard]);
    }

    #[test]
    fn falls_back_in_fixed_order() {
        let canvas =
            FakeCanvas::with_fullscreen(&[FullscreenVariant::Ms, FullscreenVariant::Webkit]);
        assert_eq!(
            request_fullscreen(&canvas),
            Ok(Some(FullscreenVariant::Webkit))
        );
        assert_eq!(canvas.fullscreen_requests(), vec![FullscreenVariant::Webkit]);
    }

    #[test]
    fn no_variant_is_a_no_op() {
        let canvas = FakeCanvas::with_fullscreen(&[]);
        assert_eq!(request_fullscreen(&canvas), Ok(None));
        assert!(canvas.fullscreen_requests().is_empty());
    }

    #[test]
    fn method_names_match_dom_api() {
        let names: Vec<_> = FullscreenVariant::FALLBACK_ORDER
            .iter()
            .map(|v| v.method_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "requestFullscreen",
                "mozRequestFullScreen",
                "webkitRequestFullscreen",
                "msRequestFullscreen"
            ]
        );
    }
}
