//! Keeps the surface's pixel size matched to the viewport

use crate::surface::Surface;
use glimmer_core::Viewport;

/// Resize `surface` to `viewport`. Returns true if the size changed.
///
/// Existing particles are not rescaled or moved; only later spawns and
/// bounds checks see the new dimensions.
pub fn sync_to_viewport<S: Surface + ?Sized>(surface: &mut S, viewport: Viewport) -> bool {
    if surface.width() == viewport.width && surface.height() == viewport.height {
        return false;
    }
    log::debug!(
        "resizing surface {}x{} -> {}x{}",
        surface.width(),
        surface.height(),
        viewport.width,
        viewport.height
    );
    surface.set_size(viewport.width, viewport.height);
    true
}
