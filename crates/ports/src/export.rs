//! Document rendering boundary contract.

use results_portal_domain::ResultSheet;
use results_portal_shared::Result;

/// Renders a laid-out result sheet into a printable document.
///
/// Rendering is CPU-bound and synchronous; callers own the resulting bytes.
pub trait ResultSheetRendererPort: Send + Sync {
    /// Render `sheet` as a PDF document.
    fn render_pdf(&self, sheet: &ResultSheet) -> Result<Vec<u8>>;
}
