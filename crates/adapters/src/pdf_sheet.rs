//! PDF rendering of result sheets with `lopdf`.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use results_portal_domain::sheet::{MARGIN_LEFT, PAGE_HEIGHT, PAGE_WIDTH, PlacedLine};
use results_portal_ports::{ResultSheet, ResultSheetRendererPort};
use results_portal_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Renders sheets as uncompressed PDF 1.5 documents using the standard
/// Helvetica faces, so no font data is embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfSheetRenderer;

impl LopdfSheetRenderer {
    /// Create a renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ResultSheetRendererPort for LopdfSheetRenderer {
    fn render_pdf(&self, sheet: &ResultSheet) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular,
                BOLD_FONT => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in sheet.pages() {
            let content = Content {
                operations: page_operations(&page),
            };
            let stream = Stream::new(dictionary! {}, content.encode().map_err(render_failed)?);
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).map_err(render_failed)?;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(PAGE_WIDTH)),
                Object::Integer(i64::from(PAGE_HEIGHT)),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(render_failed)?;
        Ok(bytes)
    }
}

fn page_operations(page: &[PlacedLine<'_>]) -> Vec<Operation> {
    let mut operations = Vec::with_capacity(page.len() * 6);
    for placed in page {
        let line = placed.line;
        let font = if line.bold { BOLD_FONT } else { REGULAR_FONT };
        let [red, green, blue] = line.tone.rgb();
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![font.into(), Object::Integer(i64::from(line.size))],
        ));
        operations.push(Operation::new(
            "rg",
            vec![
                Object::Real(red.into()),
                Object::Real(green.into()),
                Object::Real(blue.into()),
            ],
        ));
        operations.push(Operation::new(
            "Td",
            vec![
                Object::Integer(i64::from(MARGIN_LEFT)),
                Object::Integer(i64::from(placed.baseline)),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    operations
}

/// Encode text for the standard fonts; characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}

fn render_failed(error: impl std::fmt::Display) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("export", "render_failed"),
        format!("failed to render result sheet: {error}"),
        ErrorClass::NonRetriable,
    )
}
