//! PDF assembly orchestration.
//!
//! Rasterization and page writing are delegated to collaborator traits; this
//! module only sizes the raster to the page, paginates tall images, and names
//! the output file. A visual layout rendered anywhere (a GUI view, a headless
//! browser) plugs in by implementing [`Rasterizer`] and [`PageAssembler`].

use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::error::{InvoiceError, Result};
use crate::export::export_file_name;

/// A4 portrait, in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

pub const DEFAULT_RASTER_SCALE: f64 = 2.0;
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f64,
    pub background: String,
    pub allow_cross_origin: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_RASTER_SCALE,
            background: DEFAULT_BACKGROUND.to_string(),
            allow_cross_origin: true,
        }
    }
}

/// Renders a visual element to a raster image.
pub trait Rasterizer {
    type Element;

    fn rasterize(
        &self,
        element: &Self::Element,
        options: &RasterOptions,
    ) -> std::result::Result<RasterImage, BoxError>;
}

/// Opens fresh documents (A4 portrait, millimetre units).
pub trait PageAssembler {
    type Document: Document;

    fn begin(&self) -> std::result::Result<Self::Document, BoxError>;
}

/// An in-progress PDF document.
pub trait Document {
    fn page_width(&self) -> f64;
    fn page_height(&self) -> f64;
    /// Place the image on the current page; `y_mm` may be negative to shift
    /// an oversized image upward.
    fn place_image(
        &mut self,
        image: &RasterImage,
        x_mm: f64,
        y_mm: f64,
        width_mm: f64,
        height_mm: f64,
    ) -> std::result::Result<(), BoxError>;
    fn add_page(&mut self) -> std::result::Result<(), BoxError>;
    fn save(&self, path: &Path) -> std::result::Result<(), BoxError>;
    fn to_bytes(&self) -> std::result::Result<Vec<u8>, BoxError>;
}

pub struct PdfExportService<R, A> {
    rasterizer: R,
    assembler: A,
}

impl<R: Rasterizer, A: PageAssembler> PdfExportService<R, A> {
    pub fn new(rasterizer: R, assembler: A) -> Self {
        Self {
            rasterizer,
            assembler,
        }
    }

    /// Rasterize the element at 2x scale on a white background, fit the image
    /// to the page width preserving its aspect ratio, and slice anything
    /// taller than one page across successive pages by re-placing the image
    /// shifted upward.
    pub fn generate_pdf(&self, element: &R::Element) -> Result<A::Document> {
        let options = RasterOptions::default();
        let image = self
            .rasterizer
            .rasterize(element, &options)
            .map_err(|e| InvoiceError::PdfGeneration(format!("rasterization failed: {e}")))?;

        if image.width_px == 0 || image.height_px == 0 {
            return Err(InvoiceError::PdfGeneration(
                "rasterizer produced an empty image".to_string(),
            ));
        }

        let mut doc = self.assembler.begin().map_err(wrap)?;
        let page_width = doc.page_width();
        let page_height = doc.page_height();
        let image_height = image.height_px as f64 * page_width / image.width_px as f64;

        doc.place_image(&image, 0.0, 0.0, page_width, image_height)
            .map_err(wrap)?;

        let mut height_left = image_height - page_height;
        while height_left > 0.0 {
            let position = height_left - image_height;
            doc.add_page().map_err(wrap)?;
            doc.place_image(&image, 0.0, position, page_width, image_height)
                .map_err(wrap)?;
            height_left -= page_height;
        }

        Ok(doc)
    }

    /// Generate and save under `Invoice_<id>_<YYYY-MM-DD>.pdf` in `dir`.
    pub fn download_pdf(
        &self,
        element: &R::Element,
        invoice_id: &str,
        dir: &Path,
        clock: &impl Clock,
    ) -> Result<PathBuf> {
        let doc = self.generate_pdf(element)?;
        let path = dir.join(export_file_name(invoice_id, clock.today(), "pdf"));
        doc.save(&path).map_err(wrap)?;
        Ok(path)
    }

    /// Generate and return the document bytes, for callers that send the PDF
    /// onward instead of saving it.
    pub fn generate_pdf_blob(&self, element: &R::Element) -> Result<Vec<u8>> {
        self.generate_pdf(element)?.to_bytes().map_err(wrap)
    }
}

fn wrap(e: BoxError) -> InvoiceError {
    InvoiceError::PdfGeneration(e.to_string())
}
