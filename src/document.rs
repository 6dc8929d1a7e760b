//! # Document Assembly
//!
//! Page lifecycle for one statement: start a document with a page size, add
//! pages, finalize into PDF bytes.
//!
//! Every page gets the same header and footer. Instead of registering
//! callbacks with a drawing backend, the builder holds a [`PageDecorator`]
//! and invokes it right after each page is added, before the caller draws
//! the body on it.

use std::collections::HashMap;

use crate::error::Result;
use crate::font::{FontContext, FontSpec};
use crate::image_loader::{load_image, LoadedImage};
use crate::layout::{DrawOp, LayoutContext, LayoutPage, PageGeometry, Surface};
use crate::pdf::{Metadata, PdfWriter};

/// Draws the repeating parts of every physical page.
pub trait PageDecorator {
    /// `page_number` is 1-based.
    fn render_header(&self, ctx: &mut LayoutContext<'_>, surface: &mut dyn Surface, page_number: usize) -> Result<()>;
    fn render_footer(&self, ctx: &mut LayoutContext<'_>, surface: &mut dyn Surface, page_number: usize) -> Result<()>;
}

/// Images loaded so far, each source loaded once and shared across pages.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<LoadedImage>,
    by_src: HashMap<String, usize>,
}

impl ImageStore {
    /// Index of the image for `src`, loading it on first use.
    pub fn get_or_load(&mut self, src: &str) -> Result<usize> {
        if let Some(&idx) = self.by_src.get(src) {
            return Ok(idx);
        }
        let image = load_image(src)?;
        log::debug!("Loaded image {}x{} px", image.width_px, image.height_px);
        self.images.push(image);
        let idx = self.images.len() - 1;
        self.by_src.insert(src.to_string(), idx);
        Ok(idx)
    }

    pub fn images(&self) -> &[LoadedImage] {
        &self.images
    }
}

/// A [`Surface`] that records onto one page of the document.
pub struct PageCanvas<'a> {
    page: &'a mut LayoutPage,
    images: &'a mut ImageStore,
}

impl Surface for PageCanvas<'_> {
    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: FontSpec) -> Result<()> {
        self.page.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
        });
        Ok(())
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) -> Result<()> {
        self.page.ops.push(DrawOp::Line { x1, y1, x2, y2, width });
        Ok(())
    }

    fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let image = self.images.get_or_load(src)?;
        self.page.ops.push(DrawOp::Image {
            image,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.page.ops.push(DrawOp::Rect { x, y, width, height });
        Ok(())
    }
}

/// Builds the pages of one document.
pub struct DocumentBuilder<'d> {
    geometry: PageGeometry,
    pages: Vec<LayoutPage>,
    images: ImageStore,
    decorator: Option<&'d dyn PageDecorator>,
}

impl<'d> DocumentBuilder<'d> {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            images: ImageStore::default(),
            decorator: None,
        }
    }

    pub fn with_decorator(mut self, decorator: &'d dyn PageDecorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// Append a page, run the header and footer on it, and hand back a
    /// canvas for the body.
    pub fn add_page(&mut self, ctx: &mut LayoutContext<'_>) -> Result<PageCanvas<'_>> {
        let decorator = self.decorator;
        self.pages.push(LayoutPage::new(self.geometry));
        let page_number = self.pages.len();
        let mut canvas = PageCanvas {
            page: &mut self.pages[page_number - 1],
            images: &mut self.images,
        };

        if let Some(decorator) = decorator {
            decorator.render_header(ctx, &mut canvas, page_number)?;
            decorator.render_footer(ctx, &mut canvas, page_number)?;
        }
        log::debug!("Added page {}", page_number);
        Ok(canvas)
    }

    pub fn pages(&self) -> &[LayoutPage] {
        &self.pages
    }

    pub fn images(&self) -> &[LoadedImage] {
        self.images.images()
    }

    /// Serialize every page into PDF bytes.
    pub fn finish(self, fonts: &FontContext, metadata: &Metadata) -> Result<Vec<u8>> {
        PdfWriter::new().write(&self.pages, self.images.images(), metadata, fonts)
    }
}
