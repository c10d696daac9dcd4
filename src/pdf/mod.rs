pub mod assemble;
pub mod document;
pub mod font;
pub mod ocr;
pub mod render;
pub mod text;

pub use document::PdfDocument;
