// PDF output: turns a placement plan plus decoded bitmaps into PDF bytes.

pub mod pdf;

pub use pdf::render_pdf;
