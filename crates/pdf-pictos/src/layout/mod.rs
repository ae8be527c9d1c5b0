//! Layout engine: font sizing, image fitting, text placement and pagination

pub mod font_size;
pub mod grid;
pub mod image_fit;
pub mod text_run;

pub use font_size::{caption_font_size, find_max_font_size, longest_text, search_max_fitting_size};
pub use grid::{
    GridLayout, GridPosition, Page, PageMode, Pages, SideTransform, document_pages, paginate,
};
pub use image_fit::fit_image;
pub use text_run::{TextRun, layout_text_run};
