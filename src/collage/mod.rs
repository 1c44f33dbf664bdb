mod collage_error;
mod compose;
mod layout;
mod options;
mod text;

pub use collage_error::CollageError;
pub use compose::{compose_collage, list_images, CollageReport};
pub use layout::{GridLayout, Placement};
pub use options::{CollageOptions, Columns, FitMode, HexColor, Subset};
pub use text::{contrasting_text_color, list_fonts, resolve_font};
