//! Raster input-capture surface
//!
//! Turns pointer/touch gestures into strokes on a fixed-size, always-opaque
//! bitmap. Erasing overpaints with the background color.

pub mod brush;
pub mod encode;
pub mod input;
pub mod raster;

pub use brush::{BrushConfig, BrushMode};
pub use encode::{decode_data_uri, encode_data_uri, PNG_DATA_URI_PREFIX};
pub use input::{InputDisposition, PointerEvent, SurfaceRect, TouchEvent};
pub use raster::{Placement, RasterSurface};
