pub mod decode;
pub mod svg_raster;
