//! SUM - run-length text encoding for monochrome images
//!
//! This library provides functionality to:
//! - Parse SUM scripts (still images and animations) into documents
//! - Encode black/white rasters into SUM documents and serialize them
//! - Render document frames to RGBA images, PNG stills and animated GIFs

pub mod cli;
pub mod config;
pub mod encoder;
pub mod fmt;
pub mod gif;
pub mod models;
pub mod output;
pub mod parser;
pub mod ranges;
pub mod renderer;
