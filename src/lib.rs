//! Ghost to Jekyll converter library.
//!
//! Reads a Ghost JSON export, writes one Jekyll post per published post,
//! points image links at the new site and downloads the images.

pub mod config;
pub mod constants;
pub mod converter;
pub mod download;
pub mod error;
pub mod ghost;
pub mod jekyll;
pub mod markdown;
