//! Output generation: JSON artifacts between stages and the final HTML page.
//!
//! # Submodules
//!
//! - [`json`]: reads and writes the `ArticleSet` artifacts that connect the
//!   pipeline stages (`articles.json`, `verified_articles.json`)
//! - [`html`]: renders the digest context into the newsletter page under
//!   `public/`

pub mod html;
pub mod json;
