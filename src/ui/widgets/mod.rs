// src/ui/widgets/mod.rs

pub mod analysis_view; // Findings list and their explanation.
pub mod disclaimer_popup;
pub mod footer;
pub mod input;
pub mod log_view;
pub mod overview; // CDN, CMS, hosting, technologies and evidence.
pub mod summary; // Security grade, TLS, domain, email and performance.
