//! Pipeline stages for turning a journal directory into rendered pages.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! sync ──▶ discover ──▶ parse ──▶ walk / images ──▶ template ──▶ landing
//! (styles)  (stale?)    (eval)    (title, LaTeX)    (write)      (index)
//! ```
//!
//! 1. [`sync`]     — create the output tree and copy template assets without
//!    overwriting customised files; blocking I/O, run on the blocking pool
//! 2. [`discover`] — list sources, apply the whitelist, compare timestamps
//! 3. [`walk`]     — title extraction, title removal, span rewriting
//! 4. [`images`]   — download remote images for LaTeX; the only stage with
//!    network I/O
//! 5. [`template`] — format the body and substitute it into `styles/template.*`
//! 6. [`landing`]  — pick or synthesise the entry page

pub mod discover;
pub mod images;
pub mod landing;
pub mod sync;
pub mod template;
pub mod walk;
