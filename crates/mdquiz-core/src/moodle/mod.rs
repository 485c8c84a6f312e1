//! Moodle XML output.
//!
//! Questions are first rendered into an [`XmlNode`] tree, which is then
//! written as text by [`serialize`]. Keeping the two steps apart lets
//! callers inspect or adjust the tree before it is written.
//!
//! # Example
//!
//! ```
//! use mdquiz_core::QuizSettings;
//! use mdquiz_core::moodle::{MoodleRenderer, serialize};
//!
//! let settings = QuizSettings::default();
//! let tree = MoodleRenderer::new(&settings).render(&[]);
//! let xml = serialize(&tree).unwrap();
//! assert!(xml.ends_with("<quiz/>\n"));
//! ```

mod renderer;
mod serializer;
mod tree;

pub use renderer::{MoodleRenderer, format_fraction};
pub use serializer::serialize;
pub use tree::XmlNode;
