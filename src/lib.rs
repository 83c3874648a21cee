#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]

//! A mutable URI builder with `{name}` and `{name:regex}` template
//! placeholders.
//!
//! A [`UriBuilder`] models a URI as its separate components — scheme,
//! userinfo, host, port, path, query, fragment — each of which may carry
//! placeholder tokens. The builder is assembled incrementally from a
//! template string and structural edits, then resolved into a correctly
//! percent-encoded [`Uri`] from positional or named values.
//!
//! ```
//! use templated_uri::UriBuilder;
//!
//! let mut builder = UriBuilder::from_template("http://example.com/orders/{id}")?;
//! builder.query_param("expand", &["lines"]);
//!
//! let uri = builder.build(&["42"])?;
//! assert_eq!(uri.as_str(), "http://example.com/orders/42?expand=lines");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! A placeholder may declare a regular expression that substituted values
//! must match, and the regex may itself contain characters that normally
//! delimit URI components. The template parser disambiguates such text
//! from real delimiters:
//!
//! ```
//! use templated_uri::UriBuilder;
//!
//! // The '?' belongs to the regex, not to a query component.
//! let builder = UriBuilder::from_template("/{row:[a-z?]+}/c")?;
//! assert_eq!(builder.path(), Some("/{row:[a-z?]+}/c"));
//! assert_eq!(builder.query(), None);
//! # Ok::<_, templated_uri::error::TemplateError>(())
//! ```
//!
//! Builders can be resolved progressively: bind some values now, keep the
//! rest as a template for later.
//!
//! ```
//! use templated_uri::UriBuilder;
//!
//! let mut builder = UriBuilder::from_template("/{tenant}/reports/{year}")?;
//! builder.resolve_template("tenant", "acme")?;
//! assert_eq!(builder.to_template(), "/acme/reports/{year}");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! # Crate features
//!
//! - `serde`: [`Uri`] serializes as its string form and deserializes by
//!   parsing.

mod builder;
pub use builder::UriBuilder;

pub mod encoding;

pub mod error;

mod fmt;
mod parser;
mod template;

mod uri;
pub use uri::{Authority, Uri};
