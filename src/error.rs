//! Error types.

/// Detailed cause of a [`TemplateError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// The input matches neither the opaque nor the hierarchical URI grammar,
    /// or a scheme-less path would be misread as an opaque URI.
    Malformed,
    /// An empty host string.
    InvalidHost,
    /// Port text that is not a number within range.
    InvalidPort,
}

/// An error occurred when parsing or editing a URI template.
#[derive(Clone, Copy, Debug)]
pub struct TemplateError(pub(crate) TemplateErrorKind);

impl TemplateError {
    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> TemplateErrorKind {
        self.0
    }
}

impl std::error::Error for TemplateError {}

/// Detailed cause of a [`ResolveError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveErrorKind {
    /// The value source has no binding for a required placeholder.
    MissingParameter {
        /// The placeholder name.
        name: String,
    },
    /// A substituted value does not match the placeholder's declared pattern.
    RegexMismatch {
        /// The placeholder name.
        name: String,
        /// The declared pattern.
        pattern: String,
    },
    /// A declared pattern is not a valid regular expression.
    InvalidPattern {
        /// The placeholder name.
        name: String,
        /// The declared pattern.
        pattern: String,
    },
}

/// An error occurred when substituting placeholder values.
#[derive(Clone, Debug)]
pub struct ResolveError(pub(crate) ResolveErrorKind);

impl ResolveError {
    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> &ResolveErrorKind {
        &self.0
    }

    /// Returns the name of the placeholder the error refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.0 {
            ResolveErrorKind::MissingParameter { name }
            | ResolveErrorKind::RegexMismatch { name, .. }
            | ResolveErrorKind::InvalidPattern { name, .. } => name,
        }
    }

    pub(crate) fn missing(name: &str) -> Self {
        ResolveError(ResolveErrorKind::MissingParameter {
            name: name.to_owned(),
        })
    }

    pub(crate) fn mismatch(name: &str, pattern: &str) -> Self {
        ResolveError(ResolveErrorKind::RegexMismatch {
            name: name.to_owned(),
            pattern: pattern.to_owned(),
        })
    }

    pub(crate) fn invalid_pattern(name: &str, pattern: &str) -> Self {
        ResolveError(ResolveErrorKind::InvalidPattern {
            name: name.to_owned(),
            pattern: pattern.to_owned(),
        })
    }
}

impl std::error::Error for ResolveError {}

/// Detailed cause of a [`BuildError`].
#[derive(Clone, Debug)]
pub enum BuildErrorKind {
    /// A placeholder could not be resolved.
    Resolve(ResolveError),
    /// A partially resolved template no longer parses.
    Template(TemplateError),
    /// The host component is present but empty.
    EmptyHost,
    /// A component of the assembled URI is not syntactically valid.
    InvalidComponent {
        /// The name of the offending component.
        component: &'static str,
    },
    /// With an authority present, a non-empty path must start with `'/'`.
    NonAbemptyPath,
    /// Without an authority, the path must not start with `"//"`.
    PathStartingWithDoubleSlash,
    /// In a relative-path reference, the first path segment must not
    /// contain `':'`.
    ColonInFirstPathSegment,
}

/// An error occurred when building a URI.
#[derive(Clone, Debug)]
pub struct BuildError(pub(crate) BuildErrorKind);

impl BuildError {
    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> &BuildErrorKind {
        &self.0
    }
}

impl From<ResolveError> for BuildError {
    fn from(e: ResolveError) -> Self {
        BuildError(BuildErrorKind::Resolve(e))
    }
}

impl From<TemplateError> for BuildError {
    fn from(e: TemplateError) -> Self {
        BuildError(BuildErrorKind::Template(e))
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            BuildErrorKind::Resolve(e) => Some(e),
            BuildErrorKind::Template(e) => Some(e),
            _ => None,
        }
    }
}
