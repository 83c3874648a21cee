use crate::{
    encoding::EStr,
    error::{BuildError, BuildErrorKind, ResolveError, ResolveErrorKind, TemplateError, TemplateErrorKind},
    uri::{Authority, Uri},
};
use std::fmt;

impl fmt::Display for Uri {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uri")
            .field("scheme", &self.scheme())
            .field("authority", &self.authority())
            .field("path", &self.path())
            .field("query", &self.query())
            .field("fragment", &self.fragment())
            .finish()
    }
}

impl fmt::Display for Authority<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl fmt::Debug for Authority<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authority")
            .field("userinfo", &self.userinfo())
            .field("host", &self.host())
            .field("port", &self.port())
            .finish()
    }
}

impl fmt::Display for EStr {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl fmt::Debug for EStr {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind() {
            TemplateErrorKind::Malformed => "illegal URI template",
            TemplateErrorKind::InvalidHost => "empty host name",
            TemplateErrorKind::InvalidPort => "invalid port number",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ResolveErrorKind::MissingParameter { name } => {
                write!(f, "no value supplied for parameter \"{name}\"")
            }
            ResolveErrorKind::RegexMismatch { name, pattern } => {
                write!(f, "value of parameter \"{name}\" does not match \"{pattern}\"")
            }
            ResolveErrorKind::InvalidPattern { name, pattern } => {
                write!(f, "parameter \"{name}\" declares an invalid pattern \"{pattern}\"")
            }
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            BuildErrorKind::Resolve(e) => fmt::Display::fmt(e, f),
            BuildErrorKind::Template(e) => fmt::Display::fmt(e, f),
            BuildErrorKind::EmptyHost => f.write_str("empty host name"),
            BuildErrorKind::InvalidComponent { component } => {
                write!(f, "invalid {component} in built URI")
            }
            BuildErrorKind::NonAbemptyPath => {
                f.write_str("path must either be empty or start with '/' when authority is present")
            }
            BuildErrorKind::PathStartingWithDoubleSlash => {
                f.write_str("path cannot start with \"//\" when authority is absent")
            }
            BuildErrorKind::ColonInFirstPathSegment => {
                f.write_str("first path segment cannot contain ':' in relative-path reference")
            }
        }
    }
}
