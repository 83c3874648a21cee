//! The built URI value.

use crate::{builder::UriBuilder, encoding::EStr, error::BuildError};
use std::num::{NonZeroUsize, ParseIntError};
use std::str::FromStr;

/// Component offsets recorded while the URI string is assembled.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Meta {
    /// The index of the trailing colon.
    pub(crate) scheme_end: Option<NonZeroUsize>,
    pub(crate) auth: Option<AuthMeta>,
    pub(crate) path_bounds: (usize, usize),
    /// One byte past the last byte of query.
    pub(crate) query_end: Option<NonZeroUsize>,
    /// The index of the first byte after `'#'`.
    pub(crate) fragment_start: Option<NonZeroUsize>,
    /// The path bounds cover an opaque scheme-specific part.
    pub(crate) opaque: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AuthMeta {
    /// The index of the first byte after `"//"`.
    pub(crate) start: usize,
    pub(crate) host_bounds: (usize, usize),
    /// The authority was carried as one raw string, without
    /// userinfo/host/port subcomponents.
    pub(crate) raw: bool,
}

/// A finished URI.
///
/// A `Uri` is produced by [`UriBuilder::build`] and its sibling build
/// methods; its components are guaranteed percent-encoded and are exposed
/// as [`EStr`] where decoding makes sense.
///
/// # Examples
///
/// ```
/// use templated_uri::UriBuilder;
///
/// let uri = UriBuilder::from_template("http://example.com:8042/over/{t}?name=ferret")?
///     .build(&["there"])?;
///
/// assert_eq!(uri.as_str(), "http://example.com:8042/over/there?name=ferret");
/// assert_eq!(uri.scheme(), Some("http"));
/// let auth = uri.authority().unwrap();
/// assert_eq!(auth.host(), "example.com");
/// assert_eq!(auth.port_to_u32(), Ok(Some(8042)));
/// assert_eq!(uri.path().as_str(), "/over/there");
/// assert_eq!(uri.query().unwrap(), "name=ferret");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Uri {
    pub(crate) val: String,
    pub(crate) meta: Meta,
}

impl Uri {
    pub(crate) fn new(val: String, meta: Meta) -> Self {
        Uri { val, meta }
    }

    /// Parses a concrete URI string.
    ///
    /// This is a convenience for parsing the string as a template and
    /// building it without bindings; a string still carrying placeholders
    /// therefore fails with a missing-parameter error.
    pub fn parse(s: &str) -> Result<Uri, BuildError> {
        UriBuilder::from_template(s)?.build::<&str>(&[])
    }

    /// Returns the URI as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.val
    }

    /// Consumes this `Uri` and yields the underlying [`String`].
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.val
    }

    /// Returns the scheme component.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.meta.scheme_end.map(|i| &self.val[..i.get()])
    }

    /// Returns `true` if the URI is opaque, i.e., its scheme is followed
    /// by an unstructured scheme-specific part.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.meta.opaque
    }

    /// Returns the scheme-specific part of an opaque URI.
    #[must_use]
    pub fn scheme_specific_part(&self) -> Option<&str> {
        self.meta
            .opaque
            .then(|| &self.val[self.meta.path_bounds.0..self.meta.path_bounds.1])
    }

    /// Returns the authority component.
    #[must_use]
    pub fn authority(&self) -> Option<Authority<'_>> {
        self.meta.auth.map(|auth| Authority { uri: self, auth })
    }

    /// Returns the path component.
    ///
    /// For an opaque URI this is the scheme-specific part.
    #[must_use]
    pub fn path(&self) -> &EStr {
        EStr::new_validated(&self.val[self.meta.path_bounds.0..self.meta.path_bounds.1])
    }

    /// Returns the query component.
    #[must_use]
    pub fn query(&self) -> Option<&EStr> {
        self.meta
            .query_end
            .map(|end| EStr::new_validated(&self.val[self.meta.path_bounds.1 + 1..end.get()]))
    }

    /// Returns the fragment component.
    #[must_use]
    pub fn fragment(&self) -> Option<&EStr> {
        self.meta
            .fragment_start
            .map(|start| EStr::new_validated(&self.val[start.get()..]))
    }
}

impl PartialEq for Uri {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl Eq for Uri {}

impl std::hash::Hash for Uri {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.val.hash(state);
    }
}

impl FromStr for Uri {
    type Err = BuildError;

    #[inline]
    fn from_str(s: &str) -> Result<Uri, BuildError> {
        Uri::parse(s)
    }
}

/// The authority component of a [`Uri`].
#[derive(Clone, Copy)]
pub struct Authority<'a> {
    uri: &'a Uri,
    auth: AuthMeta,
}

impl<'a> Authority<'a> {
    fn end(&self) -> usize {
        self.uri.meta.path_bounds.0
    }

    /// Returns the authority as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        &self.uri.val[self.auth.start..self.end()]
    }

    /// Returns the userinfo subcomponent.
    #[must_use]
    pub fn userinfo(&self) -> Option<&'a EStr> {
        if self.auth.raw {
            return None;
        }
        let (start, host_start) = (self.auth.start, self.auth.host_bounds.0);
        (start != host_start).then(|| EStr::new_validated(&self.uri.val[start..host_start - 1]))
    }

    /// Returns the host subcomponent, or the whole authority when it was
    /// carried as one raw string.
    #[must_use]
    pub fn host(&self) -> &'a str {
        &self.uri.val[self.auth.host_bounds.0..self.auth.host_bounds.1]
    }

    /// Returns the port subcomponent.
    #[must_use]
    pub fn port(&self) -> Option<&'a str> {
        if self.auth.raw {
            return None;
        }
        let (host_end, end) = (self.auth.host_bounds.1, self.end());
        (host_end != end).then(|| &self.uri.val[host_end + 1..end])
    }

    /// Parses the port subcomponent into a `u32`.
    pub fn port_to_u32(&self) -> Result<Option<u32>, ParseIntError> {
        self.port().map(str::parse).transpose()
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::Uri;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Uri {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> Deserialize<'de> for Uri {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Uri::parse(&s).map_err(de::Error::custom)
        }
    }
}
