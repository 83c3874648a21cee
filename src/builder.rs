//! The mutable URI builder.

use crate::{
    encoding::{self, table, Mode},
    error::{BuildError, BuildErrorKind, ResolveError, TemplateError, TemplateErrorKind},
    parser,
    template::{self, Values},
    uri::{AuthMeta, Meta, Uri},
};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;

/// A mutable model of a URI's components.
///
/// Every component may carry `{name}` or `{name:regex}` placeholders,
/// which are resolved from positional or named values at build time.
/// Mutators edit components in place and return `self` for chaining;
/// structural edits never disturb unresolved placeholders.
///
/// # Examples
///
/// ```
/// use templated_uri::UriBuilder;
///
/// let uri = UriBuilder::from_template("http://example.com/widgets/{id}")?
///     .build(&["42"])?;
/// assert_eq!(uri.as_str(), "http://example.com/widgets/42");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// Values are percent-encoded on substitution, and a declared regex is
/// enforced:
///
/// ```
/// use templated_uri::UriBuilder;
///
/// let builder = UriBuilder::from_template("/files/{name}")?;
/// assert_eq!(builder.build(&["a b"])?.as_str(), "/files/a%20b");
///
/// let builder = UriBuilder::from_template("/rows/{row:[a-z]+}")?;
/// assert!(builder.build(&["42"]).is_err());
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// Cloning gives an independent copy, so one parsed template can be
/// resolved concurrently by many callers.
#[derive(Clone, Debug, Default)]
pub struct UriBuilder {
    pub(crate) scheme: Option<String>,
    pub(crate) userinfo: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u32>,
    pub(crate) path: Option<String>,
    pub(crate) query: Option<String>,
    pub(crate) fragment: Option<String>,
    pub(crate) ssp: Option<String>,
    pub(crate) authority: Option<String>,
}

struct RenderOpts {
    mode: Mode,
    keep_unresolved: bool,
    encode_slash_in_path: bool,
}

impl UriBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a template string into a new builder.
    ///
    /// Placeholders may appear in any component except the port.
    pub fn from_template(template: &str) -> Result<Self, TemplateError> {
        let mut builder = Self::new();
        parser::parse_into(&mut builder, template)?;
        Ok(builder)
    }

    /// Creates a builder holding the components of an already-built URI.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        let mut builder = Self::new();
        builder.uri(uri);
        builder
    }

    /// Parses a template string into this builder, merging with its
    /// current state: components absent from the template are kept.
    pub fn uri_template(&mut self, template: &str) -> Result<&mut Self, TemplateError> {
        parser::parse_into(self, template)?;
        Ok(self)
    }

    /// Copies the components of an already-built URI into this builder.
    ///
    /// Component text is taken as is, without re-encoding. Components
    /// absent from the URI are kept.
    pub fn uri(&mut self, uri: &Uri) -> &mut Self {
        if let Some(fragment) = uri.fragment() {
            self.fragment = Some(fragment.as_str().to_owned());
        }
        if uri.is_opaque() {
            if let Some(scheme) = uri.scheme() {
                self.scheme = Some(scheme.to_owned());
            }
            self.ssp = uri.scheme_specific_part().map(str::to_owned);
            return self;
        }
        if let Some(scheme) = uri.scheme() {
            self.scheme = Some(scheme.to_owned());
        }
        self.ssp = None;
        if let Some(auth) = uri.meta.auth {
            let (host_start, host_end) = auth.host_bounds;
            if auth.raw {
                self.authority = Some(uri.val[host_start..host_end].to_owned());
                self.userinfo = None;
                self.host = None;
                self.port = None;
            } else {
                self.authority = None;
                if host_start > auth.start {
                    self.userinfo = Some(uri.val[auth.start..host_start - 1].to_owned());
                }
                self.host = Some(uri.val[host_start..host_end].to_owned());
                if host_end < uri.meta.path_bounds.0 {
                    self.port = uri.val[host_end + 1..uri.meta.path_bounds.0].parse().ok();
                }
            }
        }
        if !uri.path().is_empty() {
            self.path = Some(uri.path().as_str().to_owned());
        }
        if let Some(query) = uri.query() {
            if !query.is_empty() {
                self.query = Some(query.as_str().to_owned());
            }
        }
        self
    }

    pub(crate) fn set_opaque(&mut self, scheme: String, ssp: String) {
        self.authority = None;
        self.userinfo = None;
        self.host = None;
        self.port = None;
        self.query = None;
        self.scheme = Some(scheme);
        self.ssp = Some(ssp);
    }

    pub(crate) fn clear_ssp(&mut self) {
        self.ssp = None;
    }

    fn touch_hierarchical(&mut self) {
        self.ssp = None;
    }

    /// Sets or clears the scheme component.
    pub fn set_scheme(&mut self, scheme: Option<&str>) -> &mut Self {
        self.scheme = scheme.map(str::to_owned);
        self
    }

    /// Sets or clears the userinfo subcomponent.
    pub fn set_userinfo(&mut self, userinfo: Option<&str>) -> &mut Self {
        self.userinfo = userinfo.map(str::to_owned);
        if self.userinfo.is_some() {
            self.ssp = None;
            self.authority = None;
        }
        self
    }

    /// Sets or clears the host subcomponent.
    ///
    /// An empty host string is rejected with
    /// [`InvalidHost`](TemplateErrorKind::InvalidHost).
    pub fn set_host(&mut self, host: Option<&str>) -> Result<&mut Self, TemplateError> {
        if host.is_some_and(str::is_empty) {
            return Err(TemplateError(TemplateErrorKind::InvalidHost));
        }
        self.host = host.map(str::to_owned);
        if self.host.is_some() {
            self.ssp = None;
            self.authority = None;
        }
        Ok(self)
    }

    /// Sets or clears the port subcomponent.
    pub fn set_port(&mut self, port: Option<u32>) -> &mut Self {
        self.port = port;
        if port.is_some() {
            self.ssp = None;
            self.authority = None;
        }
        self
    }

    /// Sets or clears the authority as one raw string, replacing any
    /// userinfo/host/port previously set.
    pub fn set_authority(&mut self, authority: Option<&str>) -> &mut Self {
        self.authority = authority.map(str::to_owned);
        if self.authority.is_some() {
            self.ssp = None;
            self.userinfo = None;
            self.host = None;
            self.port = None;
        }
        self
    }

    /// Sets or clears the fragment component, percent-encoding disallowed
    /// characters outside of placeholders.
    pub fn set_fragment(&mut self, fragment: Option<&str>) -> &mut Self {
        self.fragment =
            fragment.map(|f| template::encode_template_aware(f, table::FRAGMENT, Mode::Preserve));
        self
    }

    /// Sets the scheme-specific part.
    ///
    /// The text is combined with the current scheme and re-parsed: an
    /// opaque result (no `/` after the scheme colon) is stored as the
    /// scheme-specific part, while a hierarchical one replaces the
    /// authority, path and query components.
    pub fn set_scheme_specific_part(&mut self, ssp: &str) -> Result<&mut Self, TemplateError> {
        let mut s = String::new();
        if let Some(scheme) = &self.scheme {
            s.push_str(scheme);
            s.push(':');
        }
        s.push_str(ssp);

        let scratch = UriBuilder::from_template(&s)?;
        if scratch.ssp.is_some() {
            self.ssp = scratch.ssp;
            self.authority = None;
            self.userinfo = None;
            self.host = None;
            self.port = None;
            self.query = None;
        } else {
            self.ssp = None;
            self.userinfo = scratch.userinfo;
            self.host = scratch.host;
            self.port = scratch.port;
            self.path = scratch.path;
            self.query = scratch.query;
        }
        Ok(self)
    }

    /// Returns the scheme component.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns the userinfo subcomponent.
    #[must_use]
    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    /// Returns the host subcomponent.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the port subcomponent.
    #[must_use]
    pub fn port(&self) -> Option<u32> {
        self.port
    }

    /// Returns the path component.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the query component.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the fragment component.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the raw authority string, if one is carried unparsed.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Returns the opaque scheme-specific part.
    #[must_use]
    pub fn scheme_specific_part(&self) -> Option<&str> {
        self.ssp.as_deref()
    }

    /// Appends to the path, gluing with `/` as needed.
    ///
    /// Disallowed characters outside of placeholders are percent-encoded;
    /// `/` separators within the text are kept.
    pub fn append_path(&mut self, path: &str) -> &mut Self {
        self.touch_hierarchical();
        let base = self.path.take().unwrap_or_default();
        self.path = Some(join_path(base, path));
        self
    }

    /// Appends path segments, percent-encoding each one as a single
    /// segment (a `/` within a segment becomes `%2F`).
    pub fn append_segments<S: AsRef<str>>(&mut self, segments: &[S]) -> &mut Self {
        for segment in segments {
            let encoded = template::encode_template_aware(
                segment.as_ref(),
                table::PATH_SEGMENT,
                Mode::Preserve,
            );
            self.append_path(&encoded);
        }
        self
    }

    /// Replaces the entire path, discarding any matrix parameters within
    /// it; `None` clears the path.
    pub fn replace_path(&mut self, path: Option<&str>) -> &mut Self {
        self.touch_hierarchical();
        self.path = path.map(|p| template::encode_template_aware(p, table::PATH, Mode::Preserve));
        self
    }

    /// Appends `;name=value` matrix parameters to the current last path
    /// segment.
    pub fn matrix_param<T: fmt::Display>(&mut self, name: &str, values: &[T]) -> &mut Self {
        self.touch_hierarchical();
        let mut path = self.path.take().unwrap_or_default();
        let encoded_name =
            template::encode_template_aware(name, table::MATRIX_PARAM, Mode::Preserve);
        for value in values {
            path.push(';');
            path.push_str(&encoded_name);
            path.push('=');
            path.push_str(&template::encode_template_aware(
                &value.to_string(),
                table::MATRIX_PARAM,
                Mode::Preserve,
            ));
        }
        self.path = Some(path);
        self
    }

    /// Replaces all matrix parameters of the last path segment; `None`
    /// clears them.
    pub fn replace_matrix(&mut self, matrix: Option<&str>) -> &mut Self {
        self.touch_hierarchical();
        let matrix = matrix.unwrap_or("");
        let matrix = if matrix.starts_with(';') {
            matrix.to_owned()
        } else {
            format!(";{matrix}")
        };
        let matrix = template::encode_template_aware(&matrix, table::PATH, Mode::Preserve);

        match &mut self.path {
            None => self.path = Some(matrix),
            Some(path) => {
                let start = path.rfind('/').unwrap_or(0);
                match path[start..].find(';') {
                    Some(off) => {
                        path.truncate(start + off);
                        path.push_str(&matrix);
                    }
                    None => path.push_str(&matrix),
                }
            }
        }
        self
    }

    /// Removes every `name` matrix parameter from the last path segment,
    /// then appends the given values, keeping the other parameters in
    /// order.
    ///
    /// Placeholder tokens in the path are masked with sentinels around the
    /// edit, since a token's regex may contain `;`, `=` or `/`.
    pub fn replace_matrix_param<T: fmt::Display>(&mut self, name: &str, values: &[T]) -> &mut Self {
        let Some(current) = self.path.take() else {
            if !values.is_empty() {
                return self.matrix_param(name, values);
            }
            return self;
        };

        let (mut path, saved) = template::mask_tokens(&current);

        let start = path.rfind('/').unwrap_or(0);
        if let Some(off) = path[start..].find(';') {
            let matrix_index = start + off;
            let entries: Vec<(String, Option<String>)> = path[matrix_index + 1..]
                .split(';')
                .filter(|entry| !entry.is_empty())
                .map(|entry| match entry.split_once('=') {
                    Some((n, v)) => (n.to_owned(), Some(v.to_owned())),
                    None => (entry.to_owned(), None),
                })
                .collect();
            path.truncate(matrix_index);
            for (entry_name, value) in entries {
                if entry_name == name {
                    continue;
                }
                path.push(';');
                path.push_str(&entry_name);
                if let Some(value) = value {
                    path.push('=');
                    path.push_str(&value);
                }
            }
        }
        self.path = Some(path);

        if !values.is_empty() {
            self.matrix_param(name, values);
        }
        if !saved.is_empty() {
            if let Some(masked) = self.path.take() {
                self.path = Some(template::restore_tokens(&masked, &saved));
            }
        }
        self
    }

    /// Appends `name=value` pairs to the query.
    ///
    /// Names and values may contain placeholders; existing percent-escapes
    /// in them are preserved.
    pub fn query_param<T: fmt::Display>(&mut self, name: &str, values: &[T]) -> &mut Self {
        self.touch_hierarchical();
        let mut query = self.query.take().unwrap_or_default();
        let encoded_name = template::encode_template_aware(name, table::QUERY_PARAM, Mode::Preserve);
        for value in values {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&encoded_name);
            query.push('=');
            query.push_str(&template::encode_template_aware(
                &value.to_string(),
                table::QUERY_PARAM,
                Mode::Preserve,
            ));
        }
        self.query = if query.is_empty() { None } else { Some(query) };
        self
    }

    /// Appends `name=value` pairs to the query, treating the text as plain
    /// data: braces are encoded rather than read as placeholders, and a
    /// literal `%` is always encoded.
    pub fn query_param_literal<T: fmt::Display>(&mut self, name: &str, values: &[T]) -> &mut Self {
        self.touch_hierarchical();
        let mut query = self.query.take().unwrap_or_default();
        let encoded_name = encoding::encode(name, table::QUERY_PARAM, Mode::Fresh);
        for value in values {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&encoded_name);
            query.push('=');
            query.push_str(&encoding::encode(
                &value.to_string(),
                table::QUERY_PARAM,
                Mode::Fresh,
            ));
        }
        self.query = if query.is_empty() { None } else { Some(query) };
        self
    }

    /// Replaces the entire query; `None` or an empty string clears it.
    pub fn replace_query(&mut self, query: Option<&str>) -> &mut Self {
        self.touch_hierarchical();
        self.query = match query {
            None | Some("") => None,
            Some(q) => Some(template::encode_template_aware(q, table::QUERY, Mode::Preserve)),
        };
        self
    }

    /// Replaces the entire query with the given text as is, without any
    /// encoding.
    pub fn replace_query_raw(&mut self, query: Option<&str>) -> &mut Self {
        self.touch_hierarchical();
        self.query = query.map(str::to_owned);
        self
    }

    /// Removes every query pair whose encoded name matches `name`, then
    /// appends the given values, keeping the other pairs in order.
    pub fn replace_query_param<T: fmt::Display>(&mut self, name: &str, values: &[T]) -> &mut Self {
        if self.query.as_deref().map_or(true, str::is_empty) {
            if !values.is_empty() {
                return self.query_param(name, values);
            }
            return self;
        }

        let encoded_name = template::encode_template_aware(name, table::QUERY_PARAM, Mode::Preserve);
        let old = self.query.take().unwrap_or_default();
        let kept: Vec<&str> = old
            .split('&')
            .filter(|pair| {
                let pair_name = pair.split_once('=').map_or(*pair, |(n, _)| n);
                pair_name != encoded_name
            })
            .collect();
        self.query = if kept.is_empty() {
            None
        } else {
            Some(kept.join("&"))
        };

        if !values.is_empty() {
            self.query_param(name, values);
        }
        self
    }

    /// Resolves only the occurrences of one named placeholder inside the
    /// path, leaving all other placeholders intact.
    ///
    /// With `is_encoded`, the value is trusted to be encoded already and
    /// only a stray `%` is escaped; otherwise it is freshly encoded as a
    /// path segment.
    pub fn substitute_path_param<V: fmt::Display>(
        &mut self,
        name: &str,
        value: V,
        is_encoded: bool,
    ) -> &mut Self {
        if let Some(path) = self.path.take() {
            let value = value.to_string();
            let encoded = if is_encoded {
                encoding::encode_non_codes(&value)
            } else {
                encoding::encode(&value, table::PATH_SEGMENT, Mode::Fresh)
            };
            self.path = Some(template::substitute_one(&path, name, &encoded));
        }
        self
    }

    /// Resolves one named placeholder everywhere in the builder,
    /// re-parsing the result in place.
    pub fn resolve_template<V: fmt::Display>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, BuildError> {
        self.resolve_template_with(name, value, true)
    }

    /// Like [`resolve_template`](Self::resolve_template), with control over
    /// whether `/` in a path value is encoded.
    pub fn resolve_template_with<V: fmt::Display>(
        &mut self,
        name: &str,
        value: V,
        encode_slash_in_path: bool,
    ) -> Result<&mut Self, BuildError> {
        let mut map = HashMap::new();
        map.insert(name.to_owned(), value.to_string());
        self.resolve_map(&map, Mode::Fresh, encode_slash_in_path)
    }

    /// Like [`resolve_template`](Self::resolve_template), for a value that
    /// is already percent-encoded.
    pub fn resolve_template_from_encoded<V: fmt::Display>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, BuildError> {
        let mut map = HashMap::new();
        map.insert(name.to_owned(), value.to_string());
        self.resolve_map(&map, Mode::Preserve, true)
    }

    /// Resolves the named placeholders present in `values`, leaving the
    /// rest for later.
    pub fn resolve_templates<K: AsRef<str>, V: fmt::Display>(
        &mut self,
        values: &HashMap<K, V>,
    ) -> Result<&mut Self, BuildError> {
        self.resolve_templates_with(values, true)
    }

    /// Like [`resolve_templates`](Self::resolve_templates), with control
    /// over whether `/` in path values is encoded.
    pub fn resolve_templates_with<K: AsRef<str>, V: fmt::Display>(
        &mut self,
        values: &HashMap<K, V>,
        encode_slash_in_path: bool,
    ) -> Result<&mut Self, BuildError> {
        let owned = to_owned_map(values);
        self.resolve_map(&owned, Mode::Fresh, encode_slash_in_path)
    }

    /// Like [`resolve_templates`](Self::resolve_templates), for values that
    /// are already percent-encoded.
    pub fn resolve_templates_from_encoded<K: AsRef<str>, V: fmt::Display>(
        &mut self,
        values: &HashMap<K, V>,
    ) -> Result<&mut Self, BuildError> {
        let owned = to_owned_map(values);
        self.resolve_map(&owned, Mode::Preserve, true)
    }

    fn resolve_map(
        &mut self,
        values: &HashMap<String, String>,
        mode: Mode,
        encode_slash_in_path: bool,
    ) -> Result<&mut Self, BuildError> {
        let opts = RenderOpts {
            mode,
            keep_unresolved: true,
            encode_slash_in_path,
        };
        let mut src = Values::named(values);
        let (rendered, _) = self.render(&mut src, &opts)?;
        parser::parse_into(self, &rendered)?;
        Ok(self)
    }

    /// Builds the URI, binding placeholders to the values positionally in
    /// first-encounter order; repeated names reuse their first binding.
    ///
    /// Values are freshly percent-encoded, with `/` in path values
    /// encoded as `%2F`.
    pub fn build<T: fmt::Display>(&self, values: &[T]) -> Result<Uri, BuildError> {
        self.build_with(values, true)
    }

    /// Like [`build`](Self::build), with control over whether `/` in a
    /// path value is encoded.
    pub fn build_with<T: fmt::Display>(
        &self,
        values: &[T],
        encode_slash_in_path: bool,
    ) -> Result<Uri, BuildError> {
        let mut src = Values::positional(values.iter().map(ToString::to_string).collect());
        self.finish_build(&mut src, Mode::Fresh, encode_slash_in_path)
    }

    /// Like [`build`](Self::build), for values that are already
    /// percent-encoded: valid escapes in them are preserved instead of
    /// being encoded again.
    pub fn build_from_encoded<T: fmt::Display>(&self, values: &[T]) -> Result<Uri, BuildError> {
        let mut src = Values::positional(values.iter().map(ToString::to_string).collect());
        self.finish_build(&mut src, Mode::Preserve, false)
    }

    /// Builds the URI from named values.
    pub fn build_from_map<K: AsRef<str>, V: fmt::Display>(
        &self,
        values: &HashMap<K, V>,
    ) -> Result<Uri, BuildError> {
        self.build_from_map_with(values, true)
    }

    /// Like [`build_from_map`](Self::build_from_map), with control over
    /// whether `/` in path values is encoded.
    pub fn build_from_map_with<K: AsRef<str>, V: fmt::Display>(
        &self,
        values: &HashMap<K, V>,
        encode_slash_in_path: bool,
    ) -> Result<Uri, BuildError> {
        let owned = to_owned_map(values);
        let mut src = Values::named(&owned);
        self.finish_build(&mut src, Mode::Fresh, encode_slash_in_path)
    }

    /// Like [`build_from_map`](Self::build_from_map), for values that are
    /// already percent-encoded.
    pub fn build_from_encoded_map<K: AsRef<str>, V: fmt::Display>(
        &self,
        values: &HashMap<K, V>,
    ) -> Result<Uri, BuildError> {
        let owned = to_owned_map(values);
        let mut src = Values::named(&owned);
        self.finish_build(&mut src, Mode::Preserve, false)
    }

    /// Renders the builder as a template string, leaving unresolved
    /// placeholders literal.
    #[must_use]
    pub fn to_template(&self) -> String {
        let opts = RenderOpts {
            mode: Mode::Preserve,
            keep_unresolved: true,
            encode_slash_in_path: true,
        };
        let mut src = Values::none();
        // Infallible: nothing is bound, so nothing can fail validation.
        self.render(&mut src, &opts)
            .map(|(val, _)| val)
            .unwrap_or_default()
    }

    /// Returns the declared placeholder names, de-duplicated, in
    /// first-occurrence order across
    /// scheme, userinfo, host, path, query and fragment.
    #[must_use]
    pub fn path_param_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for component in [
            &self.scheme,
            &self.userinfo,
            &self.host,
            &self.path,
            &self.query,
            &self.fragment,
        ] {
            if let Some(text) = component {
                template::collect_names(text, &mut names);
            }
        }
        names
    }

    fn finish_build(
        &self,
        values: &mut Values<'_>,
        mode: Mode,
        encode_slash_in_path: bool,
    ) -> Result<Uri, BuildError> {
        let opts = RenderOpts {
            mode,
            keep_unresolved: false,
            encode_slash_in_path,
        };
        let (val, meta) = self.render(values, &opts)?;
        validate_built(&val, &meta)?;
        Ok(Uri::new(val, meta))
    }

    fn render(
        &self,
        values: &mut Values<'_>,
        opts: &RenderOpts,
    ) -> Result<(String, Meta), BuildError> {
        fn sub(
            text: &str,
            tbl: &'static table::Table,
            opts: &RenderOpts,
            values: &mut Values<'_>,
        ) -> Result<String, ResolveError> {
            template::substitute(text, tbl, opts.mode, opts.keep_unresolved, values)
        }

        let mut asm = Assembler::default();

        if let Some(scheme) = &self.scheme {
            let s = sub(scheme, table::SCHEME, opts, values)?;
            if s.is_empty() && !opts.keep_unresolved {
                return Err(BuildError(BuildErrorKind::InvalidComponent {
                    component: "scheme",
                }));
            }
            asm.push_scheme(&s);
        }

        if let Some(ssp) = &self.ssp {
            asm.push_ssp(ssp);
        } else if self.userinfo.is_some() || self.host.is_some() || self.port.is_some() {
            asm.start_authority();
            if let Some(userinfo) = &self.userinfo {
                let s = sub(userinfo, table::USERINFO, opts, values)?;
                asm.push_userinfo(&s);
            }
            if let Some(host) = &self.host {
                if host.is_empty() && !opts.keep_unresolved {
                    return Err(BuildError(BuildErrorKind::EmptyHost));
                }
                let s = sub(host, table::REG_NAME, opts, values)?;
                asm.push_host(&s);
            }
            if let Some(port) = self.port {
                asm.push_port(port);
            }
        } else if let Some(authority) = &self.authority {
            asm.start_authority();
            let s = sub(authority, table::USERINFO, opts, values)?;
            asm.push_authority_raw(&s);
        }

        if let Some(path) = &self.path {
            let tbl = if opts.encode_slash_in_path {
                table::PATH_SEGMENT
            } else {
                table::PATH
            };
            let s = sub(path, tbl, opts, values)?;
            asm.push_path(&s, self.userinfo.is_some() || self.host.is_some());
        }
        if let Some(query) = &self.query {
            let s = sub(query, table::QUERY_PARAM, opts, values)?;
            asm.push_query(&s);
        }
        if let Some(fragment) = &self.fragment {
            let s = sub(fragment, table::FRAGMENT, opts, values)?;
            asm.push_fragment(&s);
        }
        Ok(asm.finish())
    }
}

fn to_owned_map<K: AsRef<str>, V: fmt::Display>(values: &HashMap<K, V>) -> HashMap<String, String> {
    values
        .iter()
        .map(|(k, v)| (k.as_ref().to_owned(), v.to_string()))
        .collect()
}

fn join_path(mut base: String, segment: &str) -> String {
    if segment.is_empty() {
        return base;
    }
    if base.ends_with('/') {
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        if segment.is_empty() {
            return base;
        }
        base.push_str(&template::encode_template_aware(
            segment,
            table::PATH,
            Mode::Preserve,
        ));
    } else {
        let segment = template::encode_template_aware(segment, table::PATH, Mode::Preserve);
        if base.is_empty() {
            base = segment;
        } else if segment.starts_with('/') {
            base.push_str(&segment);
        } else {
            base.push('/');
            base.push_str(&segment);
        }
    }
    base
}

/// Assembles the URI string, recording component offsets as it goes.
#[derive(Default)]
struct Assembler {
    buf: String,
    meta: Meta,
    path_set: bool,
}

impl Assembler {
    fn push_scheme(&mut self, v: &str) {
        self.buf.push_str(v);
        self.meta.scheme_end = NonZeroUsize::new(self.buf.len());
        self.buf.push(':');
    }

    fn push_ssp(&mut self, v: &str) {
        self.meta.opaque = true;
        self.meta.path_bounds.0 = self.buf.len();
        self.buf.push_str(v);
        self.meta.path_bounds.1 = self.buf.len();
        self.path_set = true;
    }

    fn start_authority(&mut self) {
        self.buf.push_str("//");
        let start = self.buf.len();
        self.meta.auth = Some(AuthMeta {
            start,
            host_bounds: (start, start),
            raw: false,
        });
    }

    fn push_userinfo(&mut self, v: &str) {
        self.buf.push_str(v);
        self.buf.push('@');
        let auth = self.meta.auth.as_mut().unwrap();
        auth.host_bounds = (self.buf.len(), self.buf.len());
    }

    fn push_host(&mut self, v: &str) {
        let start = self.buf.len();
        self.buf.push_str(v);
        let auth = self.meta.auth.as_mut().unwrap();
        auth.host_bounds = (start, self.buf.len());
    }

    fn push_port(&mut self, port: u32) {
        self.buf.push(':');
        self.buf.push_str(&port.to_string());
    }

    fn push_authority_raw(&mut self, v: &str) {
        let start = self.buf.len();
        self.buf.push_str(v);
        let auth = self.meta.auth.as_mut().unwrap();
        auth.host_bounds = (start, self.buf.len());
        auth.raw = true;
    }

    fn push_path(&mut self, v: &str, ensure_rooted: bool) {
        self.meta.path_bounds.0 = self.buf.len();
        if ensure_rooted && !v.is_empty() && !v.starts_with('/') {
            self.buf.push('/');
        }
        self.buf.push_str(v);
        self.meta.path_bounds.1 = self.buf.len();
        self.path_set = true;
    }

    fn ensure_path(&mut self) {
        if !self.path_set {
            self.meta.path_bounds = (self.buf.len(), self.buf.len());
            self.path_set = true;
        }
    }

    fn push_query(&mut self, v: &str) {
        self.ensure_path();
        self.buf.push('?');
        self.buf.push_str(v);
        self.meta.query_end = NonZeroUsize::new(self.buf.len());
    }

    fn push_fragment(&mut self, v: &str) {
        self.ensure_path();
        self.buf.push('#');
        self.meta.fragment_start = NonZeroUsize::new(self.buf.len());
        self.buf.push_str(v);
    }

    fn finish(mut self) -> (String, Meta) {
        self.ensure_path();
        (self.buf, self.meta)
    }
}

fn validate_built(val: &str, meta: &Meta) -> Result<(), BuildError> {
    fn invalid(component: &'static str) -> BuildError {
        BuildError(BuildErrorKind::InvalidComponent { component })
    }
    fn first_segment_contains_colon(path: &str) -> bool {
        path.split_once('/').map_or(path, |x| x.0).contains(':')
    }

    if let Some(end) = meta.scheme_end {
        let scheme = val[..end.get()].as_bytes();
        if !(scheme[0].is_ascii_alphabetic() && table::SCHEME.validate(&scheme[1..])) {
            return Err(invalid("scheme"));
        }
    }

    if let Some(auth) = &meta.auth {
        let (host_start, host_end) = auth.host_bounds;
        if auth.raw {
            if !table::AUTHORITY.validate(val[host_start..host_end].as_bytes()) {
                return Err(invalid("authority"));
            }
        } else {
            if host_start > auth.start
                && !table::USERINFO.validate(val[auth.start..host_start - 1].as_bytes())
            {
                return Err(invalid("userinfo"));
            }
            let host = &val[host_start..host_end];
            if !host.starts_with('[') && !table::REG_NAME.validate(host.as_bytes()) {
                return Err(invalid("host"));
            }
        }
    }

    let path = &val[meta.path_bounds.0..meta.path_bounds.1];
    if meta.opaque {
        if !table::SSP.validate(path.as_bytes()) {
            return Err(invalid("scheme-specific part"));
        }
    } else {
        if !table::PATH.validate(path.as_bytes()) {
            return Err(invalid("path"));
        }
        if meta.auth.is_some() {
            if !path.is_empty() && !path.starts_with('/') {
                return Err(BuildError(BuildErrorKind::NonAbemptyPath));
            }
        } else {
            if path.starts_with("//") {
                return Err(BuildError(BuildErrorKind::PathStartingWithDoubleSlash));
            }
            if meta.scheme_end.is_none() && first_segment_contains_colon(path) {
                return Err(BuildError(BuildErrorKind::ColonInFirstPathSegment));
            }
        }
    }

    if let Some(end) = meta.query_end {
        if !table::QUERY.validate(val[meta.path_bounds.1 + 1..end.get()].as_bytes()) {
            return Err(invalid("query"));
        }
    }
    if let Some(start) = meta.fragment_start {
        if !table::FRAGMENT.validate(val[start.get()..].as_bytes()) {
            return Err(invalid("fragment"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::join_path;

    #[test]
    fn glues_path_segments() {
        assert_eq!(join_path(String::new(), "a"), "a");
        assert_eq!(join_path("a".to_owned(), "b"), "a/b");
        assert_eq!(join_path("a/".to_owned(), "/b"), "a/b");
        assert_eq!(join_path("a".to_owned(), "/b"), "a/b");
        assert_eq!(join_path("a/".to_owned(), "b"), "a/b");
        assert_eq!(join_path("a".to_owned(), ""), "a");
        assert_eq!(join_path("a/".to_owned(), "/"), "a/");
    }
}
