pub use uri::{InvalidUriError, Uri};

pub type Method = reqwest::Method;

mod uri {
    use std::fmt::Display;
    use std::str::FromStr;

    use thiserror::Error;

    #[derive(Debug, Error)]
    pub struct InvalidUriError(String);

    impl Display for InvalidUriError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            self.0.fmt(f)
        }
    }

    impl From<http::uri::InvalidUri> for InvalidUriError {
        fn from(value: http::uri::InvalidUri) -> Self {
            InvalidUriError(value.to_string())
        }
    }

    impl From<http::uri::InvalidUriParts> for InvalidUriError {
        fn from(value: http::uri::InvalidUriParts) -> Self {
            InvalidUriError(value.to_string())
        }
    }

    /// An absolute URI, i.e. one with both a scheme and a host
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Uri(http::Uri);

    impl Uri {
        pub fn from_static(src: &'static str) -> Self {
            Self(http::Uri::from_static(src))
        }

        pub fn path(&self) -> &str {
            self.0.path()
        }

        pub fn query(&self) -> Option<&str> {
            self.0.query()
        }

        /// Build a new URI using the scheme and authority of `base_uri` and
        /// the given path and query.
        pub fn from_parts(
            base_uri: Uri,
            path: &str,
            query: Option<&str>,
        ) -> Result<Self, InvalidUriError> {
            let path_and_query = if let Some(qs) = query {
                http::uri::PathAndQuery::from_maybe_shared(format!("{path}?{qs}",))?
            } else {
                http::uri::PathAndQuery::from_str(path)?
            };
            let mut parts = base_uri.0.into_parts();
            parts.path_and_query = Some(path_and_query);

            Ok(http::Uri::from_parts(parts).map(Self)?)
        }
    }

    impl Display for Uri {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            self.0.fmt(f)
        }
    }

    impl FromStr for Uri {
        type Err = InvalidUriError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let uri = http::Uri::from_str(s)?;
            if uri.scheme().is_none() || uri.host().is_none() {
                return Err(InvalidUriError(format!(
                    "expected an absolute URI with scheme and host, got '{s}'"
                )));
            }
            Ok(Self(uri))
        }
    }

}
