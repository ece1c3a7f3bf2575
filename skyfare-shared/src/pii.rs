use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps personal data (emails, names) so it never leaks through `{:?}` or
/// `{}` in log macros. Serialization still emits the real value because the
/// session token and the rendered pages need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl fmt::Display for Masked<String> {
    /// Keeps the first character and the domain: `j*******@example.com`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let mut chars = local.chars();
                match chars.next() {
                    Some(first) => write!(f, "{}{}@{}", first, "*".repeat(chars.count()), domain),
                    None => write!(f, "@{}", domain),
                }
            }
            None => f.write_str("********"),
        }
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}
