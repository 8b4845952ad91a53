use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Guest contact data that must not show up in log lines.
///
/// `Debug` and `Display` print a redacted form; serialization and
/// [`Masked::expose`] hand out the real value for outbound mail.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Masked(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Masked({})", redact(self.0.as_ref()))
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0.as_ref()))
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

/// Keeps the first character and, for addresses, the domain:
/// `jane@example.com` becomes `j***@example.com`.
pub fn redact(value: &str) -> String {
    let (local, domain) = match value.split_once('@') {
        Some((local, domain)) => (local, Some(domain)),
        None => (value, None),
    };
    let head: String = local.chars().take(1).collect();
    let masked = if head.is_empty() {
        String::new()
    } else {
        format!("{}***", head)
    };
    match domain {
        Some(domain) => format!("{}@{}", masked, domain),
        None => masked,
    }
}
