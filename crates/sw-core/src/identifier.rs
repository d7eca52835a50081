//! Validated string newtypes for product and step names.
//!
//! Both are persisted verbatim in the migration record tables and echoed in
//! diagnostics, so they are restricted to ASCII letters, digits, `_`, `-`
//! and `.`.

use crate::error::{CoreError, CoreResult};

fn check_name(kind: &'static str, input: &str) -> CoreResult<()> {
    let reason = if input.is_empty() {
        Some("must not be empty")
    } else if input.len() > 128 {
        Some("must be at most 128 characters")
    } else if !input
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
    {
        Some("only ASCII letters, digits, '_', '-' and '.' are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidIdentifier {
            kind,
            input: input.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Define a validated name newtype.
///
/// Generates the struct, a fallible `new`, `as_str`, `Display`, `AsRef<str>`,
/// `Deref<Target = str>`, comparisons against `str`, and serde impls that
/// reject invalid input on the way in.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident => $kind:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            /// Validate and wrap `name`.
            pub fn new(name: impl Into<String>) -> CoreResult<Self> {
                let s = name.into();
                check_name($kind, &s)?;
                Ok(Self(s))
            }

            /// Return the underlying name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::new(s).map_err(serde::de::Error::custom)
            }
        }

        impl std::str::FromStr for $Name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

define_name! {
    /// Logical product identity whose schema version is tracked (e.g. `cms`).
    pub struct ProductName => "product name";
}

define_name! {
    /// Stable name of a migration step, unique within a plan.
    pub struct StepName => "step name";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert_eq!(ProductName::new("cms").unwrap(), "cms");
        assert_eq!(
            StepName::new("add_property_group_columns").unwrap().as_str(),
            "add_property_group_columns"
        );
    }

    #[test]
    fn rejects_empty_and_spaces() {
        assert!(ProductName::new("").is_err());
        assert!(StepName::new("add columns").is_err());
        assert!(StepName::new("drop;table").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: ProductName = serde_yaml::from_str("cms-site").unwrap();
        assert_eq!(ok, "cms-site");
        assert!(serde_yaml::from_str::<ProductName>("\"a b\"").is_err());
    }

    #[test]
    fn error_names_the_kind() {
        let err = StepName::new("").unwrap_err();
        assert!(err.to_string().contains("step name"));
    }
}
