use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::QueryError;

/// A named query variable.
///
/// Variables are written `?name` in plans; the leading `?` is optional when
/// constructing one from a string and is not part of the name.
///
/// ```
/// use podmail_query::Variable;
///
/// let person: Variable = "?person".parse().unwrap();
/// assert_eq!(person.name(), "person");
/// assert_eq!(person.to_string(), "?person");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Variable(String);

impl Variable {
    /// Creates a variable, validating its name
    pub fn new(name: &str) -> Result<Self, QueryError> {
        let name = name.strip_prefix('?').unwrap_or(name);
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-');

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(QueryError::InvalidVariable {
                name: name.to_string(),
            })
        }
    }

    /// Wraps a name that is already known to be valid, such as a constant
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.strip_prefix('?').unwrap_or(name).to_string())
    }

    /// The name without the leading `?`
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

impl FromStr for Variable {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Variable {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Variable> for String {
    fn from(variable: Variable) -> Self {
        variable.to_string()
    }
}
