use std::fmt;

/// How a declaration's initializer is turned into the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Number or text, bound unchanged. The unit is documentation only.
    Plain,
    /// Only a blood pressure value is accepted.
    BloodPressure,
    /// A bare number is wrapped into a glucose reading.
    Glucose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    pub name: &'static str,
    pub coercion: Coercion,
}

/// Every type name the grammar accepts after `:` in a declaration.
pub const DECLARED_TYPES: &[DeclaredType] = &[
    DeclaredType {
        name: "Years",
        coercion: Coercion::Plain,
    },
    DeclaredType {
        name: "mmHg",
        coercion: Coercion::BloodPressure,
    },
    DeclaredType {
        name: "mg/dL",
        coercion: Coercion::Glucose,
    },
];

/// Longest declared type name that `text` starts with.
pub fn match_type_prefix(text: &[char]) -> Option<&'static DeclaredType> {
    DECLARED_TYPES
        .iter()
        .filter(|declared| {
            let name: Vec<char> = declared.name.chars().collect();
            text.starts_with(&name)
                && !text
                    .get(name.len())
                    .is_some_and(|c| c.is_alphanumeric() || *c == '_')
        })
        .max_by_key(|declared| declared.name.len())
}

pub fn type_names() -> String {
    DECLARED_TYPES
        .iter()
        .map(|declared| declared.name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Components readable from a blood pressure value with `name.property`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Systolic,
    Diastolic,
}

impl Property {
    pub const ALL: [Property; 2] = [Property::Systolic, Property::Diastolic];

    pub fn from_name(name: &str) -> Option<Property> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Property::Systolic => "systolic",
            Property::Diastolic => "diastolic",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
