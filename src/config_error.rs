use std::fmt;

/// Locator of a value inside a configuration document,
/// e.g. `networks.1.contracts.Registry.blockCreated`.
///
/// Segments that are empty or contain `.`, `[`, `]`, `"` or `\\` are written
/// in brackets: `networks.1.contracts["Registry.v2"].blockCreated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonPath(Vec<String>);

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

fn needs_brackets(segment: &str) -> bool {
    segment.is_empty() || segment == "$" || segment.contains(['.', '[', ']', '"', '\\'])
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("$");
        }
        for (index, segment) in self.segments().iter().enumerate() {
            if needs_brackets(segment) {
                f.write_str("[\"")?;
                for c in segment.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"]")?;
            } else {
                if index > 0 {
                    f.write_str(".")?;
                }
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

/// Parses the form produced by `Display`.
impl From<&str> for JsonPath {
    fn from(text: &str) -> Self {
        if text.is_empty() || text == "$" {
            return Self::root();
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
                '[' if chars.peek() == Some(&'"') => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                    chars.next();
                    while let Some(c) = chars.next() {
                        match c {
                            '\\' => current.extend(chars.next()),
                            '"' => break,
                            _ => current.push(c),
                        }
                    }
                    chars.next_if_eq(&']');
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        Self(segments)
    }
}

impl From<&JsonPath> for JsonPath {
    fn from(path: &JsonPath) -> Self {
        path.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// JSON value kind differs from the declared one (includes hex strings for numbers).
    TypeMismatch,
    MissingField,
    /// A cross-object rule failed after the structure itself was valid.
    InvariantViolation,
    /// An extension key tried to override a standard field.
    ReservedKeyConflict,
    /// Right JSON kind, unusable content (bad URL, semver, address, chain id, ...).
    InvalidValue,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TypeMismatch => "type mismatch",
            Self::MissingField => "missing field",
            Self::InvariantViolation => "invariant violation",
            Self::ReservedKeyConflict => "reserved key conflict",
            Self::InvalidValue => "invalid value",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at `{path}`: {message}")]
pub struct ValidationError {
    pub path: JsonPath,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: JsonPath, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

/// Every problem found in one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Returns `None` when there is nothing to report.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.0.iter().map(|e| e.kind).collect()
    }

    /// Errors reported at exactly `path`, given as a `JsonPath` or its display form.
    pub fn at<'a, P: Into<JsonPath>>(&'a self, path: P) -> Vec<&'a ValidationError> {
        let path = path.into();
        self.0.iter().filter(|e| e.path == path).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Failures of the loader and encoder entry points.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ConfigError {
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Json(_) => None,
        }
    }
}
