//! The structured output unit a validation run produces, per the
//! "Basic"-shaped output format of JSON Schema draft 2020-12.

use crate::value::Value;

/// One node of the validation result tree: either an applied keyword's
/// verdict, or a rolled-up subschema result.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUnit {
    pub valid: bool,
    pub instance_location: String,
    pub keyword_location: String,
    pub absolute_keyword_location: Option<String>,
    pub error: Option<String>,
    pub annotation: Option<Value>,
    pub errors: Vec<OutputUnit>,
    pub annotations: Vec<OutputUnit>,
}

impl OutputUnit {
    pub fn valid(instance_location: impl Into<String>, keyword_location: impl Into<String>) -> OutputUnit {
        OutputUnit {
            valid: true,
            instance_location: instance_location.into(),
            keyword_location: keyword_location.into(),
            absolute_keyword_location: None,
            error: None,
            annotation: None,
            errors: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn invalid(
        instance_location: impl Into<String>,
        keyword_location: impl Into<String>,
        error: impl Into<String>,
    ) -> OutputUnit {
        OutputUnit {
            valid: false,
            instance_location: instance_location.into(),
            keyword_location: keyword_location.into(),
            absolute_keyword_location: None,
            error: Some(error.into()),
            annotation: None,
            errors: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, value: Value) -> OutputUnit {
        self.annotation = Some(value);
        self
    }

    pub fn with_absolute_location(mut self, uri: impl Into<String>) -> OutputUnit {
        self.absolute_keyword_location = Some(uri.into());
        self
    }

    /// Folds `children` into this unit's `errors`/`annotations` lists and
    /// ANDs their validity into `self.valid`, matching how a schema object
    /// made of several keywords rolls its keywords' results up into one.
    pub fn absorb(&mut self, child: OutputUnit) {
        self.valid &= child.valid;
        if child.valid {
            if child.annotation.is_some() || !child.annotations.is_empty() {
                self.annotations.push(child);
            }
        } else {
            self.errors.push(child);
        }
    }
}
