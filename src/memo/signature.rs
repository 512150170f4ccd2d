//! Method signature descriptors and call-shape classification.
//!
//! A `Signature` lists a method's parameters in declaration order. Its
//! `CallShape` decides whether the method caches a single scalar or a keyed
//! map, and how an `ArgKey` is built from the call arguments.

use std::collections::HashSet;

use super::args::CallArgs;
use crate::error::MemoError;

/// Kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Required positional.
    Required,
    /// Positional with a default.
    Optional,
    /// Catch-all positional.
    Rest,
    /// Required keyword.
    RequiredKeyword,
    /// Keyword with a default.
    OptionalKeyword,
    /// Catch-all keyword.
    KeywordRest,
    /// Block / continuation. Never cacheable.
    Block,
}

impl ParamKind {
    pub fn is_positional(self) -> bool {
        matches!(self, Self::Required | Self::Optional | Self::Rest)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::RequiredKeyword | Self::OptionalKeyword | Self::KeywordRest
        )
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::Required | Self::RequiredKeyword)
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

/// How the arguments of a method map onto a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    /// No parameters: scalar slot.
    NoArgs,
    /// Exactly one required positional: keyed by that value.
    OneRequiredPositional,
    /// Exactly one required keyword: keyed by that value.
    OneRequiredKeyword,
    /// Several parameters, all required.
    MultipleRequired,
    /// Optional or rest positionals, no keyword parameters.
    Splat,
    /// Optional or rest keywords, no positional parameters.
    DoubleSplat,
    /// Optional or rest parameters of both kinds.
    SplatAndDoubleSplat,
}

impl CallShape {
    /// True when results live in a keyed map rather than a scalar slot.
    pub fn is_keyed(self) -> bool {
        !matches!(self, Self::NoArgs)
    }

    /// Whether positional values take part in the key.
    pub fn keys_positional(self) -> bool {
        matches!(
            self,
            Self::OneRequiredPositional
                | Self::MultipleRequired
                | Self::Splat
                | Self::SplatAndDoubleSplat
        )
    }

    /// Whether keyword values take part in the key.
    pub fn keys_keywords(self) -> bool {
        matches!(
            self,
            Self::OneRequiredKeyword
                | Self::MultipleRequired
                | Self::DoubleSplat
                | Self::SplatAndDoubleSplat
        )
    }
}

/// Parameter list of a method, built with the chained constructors.
///
/// ```
/// use memo_core::memo::{CallShape, Signature};
///
/// let sig = Signature::new().required("a").optional_keyword("scale");
/// assert_eq!(sig.shape(), CallShape::SplatAndDoubleSplat);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// An empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn required(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Required)
    }

    pub fn optional(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Optional)
    }

    pub fn rest(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Rest)
    }

    pub fn keyword(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::RequiredKeyword)
    }

    pub fn optional_keyword(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::OptionalKeyword)
    }

    pub fn keyword_rest(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::KeywordRest)
    }

    pub fn block(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Block)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn has_block(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::Block)
    }

    /// Classify the parameter list. Block parameters are ignored here;
    /// `Class::memoize` rejects them separately.
    pub fn shape(&self) -> CallShape {
        let params: Vec<&Param> = self
            .params
            .iter()
            .filter(|p| p.kind != ParamKind::Block)
            .collect();

        if params.is_empty() {
            return CallShape::NoArgs;
        }

        if params.iter().all(|p| p.kind.is_required()) {
            return match (params.len(), params[0].kind) {
                (1, ParamKind::Required) => CallShape::OneRequiredPositional,
                (1, _) => CallShape::OneRequiredKeyword,
                _ => CallShape::MultipleRequired,
            };
        }

        let positional = params.iter().any(|p| p.kind.is_positional());
        let keyword = params.iter().any(|p| p.kind.is_keyword());
        match (positional, keyword) {
            (true, true) => CallShape::SplatAndDoubleSplat,
            (false, true) => CallShape::DoubleSplat,
            _ => CallShape::Splat,
        }
    }

    /// Name of the sole required keyword for `OneRequiredKeyword` methods.
    pub(crate) fn sole_keyword(&self) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.kind == ParamKind::RequiredKeyword)
            .map(|p| p.name.as_str())
    }

    /// Reject parameter lists that declare a name twice.
    pub fn validate(&self, method: &str) -> Result<(), MemoError> {
        let mut seen = HashSet::new();
        for p in &self.params {
            if !seen.insert(p.name.as_str()) {
                return Err(MemoError::DuplicateParameter {
                    method: method.to_string(),
                    param: p.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check call arguments against the declared parameters.
    pub fn check_args(&self, method: &str, args: &CallArgs) -> Result<(), MemoError> {
        let count = |kind: ParamKind| self.params.iter().filter(|p| p.kind == kind).count();
        let required = count(ParamKind::Required);
        let optional = count(ParamKind::Optional);
        let rest = count(ParamKind::Rest) > 0;

        let given = args.positional_len();
        if given < required || (!rest && given > required + optional) {
            let expected = if rest {
                format!("{}+", required)
            } else if optional > 0 {
                format!("{}..{}", required, required + optional)
            } else {
                required.to_string()
            };
            return Err(MemoError::ArgumentCount {
                method: method.to_string(),
                given,
                expected,
            });
        }

        for p in self
            .params
            .iter()
            .filter(|p| p.kind == ParamKind::RequiredKeyword)
        {
            if args.keyword(&p.name).is_none() {
                return Err(MemoError::MissingKeyword {
                    method: method.to_string(),
                    keyword: p.name.clone(),
                });
            }
        }

        if count(ParamKind::KeywordRest) == 0 {
            for name in args.keywords().keys() {
                let declared = self
                    .params
                    .iter()
                    .any(|p| p.kind.is_keyword() && &p.name == name);
                if !declared {
                    return Err(MemoError::UnknownKeyword {
                        method: method.to_string(),
                        keyword: name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
