//! Cache key derivation.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

use super::args::CallArgs;
use super::signature::{CallShape, ParamKind, Signature};
use super::value::ArgValue;

/// Canonical, hashable form of one call's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgKey {
    /// Methods with a single logical parameter key by its value.
    Single(ArgValue),
    /// Positional values in order, then keyword values sorted by name.
    Composite {
        positional: Vec<ArgValue>,
        keywords: BTreeMap<String, ArgValue>,
    },
}

impl ArgKey {
    /// Derive the key for a call, or `None` for zero-argument methods which
    /// cache in a scalar slot.
    ///
    /// Arguments are not validated: an argument no declared parameter would
    /// bind is dropped, and a missing required argument keys as `Nil`. Keys
    /// built for `preset` and `reset` therefore match the ones a valid call
    /// produces.
    pub fn derive(signature: &Signature, args: &CallArgs) -> Option<ArgKey> {
        let shape = signature.shape();
        match shape {
            CallShape::NoArgs => None,
            CallShape::OneRequiredPositional => {
                Some(ArgKey::Single(args.get(0).cloned().unwrap_or(ArgValue::Nil)))
            }
            CallShape::OneRequiredKeyword => {
                let value = signature
                    .sole_keyword()
                    .and_then(|name| args.keyword(name))
                    .cloned()
                    .unwrap_or(ArgValue::Nil);
                Some(ArgKey::Single(value))
            }
            _ => Some(ArgKey::Composite {
                positional: if shape.keys_positional() {
                    declared_positional(signature, args, shape)
                } else {
                    Vec::new()
                },
                keywords: if shape.keys_keywords() {
                    declared_keywords(signature, args, shape)
                } else {
                    BTreeMap::new()
                },
            }),
        }
    }

    /// Short digest for log fields, so large argument values never end up
    /// verbatim in log output.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..8])
    }
}

/// Positional values a call with this signature can bind. Without a rest
/// parameter, values past the declared positionals are dropped; required
/// positionals that are missing key as `Nil`.
fn declared_positional(
    signature: &Signature,
    args: &CallArgs,
    shape: CallShape,
) -> Vec<ArgValue> {
    let count = |kind: ParamKind| signature.params().iter().filter(|p| p.kind == kind).count();
    let given = args.positional_values();
    if count(ParamKind::Rest) > 0 {
        return given.to_vec();
    }

    let limit = count(ParamKind::Required) + count(ParamKind::Optional);
    let mut values: Vec<ArgValue> = given.iter().take(limit).cloned().collect();
    if shape == CallShape::MultipleRequired {
        values.resize(limit, ArgValue::Nil);
    }
    values
}

/// Keyword values bound to declared keyword parameters. A keyword rest
/// parameter keeps every keyword; required keywords that are missing key
/// as `Nil`.
fn declared_keywords(
    signature: &Signature,
    args: &CallArgs,
    shape: CallShape,
) -> BTreeMap<String, ArgValue> {
    let has_rest = signature
        .params()
        .iter()
        .any(|p| p.kind == ParamKind::KeywordRest);
    if has_rest {
        return args.keywords().clone();
    }

    let mut keywords = BTreeMap::new();
    for param in signature.params() {
        match (param.kind, args.keyword(&param.name)) {
            (ParamKind::RequiredKeyword | ParamKind::OptionalKeyword, Some(value)) => {
                keywords.insert(param.name.clone(), value.clone());
            }
            (ParamKind::RequiredKeyword, None) if shape == CallShape::MultipleRequired => {
                keywords.insert(param.name.clone(), ArgValue::Nil);
            }
            _ => {}
        }
    }
    keywords
}

impl fmt::Display for ArgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => write!(f, "{}", v),
            Self::Composite {
                positional,
                keywords,
            } => {
                write!(f, "(")?;
                let mut first = true;
                for v in positional {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}", v)?;
                }
                for (k, v) in keywords {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_has_no_key() {
        assert_eq!(ArgKey::derive(&Signature::new(), &CallArgs::new()), None);
    }

    #[test]
    fn test_single_positional() {
        let sig = Signature::new().required("n");
        let key = ArgKey::derive(&sig, &CallArgs::positional([4i64]));
        assert_eq!(key, Some(ArgKey::Single(ArgValue::Int(4))));
    }

    #[test]
    fn test_single_keyword() {
        let sig = Signature::new().keyword("n");
        let key = ArgKey::derive(&sig, &CallArgs::new().kwarg("n", 4i64));
        assert_eq!(key, Some(ArgKey::Single(ArgValue::Int(4))));
    }

    #[test]
    fn test_positional_shape_ignores_keywords() {
        let sig = Signature::new().rest("xs");
        let plain = ArgKey::derive(&sig, &CallArgs::positional([1i64, 2]));
        let extra = ArgKey::derive(&sig, &CallArgs::positional([1i64, 2]).kwarg("k", 3i64));
        assert_eq!(plain, extra);
    }

    #[test]
    fn test_keyword_shape_ignores_positional() {
        let sig = Signature::new().optional_keyword("k");
        let a = ArgKey::derive(&sig, &CallArgs::new().kwarg("k", 1i64));
        let b = ArgKey::derive(&sig, &CallArgs::new().arg(9i64).kwarg("k", 1i64));
        assert_eq!(a, b);
    }

    #[test]
    fn test_multiple_required_keys_only_declared_params() {
        let sig = Signature::new().required("a").required("b");
        let plain = ArgKey::derive(&sig, &CallArgs::positional([1i64, 2]));
        let extra = ArgKey::derive(&sig, &CallArgs::positional([1i64, 2, 3]).kwarg("x", 9i64));
        assert_eq!(plain, extra);
        assert_eq!(
            plain,
            Some(ArgKey::Composite {
                positional: vec![ArgValue::Int(1), ArgValue::Int(2)],
                keywords: BTreeMap::new(),
            })
        );
    }

    #[test]
    fn test_multiple_required_pads_missing_with_nil() {
        let sig = Signature::new().required("a").keyword("b");
        let key = ArgKey::derive(&sig, &CallArgs::new()).unwrap();
        let mut keywords = BTreeMap::new();
        keywords.insert("b".to_string(), ArgValue::Nil);
        assert_eq!(
            key,
            ArgKey::Composite {
                positional: vec![ArgValue::Nil],
                keywords,
            }
        );
    }

    #[test]
    fn test_optional_shape_drops_undeclared_keywords() {
        let sig = Signature::new().required("a").optional_keyword("scale");
        let plain = ArgKey::derive(&sig, &CallArgs::new().arg(1i64).kwarg("scale", 2i64));
        let extra = ArgKey::derive(
            &sig,
            &CallArgs::new().arg(1i64).arg(5i64).kwarg("scale", 2i64).kwarg("x", 0i64),
        );
        assert_eq!(plain, extra);
        assert_ne!(plain, ArgKey::derive(&sig, &CallArgs::positional([1i64])));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let key = ArgKey::Single(ArgValue::from("hello"));
        assert_eq!(key.fingerprint(), key.clone().fingerprint());
        assert_eq!(key.fingerprint().len(), 16);
        assert_ne!(
            key.fingerprint(),
            ArgKey::Single(ArgValue::from("world")).fingerprint()
        );
    }

    #[test]
    fn test_display() {
        let sig = Signature::new().required("a").keyword("b");
        let key = ArgKey::derive(&sig, &CallArgs::new().arg(1i64).kwarg("b", "x")).unwrap();
        assert_eq!(key.to_string(), "(1, b: \"x\")");
    }
}
