//! Signature predicates over attributed nodes.
//!
//! Matchers only look at type attribution, never at spelling, so
//! `assertFalse(x)` under a static import and `Assertions.assertFalse(x)` both
//! match `org.junit.jupiter.api.Assertions assertFalse(..)`.
//!
//! Pattern syntax for [`MethodMatcher::parse`]:
//!
//! ```text
//! org.junit.jupiter.api.Assertions assertFalse(..)
//! org.junit.rules.TestName getMethodName()
//! *  toString()
//! com.example.Util join(java.lang.String, *, ..)
//! ```
//!
//! `*` matches any single type, `..` any remaining arguments (last only).

use std::borrow::Cow;

use thiserror::Error;

use crate::tree::{JavaType, MethodType, NodeId, NodeKind, Tree};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("malformed pattern '{pattern}': {reason}")]
    Malformed { pattern: String, reason: &'static str },
}

/// One parameter position in a method pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSlot {
    Type(Cow<'static, str>),
    /// `*`
    AnyOne,
    /// `..`
    Rest,
}

const REST: &[ArgSlot] = &[ArgSlot::Rest];
const NONE: &[ArgSlot] = &[];

/// Matches invocations by declaring type, name and parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatcher {
    declaring_type: Cow<'static, str>,
    name: Cow<'static, str>,
    args: Cow<'static, [ArgSlot]>,
}

impl MethodMatcher {
    /// `declaring_type name(..)`
    pub const fn any_args(declaring_type: &'static str, name: &'static str) -> Self {
        Self {
            declaring_type: Cow::Borrowed(declaring_type),
            name: Cow::Borrowed(name),
            args: Cow::Borrowed(REST),
        }
    }

    /// `declaring_type name()`
    pub const fn no_args(declaring_type: &'static str, name: &'static str) -> Self {
        Self {
            declaring_type: Cow::Borrowed(declaring_type),
            name: Cow::Borrowed(name),
            args: Cow::Borrowed(NONE),
        }
    }

    pub fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let malformed = |reason| MatcherError::Malformed {
            pattern: pattern.to_string(),
            reason,
        };
        let trimmed = pattern.trim();
        let (declaring_type, signature) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed("expected '<type> <name>(<args>)'"))?;
        let signature = signature.trim();
        let open = signature
            .find('(')
            .ok_or_else(|| malformed("missing '('"))?;
        let args = signature[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| malformed("missing ')'"))?;
        let name = signature[..open].trim();
        if name.is_empty() {
            return Err(malformed("missing method name"));
        }

        let mut slots = Vec::new();
        if !args.trim().is_empty() {
            for arg in args.split(',').map(str::trim) {
                let slot = match arg {
                    "" => return Err(malformed("empty argument")),
                    ".." => ArgSlot::Rest,
                    "*" => ArgSlot::AnyOne,
                    other => ArgSlot::Type(Cow::Owned(other.to_string())),
                };
                if slots.last() == Some(&ArgSlot::Rest) {
                    return Err(malformed("'..' must be the last argument"));
                }
                slots.push(slot);
            }
        }

        Ok(Self {
            declaring_type: Cow::Owned(declaring_type.to_string()),
            name: Cow::Owned(name.to_string()),
            args: Cow::Owned(slots),
        })
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches_type(&self, method: &MethodType) -> bool {
        if self.declaring_type != "*" && method.declaring_type != self.declaring_type {
            return false;
        }
        if method.name != self.name {
            return false;
        }
        let mut params = method.parameter_types.iter();
        for slot in self.args.iter() {
            match slot {
                ArgSlot::Rest => return true,
                ArgSlot::AnyOne => {
                    if params.next().is_none() {
                        return false;
                    }
                }
                ArgSlot::Type(expected) => match params.next() {
                    Some(actual) if actual == expected => {}
                    _ => return false,
                },
            }
        }
        params.next().is_none()
    }

    /// True if `id` is an invocation whose resolved method matches.
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        if !matches!(tree.kind(id), NodeKind::MethodInvocation { .. }) {
            return false;
        }
        tree.ty(id)
            .and_then(JavaType::as_method)
            .is_some_and(|m| self.matches_type(m))
    }
}

impl std::fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args = self
            .args
            .iter()
            .map(|slot| match slot {
                ArgSlot::Type(t) => t.as_ref(),
                ArgSlot::AnyOne => "*",
                ArgSlot::Rest => "..",
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} {}({})", self.declaring_type, self.name, args)
    }
}

/// Matches annotations by their resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMatcher {
    fqn: Cow<'static, str>,
}

impl AnnotationMatcher {
    pub const fn new(fqn: &'static str) -> Self {
        Self {
            fqn: Cow::Borrowed(fqn),
        }
    }

    /// `@org.junit.Rule`
    pub fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let fqn = pattern
            .trim()
            .strip_prefix('@')
            .ok_or_else(|| MatcherError::Malformed {
                pattern: pattern.to_string(),
                reason: "annotation patterns start with '@'",
            })?;
        if fqn.is_empty() {
            return Err(MatcherError::Malformed {
                pattern: pattern.to_string(),
                reason: "missing annotation type",
            });
        }
        Ok(Self {
            fqn: Cow::Owned(fqn.to_string()),
        })
    }

    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        let NodeKind::Annotation {
            annotation_type, ..
        } = tree.kind(id)
        else {
            return false;
        };
        let ty = tree.ty(id).or_else(|| tree.ty(*annotation_type));
        is_of_class_type(ty, &self.fqn)
    }

    /// True if any annotation on the declaration `id` matches.
    pub fn any_on(&self, tree: &Tree, id: NodeId) -> bool {
        tree.annotations(id).iter().any(|a| self.matches(tree, *a))
    }
}

/// True if `ty` is the class `fqn` (or a parameterization of it).
pub fn is_of_class_type(ty: Option<&JavaType>, fqn: &str) -> bool {
    matches!(ty, Some(JavaType::Class { fqn: own }) | Some(JavaType::Parameterized { fqn: own, .. }) if own == fqn)
}
