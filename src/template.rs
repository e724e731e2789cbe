//! `{variable}` templates used for maintainer script snippets.
//!
//! Literal braces are written doubled, `{{` and `}}`.

use std::collections::BTreeMap;
use std::borrow::Borrow;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Component<'a> {
    Constant(&'a str),
    Variable(&'a str),
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("unmatched closing brace at position {0}")]
    UnmatchedClose(usize),
    #[error("unclosed variable starting at position {0}")]
    Unclosed(usize),
    #[error("empty variable name at position {0}")]
    EmptyVariable(usize),
    #[error("brace inside of variable starting at position {0}")]
    BraceInVariable(usize),
    #[error("missing value for variable {0}")]
    MissingVariable(String),
}

#[derive(Debug)]
pub struct Parser<'a> {
    template: &'a str,
    remaining: &'a str,
}

impl<'a> Parser<'a> {
    fn pos(&self) -> usize {
        self.template.len() - self.remaining.len()
    }

    fn fail(&mut self, error: TemplateError) -> Option<Result<Component<'a>, TemplateError>> {
        self.remaining = "";
        Some(Err(error))
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Component<'a>, TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.remaining;
        if remaining.is_empty() {
            return None;
        }
        let pos = match remaining.find(&['{', '}'] as &[char]) {
            Some(pos) => pos,
            None => {
                self.remaining = "";
                return Some(Ok(Component::Constant(remaining)));
            },
        };
        if pos > 0 {
            self.remaining = &remaining[pos..];
            return Some(Ok(Component::Constant(&remaining[..pos])));
        }

        let bytes = remaining.as_bytes();
        match (bytes[0], bytes.get(1)) {
            (b'{', Some(b'{')) | (b'}', Some(b'}')) => {
                self.remaining = &remaining[2..];
                Some(Ok(Component::Constant(&remaining[..1])))
            },
            (b'}', _) => {
                let pos = self.pos();
                self.fail(TemplateError::UnmatchedClose(pos))
            },
            _ => {
                let start = self.pos();
                let rest = &remaining[1..];
                match rest.find(&['{', '}'] as &[char]).map(|end| (end, rest.as_bytes()[end])) {
                    None => self.fail(TemplateError::Unclosed(start)),
                    Some((_, b'{')) => self.fail(TemplateError::BraceInVariable(start)),
                    Some((0, _)) => self.fail(TemplateError::EmptyVariable(start)),
                    Some((end, _)) => {
                        self.remaining = &rest[(end + 1)..];
                        Some(Ok(Component::Variable(&rest[..end])))
                    },
                }
            },
        }
    }
}

pub fn parse<'a>(template: &'a str) -> Parser<'a> {
    Parser {
        template,
        remaining: template,
    }
}

pub trait Query {
    fn get(&self, key: &str) -> Option<&str>;
}

impl<T: Query> Query for &T {
    fn get(&self, key: &str) -> Option<&str> {
        (*self).get(key)
    }
}

impl<S1, S2> Query for BTreeMap<S1, S2> where S1: Borrow<str> + Eq + Ord, S2: AsRef<str> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(AsRef::as_ref)
    }
}

/// Substitutes all variables of `template`.
pub fn render<V: Query>(template: &str, vars: V) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    for component in parse(template) {
        match component? {
            Component::Constant(val) => out.push_str(val),
            Component::Variable(var) => {
                let value = vars.get(var).ok_or_else(|| TemplateError::MissingVariable(var.to_owned()))?;
                out.push_str(value);
            },
        }
    }
    Ok(out)
}
