//! Compound selectors: `tag`, `#id`, `.class`, `[attr]` and `[attr='v']`.
//!
//! Combinators (descendant, child, sibling) and pseudo-classes are not
//! supported; a selector describes a single element.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use tags_core::DocumentError;

/// `[name]` or `[name=value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub name: String,
    pub value: Option<String>,
}

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeMatch>,
}

enum Part<'a> {
    Id(&'a str),
    Class(&'a str),
    Attribute(&'a str, Option<&'a str>),
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | ':'))(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_till(|c| c == '\''), char('\'')),
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        ident,
    ))(input)
}

fn part(input: &str) -> IResult<&str, Part<'_>> {
    alt((
        map(preceded(char('#'), ident), Part::Id),
        map(preceded(char('.'), ident), Part::Class),
        map(
            delimited(
                pair(char('['), multispace0),
                pair(
                    ident,
                    opt(preceded(
                        tuple((multispace0, char('='), multispace0)),
                        attribute_value,
                    )),
                ),
                pair(multispace0, char(']')),
            ),
            |(name, value)| Part::Attribute(name, value),
        ),
    ))(input)
}

fn compound(input: &str) -> IResult<&str, (Option<&str>, Vec<Part<'_>>)> {
    pair(opt(alt((ident, tag("*")))), many0(part))(input)
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        let invalid = || DocumentError::InvalidSelector {
            selector: source.to_string(),
        };
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let (_, (tag_name, parts)) = all_consuming(compound)(trimmed).map_err(|_| invalid())?;

        let mut selector = Selector {
            tag: tag_name.filter(|t| *t != "*").map(str::to_ascii_lowercase),
            ..Selector::default()
        };
        for part in parts {
            match part {
                Part::Id(id) => selector.id = Some(id.to_string()),
                Part::Class(class) => selector.classes.push(class.to_string()),
                Part::Attribute(name, value) => selector.attributes.push(AttributeMatch {
                    name: name.to_string(),
                    value: value.map(str::to_string),
                }),
            }
        }
        Ok(selector)
    }

    /// Selector that matches an element by id.
    pub fn id(id: &str) -> Self {
        Selector {
            id: Some(id.to_string()),
            ..Selector::default()
        }
    }

    /// Test an element given its name and an attribute accessor.
    pub fn matches<'a>(&self, name: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(tag) = &self.tag {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_list = attribute("class").unwrap_or("");
            let has_all = self
                .classes
                .iter()
                .all(|wanted| class_list.split_whitespace().any(|c| c == wanted));
            if !has_all {
                return false;
            }
        }
        self.attributes.iter().all(|m| match (attribute(&m.name), &m.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        })
    }
}

impl std::str::FromStr for Selector {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> {
        move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    #[test]
    fn test_parse_compound() {
        let sel = Selector::parse("script[type='text/custom-tags']").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("script"));
        assert_eq!(
            sel.attributes,
            vec![AttributeMatch {
                name: "type".to_string(),
                value: Some("text/custom-tags".to_string()),
            }]
        );

        let sel = Selector::parse("div#main.card.wide").unwrap();
        assert_eq!(sel.id.as_deref(), Some("main"));
        assert_eq!(sel.classes, vec!["card", "wide"]);
    }

    #[test]
    fn test_parse_rejects_combinators() {
        assert!(Selector::parse("div span").is_err());
        assert!(Selector::parse("a > b").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("#").is_err());
    }

    #[test]
    fn test_matches() {
        let el = [("id", "save"), ("class", "btn primary"), ("data-x", "1")];
        assert!(Selector::parse("#save").unwrap().matches("button", attrs(&el)));
        assert!(Selector::parse("BUTTON.primary").unwrap().matches("button", attrs(&el)));
        assert!(Selector::parse("[data-x]").unwrap().matches("button", attrs(&el)));
        assert!(Selector::parse("[data-x=1]").unwrap().matches("button", attrs(&el)));
        assert!(Selector::parse("*").unwrap().matches("button", attrs(&el)));
        assert!(!Selector::parse(".secondary").unwrap().matches("button", attrs(&el)));
        assert!(!Selector::parse("[data-x='2']").unwrap().matches("button", attrs(&el)));
        assert!(!Selector::parse("a#save").unwrap().matches("button", attrs(&el)));
    }
}
