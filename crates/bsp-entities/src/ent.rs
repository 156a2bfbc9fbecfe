//! Entity text: `{ "key" "value" ... }` blocks
//!
//! Keys and values are double-quoted and have no escape sequences. Whitespace
//! between tokens is free.

use std::fmt;

use nom::{
    bytes::complete::take_until,
    character::complete::{char, multispace0},
    combinator::{all_consuming, cut},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use nav_common::{Error, Result};

/// One entity block: ordered key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Entity {
    pairs: Vec<(String, String)>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key`. An existing key keeps its position and takes the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Builder-style [`Entity::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn classname(&self) -> Option<&str> {
        self.get("classname")
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (k, v) in &self.pairs {
            writeln!(f, "\"{}\" \"{}\"", k, v)?;
        }
        writeln!(f, "}}")
    }
}

/// `"..."` with no escapes; the contents may be empty
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

/// Key and value. Once a key is read the value is required.
fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    pair(quoted, preceded(multispace0, cut(quoted)))(input)
}

fn entity(input: &str) -> IResult<&str, Entity> {
    delimited(
        terminated(char('{'), multispace0),
        fold_many0(
            terminated(key_value, multispace0),
            Entity::new,
            |mut entity, (key, value)| {
                entity.set(key, value);
                entity
            },
        ),
        cut(char('}')),
    )(input)
}

fn entity_list(input: &str) -> IResult<&str, Vec<Entity>> {
    all_consuming(preceded(
        multispace0,
        many0(terminated(entity, multispace0)),
    ))(input)
}

/// Describes where parsing stopped inside `text`
fn parse_error(text: &str, rest: &str) -> Error {
    let offset = text.len() - rest.len();
    let line = text[..offset].matches('\n').count() + 1;
    let found = match rest.chars().next() {
        Some(c) => format!("unexpected character '{}'", c),
        None => "unexpected end of text".to_string(),
    };
    Error::InvalidEntities(format!("{} on line {}", found, line))
}

/// Parses entity text into its blocks, in order
pub fn parse_entities(text: &str) -> Result<Vec<Entity>> {
    let entities = match entity_list(text) {
        Ok((_, entities)) => entities,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(parse_error(text, e.input))
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(Error::InvalidEntities("incomplete entity text".to_string()))
        }
    };

    log::debug!("Parsed {} entities", entities.len());
    Ok(entities)
}

/// Serializes entities back into text
pub fn serialize_entities(entities: &[Entity]) -> String {
    entities.iter().map(Entity::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blocks_in_order() {
        let text = r#"{
"classname" "worldspawn"
"wad" "\half-life\valve\halflife.wad"
}
{ "origin" "-128 256 36" "classname" "info_player_start" }"#;
        let entities = parse_entities(text).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].classname(), Some("worldspawn"));
        assert_eq!(
            entities[0].get("wad"),
            Some("\\half-life\\valve\\halflife.wad")
        );
        let keys: Vec<_> = entities[1].pairs().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["origin", "classname"]);
    }

    #[test]
    fn test_repeated_key_keeps_first_position() {
        let entities = parse_entities(r#"{ "a" "1" "b" "2" "a" "3" }"#).unwrap();
        let pairs: Vec<_> = entities[0].pairs().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_empty_values_and_text() {
        assert!(parse_entities("  \n\t").unwrap().is_empty());
        let entities = parse_entities(r#"{ "sequence" "" }{}"#).unwrap();
        assert_eq!(entities[0].get("sequence"), Some(""));
        assert!(entities[1].is_empty());
    }

    #[test]
    fn test_malformed_text() {
        for text in [
            r#"{ "a" "1""#,
            r#"{ "a" }"#,
            r#""a" "1""#,
            r#"{ "a" "1" { }"#,
            r#"{ "unterminated }"#,
            "{ key \"v\" }",
        ] {
            assert!(
                matches!(parse_entities(text), Err(Error::InvalidEntities(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse_entities("{\n\"a\" \"1\"\n}\n{\n\"b\"\n}").unwrap_err();
        assert!(err.to_string().contains("'}' on line 6"), "{}", err);

        let err = parse_entities("{ \"a\" \"1\"\n").unwrap_err();
        assert!(err.to_string().contains("end of text on line 2"), "{}", err);
    }

    #[test]
    fn test_serialize_layout() {
        let entity = Entity::new()
            .with("origin", "1 2 3")
            .with("classname", "info_node");
        assert_eq!(
            serialize_entities(&[entity.clone(), entity]),
            "{\n\"origin\" \"1 2 3\"\n\"classname\" \"info_node\"\n}\n".repeat(2)
        );
    }

    #[test]
    fn test_parse_serialized_text() {
        let text = "{\n\"classname\" \"light\"\n\"_light\" \"255 255 255 200\"\n}\n";
        let entities = parse_entities(text).unwrap();
        assert_eq!(serialize_entities(&entities), text);
    }
}
