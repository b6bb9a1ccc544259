use std::fmt;
use std::str::FromStr;

use crate::error::FaceError;

use super::{FaceIdentifier, Part, FACE_BITS_ANY};

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Any => write!(f, "*"),
            Part::Index(i) => write!(f, "{i}"),
        }
    }
}

impl fmt::Display for FaceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "[!]");
        }
        write!(f, "[")?;
        if !self.parts.is_empty() {
            write!(f, "parts=")?;
            for (i, part) in self.parts.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{part}")?;
            }
            write!(f, ":")?;
        }
        if self.bits == FACE_BITS_ANY {
            write!(f, "bits=*]")
        } else {
            write!(f, "bits={:b}]", self.bits)
        }
    }
}

fn parse_part(word: &str) -> Result<Part, String> {
    if word == "*" {
        return Ok(Part::Any);
    }
    word.parse::<u32>()
        .map(Part::Index)
        .map_err(|_| format!("invalid part '{word}'"))
}

fn parse_bits(word: &str) -> Result<u32, String> {
    match word {
        "*" => Ok(FACE_BITS_ANY),
        "!" => Ok(0),
        _ if word.is_empty() || word.len() > 32 => Err(format!("invalid bit mask '{word}'")),
        _ => u32::from_str_radix(word, 2).map_err(|_| format!("invalid bit mask '{word}'")),
    }
}

fn parse_face_id(input: &str) -> Result<FaceIdentifier, String> {
    let body = input
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| "expected '[...]'".to_string())?;
    if body == "!" {
        return Ok(FaceIdentifier::none());
    }

    let (parts_text, bits_text) = match body.split_once(':') {
        Some((parts, bits)) => {
            let parts = parts
                .strip_prefix("parts=")
                .ok_or_else(|| "expected 'parts='".to_string())?;
            (Some(parts), bits)
        }
        None => (None, body),
    };
    let bits = parse_bits(
        bits_text
            .strip_prefix("bits=")
            .ok_or_else(|| "expected 'bits='".to_string())?,
    )?;
    let parts = match parts_text {
        Some(text) => text.split('.').map(parse_part).collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(FaceIdentifier::with_parts(parts, bits))
}

impl FromStr for FaceIdentifier {
    type Err = FaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_face_id(s).map_err(|reason| FaceError::Parse {
            input: s.to_string(),
            reason,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(FaceIdentifier::none().to_string(), "[!]");
        assert_eq!(FaceIdentifier::any().to_string(), "[bits=*]");
        assert_eq!(FaceIdentifier::from_bits(0b101).to_string(), "[bits=101]");
        let nested = FaceIdentifier::nested(0, FaceIdentifier::nested(1, FaceIdentifier::from_bits(1)));
        assert_eq!(nested.to_string(), "[parts=0.1:bits=1]");
        let wild = FaceIdentifier::with_any_part(FaceIdentifier::any());
        assert_eq!(wild.to_string(), "[parts=*:bits=*]");
    }

    #[test]
    fn parse_forms() {
        assert_eq!("[!]".parse::<FaceIdentifier>().unwrap(), FaceIdentifier::none());
        assert_eq!("[bits=*]".parse::<FaceIdentifier>().unwrap(), FaceIdentifier::any());
        assert_eq!(
            "[bits=0101]".parse::<FaceIdentifier>().unwrap(),
            FaceIdentifier::from_bits(5)
        );
        assert_eq!(
            "[parts=0.1:bits=001]".parse::<FaceIdentifier>().unwrap(),
            FaceIdentifier::nested(0, FaceIdentifier::nested(1, FaceIdentifier::from_bits(1)))
        );
        assert_eq!(
            "[parts=*:bits=*]".parse::<FaceIdentifier>().unwrap(),
            FaceIdentifier::with_any_part(FaceIdentifier::any())
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "bits=1", "[bits=2]", "[parts=a:bits=1]", "[part=0:bits=1]", "[bits=]", "[0:1]"] {
            assert!(
                matches!(bad.parse::<FaceIdentifier>(), Err(FaceError::Parse { .. })),
                "'{bad}' should fail"
            );
        }
    }

    #[test]
    fn serde_round_trip() {
        let id = FaceIdentifier::nested(1, FaceIdentifier::from_bits(8));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<FaceIdentifier>(&json).unwrap(), id);
    }
}
