//! Value type shared by the wire and the state mirror
//!
//! Inbound OSC arguments are decoded into `MixerValue` scalars; the mirror
//! stores either a single scalar or the full argument list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A mixer parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MixerValue {
    /// On/off switches (mutes, solos)
    Bool(bool),
    /// Integer parameters (scene index, enum selections)
    Int(i32),
    /// Continuous parameters (fader positions, dB values)
    Float(f32),
    /// Names and other strings
    Text(String),
    /// Multi-argument responses
    List(Vec<MixerValue>),
}

impl MixerValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MixerValue::Int(i) => Some(f64::from(*i)),
            MixerValue::Float(f) => Some(f64::from(*f)),
            MixerValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            MixerValue::Text(_) | MixerValue::List(_) => None,
        }
    }

    /// Extract text if available
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MixerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used when coercing on/off parameters
    ///
    /// Zero, empty strings and empty lists are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            MixerValue::Bool(b) => *b,
            MixerValue::Int(i) => *i != 0,
            MixerValue::Float(f) => *f != 0.0,
            MixerValue::Text(s) => !s.is_empty(),
            MixerValue::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for MixerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixerValue::Bool(b) => write!(f, "{}", b),
            MixerValue::Int(i) => write!(f, "{}", i),
            MixerValue::Float(v) => write!(f, "{}", v),
            MixerValue::Text(s) => write!(f, "{:?}", s),
            MixerValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Parse a command-line value: `true`/`false`, integers, floats, else text
impl FromStr for MixerValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed {
            "true" | "on" => MixerValue::Bool(true),
            "false" | "off" => MixerValue::Bool(false),
            _ => {
                if let Ok(i) = trimmed.parse::<i32>() {
                    MixerValue::Int(i)
                } else if let Ok(f) = trimmed.parse::<f32>() {
                    MixerValue::Float(f)
                } else {
                    MixerValue::Text(trimmed.to_string())
                }
            }
        })
    }
}

impl From<bool> for MixerValue {
    fn from(b: bool) -> Self {
        MixerValue::Bool(b)
    }
}

impl From<i32> for MixerValue {
    fn from(i: i32) -> Self {
        MixerValue::Int(i)
    }
}

impl From<f32> for MixerValue {
    fn from(f: f32) -> Self {
        MixerValue::Float(f)
    }
}

impl From<f64> for MixerValue {
    fn from(f: f64) -> Self {
        MixerValue::Float(f as f32)
    }
}

impl From<&str> for MixerValue {
    fn from(s: &str) -> Self {
        MixerValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_values() {
        assert_eq!("true".parse::<MixerValue>().unwrap(), MixerValue::Bool(true));
        assert_eq!("off".parse::<MixerValue>().unwrap(), MixerValue::Bool(false));
        assert_eq!("6".parse::<MixerValue>().unwrap(), MixerValue::Int(6));
        assert_eq!("-6.5".parse::<MixerValue>().unwrap(), MixerValue::Float(-6.5));
        assert_eq!(
            "Vocals".parse::<MixerValue>().unwrap(),
            MixerValue::Text("Vocals".to_string())
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(MixerValue::Int(1).is_truthy());
        assert!(!MixerValue::Int(0).is_truthy());
        assert!(!MixerValue::Float(0.0).is_truthy());
        assert!(MixerValue::Text("x".into()).is_truthy());
        assert!(!MixerValue::List(vec![]).is_truthy());
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&MixerValue::List(vec![
            MixerValue::Int(1),
            MixerValue::Text("a".into()),
        ]))
        .unwrap();
        assert_eq!(json, r#"[1,"a"]"#);
    }
}
