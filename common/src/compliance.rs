//! 適合判定（Conforme / Non Conforme / Non Applicable）

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 点検項目の判定状態
///
/// 新規行は `Pending`（未判定）で始まる。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compliance {
    #[default]
    Pending,
    Conforme,
    NonConforme,
    NonApplicable,
}

impl Compliance {
    /// 選択可能な3状態（表示順）
    pub const CHOICES: [Compliance; 3] = [
        Compliance::Conforme,
        Compliance::NonConforme,
        Compliance::NonApplicable,
    ];

    /// シートに書き込むラベル
    pub fn label(&self) -> &'static str {
        match self {
            Compliance::Pending => "",
            Compliance::Conforme => "Conforme",
            Compliance::NonConforme => "Non Conforme",
            Compliance::NonApplicable => "Non Applicable",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Compliance::Pending)
    }
}

impl std::str::FromStr for Compliance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();

        match normalized.as_str() {
            "" => Ok(Compliance::Pending),
            "conforme" | "c" => Ok(Compliance::Conforme),
            "nonconforme" | "nc" => Ok(Compliance::NonConforme),
            "nonapplicable" | "na" | "n/a" => Ok(Compliance::NonApplicable),
            _ => Err(Error::Parse(format!("不明な判定値: {}", s))),
        }
    }
}

impl std::fmt::Display for Compliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compliance::Pending => write!(f, "(未判定)"),
            other => write!(f, "{}", other.label()),
        }
    }
}

impl Serialize for Compliance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Compliance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(Compliance::default(), Compliance::Pending);
        assert!(Compliance::default().is_pending());
        assert_eq!(Compliance::Pending.label(), "");
    }

    #[test]
    fn test_parse_labels_and_short_forms() {
        assert_eq!("Conforme".parse::<Compliance>().unwrap(), Compliance::Conforme);
        assert_eq!("non conforme".parse::<Compliance>().unwrap(), Compliance::NonConforme);
        assert_eq!("NC".parse::<Compliance>().unwrap(), Compliance::NonConforme);
        assert_eq!("Non-Applicable".parse::<Compliance>().unwrap(), Compliance::NonApplicable);
        assert_eq!("n/a".parse::<Compliance>().unwrap(), Compliance::NonApplicable);
        assert_eq!("  ".parse::<Compliance>().unwrap(), Compliance::Pending);
        assert!("peut-être".parse::<Compliance>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Compliance::NonApplicable).unwrap();
        assert_eq!(json, "\"Non Applicable\"");
        let back: Compliance = serde_json::from_str("\"Conforme\"").unwrap();
        assert_eq!(back, Compliance::Conforme);
    }

    #[test]
    fn test_choices_exclude_pending() {
        assert!(Compliance::CHOICES.iter().all(|c| !c.is_pending()));
    }
}
