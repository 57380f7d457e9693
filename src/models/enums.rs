use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserType {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(LogStatus {
    Scheduled => "scheduled",
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});

impl LogStatus {
    /// Terminal states have no outgoing transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scheduled)
    }
}

str_enum!(DoseDisplay {
    Upcoming => "upcoming",
    DueNow => "due_now",
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn log_status_round_trip() {
        for (variant, s) in [
            (LogStatus::Scheduled, "scheduled"),
            (LogStatus::Taken, "taken"),
            (LogStatus::Missed, "missed"),
            (LogStatus::Skipped, "skipped"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(LogStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn user_type_parses_stored_values() {
        assert_eq!(UserType::from_str("doctor").unwrap(), UserType::Doctor);
        assert_eq!(UserType::Patient.to_string(), "patient");
    }

    #[test]
    fn only_scheduled_is_open() {
        assert!(!LogStatus::Scheduled.is_terminal());
        assert!(LogStatus::Taken.is_terminal());
        assert!(LogStatus::Missed.is_terminal());
        assert!(LogStatus::Skipped.is_terminal());
    }

    #[test]
    fn display_serializes_snake_case() {
        let json = serde_json::to_string(&DoseDisplay::DueNow).unwrap();
        assert_eq!(json, "\"due_now\"");
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(LogStatus::from_str("pending").is_err());
        assert!(UserType::from_str("").is_err());
    }
}
