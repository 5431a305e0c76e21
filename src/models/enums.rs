use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

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

        impl std::str::FromStr for $name {
            type Err = PipelineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(PipelineError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ReportFlavor {
    Manufacturing => "manufacturing",
    Services => "services",
});

str_enum!(Polarity {
    Positive => "positive",
    Negative => "negative",
});

str_enum!(Provenance {
    Pattern => "pattern",
    Model => "model",
});

impl ReportFlavor {
    /// Lenient label parsing for user-facing inputs ("Services", "non-manufacturing").
    pub fn from_label(label: &str) -> Result<Self, PipelineError> {
        let key = label.trim().to_lowercase().replace(['_', ' '], "-");
        let canonical = match key.as_str() {
            "mfg" => "manufacturing",
            "service" | "non-manufacturing" | "nonmanufacturing" => "services",
            other => other,
        };
        canonical.parse().map_err(|_| PipelineError::InvalidEnum {
            field: "ReportFlavor".into(),
            value: label.into(),
        })
    }
}

impl Polarity {
    pub fn opposite(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}
