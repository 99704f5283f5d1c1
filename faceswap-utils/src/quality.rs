//! Output quality presets.
//!
//! A quality level never changes how the swap itself is computed. It only selects how much
//! post-processing the enhancer layers on top of the raw swap output:
//!
//! | Level     | Color correction | Skin smoothing | HDR tone mapping |
//! |-----------|------------------|----------------|------------------|
//! | `Basic`   | off              | off            | off              |
//! | `Hd`      | on               | light          | off              |
//! | `UltraHd` | on               | strong         | on               |

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Enhancement preset requested by the user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum QualityLevel {
    Basic,
    #[default]
    Hd,
    UltraHd,
}

impl QualityLevel {
    /// All levels in ascending order of processing.
    pub const ALL: [QualityLevel; 3] = [QualityLevel::Basic, QualityLevel::Hd, QualityLevel::UltraHd];

    /// Human readable label used by the GUI.
    pub fn as_label(self) -> &'static str {
        match self {
            QualityLevel::Basic => "Basic",
            QualityLevel::Hd => "HD",
            QualityLevel::UltraHd => "Ultra HD",
        }
    }

    /// Prefix used when naming result files (`HD_target_with_face_of_source.png`).
    pub fn file_prefix(self) -> &'static str {
        match self {
            QualityLevel::Basic => "BASIC",
            QualityLevel::Hd => "HD",
            QualityLevel::UltraHd => "ULTRA_HD",
        }
    }

    /// Numeric level (1-3) accepted on the command line.
    pub fn index(self) -> u8 {
        match self {
            QualityLevel::Basic => 1,
            QualityLevel::Hd => 2,
            QualityLevel::UltraHd => 3,
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QualityLevel::Basic => "basic",
            QualityLevel::Hd => "hd",
            QualityLevel::UltraHd => "ultra-hd",
        })
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "1" | "basic" => Ok(QualityLevel::Basic),
            "2" | "hd" => Ok(QualityLevel::Hd),
            "3" | "ultrahd" | "uhd" => Ok(QualityLevel::UltraHd),
            _ => Err(format!(
                "unknown quality level '{}', expected basic/hd/ultra-hd (or 1/2/3)",
                s.trim()
            )),
        }
    }
}
