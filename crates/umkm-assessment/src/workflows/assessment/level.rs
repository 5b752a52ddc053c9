use serde::{Deserialize, Serialize};

const MIKRO_CEILING: f64 = 40.0;
const KECIL_CEILING: f64 = 70.0;

/// Business tier derived from the total assessment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessLevel {
    Mikro,
    Kecil,
    Menengah,
}

impl BusinessLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            BusinessLevel::Mikro => "mikro",
            BusinessLevel::Kecil => "kecil",
            BusinessLevel::Menengah => "menengah",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "mikro" => Some(BusinessLevel::Mikro),
            "kecil" => Some(BusinessLevel::Kecil),
            "menengah" => Some(BusinessLevel::Menengah),
            _ => None,
        }
    }

    pub fn details(self) -> LevelDetails {
        match self {
            BusinessLevel::Mikro => LevelDetails {
                name: "Usaha Mikro",
                description: "Usaha pada tahap awal dengan pencatatan, pemasaran dan proses \
                              operasional yang masih sederhana. Fokus utama adalah merapikan \
                              dasar-dasar pengelolaan usaha.",
                range: "0 - 40",
            },
            BusinessLevel::Kecil => LevelDetails {
                name: "Usaha Kecil",
                description: "Usaha yang sudah berjalan stabil dengan praktik pengelolaan \
                              dasar. Siap memperluas pasar dan mulai mengadopsi alat digital \
                              secara konsisten.",
                range: "41 - 70",
            },
            BusinessLevel::Menengah => LevelDetails {
                name: "Usaha Menengah",
                description: "Usaha dengan tata kelola, keuangan dan pemasaran yang matang. \
                              Siap untuk ekspansi, akses pembiayaan yang lebih besar dan \
                              kemitraan strategis.",
                range: "71 - 100",
            },
        }
    }
}

/// Display metadata for a level tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelDetails {
    pub name: &'static str,
    pub description: &'static str,
    pub range: &'static str,
}

impl LevelDetails {
    pub const UNKNOWN: LevelDetails = LevelDetails {
        name: "Unknown",
        description: "-",
        range: "-",
    };
}

/// Lower tier owns its boundary: 40 is mikro, 70 is kecil.
pub fn determine_level(score: f64) -> BusinessLevel {
    if score > KECIL_CEILING {
        BusinessLevel::Menengah
    } else if score > MIKRO_CEILING {
        BusinessLevel::Kecil
    } else {
        BusinessLevel::Mikro
    }
}

/// Never fails; unrecognised tags resolve to [`LevelDetails::UNKNOWN`].
pub fn level_details(tag: &str) -> LevelDetails {
    BusinessLevel::from_tag(tag)
        .map(BusinessLevel::details)
        .unwrap_or(LevelDetails::UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_are_closed_on_the_lower_tier() {
        assert_eq!(determine_level(0.0), BusinessLevel::Mikro);
        assert_eq!(determine_level(40.0), BusinessLevel::Mikro);
        assert_eq!(determine_level(40.0001), BusinessLevel::Kecil);
        assert_eq!(determine_level(41.0), BusinessLevel::Kecil);
        assert_eq!(determine_level(70.0), BusinessLevel::Kecil);
        assert_eq!(determine_level(70.0001), BusinessLevel::Menengah);
        assert_eq!(determine_level(71.0), BusinessLevel::Menengah);
        assert_eq!(determine_level(100.0), BusinessLevel::Menengah);
    }

    #[test]
    fn details_cover_every_tag() {
        for (tag, range) in [
            ("mikro", "0 - 40"),
            ("kecil", "41 - 70"),
            ("menengah", "71 - 100"),
        ] {
            let details = level_details(tag);
            assert_eq!(details.range, range);
            assert_ne!(details.description, "-");
            assert_ne!(details.name, "Unknown");
        }
    }

    #[test]
    fn unknown_tag_returns_sentinel() {
        for tag in ["", "besar", "Mikro", " kecil"] {
            let details = level_details(tag);
            assert_eq!(details, LevelDetails::UNKNOWN);
            assert_eq!(details.name, "Unknown");
        }
    }

    #[test]
    fn tags_round_trip_through_serde() {
        let json = serde_json::to_string(&BusinessLevel::Menengah).expect("serialize");
        assert_eq!(json, "\"menengah\"");
        assert_eq!(BusinessLevel::from_tag(BusinessLevel::Kecil.as_str()), Some(BusinessLevel::Kecil));
    }

    proptest! {
        #[test]
        fn level_is_monotonic_in_score(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let rank = |level: BusinessLevel| match level {
                BusinessLevel::Mikro => 0,
                BusinessLevel::Kecil => 1,
                BusinessLevel::Menengah => 2,
            };
            prop_assert!(rank(determine_level(low)) <= rank(determine_level(high)));
        }
    }
}
