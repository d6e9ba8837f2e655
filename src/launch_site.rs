use crate::error::RxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteId {
    NoshiroAsanai,
    NoshiroOchiai,
    TaikiLand,
}

/// Geodetic origin of a launch pad's local ENU frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSite {
    pub id: SiteId,
    pub name: &'static str,
    pub origin_latitude_deg: f64,
    pub origin_longitude_deg: f64,
    pub origin_altitude_m: f64, // non-zero only offshore
}

const NOSHIRO_ASANAI: LaunchSite = LaunchSite {
    id: SiteId::NoshiroAsanai,
    name: "Noshiro Asanai (land, 3rd field)",
    origin_latitude_deg: 40.242865,
    origin_longitude_deg: 140.010450,
    origin_altitude_m: 0.0,
};

const NOSHIRO_OCHIAI: LaunchSite = LaunchSite {
    id: SiteId::NoshiroOchiai,
    name: "Noshiro Ochiai (sea)",
    origin_latitude_deg: 40.138624,
    origin_longitude_deg: 139.984906,
    origin_altitude_m: 3000.0,
};

const TAIKI_LAND: LaunchSite = LaunchSite {
    id: SiteId::TaikiLand,
    name: "Taiki (land)",
    origin_latitude_deg: 42.514320,
    origin_longitude_deg: 143.439793,
    origin_altitude_m: 0.0,
};

impl SiteId {
    pub fn site(self) -> &'static LaunchSite {
        match self {
            SiteId::NoshiroAsanai => &NOSHIRO_ASANAI,
            SiteId::NoshiroOchiai => &NOSHIRO_OCHIAI,
            SiteId::TaikiLand => &TAIKI_LAND,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Noshiro,
    Taiki,
    Land,
    Sea,
    Asanai,
    Ochiai,
}

// Lowercase substrings; a name carries a keyword if it contains any alias.
const ALIASES: &[(Keyword, &[&str])] = &[
    (Keyword::Noshiro, &["noshiro", "nosiro"]),
    (Keyword::Taiki, &["taiki"]),
    (Keyword::Land, &["land", "asanai", "asauchi", "asauti", "3rd"]),
    (Keyword::Sea, &["sea", "ochiai", "otiai"]),
    (Keyword::Asanai, &["asanai", "asauchi", "asauti"]),
    (Keyword::Ochiai, &["ochiai", "otiai"]),
];

// Checked in order, first rule whose keywords are all present wins.
const RULES: &[(&[Keyword], SiteId)] = &[
    (&[Keyword::Noshiro, Keyword::Land], SiteId::NoshiroAsanai),
    (&[Keyword::Noshiro, Keyword::Sea], SiteId::NoshiroOchiai),
    (&[Keyword::Taiki], SiteId::TaikiLand),
    // Field names that only exist at Noshiro imply the town.
    (&[Keyword::Asanai], SiteId::NoshiroAsanai),
    (&[Keyword::Ochiai], SiteId::NoshiroOchiai),
];

fn has_keyword(name: &str, keyword: Keyword) -> bool {
    ALIASES
        .iter()
        .filter(|(k, _)| *k == keyword)
        .flat_map(|(_, aliases)| aliases.iter())
        .any(|alias| name.contains(alias))
}

/// Match a free-text site name from the flight config against the registry.
pub fn resolve_site(name: &str) -> Result<&'static LaunchSite, RxError> {
    let lowered = name.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|k| has_keyword(&lowered, *k)))
        .map(|(_, id)| id.site())
        .ok_or_else(|| RxError::UnknownSite(name.to_string()))
}
