//! Province name to province code mapping.
//!
//! Shopify validates addresses against its own list of first-level
//! divisions, so free-text input like "Cba" or "capital federal" is mapped
//! to the canonical code and name before it is sent. Input that cannot be
//! resolved is passed through untouched and Shopify's own validation decides.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A first-level administrative division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Province {
    /// Province code as Shopify expects it (ISO 3166-2 suffix).
    pub code: &'static str,
    /// Canonical display name.
    pub name: &'static str,
    /// Lowercase alternative spellings, abbreviations and unaccented forms.
    #[serde(skip)]
    pub aliases: &'static [&'static str],
}

impl Province {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase() == needle
            || self.code.eq_ignore_ascii_case(needle)
            || self.aliases.contains(&needle)
    }
}

/// The province table of a single country.
#[derive(Debug)]
pub struct ProvinceTable {
    /// ISO 3166-1 alpha-2 country code this table belongs to.
    pub country: &'static str,
    /// All divisions of the country.
    pub provinces: &'static [Province],
}

impl ProvinceTable {
    /// Returns `true` if this table applies to `country` (case-insensitive).
    #[must_use]
    pub fn supports(&self, country: &str) -> bool {
        self.country.eq_ignore_ascii_case(country.trim())
    }

    /// Look up free-text input by name, code or alias.
    ///
    /// Falls back to recognising "capital"/"CABA" style input for the
    /// autonomous city before giving up.
    #[must_use]
    pub fn lookup(&self, input: &str) -> Option<&'static Province> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(province) = self.provinces.iter().find(|p| p.matches(&needle)) {
            return Some(province);
        }

        if CAPITAL_RE.is_match(&needle) {
            return self.provinces.iter().find(|p| p.code == CAPITAL_CODE);
        }

        None
    }
}

/// Province value as it goes into the outbound address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvinceField {
    /// Resolved to a canonical division.
    Mapped(&'static Province),
    /// Unresolved or foreign; sent exactly as the customer typed it.
    Raw(String),
}

impl ProvinceField {
    /// Province code, when resolved.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Mapped(province) => Some(province.code),
            Self::Raw(_) => None,
        }
    }

    /// Province display name: canonical when resolved, raw input otherwise.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Mapped(province) => province.name,
            Self::Raw(raw) => raw,
        }
    }
}

/// Map a province for the given country.
///
/// The mapper only runs for the country its table covers; for any other
/// country the raw text is returned unchanged.
#[must_use]
pub fn resolve_province(country: &str, raw: &str) -> ProvinceField {
    if ARGENTINA.supports(country)
        && let Some(province) = ARGENTINA.lookup(raw)
    {
        return ProvinceField::Mapped(province);
    }
    ProvinceField::Raw(raw.to_string())
}

const CAPITAL_CODE: &str = "C";

static CAPITAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(c\.?\s*a\.?\s*b\.?\s*a\.?|capital(\s+federal)?|ciudad\s+aut[oó]noma)\b")
        .expect("Invalid regex")
});

/// Argentine provinces with Shopify's province codes.
pub static ARGENTINA: ProvinceTable = ProvinceTable {
    country: "AR",
    provinces: &[
        Province {
            code: "C",
            name: "Ciudad Autónoma de Buenos Aires",
            aliases: &[
                "caba",
                "c.a.b.a",
                "c.a.b.a.",
                "capital",
                "capital federal",
                "cap fed",
                "cap. fed.",
                "ciudad de buenos aires",
                "ciudad autonoma de buenos aires",
                "ciudad autónoma de buenos aires",
                "ciudad autonoma",
            ],
        },
        Province {
            code: "B",
            name: "Buenos Aires",
            aliases: &[
                "bs as",
                "bs. as.",
                "bsas",
                "bs.as.",
                "pba",
                "provincia de buenos aires",
                "pcia de buenos aires",
                "pcia. de buenos aires",
                "prov. buenos aires",
                "gba",
                "gran buenos aires",
            ],
        },
        Province {
            code: "K",
            name: "Catamarca",
            aliases: &["cat", "catamarca"],
        },
        Province {
            code: "H",
            name: "Chaco",
            aliases: &["chaco"],
        },
        Province {
            code: "U",
            name: "Chubut",
            aliases: &["chubut", "chu"],
        },
        Province {
            code: "X",
            name: "Córdoba",
            aliases: &["cordoba", "cba", "cordoba capital"],
        },
        Province {
            code: "W",
            name: "Corrientes",
            aliases: &["ctes", "corrientes"],
        },
        Province {
            code: "E",
            name: "Entre Ríos",
            aliases: &["entre rios", "entrerios", "e. rios", "er"],
        },
        Province {
            code: "P",
            name: "Formosa",
            aliases: &["fsa", "formosa"],
        },
        Province {
            code: "Y",
            name: "Jujuy",
            aliases: &["jujuy", "juj"],
        },
        Province {
            code: "L",
            name: "La Pampa",
            aliases: &["lapampa", "pampa"],
        },
        Province {
            code: "F",
            name: "La Rioja",
            aliases: &["larioja", "rioja"],
        },
        Province {
            code: "M",
            name: "Mendoza",
            aliases: &["mza", "mendoza"],
        },
        Province {
            code: "N",
            name: "Misiones",
            aliases: &["mnes", "misiones"],
        },
        Province {
            code: "Q",
            name: "Neuquén",
            aliases: &["neuquen", "nqn"],
        },
        Province {
            code: "R",
            name: "Río Negro",
            aliases: &["rio negro", "rionegro", "rn"],
        },
        Province {
            code: "A",
            name: "Salta",
            aliases: &["salta", "sta"],
        },
        Province {
            code: "J",
            name: "San Juan",
            aliases: &["sanjuan", "sj"],
        },
        Province {
            code: "D",
            name: "San Luis",
            aliases: &["sanluis", "sl"],
        },
        Province {
            code: "Z",
            name: "Santa Cruz",
            aliases: &["santacruz", "sc"],
        },
        Province {
            code: "S",
            name: "Santa Fe",
            aliases: &["santafe", "sta fe", "sta. fe", "sf"],
        },
        Province {
            code: "G",
            name: "Santiago del Estero",
            aliases: &[
                "santiago del estero",
                "sgo del estero",
                "sgo. del estero",
                "santiago",
                "sde",
            ],
        },
        Province {
            code: "V",
            name: "Tierra del Fuego",
            aliases: &[
                "tierra del fuego",
                "tdf",
                "tierra del fuego, antártida e islas del atlántico sur",
                "tierra del fuego, antartida e islas del atlantico sur",
                "ushuaia",
            ],
        },
        Province {
            code: "T",
            name: "Tucumán",
            aliases: &["tucuman", "tuc"],
        },
    ],
};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_every_province_once() {
        assert_eq!(ARGENTINA.provinces.len(), 24);

        let mut codes: Vec<_> = ARGENTINA.provinces.iter().map(|p| p.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 24);
    }

    #[test]
    fn test_aliases_are_lowercase_and_trimmed() {
        for province in ARGENTINA.provinces {
            for alias in province.aliases {
                assert_eq!(*alias, alias.trim().to_lowercase(), "alias {alias:?}");
            }
        }
    }

    #[test]
    fn test_caba_variants() {
        for input in ["CABA", "Capital Federal", "caba", "  C.A.B.A. ", "Ciudad de Buenos Aires"] {
            let province = ARGENTINA.lookup(input).unwrap();
            assert_eq!(province.code, "C", "input {input:?}");
            assert_eq!(province.name, "Ciudad Autónoma de Buenos Aires");
        }
    }

    #[test]
    fn test_capital_pattern_fallback() {
        let province = ARGENTINA.lookup("Capital - Palermo").unwrap();
        assert_eq!(province.code, "C");

        let province = ARGENTINA.lookup("caba, villa crespo").unwrap();
        assert_eq!(province.code, "C");

        let province = ARGENTINA.lookup("Ciudad Autonoma Bs As").unwrap();
        assert_eq!(province.code, "C");
    }

    #[test]
    fn test_match_by_name_code_and_alias() {
        assert_eq!(ARGENTINA.lookup("Córdoba").unwrap().code, "X");
        assert_eq!(ARGENTINA.lookup("cordoba").unwrap().code, "X");
        assert_eq!(ARGENTINA.lookup("x").unwrap().code, "X");
        assert_eq!(ARGENTINA.lookup("Bs As").unwrap().code, "B");
        assert_eq!(ARGENTINA.lookup("NEUQUEN").unwrap().name, "Neuquén");
        assert_eq!(ARGENTINA.lookup("tdf").unwrap().code, "V");
    }

    #[test]
    fn test_unknown_is_unresolved() {
        assert!(ARGENTINA.lookup("Unknown Place").is_none());
        assert!(ARGENTINA.lookup("").is_none());
        assert!(ARGENTINA.lookup("   ").is_none());
    }

    #[test]
    fn test_resolve_passes_unknown_through_unchanged() {
        let field = resolve_province("AR", "Unknown Place");
        assert_eq!(field, ProvinceField::Raw("Unknown Place".to_string()));
        assert_eq!(field.name(), "Unknown Place");
        assert_eq!(field.code(), None);
    }

    #[test]
    fn test_resolve_skips_other_countries() {
        let field = resolve_province("UY", "CABA");
        assert_eq!(field, ProvinceField::Raw("CABA".to_string()));
    }

    #[test]
    fn test_resolve_country_is_case_insensitive() {
        let field = resolve_province("ar", "Mendoza");
        assert_eq!(field.code(), Some("M"));
        assert_eq!(field.name(), "Mendoza");
    }
}
