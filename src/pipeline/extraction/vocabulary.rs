//! Fixed industry-name vocabulary per report flavor.
//!
//! Canonicalization is exact-key only: case, whitespace, `&` vs `and` and a
//! short alias table. Anything else passes through untouched.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::enums::ReportFlavor;

pub const MANUFACTURING_INDUSTRIES: &[&str] = &[
    "Apparel, Leather & Allied Products",
    "Chemical Products",
    "Computer & Electronic Products",
    "Electrical Equipment, Appliances & Components",
    "Fabricated Metal Products",
    "Food, Beverage & Tobacco Products",
    "Furniture & Related Products",
    "Machinery",
    "Miscellaneous Manufacturing",
    "Nonmetallic Mineral Products",
    "Paper Products",
    "Petroleum & Coal Products",
    "Plastics & Rubber Products",
    "Primary Metals",
    "Printing & Related Support Activities",
    "Textile Mills",
    "Transportation Equipment",
    "Wood Products",
];

pub const SERVICES_INDUSTRIES: &[&str] = &[
    "Accommodation & Food Services",
    "Agriculture, Forestry, Fishing & Hunting",
    "Arts, Entertainment & Recreation",
    "Construction",
    "Educational Services",
    "Finance & Insurance",
    "Health Care & Social Assistance",
    "Information",
    "Management of Companies & Support Services",
    "Mining",
    "Other Services",
    "Professional, Scientific & Technical Services",
    "Public Administration",
    "Real Estate, Rental & Leasing",
    "Retail Trade",
    "Transportation & Warehousing",
    "Utilities",
    "Wholesale Trade",
];

/// Spellings seen in older reports → canonical name.
const ALIASES: &[(&str, &str)] = &[
    ("Apparel, Leather and Allied Products", "Apparel, Leather & Allied Products"),
    ("Apparel & Leather Products", "Apparel, Leather & Allied Products"),
    ("Computer and Electronic Products", "Computer & Electronic Products"),
    ("Computers & Electronic Products", "Computer & Electronic Products"),
    ("Electrical Equipment, Appliances and Components", "Electrical Equipment, Appliances & Components"),
    ("Food, Beverage and Tobacco Products", "Food, Beverage & Tobacco Products"),
    ("Non-Metallic Mineral Products", "Nonmetallic Mineral Products"),
    ("Plastics and Rubber Products", "Plastics & Rubber Products"),
    ("Printing and Related Support Activities", "Printing & Related Support Activities"),
    ("Misc. Manufacturing", "Miscellaneous Manufacturing"),
    ("Health Care and Social Assistance", "Health Care & Social Assistance"),
    ("Healthcare & Social Assistance", "Health Care & Social Assistance"),
    ("Transportation and Warehousing", "Transportation & Warehousing"),
    ("Management of Companies and Support Services", "Management of Companies & Support Services"),
];

/// Comparison key: lowercase, `and` folded to `&`, punctuation spacing
/// removed, whitespace collapsed.
pub fn vocabulary_key(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .map(|word| if word == "and" { "&" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ,", ",")
}

static ALL_NAMES: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut keys: HashMap<String, &'static str> = MANUFACTURING_INDUSTRIES
        .iter()
        .chain(SERVICES_INDUSTRIES.iter())
        .map(|name| (vocabulary_key(name), *name))
        .collect();
    for (alias, canonical) in ALIASES {
        keys.insert(vocabulary_key(alias), *canonical);
    }
    keys
});

/// Keys of vocabulary names (and aliases) that contain a comma. The list
/// normalizer re-joins comma-split fragments that form one of these.
static COMMA_NAME_KEYS: LazyLock<Vec<String>> = LazyLock::new(|| {
    ALL_NAMES
        .keys()
        .filter(|key| key.contains(','))
        .cloned()
        .collect()
});

/// True when `name` is a vocabulary entry or alias (any flavor).
pub fn is_known_industry(name: &str) -> bool {
    ALL_NAMES.contains_key(&vocabulary_key(name))
}

/// True when `candidate` equals a comma-bearing vocabulary name or alias.
pub fn is_comma_name(candidate: &str) -> bool {
    let key = vocabulary_key(candidate);
    COMMA_NAME_KEYS.iter().any(|k| *k == key)
}

/// Key → canonical name for one flavor's names and the aliases of those names.
fn flavor_keys(names: &'static [&'static str]) -> HashMap<String, &'static str> {
    let mut keys: HashMap<String, &'static str> = names
        .iter()
        .map(|name| (vocabulary_key(name), *name))
        .collect();
    for (alias, canonical) in ALIASES {
        if names.contains(canonical) {
            keys.insert(vocabulary_key(alias), *canonical);
        }
    }
    keys
}

static MANUFACTURING_KEYS: LazyLock<HashMap<String, &'static str>> =
    LazyLock::new(|| flavor_keys(MANUFACTURING_INDUSTRIES));
static SERVICES_KEYS: LazyLock<HashMap<String, &'static str>> =
    LazyLock::new(|| flavor_keys(SERVICES_INDUSTRIES));

/// Industry vocabulary for one report flavor.
#[derive(Debug, Clone)]
pub struct IndustryVocabulary {
    flavor: ReportFlavor,
    keys: &'static HashMap<String, &'static str>,
}

impl IndustryVocabulary {
    pub fn for_flavor(flavor: ReportFlavor) -> Self {
        let keys: &'static HashMap<String, &'static str> = match flavor {
            ReportFlavor::Manufacturing => &MANUFACTURING_KEYS,
            ReportFlavor::Services => &SERVICES_KEYS,
        };
        Self { flavor, keys }
    }

    pub fn flavor(&self) -> ReportFlavor {
        self.flavor
    }

    /// Canonical spelling for `name` when it is an entry or alias of this
    /// flavor. Names from the other survey's list pass through.
    pub fn canonicalize(&self, name: &str) -> Option<&'static str> {
        self.keys.get(&vocabulary_key(name)).copied()
    }
}
