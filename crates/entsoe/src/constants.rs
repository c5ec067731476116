//! Constants for the ENTSO-e integration

use ha_core::SelectOption;

pub const DOMAIN: &str = "entsoe";
pub const ATTRIBUTION: &str = "Data provided by ENTSO-e Transparency Platform";
pub const ICON: &str = "mdi:currency-eur";
pub const UNIQUE_ID: &str = "entsoe_component";
pub const COMPONENT_TITLE: &str = "ENTSO-e Transparency Platform";

pub const CONF_API_KEY: &str = "api_key";
pub const CONF_AREA: &str = "area";
pub const CONF_ADDITIONAL: &str = "additional_cost";

/// Cost template used when none is given; renders to `0.0`
pub const DEFAULT_TEMPLATE: &str = "{{0.0|float}}";

/// Bidding areas that return data from ENTSO-e
///
/// Albania, Bosnia and Herz., Cyprus, Georgia, Ireland, Kosovo, Malta,
/// Moldova, Montenegro, North Macedonia, Turkey and Ukraine are left out
/// because the platform has no day-ahead prices for them.
///
/// Luxembourg and Germany share the `DE_LU` zone and both point at it.
pub static TARGET_AREA_OPTIONS: &[SelectOption] = &[
    SelectOption::new("AT", "Austria"),
    SelectOption::new("BE", "Belgium"),
    SelectOption::new("BG", "Bulgaria"),
    SelectOption::new("HR", "Croatia"),
    SelectOption::new("CZ", "Czech Republic"),
    SelectOption::new("DK_1", "Denmark Eastern (DK1)"),
    SelectOption::new("DK_2", "Denmark Western (DK2)"),
    SelectOption::new("EE", "Estonia"),
    SelectOption::new("FI", "Finland"),
    SelectOption::new("FR", "France"),
    SelectOption::new("DE_LU", "Luxembourg"),
    SelectOption::new("DE_LU", "Germany"),
    SelectOption::new("GR", "Greece"),
    SelectOption::new("HU", "Hungary"),
    SelectOption::new("IT_CNOR", "Italy Centre North"),
    SelectOption::new("IT_CSUD", "Italy Centre South"),
    SelectOption::new("IT_NORD", "Italy North"),
    SelectOption::new("IT_SUD", "Italy South"),
    SelectOption::new("IT_SICI", "Italy Sicilia"),
    SelectOption::new("IT_SARD", "Italy Sardinia"),
    SelectOption::new("LV", "Latvia"),
    SelectOption::new("LT", "Lithuania"),
    SelectOption::new("NL", "Netherlands"),
    SelectOption::new("NO_1", "Norway Oslo (NO1"),
    SelectOption::new("NO_2", "Norway Kr.Sand (NO2)"),
    SelectOption::new("NO_3", "Norway Tr.heim (NO3)"),
    SelectOption::new("NO_4", "Norway Tromsø (NO4)"),
    SelectOption::new("NO_5", "Norway Bergen (NO5"),
    SelectOption::new("PL", "Poland"),
    SelectOption::new("PT", "Portugal"),
    SelectOption::new("RO", "Romania"),
    SelectOption::new("RS", "Serbia"),
    SelectOption::new("SK", "Slovakia"),
    SelectOption::new("SI", "Slovenia"),
    SelectOption::new("ES", "Spain"),
    SelectOption::new("SE_1", "Sweden Luleå (SE1)"),
    SelectOption::new("SE_2", "Sweden Sundsvall (SE2)"),
    SelectOption::new("SE_3", "Sweden Stockholm (SE3)"),
    SelectOption::new("SE_4", "Sweden Malmö (SE4)"),
    SelectOption::new("CH", "Switzerland"),
    SelectOption::new("UK", "United Kingdom"),
];
