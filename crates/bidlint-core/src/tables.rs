//! Static lookup tables: country and datacenter continents, device type labels.

use phf::phf_map;

/// ISO-3166 country to continent. Both alpha-2 and alpha-3 keys are present
/// so `geo.country` resolves regardless of which form the sender used.
static COUNTRY_CONTINENT: phf::Map<&'static str, &'static str> = phf_map! {
    // North America
    "US" => "NA", "USA" => "NA",
    "CA" => "NA", "CAN" => "NA",
    "MX" => "NA", "MEX" => "NA",
    "GT" => "NA", "GTM" => "NA",
    "CR" => "NA", "CRI" => "NA",
    "PA" => "NA", "PAN" => "NA",
    "DO" => "NA", "DOM" => "NA",
    "PR" => "NA", "PRI" => "NA",
    // South America
    "BR" => "SA", "BRA" => "SA",
    "AR" => "SA", "ARG" => "SA",
    "CL" => "SA", "CHL" => "SA",
    "CO" => "SA", "COL" => "SA",
    "PE" => "SA", "PER" => "SA",
    "VE" => "SA", "VEN" => "SA",
    "EC" => "SA", "ECU" => "SA",
    "UY" => "SA", "URY" => "SA",
    // Europe
    "GB" => "EU", "GBR" => "EU",
    "DE" => "EU", "DEU" => "EU",
    "FR" => "EU", "FRA" => "EU",
    "ES" => "EU", "ESP" => "EU",
    "IT" => "EU", "ITA" => "EU",
    "NL" => "EU", "NLD" => "EU",
    "BE" => "EU", "BEL" => "EU",
    "SE" => "EU", "SWE" => "EU",
    "NO" => "EU", "NOR" => "EU",
    "DK" => "EU", "DNK" => "EU",
    "FI" => "EU", "FIN" => "EU",
    "PL" => "EU", "POL" => "EU",
    "AT" => "EU", "AUT" => "EU",
    "CH" => "EU", "CHE" => "EU",
    "IE" => "EU", "IRL" => "EU",
    "PT" => "EU", "PRT" => "EU",
    "CZ" => "EU", "CZE" => "EU",
    "RO" => "EU", "ROU" => "EU",
    "GR" => "EU", "GRC" => "EU",
    "HU" => "EU", "HUN" => "EU",
    "UA" => "EU", "UKR" => "EU",
    "RU" => "EU", "RUS" => "EU",
    "TR" => "EU", "TUR" => "EU",
    // Asia
    "CN" => "AS", "CHN" => "AS",
    "JP" => "AS", "JPN" => "AS",
    "KR" => "AS", "KOR" => "AS",
    "IN" => "AS", "IND" => "AS",
    "SG" => "AS", "SGP" => "AS",
    "HK" => "AS", "HKG" => "AS",
    "TW" => "AS", "TWN" => "AS",
    "TH" => "AS", "THA" => "AS",
    "VN" => "AS", "VNM" => "AS",
    "MY" => "AS", "MYS" => "AS",
    "ID" => "AS", "IDN" => "AS",
    "PH" => "AS", "PHL" => "AS",
    "IL" => "AS", "ISR" => "AS",
    "AE" => "AS", "ARE" => "AS",
    "SA" => "AS", "SAU" => "AS",
    "PK" => "AS", "PAK" => "AS",
    "BD" => "AS", "BGD" => "AS",
    // Africa
    "ZA" => "AF", "ZAF" => "AF",
    "NG" => "AF", "NGA" => "AF",
    "EG" => "AF", "EGY" => "AF",
    "KE" => "AF", "KEN" => "AF",
    "MA" => "AF", "MAR" => "AF",
    "GH" => "AF", "GHA" => "AF",
    // Oceania
    "AU" => "OC", "AUS" => "OC",
    "NZ" => "OC", "NZL" => "OC",
};

/// Datacenter / region identifiers to continent. Covers the cloud region
/// naming convention plus the airport-code shorthand ad servers log.
static DATACENTER_CONTINENT: phf::Map<&'static str, &'static str> = phf_map! {
    // Region-style ids
    "us-east-1" => "NA", "us-east-2" => "NA",
    "us-west-1" => "NA", "us-west-2" => "NA",
    "us-central1" => "NA",
    "ca-central-1" => "NA",
    "sa-east-1" => "SA",
    "eu-west-1" => "EU", "eu-west-2" => "EU", "eu-west-3" => "EU",
    "eu-central-1" => "EU", "eu-north-1" => "EU", "eu-south-1" => "EU",
    "ap-northeast-1" => "AS", "ap-northeast-2" => "AS",
    "ap-southeast-1" => "AS", "ap-south-1" => "AS",
    "ap-east-1" => "AS",
    "me-south-1" => "AS",
    "af-south-1" => "AF",
    "ap-southeast-2" => "OC",
    // Airport-code shorthand
    "iad" => "NA", "ord" => "NA", "dfw" => "NA", "sjc" => "NA",
    "lax" => "NA", "atl" => "NA", "yyz" => "NA",
    "gru" => "SA",
    "lhr" => "EU", "fra" => "EU", "ams" => "EU", "cdg" => "EU",
    "mad" => "EU", "arn" => "EU", "waw" => "EU",
    "nrt" => "AS", "hnd" => "AS", "icn" => "AS", "sin" => "AS",
    "hkg" => "AS", "bom" => "AS",
    "jnb" => "AF",
    "syd" => "OC", "akl" => "OC",
};

/// Continent for a `geo.country` value, alpha-2 or alpha-3, any case.
pub fn country_continent(country: &str) -> Option<&'static str> {
    COUNTRY_CONTINENT.get(country.to_ascii_uppercase().as_str()).copied()
}

/// Continent for a datacenter / region id, any case.
pub fn datacenter_continent(dc: &str) -> Option<&'static str> {
    DATACENTER_CONTINENT.get(dc.to_ascii_lowercase().as_str()).copied()
}

/// Human label for `device.devicetype` codes.
pub fn device_type_label(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Mobile/Tablet"),
        2 => Some("Personal Computer"),
        3 => Some("Connected TV"),
        4 => Some("Phone"),
        5 => Some("Tablet"),
        6 => Some("Connected Device"),
        7 => Some("Set Top Box"),
        8 => Some("OOH Device"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_lookup_handles_both_iso_forms() {
        assert_eq!(country_continent("US"), Some("NA"));
        assert_eq!(country_continent("USA"), Some("NA"));
        assert_eq!(country_continent("deu"), Some("EU"));
        assert_eq!(country_continent("XX"), None);
    }

    #[test]
    fn datacenter_lookup_handles_regions_and_airports() {
        assert_eq!(datacenter_continent("us-east-1"), Some("NA"));
        assert_eq!(datacenter_continent("FRA"), Some("EU"));
        assert_eq!(datacenter_continent("syd"), Some("OC"));
        assert_eq!(datacenter_continent("moon-base-1"), None);
    }

    #[test]
    fn device_type_labels() {
        assert_eq!(device_type_label(3), Some("Connected TV"));
        assert_eq!(device_type_label(8), Some("OOH Device"));
        assert_eq!(device_type_label(99), None);
    }
}
