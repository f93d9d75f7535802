// Copyright 2026 gsc-query Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! ISO 3166-1 alpha-3 codes, the form the `country` dimension uses on the
//! wire.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Country {
    pub name: &'static str,
    pub code: &'static str,
}

impl Country {
    /// Finds a country by alpha-3 code or by name, ignoring case.
    pub fn lookup(input: &str) -> Option<Country> {
        let wanted = input.trim();
        COUNTRIES
            .iter()
            .copied()
            .find(|c| c.code.eq_ignore_ascii_case(wanted) || c.name.eq_ignore_ascii_case(wanted))
    }

    /// Expression value for a `country` filter.
    pub fn expression(self) -> String {
        self.code.to_lowercase()
    }
}

pub const COUNTRIES: &[Country] = &[
    Country { name: "Afghanistan", code: "AFG" },
    Country { name: "Aland Islands", code: "ALA" },
    Country { name: "Albania", code: "ALB" },
    Country { name: "Algeria", code: "DZA" },
    Country { name: "American Samoa", code: "ASM" },
    Country { name: "Andorra", code: "AND" },
    Country { name: "Angola", code: "AGO" },
    Country { name: "Anguilla", code: "AIA" },
    Country { name: "Antarctica", code: "ATA" },
    Country { name: "Antigua and Barbuda", code: "ATG" },
    Country { name: "Argentina", code: "ARG" },
    Country { name: "Armenia", code: "ARM" },
    Country { name: "Aruba", code: "ABW" },
    Country { name: "Australia", code: "AUS" },
    Country { name: "Austria", code: "AUT" },
    Country { name: "Azerbaijan", code: "AZE" },
    Country { name: "Bahamas", code: "BHS" },
    Country { name: "Bahrain", code: "BHR" },
    Country { name: "Bangladesh", code: "BGD" },
    Country { name: "Barbados", code: "BRB" },
    Country { name: "Belarus", code: "BLR" },
    Country { name: "Belgium", code: "BEL" },
    Country { name: "Belize", code: "BLZ" },
    Country { name: "Benin", code: "BEN" },
    Country { name: "Bermuda", code: "BMU" },
    Country { name: "Bhutan", code: "BTN" },
    Country { name: "Bolivia", code: "BOL" },
    Country { name: "Bonaire Sint Eustatius and Saba", code: "BES" },
    Country { name: "Bosnia and Herzegovina", code: "BIH" },
    Country { name: "Botswana", code: "BWA" },
    Country { name: "Bouvet Island", code: "BVT" },
    Country { name: "Brazil", code: "BRA" },
    Country { name: "British Indian Ocean Territory", code: "IOT" },
    Country { name: "Brunei Darussalam", code: "BRN" },
    Country { name: "Bulgaria", code: "BGR" },
    Country { name: "Burkina Faso", code: "BFA" },
    Country { name: "Burundi", code: "BDI" },
    Country { name: "Cabo Verde", code: "CPV" },
    Country { name: "Cambodia", code: "KHM" },
    Country { name: "Cameroon", code: "CMR" },
    Country { name: "Canada", code: "CAN" },
    Country { name: "Cayman Islands", code: "CYM" },
    Country { name: "Central African Republic", code: "CAF" },
    Country { name: "Chad", code: "TCD" },
    Country { name: "Chile", code: "CHL" },
    Country { name: "China", code: "CHN" },
    Country { name: "Christmas Island", code: "CXR" },
    Country { name: "Cocos Keeling Islands", code: "CCK" },
    Country { name: "Colombia", code: "COL" },
    Country { name: "Comoros", code: "COM" },
    Country { name: "Congo Democratic Republic", code: "COD" },
    Country { name: "Congo", code: "COG" },
    Country { name: "Cook Islands", code: "COK" },
    Country { name: "Costa Rica", code: "CRI" },
    Country { name: "Croatia", code: "HRV" },
    Country { name: "Cuba", code: "CUB" },
    Country { name: "Curaçao", code: "CUW" },
    Country { name: "Cyprus", code: "CYP" },
    Country { name: "Czechia", code: "CZE" },
    Country { name: "Denmark", code: "DNK" },
    Country { name: "Djibouti", code: "DJI" },
    Country { name: "Dominica", code: "DMA" },
    Country { name: "Dominican Republic", code: "DOM" },
    Country { name: "Ecuador", code: "ECU" },
    Country { name: "Egypt", code: "EGY" },
    Country { name: "El Salvador", code: "SLV" },
    Country { name: "Equatorial Guinea", code: "GNQ" },
    Country { name: "Eritrea", code: "ERI" },
    Country { name: "Estonia", code: "EST" },
    Country { name: "Eswatini", code: "SWZ" },
    Country { name: "Ethiopia", code: "ETH" },
    Country { name: "Falkland Islands", code: "FLK" },
    Country { name: "Faroe Islands", code: "FRO" },
    Country { name: "Fiji", code: "FJI" },
    Country { name: "Finland", code: "FIN" },
    Country { name: "France", code: "FRA" },
    Country { name: "French Guiana", code: "GUF" },
    Country { name: "French Polynesia", code: "PYF" },
    Country { name: "French Southern Territories", code: "ATF" },
    Country { name: "Gabon", code: "GAB" },
    Country { name: "Gambia", code: "GMB" },
    Country { name: "Georgia", code: "GEO" },
    Country { name: "Germany", code: "DEU" },
    Country { name: "Ghana", code: "GHA" },
    Country { name: "Gibraltar", code: "GIB" },
    Country { name: "Greece", code: "GRC" },
    Country { name: "Greenland", code: "GRL" },
    Country { name: "Grenada", code: "GRD" },
    Country { name: "Guadeloupe", code: "GLP" },
    Country { name: "Guam", code: "GUM" },
    Country { name: "Guatemala", code: "GTM" },
    Country { name: "Guernsey", code: "GGY" },
    Country { name: "Guinea", code: "GIN" },
    Country { name: "Guinea Bissau", code: "GNB" },
    Country { name: "Guyana", code: "GUY" },
    Country { name: "Haiti", code: "HTI" },
    Country { name: "Heard Island and Mcdonald Islands", code: "HMD" },
    Country { name: "Holy See", code: "VAT" },
    Country { name: "Honduras", code: "HND" },
    Country { name: "Hong Kong", code: "HKG" },
    Country { name: "Hungary", code: "HUN" },
    Country { name: "Iceland", code: "ISL" },
    Country { name: "India", code: "IND" },
    Country { name: "Indonesia", code: "IDN" },
    Country { name: "Iran", code: "IRN" },
    Country { name: "Iraq", code: "IRQ" },
    Country { name: "Ireland", code: "IRL" },
    Country { name: "Isle of Man", code: "IMN" },
    Country { name: "Israel", code: "ISR" },
    Country { name: "Italy", code: "ITA" },
    Country { name: "Ivory Coast", code: "CIV" },
    Country { name: "Jamaica", code: "JAM" },
    Country { name: "Japan", code: "JPN" },
    Country { name: "Jersey", code: "JEY" },
    Country { name: "Jordan", code: "JOR" },
    Country { name: "Kazakhstan", code: "KAZ" },
    Country { name: "Kenya", code: "KEN" },
    Country { name: "Kiribati", code: "KIR" },
    Country { name: "Korea Democratic People Republic", code: "PRK" },
    Country { name: "Korea Republic of", code: "KOR" },
    Country { name: "Kuwait", code: "KWT" },
    Country { name: "Kyrgyzstan", code: "KGZ" },
    Country { name: "Lao Republic", code: "LAO" },
    Country { name: "Latvia", code: "LVA" },
    Country { name: "Lebanon", code: "LBN" },
    Country { name: "Lesotho", code: "LSO" },
    Country { name: "Liberia", code: "LBR" },
    Country { name: "Libya", code: "LBY" },
    Country { name: "Liechtenstein", code: "LIE" },
    Country { name: "Lithuania", code: "LTU" },
    Country { name: "Luxembourg", code: "LUX" },
    Country { name: "Macao", code: "MAC" },
    Country { name: "Madagascar", code: "MDG" },
    Country { name: "Malawi", code: "MWI" },
    Country { name: "Malaysia", code: "MYS" },
    Country { name: "Maldives", code: "MDV" },
    Country { name: "Mali", code: "MLI" },
    Country { name: "Malta", code: "MLT" },
    Country { name: "Marshall Islands", code: "MHL" },
    Country { name: "Martinique", code: "MTQ" },
    Country { name: "Mauritania", code: "MRT" },
    Country { name: "Mauritius", code: "MUS" },
    Country { name: "Mayotte", code: "MYT" },
    Country { name: "Mexico", code: "MEX" },
    Country { name: "Micronesia", code: "FSM" },
    Country { name: "Moldova", code: "MDA" },
    Country { name: "Monaco", code: "MCO" },
    Country { name: "Mongolia", code: "MNG" },
    Country { name: "Montenegro", code: "MNE" },
    Country { name: "Montserrat", code: "MSR" },
    Country { name: "Morocco", code: "MAR" },
    Country { name: "Mozambique", code: "MOZ" },
    Country { name: "Myanmar", code: "MMR" },
    Country { name: "Namibia", code: "NAM" },
    Country { name: "Nauru", code: "NRU" },
    Country { name: "Nepal", code: "NPL" },
    Country { name: "Netherlands", code: "NLD" },
    Country { name: "New Caledonia", code: "NCL" },
    Country { name: "New Zealand", code: "NZL" },
    Country { name: "Nicaragua", code: "NIC" },
    Country { name: "Niger", code: "NER" },
    Country { name: "Nigeria", code: "NGA" },
    Country { name: "Niue", code: "NIU" },
    Country { name: "Norfolk Island", code: "NFK" },
    Country { name: "Northern Mariana Islands", code: "MNP" },
    Country { name: "Norway", code: "NOR" },
    Country { name: "Oman", code: "OMN" },
    Country { name: "Pakistan", code: "PAK" },
    Country { name: "Palau", code: "PLW" },
    Country { name: "Palestine", code: "PSE" },
    Country { name: "Panama", code: "PAN" },
    Country { name: "Papua New Guinea", code: "PNG" },
    Country { name: "Paraguay", code: "PRY" },
    Country { name: "Peru", code: "PER" },
    Country { name: "Philippines", code: "PHL" },
    Country { name: "Pitcairn", code: "PCN" },
    Country { name: "Poland", code: "POL" },
    Country { name: "Portugal", code: "PRT" },
    Country { name: "Puerto Rico", code: "PRI" },
    Country { name: "Qatar", code: "QAT" },
    Country { name: "Republic of North Macedonia", code: "MKD" },
    Country { name: "Romania", code: "ROU" },
    Country { name: "Russian Federation", code: "RUS" },
    Country { name: "Rwanda", code: "RWA" },
    Country { name: "Réunion", code: "REU" },
    Country { name: "Saint Barthelemy", code: "BLM" },
    Country { name: "Saint Helena", code: "SHN" },
    Country { name: "Saint Kitts and Nevis", code: "KNA" },
    Country { name: "Saint Lucia", code: "LCA" },
    Country { name: "Saint Martin", code: "MAF" },
    Country { name: "Saint Pierre and Miquelon", code: "SPM" },
    Country { name: "Saint Vincent and the Grenadines", code: "VCT" },
    Country { name: "Samoa", code: "WSM" },
    Country { name: "San Marino", code: "SMR" },
    Country { name: "Sao Tome and Principe", code: "STP" },
    Country { name: "Saudi Arabia", code: "SAU" },
    Country { name: "Senegal", code: "SEN" },
    Country { name: "Serbia", code: "SRB" },
    Country { name: "Seychelles", code: "SYC" },
    Country { name: "Sierra Leone", code: "SLE" },
    Country { name: "Singapore", code: "SGP" },
    Country { name: "Sint Maarten", code: "SXM" },
    Country { name: "Slovakia", code: "SVK" },
    Country { name: "Slovenia", code: "SVN" },
    Country { name: "Solomon Islands", code: "SLB" },
    Country { name: "Somalia", code: "SOM" },
    Country { name: "South Africa", code: "ZAF" },
    Country { name: "South Georgia and the South Sandwich Islands", code: "SGS" },
    Country { name: "South Sudan", code: "SSD" },
    Country { name: "Spain", code: "ESP" },
    Country { name: "Sri Lanka", code: "LKA" },
    Country { name: "Sudan", code: "SDN" },
    Country { name: "Suriname", code: "SUR" },
    Country { name: "Svalbard and Jan Mayen", code: "SJM" },
    Country { name: "Sweden", code: "SWE" },
    Country { name: "Switzerland", code: "CHE" },
    Country { name: "Syrian Arab Republic", code: "SYR" },
    Country { name: "Taiwan", code: "TWN" },
    Country { name: "Tajikistan", code: "TJK" },
    Country { name: "Tanzania", code: "TZA" },
    Country { name: "Thailand", code: "THA" },
    Country { name: "Timor Leste", code: "TLS" },
    Country { name: "Togo", code: "TGO" },
    Country { name: "Tokelau", code: "TKL" },
    Country { name: "Tonga", code: "TON" },
    Country { name: "Trinidad and Tobago", code: "TTO" },
    Country { name: "Tunisia", code: "TUN" },
    Country { name: "Turkey", code: "TUR" },
    Country { name: "Turkmenistan", code: "TKM" },
    Country { name: "Turks and Caicos Islands", code: "TCA" },
    Country { name: "Tuvalu", code: "TUV" },
    Country { name: "Uganda", code: "UGA" },
    Country { name: "Ukraine", code: "UKR" },
    Country { name: "United Arab Emirates", code: "ARE" },
    Country { name: "United Kingdom", code: "GBR" },
    Country { name: "United States Minor Outlying Islands", code: "UMI" },
    Country { name: "United States", code: "USA" },
    Country { name: "Uruguay", code: "URY" },
    Country { name: "Uzbekistan", code: "UZB" },
    Country { name: "Vanuatu", code: "VUT" },
    Country { name: "Venezuela", code: "VEN" },
    Country { name: "Viet Nam", code: "VNM" },
    Country { name: "Virgin Islands British", code: "VGB" },
    Country { name: "Virgin Islands Us", code: "VIR" },
    Country { name: "Wallis and Futuna", code: "WLF" },
    Country { name: "Western Sahara", code: "ESH" },
    Country { name: "Yemen", code: "YEM" },
    Country { name: "Zambia", code: "ZMB" },
    Country { name: "Zimbabwe", code: "ZWE" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_code_or_name() {
        let italy = Country::lookup("ita").expect("italy");
        assert_eq!(italy.name, "Italy");
        assert_eq!(Country::lookup("United Kingdom").map(|c| c.code), Some("GBR"));
        assert_eq!(italy.expression(), "ita");
        assert!(Country::lookup("atlantis").is_none());
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<&str> = COUNTRIES.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), COUNTRIES.len());
    }
}
