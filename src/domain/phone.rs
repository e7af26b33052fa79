use crate::domain::validation::ValidationError;

use phonenumber::country;

/// Country calling code of China mainland.
pub const CHINA_REGION_CODE: u16 = 86;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
/// E.164 country calling code attached to a message.
///
/// `0` (unset) and `86` both mean China mainland; every other value is international.
pub struct RegionCode(u16);

impl RegionCode {
    /// Unset region, treated as domestic.
    pub const UNSET: Self = Self(0);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// `true` for `0` and `86`.
    pub fn is_domestic(self) -> bool {
        self.0 == 0 || self.0 == CHINA_REGION_CODE
    }

    /// The calling code to print, defaulting an unset region to `86`.
    pub fn effective(self) -> u16 {
        if self.0 == 0 { CHINA_REGION_CODE } else { self.0 }
    }
}

impl From<u16> for RegionCode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// How a vendor wants recipient numbers printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneFormat {
    /// Domestic numbers stripped of any `86` prefix; international as `<cc><number>`.
    BarePrefixed,
    /// Domestic numbers stripped of any `86` prefix; international as `+<cc><number>`.
    BarePlusPrefixed,
    /// Always `+<cc><number>`, unset region printed as `+86`.
    E164,
    /// International numbers as `00<cc><number>`; domestic unchanged.
    DoubleZeroPrefixed,
    /// Passed through untouched.
    Plain,
}

impl PhoneFormat {
    /// Format one raw (already trimmed) number for the given region.
    pub fn format(self, raw: &str, region: RegionCode) -> String {
        let raw = raw.trim();
        match self {
            Self::Plain => raw.to_owned(),
            Self::E164 => {
                if raw.starts_with('+') {
                    return raw.to_owned();
                }
                let cc = region.effective();
                let national = strip_code(raw, cc);
                format!("+{cc}{national}")
            }
            Self::BarePrefixed | Self::BarePlusPrefixed | Self::DoubleZeroPrefixed => {
                if region.is_domestic() {
                    return strip_code(raw, CHINA_REGION_CODE).to_owned();
                }
                if raw.starts_with('+') {
                    return match self {
                        Self::BarePrefixed => raw.trim_start_matches('+').to_owned(),
                        Self::DoubleZeroPrefixed => format!("00{}", raw.trim_start_matches('+')),
                        _ => raw.to_owned(),
                    };
                }
                let cc = region.value();
                match self {
                    Self::BarePrefixed => format!("{cc}{raw}"),
                    Self::DoubleZeroPrefixed => format!("00{cc}{raw}"),
                    _ => format!("+{cc}{raw}"),
                }
            }
        }
    }

    /// The number without any `+<cc>`/`00<cc>` prefix, for vendors taking the
    /// calling code in a separate field.
    pub fn national(raw: &str, region: RegionCode) -> &str {
        strip_code(raw.trim(), region.effective())
    }

    /// Format every number and join them with `,`.
    pub fn join(self, mobiles: &[String], region: RegionCode) -> String {
        mobiles
            .iter()
            .map(|mobile| self.format(mobile, region))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Strip an explicit `+<cc>`/`00<cc>` prefix. Bare `<cc>` is stripped only for
/// domestic numbers longer than the 11-digit mainland format.
fn strip_code(raw: &str, cc: u16) -> &str {
    let code = cc.to_string();
    if let Some(rest) = raw.strip_prefix('+').and_then(|it| it.strip_prefix(code.as_str())) {
        return rest;
    }
    if let Some(rest) = raw.strip_prefix("00").and_then(|it| it.strip_prefix(code.as_str())) {
        return rest;
    }
    if cc == CHINA_REGION_CODE && raw.len() == 13 {
        if let Some(rest) = raw.strip_prefix(code.as_str()) {
            return rest;
        }
    }
    raw
}

#[derive(Debug, Clone)]
/// Parsed phone number split into calling code and national number.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    region: RegionCode,
    national: String,
}

impl PhoneNumber {
    pub const FIELD: &'static str = "mobiles";

    /// Parse and normalize a phone number.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();
        let code = parsed.code().value();
        let national = e164
            .strip_prefix(&format!("+{code}"))
            .unwrap_or(e164.as_str())
            .to_owned();

        Ok(Self {
            raw,
            e164,
            region: RegionCode::new(code),
            national,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn e164(&self) -> &str {
        &self.e164
    }

    pub fn region(&self) -> RegionCode {
        self.region
    }

    /// National significant number without the calling code.
    pub fn national(&self) -> &str {
        &self.national
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}
