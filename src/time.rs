//! Datetime values: the four temporal kinds of TOML v1.0.0.
//!
//! A [`Datetime`] keeps the broken-down fields plus the *render format* that
//! was recorded at parse time. The format is a small strftime subset
//! (`%Y %m %d %H %M %S` and literal text); the fractional seconds and the
//! UTC offset are baked into it as literal text, so rendering reproduces the
//! source spelling (`Z` stays `Z`, `+00:00` stays `+00:00`) without any
//! offset arithmetic.

#[cfg(test)]
#[path = "./time_tests.rs"]
mod tests;

use std::fmt;

/// Which of the four temporal shapes a [`Datetime`] carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatetimeKind {
    /// Date, time and UTC offset (`1979-05-27T07:32:00-08:00` or a `Z`
    /// suffix).
    OffsetDatetime,
    /// Date and time without an offset.
    LocalDatetime,
    /// Date only.
    LocalDate,
    /// Time only.
    LocalTime,
}

/// A parsed TOML datetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datetime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    kind: DatetimeKind,
    /// Normalized sub-second value: one source digit scales by 100, two by
    /// 10, three or more are kept as written. Zero when absent.
    millis: u32,
    /// Effective sub-second digit count after normalization (minimum 3 when
    /// a fraction is present, 0 otherwise).
    precision: u8,
    format: String,
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    const DAYS: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[month as usize]
    }
}

/// Reads `N` ASCII digits as a number, or nothing.
fn digits<const N: usize>(text: &[u8]) -> Option<u32> {
    if text.len() < N {
        return None;
    }
    let mut value = 0u32;
    for &b in &text[..N] {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + (b - b'0') as u32;
    }
    Some(value)
}

/// Outcome of matching the time-of-day tail `HH:MM:SS[.frac]`.
struct TimeFields {
    hour: u8,
    minute: u8,
    second: u8,
    millis: u32,
    precision: u8,
    /// Bytes consumed from the tail.
    len: usize,
}

fn parse_time_fields(text: &[u8]) -> Option<TimeFields> {
    let hour = digits::<2>(text)?;
    if text.get(2) != Some(&b':') {
        return None;
    }
    let minute = digits::<2>(&text[3..])?;
    if text.get(5) != Some(&b':') {
        return None;
    }
    let second = digits::<2>(&text[6..])?;
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    let mut fields = TimeFields {
        hour: hour as u8,
        minute: minute as u8,
        second: second as u8,
        millis: 0,
        precision: 0,
        len: 8,
    };
    if text.get(8) == Some(&b'.') {
        let frac = &text[9..];
        let mut count = 0usize;
        let mut value = 0u32;
        for &b in frac {
            if !b.is_ascii_digit() {
                break;
            }
            // Digits past the ninth are consumed but not stored.
            if count < 9 {
                value = value * 10 + (b - b'0') as u32;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        // Normalize short fractions: 1 digit scales by 100, 2 by 10.
        match count {
            1 => value *= 100,
            2 => value *= 10,
            _ => {}
        }
        fields.millis = value;
        fields.precision = count.clamp(3, 9) as u8;
        fields.len = 9 + count;
    }
    Some(fields)
}

impl Datetime {
    /// Parses one of the recognized datetime shapes from a full literal.
    ///
    /// The literal must be consumed exactly; trailing bytes reject the
    /// match. Returns `None` on shape mismatch or calendar/clock-invalid
    /// fields.
    pub(crate) fn parse(text: &[u8]) -> Option<Datetime> {
        if text.len() >= 3 && text[2] == b':' {
            return Self::parse_local_time(text);
        }
        Self::parse_date_led(text)
    }

    fn parse_local_time(text: &[u8]) -> Option<Datetime> {
        let t = parse_time_fields(text)?;
        // An offset is not valid on a time-only literal, and neither is any
        // other trailing byte.
        if t.len != text.len() {
            return None;
        }
        let mut format = String::from("%H:%M:%S");
        push_fraction(&mut format, t.millis, t.precision);
        Some(Datetime {
            year: 0,
            month: 0,
            day: 0,
            hour: t.hour,
            minute: t.minute,
            second: t.second,
            kind: DatetimeKind::LocalTime,
            millis: t.millis,
            precision: t.precision,
            format,
        })
    }

    fn parse_date_led(text: &[u8]) -> Option<Datetime> {
        let year = digits::<4>(text)?;
        if text.get(4) != Some(&b'-') {
            return None;
        }
        let month = digits::<2>(&text[5..])?;
        if text.get(7) != Some(&b'-') {
            return None;
        }
        let day = digits::<2>(&text[8..])?;
        if !(1..=12).contains(&month) {
            return None;
        }
        if day < 1 || day as u8 > days_in_month(year as u16, month as u8) {
            return None;
        }

        let mut value = Datetime {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: 0,
            minute: 0,
            second: 0,
            kind: DatetimeKind::LocalDate,
            millis: 0,
            precision: 0,
            format: String::from("%Y-%m-%d"),
        };
        if text.len() == 10 {
            return Some(value);
        }

        // The delimiter is rendered as `T` regardless of the source
        // spelling; a space is accepted only when explicitly written.
        if !matches!(text[10], b'T' | b't' | b' ') {
            return None;
        }
        let t = parse_time_fields(&text[11..])?;
        value.hour = t.hour;
        value.minute = t.minute;
        value.second = t.second;
        value.millis = t.millis;
        value.precision = t.precision;
        value.format = String::from("%Y-%m-%dT%H:%M:%S");
        push_fraction(&mut value.format, t.millis, t.precision);

        let tail = &text[11 + t.len..];
        match tail {
            [] => {
                value.kind = DatetimeKind::LocalDatetime;
                Some(value)
            }
            [b'Z' | b'z'] => {
                value.kind = DatetimeKind::OffsetDatetime;
                value.format.push('Z');
                Some(value)
            }
            [sign @ (b'+' | b'-'), rest @ ..] => {
                let off_hour = digits::<2>(rest)?;
                if rest.get(2) != Some(&b':') {
                    return None;
                }
                let off_minute = digits::<2>(&rest[3..])?;
                if rest.len() != 5 || off_hour > 23 || off_minute > 59 {
                    return None;
                }
                value.kind = DatetimeKind::OffsetDatetime;
                value.format.push(*sign as char);
                value.format.push_str(&format!("{off_hour:02}:{off_minute:02}"));
                Some(value)
            }
            _ => None,
        }
    }

    /// Which temporal shape this value carries.
    #[inline]
    pub fn kind(&self) -> DatetimeKind {
        self.kind
    }

    /// Normalized sub-second value (0 when the source had no fraction).
    #[inline]
    pub fn subsec(&self) -> u32 {
        self.millis
    }

    /// Effective sub-second digit count (0 when the source had no fraction).
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The render format recorded at parse time, e.g.
    /// `%Y-%m-%dT%H:%M:%S.500-08:00`. This is the only place the `Z` versus
    /// `+00:00` distinction survives.
    #[inline]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Renders the value through the recorded format.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.format.len() + 8);
        let mut chars = self.format.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('Y') => out.push_str(&format!("{:04}", self.year)),
                Some('m') => out.push_str(&format!("{:02}", self.month)),
                Some('d') => out.push_str(&format!("{:02}", self.day)),
                Some('H') => out.push_str(&format!("{:02}", self.hour)),
                Some('M') => out.push_str(&format!("{:02}", self.minute)),
                Some('S') => out.push_str(&format!("{:02}", self.second)),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        out
    }
}

fn push_fraction(format: &mut String, millis: u32, precision: u8) {
    if precision > 0 {
        format.push('.');
        format.push_str(&format!("{:0width$}", millis, width = precision as usize));
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
