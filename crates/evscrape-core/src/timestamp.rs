//! Parsing of the app's "last updated" text.
//!
//! The status screen shows the refresh time as free text such as
//! `UPDATED MAR 05, 2025, 06:31 AM`, in the device's wall-clock time. It is
//! parsed into an absolute instant (kept in UTC), optionally converted to a
//! target zone, and reformatted as `Wed Mar 05 06:31 AM`.

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use evscrape_types::{ParseError, ParseResult};

/// Label in front of the refresh time.
pub const REFRESH_LABEL: &str = "UPDATED";

/// Accepted shapes of the refresh time after the label, tried in order.
/// `%B` takes full or abbreviated month names; names and AM/PM are matched
/// case-insensitively.
pub const INPUT_FORMATS: &[&str] = &["%B %d, %Y, %I:%M %p", "%B %d, %Y %I:%M %p"];

/// Shapes without a year. The year is filled in from the device's date.
const YEARLESS_FORMATS: &[&str] = &["%Y %B %d, %I:%M %p", "%Y %B %d %I:%M %p"];

/// Output pattern: day-of-week, month, day, hour:minute, AM/PM.
pub const OUTPUT_FORMAT: &str = "%a %b %d %I:%M %p";

/// Zone the device displays wall-clock time in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceZone {
    /// The zone of the machine running the scraper. Emulators inherit it.
    #[default]
    Local,
    Named(Tz),
}

/// How to interpret and render the refresh time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampOptions {
    pub source: SourceZone,
    /// Convert to this zone before formatting; UTC when `None`.
    pub target: Option<Tz>,
}

impl TimestampOptions {
    #[must_use]
    pub fn source(mut self, source: SourceZone) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn target(mut self, target: Option<Tz>) -> Self {
        self.target = target;
        self
    }
}

/// Look up an IANA zone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> ParseResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ParseError::UnknownTimezone(name.to_string()))
}

/// Remove the leading label, ignoring case and surrounding whitespace.
///
/// The label must stand alone: it is followed by whitespace, a `:`, or
/// nothing.
pub fn strip_label(text: &str) -> ParseResult<&str> {
    let trimmed = text.trim();
    let rest = trimmed
        .get(..REFRESH_LABEL.len())
        .filter(|head| head.eq_ignore_ascii_case(REFRESH_LABEL))
        .map(|_| &trimmed[REFRESH_LABEL.len()..])
        .filter(|rest| rest.is_empty() || rest.starts_with(|c: char| c == ':' || c.is_whitespace()));

    match rest {
        Some(rest) => Ok(rest.trim_start_matches(':').trim()),
        None => Err(ParseError::MissingLabel {
            label: REFRESH_LABEL.to_string(),
            text: text.to_string(),
        }),
    }
}

/// Parse the wall-clock text after the label.
///
/// `today` is the device's current date. A year-less date takes its year,
/// or the previous one if the date would otherwise lie in the future.
pub fn parse_wall_time(text: &str, today: NaiveDate) -> ParseResult<NaiveDateTime> {
    let mut first_error = None;
    for format in INPUT_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(naive) => return Ok(naive),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    let with_year = format!("{} {}", today.year(), text);
    for format in YEARLESS_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&with_year, format) {
            let future = today.succ_opt().is_some_and(|tomorrow| naive.date() > tomorrow);
            if future {
                if let Some(last_year) = naive.with_year(today.year() - 1) {
                    return Ok(last_year);
                }
            }
            return Ok(naive);
        }
    }

    Err(ParseError::InvalidTimestamp {
        text: text.to_string(),
        reason: first_error
            .map(|e| format!("unrecognised date layout: {}", e))
            .unwrap_or_else(|| "unrecognised date layout".to_string()),
    })
}

fn localize<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime, text: &str) -> ParseResult<DateTime<Utc>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Repeated hour at a DST fall-back: the earlier instant.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ParseError::InvalidTimestamp {
            text: text.to_string(),
            reason: "time does not exist in the device's zone".to_string(),
        }),
    }
}

/// Parse the full refresh-status text into a UTC instant.
pub fn parse_refresh_text(text: &str, source: SourceZone) -> ParseResult<DateTime<Utc>> {
    let rest = strip_label(text)?;
    match source {
        SourceZone::Local => {
            let naive = parse_wall_time(rest, Local::now().date_naive())?;
            localize(&Local, &naive, rest)
        }
        SourceZone::Named(tz) => {
            let naive = parse_wall_time(rest, Utc::now().with_timezone(&tz).date_naive())?;
            localize(&tz, &naive, rest)
        }
    }
}

/// Render an instant with [`OUTPUT_FORMAT`], in `target` or UTC.
pub fn format_instant(instant: DateTime<Utc>, target: Option<Tz>) -> String {
    match target {
        Some(tz) => instant.with_timezone(&tz).format(OUTPUT_FORMAT).to_string(),
        None => instant.format(OUTPUT_FORMAT).to_string(),
    }
}

/// Parse the refresh-status text and render it for output.
pub fn render_refresh_text(text: &str, options: &TimestampOptions) -> ParseResult<String> {
    let instant = parse_refresh_text(text, options.source)?;
    Ok(format_instant(instant, options.target))
}
