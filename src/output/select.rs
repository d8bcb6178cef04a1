use std::io::{self, BufRead, Write};

use crate::probe::prelude::{RankedEntry, RunReport};
use crate::relays::model::{CITY_NAME, COUNTRY_NAME};

/// Asks which of the fastest relays to use.
///
/// `0` or an empty line picks the fastest relay, `1..=count` picks one of the
/// runners-up. Invalid answers are asked again; end of input picks nothing.
pub fn prompt_selection<'a, R: BufRead, W: Write>(
    report: &'a RunReport,
    count: usize,
    mut input: R,
    mut output: W,
) -> io::Result<Option<&'a RankedEntry>> {
    let Some(best) = report.best() else {
        return Ok(None);
    };
    let next = report.next(count);

    writeln!(output, "Which server do you want to use?")?;
    writeln!(output, "  [0] {} (fastest)", describe(best))?;
    for (idx, entry) in next.iter().enumerate() {
        writeln!(output, "  [{}] {}", idx + 1, describe(entry))?;
    }

    loop {
        write!(output, "Choice [0]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_choice(&line, next.len()) {
            Some(0) => return Ok(Some(best)),
            Some(n) => return Ok(next.get(n - 1)),
            None => writeln!(output, "Please enter a number between 0 and {}.", next.len())?,
        }
    }
}

fn parse_choice(line: &str, max: usize) -> Option<usize> {
    let line = line.trim();
    if line.is_empty() {
        return Some(0);
    }
    line.parse().ok().filter(|n| *n <= max)
}

fn describe(entry: &RankedEntry) -> String {
    let candidate = &entry.candidate;
    let city = candidate.meta(CITY_NAME);
    let country = candidate.meta(COUNTRY_NAME);
    format!(
        "{} - {:.3} ms - {}, {}",
        candidate.address,
        entry.latency_ms,
        if city.is_empty() { "Unknown" } else { city },
        if country.is_empty() { "Unknown" } else { country },
    )
}

/// The provider CLI command that switches to the chosen relay.
pub fn connect_hint(entry: &RankedEntry) -> String {
    format!(
        "mullvad relay set hostname {} && mullvad connect",
        entry.candidate.id
    )
}
