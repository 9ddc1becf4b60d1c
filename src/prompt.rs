//! Line-oriented prompts for the interactive session.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::filter::{TripFilter, parse_month_selector, parse_weekday_selector};
use crate::trip::City;

/// Reads answers from `R` and writes questions to `W`.
pub struct Prompter<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: AsyncBufRead + Unpin, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    /// Asks `question` until `parse` accepts the answer. `None` once input ends.
    pub async fn ask<T, E: Display>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Result<T, E>,
    ) -> Result<Option<T>> {
        loop {
            write!(self.out, "{question} ")?;
            self.out.flush()?;

            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };

            match parse(line.trim()) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    debug!(answer = %line, error = %e, "Rejected answer");
                    writeln!(self.out, "{e}")?;
                }
            }
        }
    }

    /// City, month and day, in that order. `None` once input ends.
    pub async fn ask_selection(&mut self) -> Result<Option<(City, TripFilter)>> {
        let Some(city) = self
            .ask(
                "Please enter a city name (chicago, new york city, washington):",
                str::parse::<City>,
            )
            .await?
        else {
            return Ok(None);
        };
        let Some(month) = self
            .ask(
                "Please enter a month name (all, january, february, ... , june):",
                parse_month_selector,
            )
            .await?
        else {
            return Ok(None);
        };
        let Some(weekday) = self
            .ask(
                "Please enter a day name (all, monday, tuesday, ... sunday):",
                parse_weekday_selector,
            )
            .await?
        else {
            return Ok(None);
        };

        Ok(Some((city, TripFilter::new(month, weekday))))
    }

    /// True only for an explicit `yes`.
    pub async fn ask_restart(&mut self) -> Result<bool> {
        let answer = self
            .ask(
                "\nWould you like to restart? Enter yes or no.\n",
                |s: &str| Ok::<_, std::convert::Infallible>(s.eq_ignore_ascii_case("yes")),
            )
            .await?;
        Ok(answer.unwrap_or(false))
    }
}
