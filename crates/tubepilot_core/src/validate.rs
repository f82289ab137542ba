use std::collections::BTreeSet;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    DESCRIPTION_MAX_LENGTH, TAGS_MAX_COUNT, TAG_MAX_LENGTH, TITLE_MAX_LENGTH, TITLE_MIN_LENGTH,
};
use crate::{RemoteSchedulerConfig, VideoMetadata};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must be between {min} and {max} characters (got {actual})")]
    TitleLength { min: usize, max: usize, actual: usize },
    #[error("description must be at most {max} characters (got {actual})")]
    DescriptionLength { max: usize, actual: usize },
    #[error("at most {max} tags are allowed (got {actual})")]
    TooManyTags { max: usize, actual: usize },
    #[error("tag {tag:?} exceeds {max} characters")]
    TagLength { tag: String, max: usize },
    #[error("invalid cron schedule {expression:?}: {reason}")]
    Schedule { expression: String, reason: String },
    #[error("maxVideosPerDay must be greater than zero")]
    MaxVideosPerDay,
}

/// Validates a five-field cron expression (minute hour day month weekday).
///
/// The parser expects a leading seconds field, so a zero is prepended. It also
/// counts weekdays from 1 (Sunday), so the POSIX weekday field is renumbered first.
pub fn validate_schedule(expression: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::Schedule {
        expression: expression.to_string(),
        reason,
    };
    let mut fields: Vec<String> = expression.split_whitespace().map(str::to_string).collect();
    if fields.len() != 5 {
        return Err(invalid(format!("expected 5 fields, found {}", fields.len())));
    }
    fields[4] = parser_weekdays(&fields[4]).map_err(invalid)?;
    cron::Schedule::from_str(&format!("0 {}", fields.join(" ")))
        .map(|_| ())
        .map_err(|err| invalid(err.to_string()))
}

/// Rewrites a POSIX weekday field (0-7, Sunday is both 0 and 7) as the parser's
/// 1-7 list. Named days are passed through untouched.
fn parser_weekdays(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }
    let mut days = BTreeSet::new();
    let mut named = Vec::new();
    for item in field.split(',') {
        if item.chars().any(|c| c.is_ascii_alphabetic()) {
            named.push(item.to_string());
            continue;
        }
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: u8 = step
                    .parse()
                    .map_err(|_| format!("invalid weekday step {step:?}"))?;
                if step == 0 {
                    return Err("weekday step must be positive".to_string());
                }
                (range, Some(step))
            }
            None => (item, None),
        };
        let (start, end) = if range == "*" {
            (0, 6)
        } else if let Some((start, end)) = range.split_once('-') {
            (posix_weekday(start)?, posix_weekday(end)?)
        } else {
            let day = posix_weekday(range)?;
            (day, if step.is_some() { 7 } else { day })
        };
        if start > end {
            return Err(format!("weekday range {range:?} runs backwards"));
        }
        let step = usize::from(step.unwrap_or(1));
        days.extend((start..=end).step_by(step).map(|day| day % 7 + 1));
    }
    Ok(days
        .iter()
        .map(u8::to_string)
        .chain(named)
        .collect::<Vec<_>>()
        .join(","))
}

fn posix_weekday(text: &str) -> Result<u8, String> {
    match text.parse::<u8>() {
        Ok(day) if day <= 7 => Ok(day),
        _ => Err(format!("day of week {text:?} must be between 0 and 7")),
    }
}

impl RemoteSchedulerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_videos_per_day == 0 {
            return Err(ValidationError::MaxVideosPerDay);
        }
        validate_schedule(&self.schedule)
    }
}

impl VideoMetadata {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let title_len = self.title.trim().chars().count();
        if !(TITLE_MIN_LENGTH..=TITLE_MAX_LENGTH).contains(&title_len) {
            return Err(ValidationError::TitleLength {
                min: TITLE_MIN_LENGTH,
                max: TITLE_MAX_LENGTH,
                actual: title_len,
            });
        }
        let description_len = self.description.chars().count();
        if description_len > DESCRIPTION_MAX_LENGTH {
            return Err(ValidationError::DescriptionLength {
                max: DESCRIPTION_MAX_LENGTH,
                actual: description_len,
            });
        }
        if self.tags.len() > TAGS_MAX_COUNT {
            return Err(ValidationError::TooManyTags {
                max: TAGS_MAX_COUNT,
                actual: self.tags.len(),
            });
        }
        if let Some(tag) = self
            .tags
            .iter()
            .find(|tag| tag.chars().count() > TAG_MAX_LENGTH)
        {
            return Err(ValidationError::TagLength {
                tag: tag.clone(),
                max: TAG_MAX_LENGTH,
            });
        }
        Ok(())
    }
}
