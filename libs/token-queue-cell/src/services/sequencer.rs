use chrono::NaiveDate;

use crate::models::Token;

/// Next token number for a (doctor, date) scope: one past the current
/// maximum, or 1 for an empty day. Callers must hold the doctor's shard
/// lock so the read-max and the subsequent insert form one atomic unit;
/// that discipline is what keeps the sequence gapless and duplicate-free
/// under concurrent creation.
pub fn next_token_number<'a>(
    tokens: impl Iterator<Item = &'a Token>,
    date: NaiveDate,
) -> u32 {
    tokens
        .filter(|t| t.booking_date == date)
        .map(|t| t.token_number)
        .max()
        .map(|n| n + 1)
        .unwrap_or(1)
}
