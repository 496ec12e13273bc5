//! Date and time built-ins.
//!
//! Dates flow through the engine as instants with a fixed offset; handlers
//! also accept RFC 3339 strings wherever a date is expected. Format strings
//! use strftime specifiers and are validated before formatting.

use crate::{expect_between, take2};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use weft_core::{EngineError, Value};
use weft_engine::Engine;

pub fn register(engine: &mut Engine) {
    engine.register_function("utcNow", utc_now);
    engine.register_function("formatDateTime", format_date_time);
    engine.register_function("addSeconds", add_seconds);
    engine.register_function("addMinutes", add_minutes);
    engine.register_function("addHours", add_hours);
    engine.register_function("addDays", add_days);
}

/// Current UTC instant; with a format argument, the formatted text instead.
async fn utc_now(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_between("utcNow", &args, 0, 1)?;
    let now: DateTime<FixedOffset> = Utc::now().fixed_offset();
    match args.into_iter().next() {
        None => Ok(Value::Date(now)),
        Some(format) => {
            let format = format.as_str()?.to_string();
            let items = parse_format("utcNow", &format)?;
            Ok(Value::String(
                now.format_with_items(items.into_iter()).to_string(),
            ))
        }
    }
}

async fn format_date_time(args: Vec<Value>) -> Result<Value, EngineError> {
    let (date, format) = take2("formatDateTime", args)?;
    let date = date_arg("formatDateTime", &date)?;
    let format = format.as_str()?;
    let items = parse_format("formatDateTime", format)?;
    Ok(Value::String(
        date.format_with_items(items.into_iter()).to_string(),
    ))
}

async fn add_seconds(args: Vec<Value>) -> Result<Value, EngineError> {
    shift("addSeconds", args, Duration::try_seconds)
}

async fn add_minutes(args: Vec<Value>) -> Result<Value, EngineError> {
    shift("addMinutes", args, Duration::try_minutes)
}

async fn add_hours(args: Vec<Value>) -> Result<Value, EngineError> {
    shift("addHours", args, Duration::try_hours)
}

async fn add_days(args: Vec<Value>) -> Result<Value, EngineError> {
    shift("addDays", args, Duration::try_days)
}

fn shift(
    function: &str,
    args: Vec<Value>,
    to_delta: fn(i64) -> Option<Duration>,
) -> Result<Value, EngineError> {
    let (date, amount) = take2(function, args)?;
    let date = date_arg(function, &date)?;
    let delta = to_delta(amount.as_int()?)
        .ok_or_else(|| EngineError::argument(function, "shift amount is out of range"))?;
    date.checked_add_signed(delta)
        .map(Value::Date)
        .ok_or_else(|| EngineError::argument(function, "resulting date is out of range"))
}

fn date_arg(function: &str, value: &Value) -> Result<DateTime<FixedOffset>, EngineError> {
    match value {
        Value::Date(date) => Ok(*date),
        Value::String(s) => DateTime::parse_from_rfc3339(s).map_err(|e| {
            EngineError::argument(function, format!("cannot parse '{s}' as a date: {e}"))
        }),
        other => Err(EngineError::type_mismatch("a date", other)),
    }
}

fn parse_format<'a>(function: &str, format: &'a str) -> Result<Vec<Item<'a>>, EngineError> {
    let items: Vec<Item<'a>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(EngineError::argument(
            function,
            format!("invalid format string '{format}'"),
        ));
    }
    Ok(items)
}
