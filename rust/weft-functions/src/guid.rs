//! GUID generation built-in.

use crate::expect_between;
use uuid::Uuid;
use weft_core::{EngineError, Value};
use weft_engine::Engine;

pub fn register(engine: &mut Engine) {
    engine.register_function("guid", guid);
}

/// Fresh v4 UUID. The optional format argument is one of `n`, `d`, `b`, `p`
/// or `x` (case-insensitive); the default is the hyphenated `d` form.
async fn guid(args: Vec<Value>) -> Result<Value, EngineError> {
    expect_between("guid", &args, 0, 1)?;
    let id = Uuid::new_v4();
    let format = match args.first() {
        None => "d".to_string(),
        Some(value) => value.as_str()?.to_lowercase(),
    };
    let text = match format.as_str() {
        "n" => id.simple().to_string(),
        "d" => id.hyphenated().to_string(),
        "b" => id.braced().to_string(),
        "p" => format!("({})", id.hyphenated()),
        "x" => hex_sections(&id),
        other => {
            return Err(EngineError::argument(
                "guid",
                format!("unknown format '{other}'"),
            ))
        }
    };
    Ok(Value::String(text))
}

/// The grouped-hex form: `{0x…,0x…,0x…,{0x…,…}}`.
fn hex_sections(id: &Uuid) -> String {
    let (a, b, c, d) = id.as_fields();
    let tail: Vec<String> = d.iter().map(|byte| format!("0x{byte:02x}")).collect();
    format!("{{0x{a:08x},0x{b:04x},0x{c:04x},{{{}}}}}", tail.join(","))
}
