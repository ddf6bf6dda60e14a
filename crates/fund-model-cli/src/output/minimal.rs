use serde_json::Value;

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 6] = [
    "lp_net_irr",
    "gross_irr",
    "lp_net_moic",
    "gross_moic",
    "total_value",
    "gp_carry",
];

/// Print just the headline number from the output.
///
/// Scenario envelopes print LP net IRR; sweeps print one `key<TAB>irr` line
/// per row; anything else falls back to its first field.
pub fn print_minimal(value: &Value) {
    if let Some(Value::Array(rows)) = value.get("results") {
        for row in rows {
            let key = row.get("key").map(format_minimal).unwrap_or_default();
            let irr = row.get("lp_net_irr").map(format_minimal).unwrap_or_default();
            println!("{}\t{}", key, irr);
        }
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
