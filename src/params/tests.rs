use serde_json::{Value, json};

use super::{ParamMapper, convert};
use crate::domain::{ArrayGaps, ColumnSelector, ParamMapping, ParamMode, ParamType};

const ALL_TAGS: [&str; 7] = ["string", "int", "float", "bool", "string[]", "int[]", "uuid"];

fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| (*field).to_owned()).collect()
}

fn mapping(column: &str, name: &str, tag: &str, default_value: &str, index: i64) -> ParamMapping {
    ParamMapping {
        column: ColumnSelector::parse(column),
        name: name.to_owned(),
        param_type: ParamType::from_tag(tag),
        default_value: default_value.to_owned(),
        array_index: index,
    }
}

fn payload_json(payload: &[u8]) -> Result<Value, String> {
    serde_json::from_slice(payload).map_err(|err| format!("payload is not JSON: {}", err))
}

#[test]
fn empty_input_yields_zero_values() -> Result<(), String> {
    let expected = [
        json!(""),
        json!(0),
        json!(0),
        json!(false),
        json!([]),
        json!([]),
        json!(""),
    ];
    for (tag, want) in ALL_TAGS.iter().zip(expected.iter()) {
        let got = convert("", &ParamType::from_tag(tag))
            .map_err(|err| format!("{} errored on empty input: {}", tag, err))?;
        if &got != want {
            return Err(format!("{}: expected {}, got {}", tag, want, got));
        }
    }
    Ok(())
}

#[test]
fn int_round_trips_normalized_text() -> Result<(), String> {
    for (input, normalized) in [("42", "42"), ("-7", "-7"), ("+15", "15"), (" 8 ", "8"), ("007", "7")] {
        let got = convert(input, &ParamType::Int).map_err(|err| err.to_string())?;
        if got.to_string() != normalized {
            return Err(format!("{:?}: expected {}, got {}", input, normalized, got));
        }
    }
    Ok(())
}

#[test]
fn scalar_parse_failures_are_errors() -> Result<(), String> {
    for (input, tag) in [("abc", "int"), ("1.5", "int"), ("x1", "float"), ("yes", "bool"), ("inf", "float")] {
        if convert(input, &ParamType::from_tag(tag)).is_ok() {
            return Err(format!("expected {:?} as {} to fail", input, tag));
        }
    }
    Ok(())
}

#[test]
fn bool_accepts_standard_literals() -> Result<(), String> {
    for input in ["1", "t", "T", "TRUE", "true", "True"] {
        if convert(input, &ParamType::Bool).map_err(|err| err.to_string())? != json!(true) {
            return Err(format!("{:?} should be true", input));
        }
    }
    for input in ["0", "f", "F", "FALSE", "false", "False"] {
        if convert(input, &ParamType::Bool).map_err(|err| err.to_string())? != json!(false) {
            return Err(format!("{:?} should be false", input));
        }
    }
    Ok(())
}

#[test]
fn float_parses_decimal() -> Result<(), String> {
    let got = convert("2.5", &ParamType::Float).map_err(|err| err.to_string())?;
    if got != json!(2.5) {
        return Err(format!("unexpected float: {}", got));
    }
    Ok(())
}

#[test]
fn whole_floats_have_no_fraction() -> Result<(), String> {
    for (input, text) in [("3", "3"), ("0", "0"), ("-2.0", "-2"), ("1e3", "1000"), ("0.25", "0.25")] {
        let got = convert(input, &ParamType::Float).map_err(|err| err.to_string())?;
        if got.to_string() != text {
            return Err(format!("{:?}: expected {}, got {}", input, text, got));
        }
    }
    Ok(())
}

#[test]
fn string_list_splits_on_first_separator_only() -> Result<(), String> {
    let cases = [
        ("a,b,c", json!(["a", "b", "c"])),
        ("a;b|c", json!(["a", "b|c"])),
        ("red;blue;green", json!(["red", "blue", "green"])),
        ("x|y z", json!(["x", "y z"])),
        ("a b  c", json!(["a", "b", "c"])),
        ("solo", json!(["solo"])),
        (" a , , b ", json!(["a", "b"])),
    ];
    for (input, want) in cases {
        let got = convert(input, &ParamType::StringList).map_err(|err| err.to_string())?;
        if got != want {
            return Err(format!("{:?}: expected {}, got {}", input, want, got));
        }
    }
    Ok(())
}

#[test]
fn int_list_skips_invalid_pieces() -> Result<(), String> {
    let cases = [
        ("1,2,x,4", json!([1, 2, 4])),
        ("1, abc, 3, 4.5, 5", json!([1, 3, 5])),
        ("10;20;30", json!([10, 20, 30])),
        ("nope", json!([])),
    ];
    for (input, want) in cases {
        let got = convert(input, &ParamType::IntList).map_err(|err| err.to_string())?;
        if got != want {
            return Err(format!("{:?}: expected {}, got {}", input, want, got));
        }
    }
    Ok(())
}

#[test]
fn unknown_tag_passes_trimmed_text() -> Result<(), String> {
    let got = convert("  raw value ", &ParamType::from_tag("date")).map_err(|err| err.to_string())?;
    if got != json!("raw value") {
        return Err(format!("unexpected value: {}", got));
    }
    Ok(())
}

#[test]
fn array_mode_orders_by_index() -> Result<(), String> {
    let mappings = [
        mapping("0", "c", "string", "", 2),
        mapping("1", "a", "int", "", 0),
        mapping("2", "b", "bool", "", 1),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Array, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["third", "1", "true"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!([1, true, "third"]) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn array_mode_failure_shifts_later_values() -> Result<(), String> {
    let mappings = [
        mapping("0", "", "int", "", 0),
        mapping("1", "", "int", "", 1),
        mapping("2", "", "string", "", 2),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Array, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["1", "bad", "tail"]))
        .map_err(|err| err.to_string())?;
    if mapped.failures.len() != 1 {
        return Err(format!("expected one failure, got {}", mapped.failures.len()));
    }
    let got = payload_json(&mapped.payload)?;
    if got != json!([1, "tail"]) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn array_mode_null_gaps_keep_positions() -> Result<(), String> {
    let mappings = [
        mapping("0", "", "int", "", 0),
        mapping("1", "", "int", "", 1),
        mapping("2", "", "string", "", 2),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Array, ArrayGaps::Null, &[]);
    let mapped = mapper
        .map_row(&row(&["1", "bad", "tail"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!([1, null, "tail"]) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn object_mode_later_mapping_wins() -> Result<(), String> {
    let mappings = [
        mapping("0", "id", "string", "", 0),
        mapping("1", "id", "int", "", 0),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Object, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["first", "2"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!({ "id": 2 }) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn object_mode_failed_key_is_absent() -> Result<(), String> {
    let mappings = [
        mapping("0", "count", "int", "", 0),
        mapping("1", "name", "string", "", 0),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Object, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["many", "bob"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!({ "name": "bob" }) {
        return Err(format!("unexpected payload: {}", got));
    }
    match mapped.failures.first() {
        Some(failure) if failure.label == "count" => Ok(()),
        _ => Err("expected failure labelled 'count'".to_owned()),
    }
}

#[test]
fn blank_or_out_of_range_fields_use_default() -> Result<(), String> {
    let mappings = [
        mapping("0", "blank", "int", "5", 0),
        mapping("9", "missing", "string", "fallback", 0),
        mapping("-1", "negative", "string", "neg", 0),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Object, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["   ", "x"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!({ "blank": 5, "missing": "fallback", "negative": "neg" }) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn named_columns_resolve_against_header() -> Result<(), String> {
    let header = row(&["id", " amount ", "tags"]);
    let mappings = [
        mapping("amount", "amount", "float", "", 0),
        mapping("tags", "tags", "string[]", "", 0),
        mapping("unknown", "other", "string", "dflt", 0),
    ];
    let mapper = ParamMapper::new(&mappings, ParamMode::Object, ArrayGaps::Shift, &header);
    let mapped = mapper
        .map_row(&row(&["7", "1.5", "a|b"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!({ "amount": 1.5, "tags": ["a", "b"], "other": "dflt" }) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn single_field_rows_are_split_on_tabs() -> Result<(), String> {
    let mappings = [mapping("1", "second", "string", "", 0)];
    let mapper = ParamMapper::new(&mappings, ParamMode::Object, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["one\ttwo\tthree"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!({ "second": "two" }) {
        return Err(format!("unexpected payload: {}", got));
    }
    Ok(())
}

#[test]
fn legacy_mapping_uses_fixed_fields() -> Result<(), String> {
    let mapper = ParamMapper::new(&[], ParamMode::Object, ArrayGaps::Shift, &[]);
    let mapped = mapper
        .map_row(&row(&["a", "b", "17", "d", "SO-1"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!(["SO-1", 17]) {
        return Err(format!("unexpected payload: {}", got));
    }

    let mapped = mapper
        .map_row(&row(&["a", "b", "n/a", "d", "SO-2"]))
        .map_err(|err| err.to_string())?;
    let got = payload_json(&mapped.payload)?;
    if got != json!(["SO-2", 0]) {
        return Err(format!("unexpected payload: {}", got));
    }

    if mapper.map_row(&row(&["a", "b", "c"])).is_ok() {
        return Err("expected short row to fail".to_owned());
    }
    Ok(())
}

#[test]
fn column_selector_parsing() -> Result<(), String> {
    if ColumnSelector::parse(" 3 ") != ColumnSelector::Index(3) {
        return Err("expected index".to_owned());
    }
    if ColumnSelector::parse("-2") != ColumnSelector::Negative {
        return Err("expected negative".to_owned());
    }
    if ColumnSelector::parse("name") != ColumnSelector::Name("name".to_owned()) {
        return Err("expected name".to_owned());
    }
    if ParamType::from_tag(" int ") != ParamType::Int {
        return Err("expected trimmed type tag".to_owned());
    }
    Ok(())
}
