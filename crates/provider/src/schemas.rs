//! Named structured-output profiles.
//!
//! A schema profile is a fixed, strict JSON Schema passed through
//! verbatim as the `response_format` constraint of a run. The gateway
//! does not validate agent output against it — enforcement happens on
//! the provider side.

use serde_json::{json, Value};

/// Profile requested when the caller does not name one.
pub const DEFAULT_PROFILE: &str = "income_cashflow_expense";

/// Look up the `response_format` payload for a profile name.
///
/// Unrecognized names return `None`: the run is created without any
/// output constraint rather than rejected.
pub fn response_format(profile: &str) -> Option<Value> {
    match profile {
        "income_cashflow_expense" => Some(json!({
            "type": "json_schema",
            "json_schema": financial_report_schema(),
            "strict": true,
        })),
        _ => None,
    }
}

/// The `financial_reports` schema: an income-statement series, a cash
/// flow summary, and an expense breakdown, all required.
fn financial_report_schema() -> Value {
    json!({
        "name": "financial_reports",
        "schema": {
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "additionalProperties": false,
            "required": ["income_statement", "cash_flow", "expense_breakdown"],
            "properties": {
                "income_statement": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["periods"],
                    "properties": {
                        "periods": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": [
                                    "label",
                                    "revenue",
                                    "cogs",
                                    "gross_profit",
                                    "operating_expenses",
                                    "operating_income",
                                    "other_net",
                                    "taxes",
                                    "net_income",
                                    "margins",
                                ],
                                "properties": {
                                    "label": {"type": "string"},
                                    "revenue": {"type": "number"},
                                    "cogs": {"type": "number"},
                                    "gross_profit": {"type": "number"},
                                    "operating_expenses": {"type": "number"},
                                    "operating_income": {"type": "number"},
                                    "other_net": {"type": "number"},
                                    "taxes": {"type": "number"},
                                    "net_income": {"type": "number"},
                                    "margins": {
                                        "type": "object",
                                        "additionalProperties": false,
                                        "required": ["gross", "operating", "net"],
                                        "properties": {
                                            "gross": {"type": "number"},
                                            "operating": {"type": "number"},
                                            "net": {"type": "number"},
                                        },
                                    },
                                },
                            },
                        }
                    },
                },
                "cash_flow": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["operating", "investing", "financing", "net_change"],
                    "properties": {
                        "operating": {"type": "number"},
                        "investing": {"type": "number"},
                        "financing": {"type": "number"},
                        "net_change": {"type": "number"},
                    },
                },
                "expense_breakdown": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["by_category", "by_vendor", "by_month"],
                    "properties": {
                        "by_category": labelled_total_series(),
                        "by_vendor": labelled_total_series(),
                        "by_month": labelled_total_series(),
                    },
                },
            },
        },
        "strict": true,
    })
}

/// An array of `{label, total}` aggregates, shared by the three
/// expense-breakdown axes.
fn labelled_total_series() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "additionalProperties": false,
            "required": ["label", "total"],
            "properties": {
                "label": {"type": "string"},
                "total": {"type": "number"},
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_profile_yields_strict_json_schema_format() {
        let format = response_format("income_cashflow_expense").unwrap();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["strict"], true);
        assert_eq!(format["json_schema"]["name"], "financial_reports");
    }

    #[test]
    fn schema_requires_all_three_sections() {
        let format = response_format(DEFAULT_PROFILE).unwrap();
        let required = format["json_schema"]["schema"]["required"]
            .as_array()
            .unwrap();
        let names: Vec<&str> = required.iter().filter_map(Value::as_str).collect();
        assert_eq!(
            names,
            ["income_statement", "cash_flow", "expense_breakdown"]
        );
    }

    #[test]
    fn expense_axes_share_the_label_total_shape() {
        let format = response_format(DEFAULT_PROFILE).unwrap();
        let breakdown =
            &format["json_schema"]["schema"]["properties"]["expense_breakdown"]["properties"];
        for axis in ["by_category", "by_vendor", "by_month"] {
            assert_eq!(breakdown[axis]["items"]["required"][0], "label");
            assert_eq!(breakdown[axis]["items"]["required"][1], "total");
        }
    }

    #[test]
    fn unrecognized_profiles_yield_none() {
        assert!(response_format("default").is_none());
        assert!(response_format("balance_sheet").is_none());
        assert!(response_format("").is_none());
    }
}
