use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::CatalogError;

/// Static metadata advertised for a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ExecuteCode,
    Add,
    CalculateBmi,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::ExecuteCode, Tool::Add, Tool::CalculateBmi];

    pub fn from_name(name: &str) -> Option<Tool> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::ExecuteCode => "execute_code",
            Tool::Add => "add",
            Tool::CalculateBmi => "calculate_bmi",
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        match self {
            Tool::ExecuteCode => ToolDescriptor {
                name: self.name(),
                description: "Execute Python code and return its captured stdout, stderr and any exception. \
                              Set `stream` to receive execution events as newline-delimited JSON.",
                input_schema: json!({
                    "type": "object",
                    "title": "execute_codeArguments",
                    "properties": {
                        "code": {
                            "title": "Code",
                            "type": "string",
                            "description": "Python source to execute"
                        },
                        "stream": {
                            "title": "Stream",
                            "type": "boolean",
                            "default": false,
                            "description": "Stream execution events instead of returning one result"
                        }
                    },
                    "required": ["code"]
                }),
            },
            Tool::Add => ToolDescriptor {
                name: self.name(),
                description: "Add two numbers",
                input_schema: json!({
                    "type": "object",
                    "title": "addArguments",
                    "properties": {
                        "a": {"title": "A", "type": "integer"},
                        "b": {"title": "B", "type": "integer"}
                    },
                    "required": ["a", "b"]
                }),
            },
            Tool::CalculateBmi => ToolDescriptor {
                name: self.name(),
                description: "Calculate BMI given weight in kg and height in meters",
                input_schema: json!({
                    "type": "object",
                    "title": "calculate_bmiArguments",
                    "properties": {
                        "weight_kg": {"title": "Weight Kg", "type": "number"},
                        "height_m": {"title": "Height M", "type": "number"}
                    },
                    "required": ["weight_kg", "height_m"]
                }),
            },
        }
    }
}

/// Envelope of `POST /tools/call`.
///
/// `name` stays untyped so that a missing or non-string name resolves to an
/// unknown tool rather than a body parse failure.
#[derive(Debug, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn resolve(&self) -> Result<Tool, CatalogError> {
        self.name
            .as_str()
            .and_then(Tool::from_name)
            .ok_or(CatalogError::UnknownTool)
    }
}

/// Arguments of `execute_code`.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteArgs {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

impl ExecuteArgs {
    pub fn parse(arguments: &Value) -> Result<Self, CatalogError> {
        if arguments.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(arguments.clone())
            .map_err(|e| CatalogError::InvalidArguments(format!("Error: {}", e)))
    }

    /// The code to run, or `None` when missing or empty.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct AddArgs {
    a: i64,
    b: i64,
}

#[derive(Debug, Deserialize)]
struct BmiArgs {
    weight_kg: f64,
    height_m: f64,
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: &Value) -> Result<T, CatalogError> {
    serde_json::from_value(arguments.clone())
        .map_err(|e| CatalogError::InvalidArguments(format!("Error: {}", e)))
}

/// Evaluate one of the in-process tools and return its text output.
pub fn call_builtin(tool: Tool, arguments: &Value) -> Result<String, CatalogError> {
    match tool {
        Tool::Add => {
            let args: AddArgs = parse_args(arguments)?;
            let sum = args.a.checked_add(args.b).ok_or_else(|| {
                CatalogError::InvalidArguments("Error: integer overflow".to_string())
            })?;
            Ok(sum.to_string())
        }
        Tool::CalculateBmi => {
            let args: BmiArgs = parse_args(arguments)?;
            if args.height_m <= 0.0 {
                return Err(CatalogError::InvalidArguments(
                    "Error: height_m must be greater than zero".to_string(),
                ));
            }
            Ok((args.weight_kg / args.height_m.powi(2)).to_string())
        }
        Tool::ExecuteCode => Err(CatalogError::InvalidArguments(
            "Error: execute_code is not an in-process tool".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("nonexistent_tool"), None);
    }

    #[test]
    fn add_schema_requires_both_operands() {
        let descriptor = Tool::Add.descriptor();
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["inputSchema"]["required"], json!(["a", "b"]));
        assert_eq!(value["description"], "Add two numbers");
    }

    #[test]
    fn add_returns_sum_as_text() {
        assert_eq!(call_builtin(Tool::Add, &json!({"a": 1, "b": 2})).unwrap(), "3");
        assert!(matches!(
            call_builtin(Tool::Add, &json!({"a": 1})),
            Err(CatalogError::InvalidArguments(_))
        ));
    }

    #[test]
    fn bmi_divides_by_height_squared() {
        let text = call_builtin(
            Tool::CalculateBmi,
            &json!({"weight_kg": 70.0, "height_m": 2.0}),
        )
        .unwrap();
        assert_eq!(text, "17.5");

        assert!(call_builtin(
            Tool::CalculateBmi,
            &json!({"weight_kg": 70.0, "height_m": 0.0}),
        )
        .is_err());
    }

    #[test]
    fn tool_call_without_string_name_is_unknown() {
        for body in [
            json!({"arguments": {}}),
            json!({"name": null, "arguments": {}}),
            json!({"name": 7}),
        ] {
            let call: ToolCall = serde_json::from_value(body).unwrap();
            assert!(matches!(call.resolve(), Err(CatalogError::UnknownTool)));
        }

        let call: ToolCall = serde_json::from_value(json!({"name": "add"})).unwrap();
        assert_eq!(call.resolve().unwrap(), Tool::Add);
    }

    #[test]
    fn execute_args_only_reject_missing_or_empty_code() {
        assert!(ExecuteArgs::parse(&Value::Null).unwrap().code().is_none());
        assert!(ExecuteArgs::parse(&json!({"code": ""})).unwrap().code().is_none());
        assert_eq!(
            ExecuteArgs::parse(&json!({"code": "  \n"})).unwrap().code(),
            Some("  \n")
        );

        let args = ExecuteArgs::parse(&json!({"code": "print(1)", "stream": true})).unwrap();
        assert_eq!(args.code(), Some("print(1)"));
        assert!(args.stream);

        assert!(ExecuteArgs::parse(&json!({"code": 5})).is_err());
    }
}
