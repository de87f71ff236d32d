//! Node definitions: the static schema every node type registers with

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::nodes::interface::{ParamValue, Parameters};

/// Data types that can flow through ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Paths,
    Number,
    Vector,
    Boolean,
    NumberArray,
}

impl DataType {
    /// Get a human-readable name for this data type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Paths => "paths",
            DataType::Number => "number",
            DataType::Vector => "vector",
            DataType::Boolean => "boolean",
            DataType::NumberArray => "numberArray",
        }
    }
}

/// Hierarchical category system for organizing nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeCategory {
    path: Vec<String>,
}

impl NodeCategory {
    /// Create a new category from path components
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Get the category name (last component)
    pub fn name(&self) -> &str {
        self.path.last().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn display_string(&self) -> String {
        self.path.join(" > ")
    }

    pub fn math() -> Self {
        Self::new(&["Math"])
    }

    pub fn data() -> Self {
        Self::new(&["Data"])
    }

    pub fn output() -> Self {
        Self::new(&["Output"])
    }

    pub fn utility() -> Self {
        Self::new(&["Utility"])
    }

    pub fn generator() -> Self {
        Self::new(&["Generators"])
    }

    pub fn modifier() -> Self {
        Self::new(&["Modifiers"])
    }
}

/// Port definition for node creation
#[derive(Debug, Clone, PartialEq)]
pub struct PortDefinition {
    pub name: String,
    pub data_type: DataType,
    pub optional: bool,
}

impl PortDefinition {
    pub fn required(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            optional: false,
        }
    }

    pub fn optional(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            optional: true,
        }
    }
}

/// Editor widget a parameter is edited with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Number,
    Select,
    Boolean,
    File,
    Text,
}

/// Shows a parameter only while another parameter holds a given value
#[derive(Debug, Clone, PartialEq)]
pub struct ShowWhen {
    pub param: String,
    pub value: ParamValue,
}

impl ShowWhen {
    pub fn is_satisfied(&self, params: &Parameters) -> bool {
        params.get(&self.param) == Some(&self.value)
    }
}

/// One entry of a node's parameter schema
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub name: String,
    pub label: String,
    pub kind: ParameterKind,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub options: Vec<String>,
    pub show_when: Option<ShowWhen>,
    /// Wire type accepted when the parameter is promoted to a `param:<name>` port
    pub promotable: Option<DataType>,
}

impl ParameterDefinition {
    fn base(name: &str, label: &str, kind: ParameterKind, default: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            default,
            min: None,
            max: None,
            step: None,
            options: Vec::new(),
            show_when: None,
            promotable: None,
        }
    }

    /// Numeric parameter, promotable as a number
    pub fn number(name: &str, label: &str, default: f64) -> Self {
        Self {
            promotable: Some(DataType::Number),
            ..Self::base(name, label, ParameterKind::Number, ParamValue::Number(default))
        }
    }

    /// Boolean parameter, promotable as a boolean
    pub fn boolean(name: &str, label: &str, default: bool) -> Self {
        Self {
            promotable: Some(DataType::Boolean),
            ..Self::base(name, label, ParameterKind::Boolean, ParamValue::Boolean(default))
        }
    }

    pub fn select(name: &str, label: &str, options: &[&str], default: &str) -> Self {
        Self {
            options: options.iter().map(|s| s.to_string()).collect(),
            ..Self::base(name, label, ParameterKind::Select, ParamValue::Text(default.to_string()))
        }
    }

    pub fn file(name: &str, label: &str) -> Self {
        Self::base(name, label, ParameterKind::File, ParamValue::Text(String::new()))
    }

    pub fn text(name: &str, label: &str, default: &str) -> Self {
        Self::base(name, label, ParameterKind::Text, ParamValue::Text(default.to_string()))
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_show_when(mut self, param: &str, value: impl Into<ParamValue>) -> Self {
        self.show_when = Some(ShowWhen {
            param: param.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn with_promotable(mut self, data_type: Option<DataType>) -> Self {
        self.promotable = data_type;
        self
    }
}

/// Rich metadata for a node type - the single source of truth for its ports and parameters
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefinition {
    pub node_type: String,
    pub display_name: String,
    pub description: String,
    pub category: NodeCategory,
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
    pub parameters: Vec<ParameterDefinition>,
}

impl NodeDefinition {
    pub fn new(node_type: &str, display_name: &str, category: NodeCategory, description: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            category,
            inputs: vec![],
            outputs: vec![],
            parameters: vec![],
        }
    }

    /// Generator: no path input, one `paths` output
    pub fn generator(node_type: &str, display_name: &str, description: &str) -> Self {
        Self::new(node_type, display_name, NodeCategory::generator(), description)
            .with_outputs(vec![PortDefinition::required("paths", DataType::Paths)])
    }

    /// Modifier: one `paths` input transformed into one `paths` output
    pub fn modifier(node_type: &str, display_name: &str, description: &str) -> Self {
        Self::new(node_type, display_name, NodeCategory::modifier(), description)
            .with_inputs(vec![PortDefinition::optional("paths", DataType::Paths)])
            .with_outputs(vec![PortDefinition::required("paths", DataType::Paths)])
    }

    pub fn with_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Declares additional named inputs after the existing ones
    pub fn with_extra_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortDefinition>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterDefinition>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn input(&self, name: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&PortDefinition> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Merges declared defaults with stored overrides into a fully-populated record.
    ///
    /// Stored values for names the schema does not declare are carried through unchanged.
    pub fn resolve_parameters(&self, stored: &BTreeMap<String, ParamValue>) -> Parameters {
        let mut params = Parameters::new();
        for definition in &self.parameters {
            params.set(&definition.name, definition.default.clone());
        }
        for (name, value) in stored {
            params.set(name, value.clone());
        }
        params
    }

    /// Parameters currently visible given the other parameter values
    pub fn visible_parameters<'a>(&'a self, params: &'a Parameters) -> impl Iterator<Item = &'a ParameterDefinition> {
        self.parameters
            .iter()
            .filter(move |p| p.show_when.as_ref().map_or(true, |cond| cond.is_satisfied(params)))
    }
}
