//! Parse tree returned by the remote analyzer.
//!
//! Nodes arrive either as `{category, value, children}` or in the shape the
//! original web diagram consumed, `{name, attributes: {value}, children}`.
//! Both deserialize into the same closed model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node categories the analyzer emits, plus a fallback for anything else
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Comando,
    Verbo,
    Palabras,
    Tiempo,
    Fecha,
    Hora,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Comando => "COMANDO",
            Category::Verbo => "VERBO",
            Category::Palabras => "PALABRAS",
            Category::Tiempo => "TIEMPO",
            Category::Fecha => "FECHA",
            Category::Hora => "HORA",
            Category::Other(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "COMANDO" => Category::Comando,
            "VERBO" => Category::Verbo,
            "PALABRAS" => Category::Palabras,
            "TIEMPO" => Category::Tiempo,
            "FECHA" => Category::Fecha,
            "HORA" => Category::Hora,
            _ => Category::Other(name.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    Text(String),
    List(Vec<String>),
}

impl NodeValue {
    fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::String(text) => Some(NodeValue::Text(text)),
            Value::Array(items) => Some(NodeValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            other => Some(NodeValue::Text(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawNode")]
pub struct AstNode {
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(category: impl Into<Category>) -> Self {
        Self {
            category: category.into(),
            value: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(NodeValue::Text(value.into()));
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value = Some(NodeValue::List(values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    /// Sequence values joined by spaces, text as-is, nothing as empty
    pub fn display_value(&self) -> String {
        match &self.value {
            Some(NodeValue::List(items)) => items.join(" "),
            Some(NodeValue::Text(text)) => text.clone(),
            None => String::new(),
        }
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AstNode::node_count).sum::<usize>()
    }

    /// Node at a child-index path from this node
    pub fn at_path(&self, path: &[usize]) -> Option<&AstNode> {
        path.iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    /// Plain-text rendering with box-drawing guides, one node per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, "", None);
        out
    }

    fn write_outline(&self, out: &mut String, prefix: &str, last: Option<bool>) {
        let (branch, extension) = match last {
            None => ("", ""),
            Some(true) => ("└── ", "    "),
            Some(false) => ("├── ", "│   "),
        };

        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(self.category.as_str());
        let value = self.display_value();
        if !value.is_empty() {
            out.push_str(": ");
            out.push_str(&value);
        }
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, extension);
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.write_outline(out, &child_prefix, Some(i + 1 == count));
        }
    }
}

#[derive(Deserialize)]
struct RawAttributes {
    #[serde(default)]
    value: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default, alias = "name")]
    category: Option<String>,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    attributes: Option<RawAttributes>,
    #[serde(default)]
    children: Option<Vec<RawNode>>,
}

impl From<RawNode> for AstNode {
    fn from(raw: RawNode) -> Self {
        let value = raw
            .value
            .or_else(|| raw.attributes.and_then(|a| a.value))
            .and_then(NodeValue::from_json);

        AstNode {
            category: Category::from(raw.category.as_deref().unwrap_or_default()),
            value,
            children: raw
                .children
                .unwrap_or_default()
                .into_iter()
                .map(AstNode::from)
                .collect(),
        }
    }
}
